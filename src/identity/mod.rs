pub mod local;
pub mod messages;

use std::fmt;

use serde::{Deserialize, Serialize};
use snafu::Snafu;

pub use local::{AccountRecord, LocalIdentityProvider};

/// An authenticated user as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
}

/// Errors reported by an identity provider. Each variant maps to one provider error code.
#[derive(Clone, Debug, PartialEq, Eq, Snafu)]
pub enum AuthError {
    #[snafu(display("The email address is already in use by another account"))]
    EmailAlreadyInUse,
    #[snafu(display("The email address is badly formatted"))]
    InvalidEmail,
    #[snafu(display("The password must be at least {min_len} characters long"))]
    WeakPassword { min_len: usize },
    #[snafu(display("The user account has been disabled"))]
    UserDisabled,
    #[snafu(display("There is no user record corresponding to this identifier"))]
    UserNotFound,
    #[snafu(display("The password is invalid"))]
    WrongPassword,
    #[snafu(display("Identity provider error: {code}"))]
    Other { code: String },
}

impl AuthError {
    /// Provider-side error code, e.g. `auth/invalid-email`.
    pub fn code(&self) -> &str {
        match self {
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::InvalidEmail => "auth/invalid-email",
            Self::WeakPassword { .. } => "auth/weak-password",
            Self::UserDisabled => "auth/user-disabled",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::Other { code } => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/weak-password" => Self::WeakPassword {
                min_len: local::MIN_PASSWORD_LEN,
            },
            "auth/user-disabled" => Self::UserDisabled,
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            other => Self::Other {
                code: other.to_string(),
            },
        }
    }
}

/// Callback invoked with the current session on subscribe and on every change.
pub type SessionCallback = Box<dyn Fn(Option<&Principal>) + Send + Sync>;

/// Handle to a session-change subscription. Dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn unsubscribe(self) {
        drop(self)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// The identity collaborator the application authenticates against.
///
/// The application never mutates the session directly: it calls the account
/// operations and observes the outcome through [`IdentityProvider::on_session_changed`].
pub trait IdentityProvider: Send + Sync {
    /// Create an account, sign it in and send a verification email.
    fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribe to session changes. The callback fires once immediately with the
    /// current session and then after every transition.
    fn on_session_changed(&self, callback: SessionCallback) -> Subscription;

    fn send_verification_email(&self, principal: &Principal) -> Result<(), AuthError>;

    fn current_user(&self) -> Option<Principal>;
}
