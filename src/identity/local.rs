// In-process identity provider backed by an in-memory account table

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::WindTunnelError;

use super::{AuthError, IdentityProvider, Principal, SessionCallback, Subscription};

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

/// One account as stored in the accounts file (one JSON object per line).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(default = "new_uid")]
    pub uid: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub disabled: bool,
}

fn new_uid() -> String {
    Uuid::new_v4().to_string()
}

impl AccountRecord {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            uid: new_uid(),
            email: email.trim().to_string(),
            password: password.to_string(),
            email_verified: false,
            disabled: false,
        }
    }

    fn principal(&self) -> Principal {
        Principal {
            uid: self.uid.clone(),
            email: self.email.clone(),
            email_verified: self.email_verified,
        }
    }
}

type SharedCallback = Arc<dyn Fn(Option<&Principal>) + Send + Sync>;

#[derive(Default)]
struct ProviderState {
    // keyed by lowercased email
    accounts: HashMap<String, AccountRecord>,
    current: Option<Principal>,
    subscribers: Vec<(u64, SharedCallback)>,
    next_subscriber_id: u64,
    sent_verifications: Vec<String>,
}

/// Identity provider that keeps accounts in memory.
///
/// Accounts can be seeded from a JSON Lines file; when a file is configured new
/// registrations are appended to it. Verification emails are only logged. With
/// `auto_verify` the account is marked verified as soon as the email is "sent".
pub struct LocalIdentityProvider {
    state: Arc<Mutex<ProviderState>>,
    accounts_file: Option<PathBuf>,
    auto_verify: bool,
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The account's principal when it is the one signed in and differs from the
/// session, so the caller can publish the change.
fn signed_in_as(state: &ProviderState, principal: Principal) -> Option<Principal> {
    match &state.current {
        Some(current) if current.uid == principal.uid && *current != principal => Some(principal),
        _ => None,
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState::default())),
            accounts_file: None,
            auto_verify: false,
        }
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = AccountRecord>) -> Self {
        let provider = Self::new();
        {
            let mut state = provider.lock();
            for account in accounts {
                state.accounts.insert(account_key(&account.email), account);
            }
        }
        provider
    }

    /// Load accounts from a JSON Lines file. A missing file yields an empty provider
    /// that will create the file on the first registration.
    pub fn from_accounts_file(path: &Path) -> Result<Self, WindTunnelError> {
        let mut accounts = Vec::new();
        if path.exists() {
            let file = File::open(path).map_err(|e| WindTunnelError::AccountsIOError { source: e })?;
            for (line_no, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|e| WindTunnelError::AccountsIOError { source: e })?;
                if line.trim().is_empty() {
                    continue;
                }
                let account: AccountRecord = serde_json::from_str(&line).map_err(|e| {
                    error!("Could not parse account on line {}: {}", line_no + 1, e);
                    WindTunnelError::AccountsParseError {
                        line: line_no + 1,
                        source: e,
                    }
                })?;
                accounts.push(account);
            }
            info!("Loaded {} accounts from {:?}", accounts.len(), path);
        } else {
            debug!("Accounts file {:?} does not exist yet", path);
        }

        let mut provider = Self::with_accounts(accounts);
        provider.accounts_file = Some(path.to_path_buf());
        Ok(provider)
    }

    pub fn auto_verify(mut self, auto_verify: bool) -> Self {
        self.auto_verify = auto_verify;
        self
    }

    /// Mark an account verified, as if the user followed the link in the email.
    pub fn verify_email(&self, email: &str) -> Result<(), AuthError> {
        let refreshed = {
            let mut state = self.lock();
            let account = state
                .accounts
                .get_mut(&account_key(email))
                .ok_or(AuthError::UserNotFound)?;
            account.email_verified = true;
            let principal = account.principal();
            signed_in_as(&state, principal)
        };
        if let Some(principal) = refreshed {
            self.set_session(Some(principal));
        }
        Ok(())
    }

    pub fn set_disabled(&self, email: &str, disabled: bool) -> Result<(), AuthError> {
        let mut state = self.lock();
        let account = state
            .accounts
            .get_mut(&account_key(email))
            .ok_or(AuthError::UserNotFound)?;
        account.disabled = disabled;
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Addresses a verification email was sent to, oldest first.
    pub fn sent_verification_emails(&self) -> Vec<String> {
        self.lock().sent_verifications.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_session(&self, session: Option<Principal>) {
        let (session, callbacks) = {
            let mut state = self.lock();
            if state.current == session {
                return;
            }
            state.current = session;
            let callbacks: Vec<SharedCallback> = state
                .subscribers
                .iter()
                .map(|(_, callback)| callback.clone())
                .collect();
            (state.current.clone(), callbacks)
        };

        // callbacks run outside the lock so they may call back into the provider
        for callback in callbacks {
            callback(session.as_ref());
        }
    }

    fn persist_account(&self, account: &AccountRecord) -> Result<(), AuthError> {
        let Some(path) = &self.accounts_file else {
            return Ok(());
        };
        serde_jsonlines::append_json_lines(path, [account]).map_err(|e| {
            error!("Could not append account to {:?}: {}", path, e);
            AuthError::Other {
                code: "auth/internal-error".to_string(),
            }
        })
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min_len: MIN_PASSWORD_LEN,
            });
        }

        let account = {
            let mut state = self.lock();
            let key = account_key(email);
            if state.accounts.contains_key(&key) {
                return Err(AuthError::EmailAlreadyInUse);
            }
            let account = AccountRecord::new(email, password);
            // the account only exists once it is on disk
            self.persist_account(&account)?;
            state.accounts.insert(key, account.clone());
            account
        };
        info!("Registered account {}", account.email);

        let principal = account.principal();
        self.set_session(Some(principal.clone()));
        self.send_verification_email(&principal)?;

        Ok(self.current_user().unwrap_or(principal))
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        let principal = {
            let state = self.lock();
            let account = state
                .accounts
                .get(&account_key(email))
                .ok_or(AuthError::UserNotFound)?;
            if account.disabled {
                return Err(AuthError::UserDisabled);
            }
            if account.password != password {
                return Err(AuthError::WrongPassword);
            }
            account.principal()
        };

        info!("Signed in as {}", principal.email);
        self.set_session(Some(principal.clone()));
        Ok(principal)
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(current) = self.current_user() {
            info!("Signed out {}", current.email);
        }
        self.set_session(None);
        Ok(())
    }

    fn on_session_changed(&self, callback: SessionCallback) -> Subscription {
        let callback: SharedCallback = Arc::from(callback);
        let (id, session) = {
            let mut state = self.lock();
            let id = state.next_subscriber_id;
            state.next_subscriber_id += 1;
            state.subscribers.push((id, callback.clone()));
            (id, state.current.clone())
        };
        debug!("Session subscriber {} registered", id);

        callback(session.as_ref());

        let state: Weak<Mutex<ProviderState>> = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                state.subscribers.retain(|(subscriber_id, _)| *subscriber_id != id);
                debug!("Session subscriber {} released", id);
            }
        })
    }

    fn send_verification_email(&self, principal: &Principal) -> Result<(), AuthError> {
        let refreshed = {
            let mut state = self.lock();
            let key = account_key(&principal.email);
            let account = state.accounts.get_mut(&key).ok_or_else(|| {
                warn!("Verification email requested for unknown account {}", principal.email);
                AuthError::UserNotFound
            })?;
            if self.auto_verify {
                account.email_verified = true;
            }
            let account_principal = account.principal();
            state.sent_verifications.push(account_principal.email.clone());
            info!("Verification email sent to {}", account_principal.email);
            signed_in_as(&state, account_principal)
        };
        if let Some(principal) = refreshed {
            self.set_session(Some(principal));
        }
        Ok(())
    }

    fn current_user(&self) -> Option<Principal> {
        self.lock().current.clone()
    }
}
