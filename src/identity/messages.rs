// User-facing messages for identity failures and form validation

use super::AuthError;

pub const SIGN_IN_FAILED: &str = "An error occurred while signing in";
pub const SIGN_UP_FAILED: &str = "An error occurred during registration";
pub const INVALID_EMAIL: &str = "Invalid email address";
pub const USER_DISABLED: &str = "This account has been disabled";
pub const USER_NOT_FOUND: &str = "User not found";
pub const WRONG_PASSWORD: &str = "Wrong password";
pub const EMAIL_IN_USE: &str = "This email address is already in use";
pub const WEAK_PASSWORD: &str = "Password is too weak";

pub const MISSING_CREDENTIALS: &str = "Please enter your email and password";
pub const MISSING_FIELDS: &str = "Please fill in all fields";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

pub const REGISTRATION_SUCCEEDED: &str = "Registration successful! Please verify your email address.";
pub const EMAIL_NOT_VERIFIED: &str =
    "Your email address is not verified. Send a verification email?";
pub const VERIFICATION_SENT: &str = "Verification email sent";
pub const VERIFICATION_FAILED: &str = "Could not send verification email";
pub const SIGN_OUT_FAILED: &str = "An error occurred while signing out";

/// Message shown when signing in fails. Codes outside the sign-in set fall back
/// to a generic message.
pub fn sign_in_message(error: &AuthError) -> &'static str {
    match error {
        AuthError::InvalidEmail => INVALID_EMAIL,
        AuthError::UserDisabled => USER_DISABLED,
        AuthError::UserNotFound => USER_NOT_FOUND,
        AuthError::WrongPassword => WRONG_PASSWORD,
        _ => SIGN_IN_FAILED,
    }
}

/// Message shown when registration fails.
pub fn sign_up_message(error: &AuthError) -> &'static str {
    match error {
        AuthError::EmailAlreadyInUse => EMAIL_IN_USE,
        AuthError::InvalidEmail => INVALID_EMAIL,
        AuthError::WeakPassword { .. } => WEAK_PASSWORD,
        _ => SIGN_UP_FAILED,
    }
}

/// Validate the login form before calling the provider.
pub fn validate_login_form(email: &str, password: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(MISSING_CREDENTIALS);
    }
    Ok(())
}

/// Validate the registration form before calling the provider.
pub fn validate_register_form(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), &'static str> {
    if email.trim().is_empty() || password.is_empty() || confirm_password.is_empty() {
        return Err(MISSING_FIELDS);
    }
    if password != confirm_password {
        return Err(PASSWORD_MISMATCH);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_messages() {
        assert_eq!(sign_in_message(&AuthError::InvalidEmail), INVALID_EMAIL);
        assert_eq!(sign_in_message(&AuthError::UserDisabled), USER_DISABLED);
        assert_eq!(sign_in_message(&AuthError::UserNotFound), USER_NOT_FOUND);
        assert_eq!(sign_in_message(&AuthError::WrongPassword), WRONG_PASSWORD);
        // registration-only codes are not part of the sign-in set
        assert_eq!(sign_in_message(&AuthError::EmailAlreadyInUse), SIGN_IN_FAILED);
    }

    #[test]
    fn test_unmapped_code_falls_back() {
        let error = AuthError::from_code("auth/too-many-requests");
        assert_eq!(error.code(), "auth/too-many-requests");
        assert_eq!(sign_in_message(&error), SIGN_IN_FAILED);
        assert_eq!(sign_up_message(&error), SIGN_UP_FAILED);
    }

    #[test]
    fn test_sign_up_messages() {
        assert_eq!(sign_up_message(&AuthError::EmailAlreadyInUse), EMAIL_IN_USE);
        assert_eq!(sign_up_message(&AuthError::InvalidEmail), INVALID_EMAIL);
        assert_eq!(
            sign_up_message(&AuthError::WeakPassword { min_len: 6 }),
            WEAK_PASSWORD
        );
        assert_eq!(sign_up_message(&AuthError::WrongPassword), SIGN_UP_FAILED);
    }

    #[test]
    fn test_codes_roundtrip() {
        for code in [
            "auth/email-already-in-use",
            "auth/invalid-email",
            "auth/weak-password",
            "auth/user-disabled",
            "auth/user-not-found",
            "auth/wrong-password",
        ] {
            assert_eq!(AuthError::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_form_validation() {
        assert_eq!(validate_login_form("", "x"), Err(MISSING_CREDENTIALS));
        assert_eq!(validate_login_form("a@b.co", ""), Err(MISSING_CREDENTIALS));
        assert!(validate_login_form("a@b.co", "x").is_ok());

        assert_eq!(
            validate_register_form("a@b.co", "secret1", ""),
            Err(MISSING_FIELDS)
        );
        assert_eq!(
            validate_register_form("a@b.co", "secret1", "secret2"),
            Err(PASSWORD_MISMATCH)
        );
        assert!(validate_register_form("a@b.co", "secret1", "secret1").is_ok());
    }
}
