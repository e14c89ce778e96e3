// Integration tests for the session guard driving a navigator
//
// These walk the same flows the application does: start on the index screen,
// register or sign in through the identity provider, navigate, sign out, and
// check that the guard keeps the screen stack on the right side of the
// authentication boundary.

use std::{fs, sync::Arc};

use tempfile::TempDir;
use windtunnel::{
    IdentityProvider, LocalIdentityProvider, Navigator, Route, SessionGuard, WindTunnelError,
    identity::AccountRecord,
};

fn verified_account(email: &str, password: &str) -> AccountRecord {
    let mut account = AccountRecord::new(email, password);
    account.email_verified = true;
    account
}

fn mount(provider: &Arc<LocalIdentityProvider>, navigator: &Navigator) -> SessionGuard {
    let provider: Arc<dyn IdentityProvider> = provider.clone();
    SessionGuard::mount(provider, navigator.current())
}

#[test]
fn test_signed_out_user_lands_on_login() {
    let provider = Arc::new(LocalIdentityProvider::new());
    let mut navigator = Navigator::default();
    let mut guard = mount(&provider, &navigator);

    assert_eq!(guard.poll(&mut navigator), 1);
    assert_eq!(navigator.current(), &Route::Login);
    assert!(guard.is_session_known());
    assert!(guard.session().is_none());

    // register is part of the unauthenticated area
    navigator.push(Route::Register);
    assert_eq!(guard.poll(&mut navigator), 0);
    assert_eq!(navigator.current(), &Route::Register);
}

#[test]
fn test_full_session_lifecycle() {
    let provider = Arc::new(LocalIdentityProvider::with_accounts([verified_account(
        "pilot@example.com",
        "secret1",
    )]));
    let mut navigator = Navigator::new(Route::Login);
    let mut guard = mount(&provider, &navigator);
    assert_eq!(guard.poll(&mut navigator), 0);

    provider.sign_in("pilot@example.com", "secret1").unwrap();
    assert_eq!(guard.poll(&mut navigator), 1);
    assert_eq!(navigator.current(), &Route::WingSelection);
    assert_eq!(guard.session().map(|p| p.email.as_str()), Some("pilot@example.com"));

    navigator.push(Route::test("naca2412"));
    navigator.push(Route::Users);
    assert_eq!(guard.poll(&mut navigator), 0);
    assert_eq!(navigator.depth(), 3);

    provider.sign_out().unwrap();
    assert_eq!(guard.poll(&mut navigator), 1);
    assert_eq!(navigator.current(), &Route::Login);
    assert!(guard.session().is_none());

    // the stack below the replaced screen is still protected
    assert!(navigator.back());
    assert_eq!(guard.poll(&mut navigator), 1);
    assert_eq!(navigator.current(), &Route::Login);
}

#[test]
fn test_registration_enters_authenticated_area() {
    let provider = Arc::new(LocalIdentityProvider::new());
    let mut navigator = Navigator::new(Route::Register);
    let mut guard = mount(&provider, &navigator);
    assert_eq!(guard.poll(&mut navigator), 0);

    let principal = provider.sign_up("new@example.com", "secret1").unwrap();
    assert!(!principal.email_verified);
    assert_eq!(provider.sent_verification_emails(), vec!["new@example.com"]);

    assert_eq!(guard.poll(&mut navigator), 1);
    assert_eq!(navigator.current(), &Route::WingSelection);
}

#[test]
fn test_subscriptions_do_not_accumulate() {
    let provider = Arc::new(LocalIdentityProvider::with_accounts([verified_account(
        "pilot@example.com",
        "secret1",
    )]));
    provider.sign_in("pilot@example.com", "secret1").unwrap();

    let mut navigator = Navigator::new(Route::WingSelection);
    let mut guard = mount(&provider, &navigator);
    for wing_id in ["naca0012", "naca2412", "naca4412", "naca1408"] {
        navigator.push(Route::test(wing_id));
        guard.poll(&mut navigator);
        navigator.back();
        guard.poll(&mut navigator);
    }
    navigator.push(Route::Control);
    guard.poll(&mut navigator);
    assert_eq!(provider.subscriber_count(), 1);

    drop(guard);
    assert_eq!(provider.subscriber_count(), 0);
}

#[test]
fn test_accounts_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let accounts_path = temp_dir.path().join("accounts.jsonl");

    {
        let provider = LocalIdentityProvider::from_accounts_file(&accounts_path).unwrap();
        provider.sign_up("first@example.com", "secret1").unwrap();
        provider.sign_out().unwrap();
        provider.sign_up("second@example.com", "secret2").unwrap();
    }
    let contents = fs::read_to_string(&accounts_path).unwrap();
    assert_eq!(contents.lines().count(), 2);

    let provider = LocalIdentityProvider::from_accounts_file(&accounts_path).unwrap();
    let principal = provider.sign_in("second@example.com", "secret2").unwrap();
    assert_eq!(principal.email, "second@example.com");
    assert!(matches!(
        provider.sign_up("first@example.com", "another1"),
        Err(windtunnel::AuthError::EmailAlreadyInUse)
    ));
}

#[test]
fn test_malformed_accounts_file_reports_line() {
    let temp_dir = TempDir::new().unwrap();
    let accounts_path = temp_dir.path().join("accounts.jsonl");
    fs::write(
        &accounts_path,
        "{\"email\":\"ok@example.com\",\"password\":\"secret1\"}\n\nnot json\n",
    )
    .unwrap();

    match LocalIdentityProvider::from_accounts_file(&accounts_path) {
        Err(WindTunnelError::AccountsParseError { line, .. }) => assert_eq!(line, 3),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("malformed file was accepted"),
    }
}
