//! Session lifecycle integration tests.
//!
//! Drives login/logout/registration and the forced sign-out path against the
//! recording stub backend, and checks the credential/header coupling the
//! whole console relies on.

use terra_console::{ApiError, AuthOutcome, ConsoleConfig, OrderWorkflow, SessionManager};
use terra_integration_tests::{ADMIN_PASSWORD, ADMIN_USERNAME, TestContext};
use url::Url;

// =============================================================================
// Login / registration
// =============================================================================

#[tokio::test]
async fn test_login_installs_session_atomically() {
    let ctx = TestContext::new().await;
    assert!(!ctx.session.is_authenticated().await);
    assert!(ctx.session.principal().await.is_none());

    let outcome = ctx
        .session
        .login(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .expect("exchange");
    assert!(outcome.is_granted());

    // Authenticated iff credential and principal are both present.
    assert!(ctx.session.is_authenticated().await);
    let principal = ctx.session.principal().await.expect("principal");
    assert_eq!(principal.username, ADMIN_USERNAME);
}

#[tokio::test]
async fn test_rejected_login_is_reported_not_raised() {
    let ctx = TestContext::new().await;

    // Known account, wrong password: rejection inside a 200 envelope.
    let outcome = ctx
        .session
        .login(ADMIN_USERNAME, "wrong-password")
        .await
        .expect("exchange");
    match outcome {
        AuthOutcome::Rejected { message } => {
            assert_eq!(message, "Invalid username or password");
        }
        AuthOutcome::Granted => panic!("wrong password must be rejected"),
    }
    assert!(!ctx.session.is_authenticated().await);

    // Unknown account: rejection as a 401 with the same envelope.
    let outcome = ctx
        .session
        .login("ghost", "whatever")
        .await
        .expect("exchange");
    assert!(!outcome.is_granted());
    assert!(!ctx.session.is_authenticated().await);
}

#[tokio::test]
async fn test_register_bootstraps_first_admin_only() {
    let ctx = TestContext::new().await;
    ctx.backend.clear_accounts();

    let outcome = ctx
        .session
        .register("founder", "founder@example.com", "hunter22")
        .await
        .expect("exchange");
    assert!(outcome.is_granted());
    assert!(ctx.session.is_authenticated().await);
    assert_eq!(
        ctx.session.principal().await.expect("principal").username,
        "founder"
    );

    // A second registration is refused by the backend rule, not by us.
    let second = SessionManager::open(&ctx.config()).await;
    second.logout().await;
    let outcome = second
        .register("intruder", "intruder@example.com", "hunter23")
        .await
        .expect("exchange");
    match outcome {
        AuthOutcome::Rejected { message } => {
            assert_eq!(message, "Administrator already exists");
        }
        AuthOutcome::Granted => panic!("second registration must be rejected"),
    }
}

#[tokio::test]
async fn test_register_short_password_never_hits_network() {
    let ctx = TestContext::new().await;

    let err = ctx
        .session
        .register("admin", "admin@example.com", "12345")
        .await
        .expect_err("short password");
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(ctx.backend.request_count(), 0);
}

// =============================================================================
// Credential / header coupling
// =============================================================================

#[tokio::test]
async fn test_anonymous_calls_carry_no_credential() {
    let ctx = TestContext::new().await;

    let _ = ctx.session.login(ADMIN_USERNAME, "wrong-password").await;
    let err = ctx.workflow.list().await.expect_err("anonymous listing");
    assert!(matches!(err, ApiError::Unauthorized));

    for request in ctx.backend.requests() {
        assert!(
            request.authorization.is_none(),
            "anonymous {} {} must carry no credential",
            request.method,
            request.path
        );
    }
}

#[tokio::test]
async fn test_authenticated_calls_carry_exactly_current_credential() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    ctx.workflow.list().await.expect("listing");

    let token = ctx
        .backend
        .valid_tokens()
        .last()
        .cloned()
        .expect("issued token");
    let listings = ctx.backend.requests_matching("GET", "/orders");
    assert_eq!(listings.len(), 1);
    assert_eq!(
        listings.first().expect("listing").authorization,
        Some(format!("Bearer {token}"))
    );

    // A fresh login supersedes the credential; later calls carry the new one.
    ctx.login().await;
    ctx.workflow.list().await.expect("listing");

    let newest = ctx
        .backend
        .valid_tokens()
        .last()
        .cloned()
        .expect("reissued token");
    assert_ne!(newest, token);
    let listings = ctx.backend.requests_matching("GET", "/orders");
    assert_eq!(
        listings.last().expect("listing").authorization,
        Some(format!("Bearer {newest}"))
    );
}

#[tokio::test]
async fn test_unauthorized_response_forces_anonymous() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    ctx.backend.revoke_tokens();

    let err = ctx.workflow.list().await.expect_err("revoked credential");
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!ctx.session.is_authenticated().await);

    // The dead credential is gone for good: the next call goes out bare.
    let _ = ctx.workflow.list().await;
    let last = ctx.backend.requests();
    let last = last.last().expect("recorded listing");
    assert!(last.authorization.is_none());

    // And the durable record is gone too - a restart stays anonymous.
    let restarted = SessionManager::open(&ctx.config()).await;
    assert!(!restarted.is_authenticated().await);
}

// =============================================================================
// Durability
// =============================================================================

#[tokio::test]
async fn test_session_persists_across_restart() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    let principal = ctx.session.principal().await.expect("principal");

    let restarted = SessionManager::open(&ctx.config()).await;
    assert!(restarted.is_authenticated().await);
    assert_eq!(restarted.principal().await, Some(principal));

    // The restored credential is live, not just displayed.
    let workflow = OrderWorkflow::new(restarted);
    let orders = workflow.list().await.expect("listing after restart");
    assert_eq!(orders.len(), 2);
}

#[tokio::test]
async fn test_corrupt_store_falls_back_to_anonymous() {
    let ctx = TestContext::new().await;
    ctx.login().await;

    let config = ctx.config();
    tokio::fs::write(config.session_file(), b"{not json")
        .await
        .expect("corrupt the record");

    let restarted = SessionManager::open(&config).await;
    assert!(!restarted.is_authenticated().await);
    assert!(restarted.principal().await.is_none());
}

#[tokio::test]
async fn test_logout_is_local_and_total() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    let served = ctx.backend.request_count();

    ctx.session.logout().await;

    // No network call, memory and store both cleared.
    assert_eq!(ctx.backend.request_count(), served);
    assert!(!ctx.session.is_authenticated().await);
    let restarted = SessionManager::open(&ctx.config()).await;
    assert!(!restarted.is_authenticated().await);

    // Logging out again is fine.
    ctx.session.logout().await;
    assert!(!ctx.session.is_authenticated().await);
}

// =============================================================================
// Transport failure
// =============================================================================

#[tokio::test]
async fn test_transport_failure_is_distinct_and_recoverable() {
    // Grab a port nobody is listening on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let dir = tempfile::tempdir().expect("temp state dir");
    let config = ConsoleConfig::new(
        Url::parse(&format!("http://{addr}")).expect("url"),
        dir.path(),
    );
    let session = SessionManager::open(&config).await;

    let err = session
        .login(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .expect_err("unreachable backend");
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(err.is_retryable());
    assert!(!session.is_authenticated().await);
}
