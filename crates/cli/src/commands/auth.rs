//! Session commands: login, register, logout, whoami.

use terra_console::{AuthOutcome, SessionManager};

use super::CommandError;

/// Sign in and persist the session.
///
/// # Errors
///
/// Returns `CommandError::Auth` when the backend rejects the credentials and
/// `CommandError::Api` on transport failure.
pub async fn login(
    session: &SessionManager,
    username: &str,
    password: &str,
) -> Result<(), CommandError> {
    match session.login(username, password).await? {
        AuthOutcome::Granted => {
            if let Some(principal) = session.principal().await {
                println!("Signed in as {} ({})", principal.username, principal.role);
            }
            Ok(())
        }
        AuthOutcome::Rejected { message } => Err(CommandError::Auth(message)),
    }
}

/// Register the first administrator and sign in.
///
/// # Errors
///
/// Same contract as [`login`]; additionally `CommandError::Api` with a
/// validation error for a too-short password.
pub async fn register(
    session: &SessionManager,
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), CommandError> {
    match session.register(username, email, password).await? {
        AuthOutcome::Granted => {
            println!("Administrator {username} registered and signed in");
            Ok(())
        }
        AuthOutcome::Rejected { message } => Err(CommandError::Auth(message)),
    }
}

/// Drop the current session. Never fails, even with no session.
pub async fn logout(session: &SessionManager) -> Result<(), CommandError> {
    session.logout().await;
    println!("Signed out");
    Ok(())
}

/// Print the signed-in principal.
pub async fn whoami(session: &SessionManager) -> Result<(), CommandError> {
    match session.principal().await {
        Some(principal) => println!("{} ({})", principal.username, principal.role),
        None => println!("Not signed in"),
    }
    Ok(())
}
