//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password from --password or PRESTAMOS_PASSWORD)
//! prestamos login -e ana@example.com
//!
//! # Show the cached session
//! prestamos status
//!
//! # Log out and forget the cached session
//! prestamos logout
//! ```
//!
//! # Environment Variables
//!
//! - `PRESTAMOS_API_BASE_URL` - Backend REST API base URL
//! - `PRESTAMOS_CREDENTIALS_PATH` - Credentials file

use prestamos_core::LoginCredentials;
use prestamos_session::{BiometricVault, Phase, SessionManager};

use super::{CommandError, Context, print_lines};
use crate::telemetry;

/// Log in and cache the session.
///
/// With `remember_biometric`, the credentials are also stored for
/// `biometric login`.
pub async fn login(email: &str, password: &str, remember_biometric: bool) -> Result<(), CommandError> {
    let credentials = LoginCredentials::new(email, password)?;
    let ctx = Context::load().await?;

    if !ctx.manager.login(&credentials).await {
        return Err(login_failure(&ctx.manager));
    }

    report_login(&ctx.manager);

    if remember_biometric {
        BiometricVault::new(ctx.store.clone()).enable(&credentials).await?;
    }

    Ok(())
}

/// Log out, notifying the backend when a session is cached.
pub async fn logout() -> Result<(), CommandError> {
    let ctx = Context::load().await?;
    ctx.manager.restore().await;
    ctx.manager.logout().await;
    telemetry::clear_sentry_user();
    tracing::info!("Logged out");
    Ok(())
}

/// Print the cached session.
pub async fn status() -> Result<(), CommandError> {
    let ctx = Context::load().await?;
    let session = ctx.manager.restore().await;

    let mut lines = vec![format!("phase: {}", phase_name(session.phase()))];
    if let Some(user) = session.user() {
        lines.push(format!("user:  {} (id {})", user.name, user.id));
        if let Some(email) = &user.email {
            lines.push(format!("email: {email}"));
        }
    }
    if let Some(role) = session.role() {
        lines.push(format!("role:  {role}"));
    }
    if let Some(error) = session.error() {
        lines.push(format!("error: {error}"));
        ctx.manager.clear_error();
    }

    print_lines(&lines);
    Ok(())
}

/// Print the role of the cached user, or `none`.
pub async fn role() -> Result<(), CommandError> {
    let ctx = Context::load().await?;
    ctx.manager.restore().await;

    let role = ctx
        .manager
        .user_role()
        .map_or_else(|| "none".to_string(), |r| r.to_string());
    print_lines(&[role]);
    Ok(())
}

/// Take the failed login's message and clear it from the session.
pub(super) fn login_failure(manager: &SessionManager) -> CommandError {
    let message = manager
        .state()
        .error()
        .unwrap_or(prestamos_session::error::UNEXPECTED_ERROR)
        .to_string();
    manager.clear_error();
    CommandError::LoginFailed(message)
}

pub(super) fn report_login(manager: &SessionManager) {
    let session = manager.state();
    if let Some(user) = session.user() {
        telemetry::set_sentry_user(&user.id, user.email.as_deref());
        tracing::info!(
            "Logged in as {} ({})",
            user.name,
            session.role().map_or("no role", |r| r.as_str())
        );
    }
}

const fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Initializing => "initializing",
        Phase::Loading => "loading",
        Phase::Authenticated => "authenticated",
        Phase::Unauthenticated => "signed out",
    }
}
