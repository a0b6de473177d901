//! Biometric unlock commands.
//!
//! A terminal has no biometric sensor, so the prompt is a confirmation on
//! stdin. It is only offered when stdin is interactive.
//!
//! # Usage
//!
//! ```bash
//! prestamos biometric enable -e ana@example.com
//! prestamos biometric login
//! prestamos biometric disable
//! ```

use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;

use async_trait::async_trait;

use prestamos_core::LoginCredentials;
use prestamos_session::{BiometricError, BiometricPrompt, BiometricUnlock, BiometricVault};

use super::session::{login_failure, report_login};
use super::{CommandError, Context};

/// Confirmation prompt on the controlling terminal.
struct TerminalPrompt;

#[async_trait]
impl BiometricPrompt for TerminalPrompt {
    async fn is_available(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    async fn authenticate(&self, reason: &str) -> Result<bool, BiometricError> {
        let reason = reason.to_owned();
        tokio::task::spawn_blocking(move || confirm(&reason))
            .await
            .map_err(|e| BiometricError::Prompt(e.to_string()))?
    }
}

fn confirm(reason: &str) -> Result<bool, BiometricError> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{reason} [y/N]: ")
        .and_then(|()| stderr.flush())
        .map_err(|e| BiometricError::Prompt(e.to_string()))?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| BiometricError::Prompt(e.to_string()))?;

    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí"))
}

/// Store credentials for biometric login without logging in.
pub async fn enable(email: &str, password: &str) -> Result<(), CommandError> {
    let credentials = LoginCredentials::new(email, password)?;
    let ctx = Context::load().await?;
    BiometricVault::new(ctx.store).enable(&credentials).await?;
    tracing::info!("Biometric login enabled for {}", credentials.email());
    Ok(())
}

/// Forget stored biometric credentials.
pub async fn disable() -> Result<(), CommandError> {
    let ctx = Context::load().await?;
    BiometricVault::new(ctx.store).disable().await?;
    tracing::info!("Biometric login disabled");
    Ok(())
}

/// Confirm on the terminal, then log in with the stored credentials.
pub async fn login() -> Result<(), CommandError> {
    let ctx = Context::load().await?;
    let unlock = BiometricUnlock::new(BiometricVault::new(ctx.store.clone()), Arc::new(TerminalPrompt));

    if !unlock.replay(&ctx.manager).await? {
        return Err(login_failure(&ctx.manager));
    }

    report_login(&ctx.manager);
    Ok(())
}
