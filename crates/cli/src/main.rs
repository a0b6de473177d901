//! Prestamos CLI - Session and loan tools for the lending backend.
//!
//! # Usage
//!
//! ```bash
//! # Log in and cache the session
//! PRESTAMOS_PASSWORD=... prestamos login -e ana@example.com
//!
//! # Show the cached session and role
//! prestamos status
//! prestamos role
//!
//! # Biometric unlock
//! prestamos biometric enable -e ana@example.com
//! prestamos biometric login
//!
//! # Loan amortization table
//! prestamos amortize --principal 10000 --rate 12 --months 12
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` - Start or end a session
//! - `status` / `role` - Inspect the cached session
//! - `biometric` - Manage biometric login
//! - `amortize` - Print a fixed-payment loan schedule

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;
mod config;
mod telemetry;

#[derive(Parser)]
#[command(name = "prestamos")]
#[command(author, version, about = "Prestamos lending client tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and cache the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(long, env = "PRESTAMOS_PASSWORD", hide_env_values = true)]
        password: String,

        /// Also store the credentials for biometric login
        #[arg(long)]
        remember_biometric: bool,
    },
    /// Log out and clear the cached session
    Logout,
    /// Show the cached session
    Status,
    /// Print the role of the cached user
    Role,
    /// Manage biometric login
    Biometric {
        #[command(subcommand)]
        action: BiometricAction,
    },
    /// Print a loan amortization table
    Amortize {
        /// Amount borrowed
        #[arg(long)]
        principal: Decimal,

        /// Annual interest rate in percent
        #[arg(long)]
        rate: Decimal,

        /// Term in months
        #[arg(long)]
        months: u32,

        /// First due date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Currency code (MXN, USD, EUR, COP)
        #[arg(long, default_value = "MXN")]
        currency: String,
    },
}

#[derive(Subcommand)]
enum BiometricAction {
    /// Store credentials for biometric login
    Enable {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(long, env = "PRESTAMOS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget stored biometric credentials
    Disable,
    /// Log in with stored credentials after confirmation
    Login,
}

#[tokio::main]
async fn main() {
    let telemetry_config = config::TelemetryConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = telemetry::init_sentry(&telemetry_config);
    telemetry::init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Login {
            email,
            password,
            remember_biometric,
        } => commands::session::login(&email, &password, remember_biometric).await?,
        Commands::Logout => commands::session::logout().await?,
        Commands::Status => commands::session::status().await?,
        Commands::Role => commands::session::role().await?,
        Commands::Biometric { action } => match action {
            BiometricAction::Enable { email, password } => {
                commands::biometric::enable(&email, &password).await?;
            }
            BiometricAction::Disable => commands::biometric::disable().await?,
            BiometricAction::Login => commands::biometric::login().await?,
        },
        Commands::Amortize {
            principal,
            rate,
            months,
            start,
            currency,
        } => commands::amortize::run(principal, rate, months, start, &currency)?,
    }
    Ok(())
}
