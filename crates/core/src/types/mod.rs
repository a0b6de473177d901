//! Core types for Prestamos.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credentials;
pub mod email;
pub mod id;
pub mod money;
pub mod role;

pub use credentials::LoginCredentials;
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Amount, CurrencyCode, UnknownCurrency};
pub use role::Role;
