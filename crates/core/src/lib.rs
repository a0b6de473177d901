//! Prestamos Core - Shared domain types for the lending client.
//!
//! This crate holds everything the session layer and the command-line front
//! end agree on:
//! - identity types (`UserId`, `Email`, `Role`)
//! - login credentials and the client-side form validation rules
//! - money amounts and the loan amortization calculator
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP,
//! no storage. Anything that talks to the backend or to disk lives in
//! `prestamos-session`.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, roles and credentials
//! - [`validation`] - Client-side checks that run before any network call
//! - [`amortization`] - Fixed-payment loan schedules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod amortization;
pub mod types;
pub mod validation;

pub use amortization::{AmortizationError, AmortizationRow, AmortizationSchedule, LoanTerms};
pub use types::*;
pub use validation::ValidationError;
