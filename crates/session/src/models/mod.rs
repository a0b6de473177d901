//! Domain models held by the session.

pub mod session;
pub mod user;
