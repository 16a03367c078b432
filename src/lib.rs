//! GCash payment intake and approval for a UISP billing installation.
//!
//! Customers claim a GCash payment through a two-step public form; administrators
//! approve claims (posting a payment to the billing platform), reject them or delete
//! them. Claims live in one JSON file.

pub mod accounts;
pub mod claims;
pub mod config;
pub mod error;
pub mod payments;
pub mod session;
pub mod workflow;

#[cfg(feature = "server")]
pub mod api;

pub use error::{AppError, AppResult};
