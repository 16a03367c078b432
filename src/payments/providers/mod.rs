//! Billing platform implementations
//!
//! Concrete implementations of the BillingApi trait.

pub mod uisp;

pub use uisp::{UispClient, UispClientConfig};
