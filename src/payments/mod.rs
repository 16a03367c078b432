//! Billing platform integration
//!
//! The claim workflow looks customers up in the billing platform's client directory and
//! the review workflow posts approved claims back to it as payments.

pub mod providers;
pub mod traits;
pub mod types;

pub use providers::UispClient;
pub use traits::BillingApi;
pub use types::{BillingClient, CreatePaymentRequest, CreatePaymentResponse, PaymentMethod};
