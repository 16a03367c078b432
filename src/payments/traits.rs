//! Billing API trait definitions
//!
//! Defines the narrow interface the workflows need from the billing platform.

use crate::error::AppResult;
use crate::payments::types::{
    BillingClient, CreatePaymentRequest, CreatePaymentResponse, PaymentMethod,
};
use async_trait::async_trait;

/// Client directory and payment API of the billing platform
///
/// All calls are network-backed and fallible. None of them are retried.
#[async_trait]
pub trait BillingApi: Send + Sync {
    /// List all clients in the directory
    ///
    /// Failures are reported as `AppError::Lookup`.
    async fn list_clients(&self) -> AppResult<Vec<BillingClient>>;

    /// List the payment methods configured in the platform
    async fn list_payment_methods(&self) -> AppResult<Vec<PaymentMethod>>;

    /// Create a payment record
    ///
    /// # Arguments
    /// * `request` - Client id, amount, note and optional method id
    ///
    /// # Returns
    /// * `CreatePaymentResponse` - Carries the new payment's id when the platform
    ///   accepted it. Transport and HTTP failures are `AppError::ExternalApi`.
    async fn create_payment(&self, request: CreatePaymentRequest)
        -> AppResult<CreatePaymentResponse>;
}
