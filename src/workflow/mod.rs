//! Claim submission and review workflows.

pub mod claim;
pub mod review;

pub use claim::{ClaimWorkflow, StepTwo};
pub use review::{ClaimListing, IgnoreReason, ReviewOutcome, ReviewWorkflow, Reviewer};

use chrono::{Local, NaiveDateTime};

/// Source of the local wall-clock time used for stamps and account rotation
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::error::{AppError, AppResult};
    use crate::payments::{
        BillingApi, BillingClient, CreatePaymentRequest, CreatePaymentResponse, PaymentMethod,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted billing API that records payment requests
    #[derive(Default)]
    pub struct MockBilling {
        pub clients: Vec<BillingClient>,
        pub clients_error: Option<AppError>,
        pub methods: Vec<PaymentMethod>,
        pub methods_error: Option<AppError>,
        pub payment_response: Option<AppResult<CreatePaymentResponse>>,
        pub requests: Mutex<Vec<CreatePaymentRequest>>,
    }

    impl MockBilling {
        pub fn with_client(id: i64, account_number: &str, first: &str, last: &str) -> Self {
            Self {
                clients: vec![BillingClient {
                    id,
                    user_ident: Some(account_number.to_string()),
                    first_name: Some(first.to_string()),
                    last_name: Some(last.to_string()),
                }],
                ..Default::default()
            }
        }

        pub fn recorded(&self) -> Vec<CreatePaymentRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BillingApi for MockBilling {
        async fn list_clients(&self) -> AppResult<Vec<BillingClient>> {
            match &self.clients_error {
                Some(err) => Err(err.clone()),
                None => Ok(self.clients.clone()),
            }
        }

        async fn list_payment_methods(&self) -> AppResult<Vec<PaymentMethod>> {
            match &self.methods_error {
                Some(err) => Err(err.clone()),
                None => Ok(self.methods.clone()),
            }
        }

        async fn create_payment(
            &self,
            request: CreatePaymentRequest,
        ) -> AppResult<CreatePaymentResponse> {
            self.requests.lock().unwrap().push(request);
            self.payment_response
                .clone()
                .unwrap_or_else(|| Ok(CreatePaymentResponse::with_id("pay_1")))
        }
    }
}
