#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use gcash_payments::accounts::ReceivingAccount;
use gcash_payments::claims::{ClaimRepository, JsonFileStore, PaymentClaim};
use gcash_payments::config::{PluginConfig, StaticConfigProvider};
use gcash_payments::payments::{
    BillingApi, BillingClient, CreatePaymentRequest, CreatePaymentResponse, PaymentMethod,
};
use gcash_payments::session::InMemorySessionStore;
use gcash_payments::workflow::{ClaimWorkflow, FixedClock, ReviewWorkflow};
use gcash_payments::{AppError, AppResult};
use std::sync::{Arc, Mutex};

/// Billing platform stand-in with one known customer
pub struct FakeBilling {
    pub clients: Vec<BillingClient>,
    pub next_payment_id: Mutex<Option<String>>,
    pub fail_payments: bool,
    pub requests: Mutex<Vec<CreatePaymentRequest>>,
}

impl FakeBilling {
    pub fn new() -> Self {
        Self {
            clients: vec![
                BillingClient {
                    id: 42,
                    user_ident: Some("ACC100".to_string()),
                    first_name: Some("Juan".to_string()),
                    last_name: Some("Dela Cruz".to_string()),
                },
                BillingClient {
                    id: 43,
                    user_ident: Some("ACC200".to_string()),
                    first_name: Some("Maria".to_string()),
                    last_name: Some("Santos".to_string()),
                },
            ],
            next_payment_id: Mutex::new(Some("pay_1".to_string())),
            fail_payments: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn respond_without_id(&self) {
        *self.next_payment_id.lock().unwrap() = None;
    }

    pub fn requests(&self) -> Vec<CreatePaymentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillingApi for FakeBilling {
    async fn list_clients(&self) -> AppResult<Vec<BillingClient>> {
        Ok(self.clients.clone())
    }

    async fn list_payment_methods(&self) -> AppResult<Vec<PaymentMethod>> {
        Ok(vec![PaymentMethod {
            id: "d8c1eae9-d41d-479f-aeaf-38497975d7b3".to_string(),
            name: "GCash".to_string(),
        }])
    }

    async fn create_payment(&self, request: CreatePaymentRequest) -> AppResult<CreatePaymentResponse> {
        self.requests.lock().unwrap().push(request);
        if self.fail_payments {
            return Err(AppError::external_api("HTTP 503: maintenance"));
        }
        Ok(CreatePaymentResponse {
            id: self.next_payment_id.lock().unwrap().clone(),
        })
    }
}

pub fn noon(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, day)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

pub fn plugin_config() -> PluginConfig {
    PluginConfig {
        accounts: vec![
            ReceivingAccount {
                slot: 1,
                number: "09170000001".to_string(),
                name: "Main Account".to_string(),
                qr_code: "https://example.com/qr1.png".to_string(),
                active_days: "1-15".to_string(),
            },
            ReceivingAccount {
                slot: 2,
                number: "09170000002".to_string(),
                name: "Second Account".to_string(),
                qr_code: String::new(),
                active_days: "16-31".to_string(),
            },
        ],
        payment_method: Some("gcash".to_string()),
        ..Default::default()
    }
}

pub struct TestApp {
    pub claims: Arc<ClaimWorkflow>,
    pub reviews: Arc<ReviewWorkflow>,
    pub store: Arc<JsonFileStore>,
    pub billing: Arc<FakeBilling>,
    pub config: Arc<StaticConfigProvider>,
    pub dir: tempfile::TempDir,
}

impl TestApp {
    pub fn spawn(billing: FakeBilling, day: u32) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Arc::new(JsonFileStore::in_dir(dir.path().join("data")));
        let billing = Arc::new(billing);
        let config = Arc::new(StaticConfigProvider(plugin_config()));
        let clock = Arc::new(FixedClock(noon(day)));

        let claims = Arc::new(ClaimWorkflow::new(
            store.clone(),
            billing.clone(),
            Arc::new(InMemorySessionStore::default()),
            config.clone(),
            clock.clone(),
        ));
        let reviews = Arc::new(ReviewWorkflow::new(
            store.clone(),
            billing.clone(),
            config.clone(),
            clock,
        ));

        Self {
            claims,
            reviews,
            store,
            billing,
            config,
            dir,
        }
    }
}

impl TestApp {
    pub async fn stored(&self, id: &str) -> Option<PaymentClaim> {
        self.store
            .load_all()
            .await
            .expect("store should be readable")
            .into_iter()
            .find(|claim| claim.id == id)
    }
}
