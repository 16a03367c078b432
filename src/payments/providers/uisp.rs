//! UISP CRM API client
//!
//! Talks to the billing platform's REST API (`/clients`, `/payment-methods`,
//! `/payments`) with an application key. Requests are made once; there is no retry.

use crate::config::UispConfig;
use crate::error::{AppError, AppResult};
use crate::payments::traits::BillingApi;
use crate::payments::types::{
    BillingClient, CreatePaymentRequest, CreatePaymentResponse, PaymentMethod,
};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

/// UISP client configuration
#[derive(Debug, Clone)]
pub struct UispClientConfig {
    /// API base URL without trailing slash
    pub base_url: String,
    /// Application key sent as `X-Auth-App-Key`
    pub app_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for UispClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/crm/api/v1.0".to_string(),
            app_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl From<&UispConfig> for UispClientConfig {
    fn from(config: &UispConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            app_key: config.app_key.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

/// Which error category a failed call belongs to
#[derive(Debug, Clone, Copy)]
enum CallKind {
    Lookup,
    Payment,
}

impl CallKind {
    fn error(self, message: String) -> AppError {
        match self {
            CallKind::Lookup => AppError::lookup(message),
            CallKind::Payment => AppError::external_api(message),
        }
    }
}

pub struct UispClient {
    config: UispClientConfig,
    client: Client,
}

impl UispClient {
    pub fn new(config: UispClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("gcash-payments/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        info!("UISP client initialized with URL: {}", config.base_url);

        Ok(Self { config, client })
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Make an authenticated request to the UISP API
    async fn make_request<B, T>(
        &self,
        kind: CallKind,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!("UISP {} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header("X-Auth-App-Key", &self.config.app_key)
            .header("Accept", "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("UISP request to {} failed: {}", endpoint, e);
            if e.is_timeout() {
                kind.error(format!(
                    "request timed out after {} seconds",
                    self.config.timeout_secs
                ))
            } else {
                kind.error(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        let response_text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let error_msg = format!("HTTP {}: {}", status, response_text);
            error!("UISP API error on {}: {}", endpoint, error_msg);
            return Err(kind.error(error_msg));
        }

        serde_json::from_str::<T>(&response_text).map_err(|e| {
            error!("Failed to parse UISP response from {}: {}", endpoint, e);
            kind.error(format!("Invalid response format: {}", e))
        })
    }
}

#[async_trait]
impl BillingApi for UispClient {
    async fn list_clients(&self) -> AppResult<Vec<BillingClient>> {
        let clients: Vec<BillingClient> = self
            .make_request::<(), _>(CallKind::Lookup, Method::GET, "clients", None)
            .await?;

        debug!("Fetched {} clients from UISP", clients.len());
        Ok(clients)
    }

    async fn list_payment_methods(&self) -> AppResult<Vec<PaymentMethod>> {
        self.make_request::<(), _>(CallKind::Lookup, Method::GET, "payment-methods", None)
            .await
    }

    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> AppResult<CreatePaymentResponse> {
        info!(
            "Creating UISP payment: client={} amount={}",
            request.client_id, request.amount
        );

        let response: CreatePaymentResponse = self
            .make_request(CallKind::Payment, Method::POST, "payments", Some(&request))
            .await?;

        match &response.id {
            Some(id) => info!("UISP payment created: id={}", id),
            None => error!("UISP payment response carried no id"),
        }

        Ok(response)
    }
}
