//! Public two-step submission of a payment claim.
//!
//! Step 1 verifies the customer's account number against the client directory and
//! parks the matched identity in the session store. Step 2 takes the GCash reference
//! number and persists a `pending` claim.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::accounts::{select_active_account, ReceivingAccount};
use crate::claims::{reference_in_use, ClaimRepository, ClaimStatus, PaymentClaim};
use crate::config::ConfigProvider;
use crate::error::{AppError, AppResult};
use crate::payments::BillingApi;
use crate::session::{PendingIdentity, SessionStore};
use crate::workflow::Clock;

/// What the payer sees on step 2
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTwo {
    pub session_token: String,
    pub client_name: String,
    pub account_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub receiving_account: Option<ReceivingAccount>,
}

pub struct ClaimWorkflow {
    repository: Arc<dyn ClaimRepository>,
    billing: Arc<dyn BillingApi>,
    sessions: Arc<dyn SessionStore>,
    config: Arc<dyn ConfigProvider>,
    clock: Arc<dyn Clock>,
}

impl ClaimWorkflow {
    pub fn new(
        repository: Arc<dyn ClaimRepository>,
        billing: Arc<dyn BillingApi>,
        sessions: Arc<dyn SessionStore>,
        config: Arc<dyn ConfigProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            billing,
            sessions,
            config,
            clock,
        }
    }

    /// Step 1: match the account number and remember who is paying.
    pub async fn verify_account(
        &self,
        session_token: &str,
        account_number: &str,
        amount: &str,
    ) -> AppResult<StepTwo> {
        let account_number = account_number.trim();
        if account_number.is_empty() {
            return Err(AppError::validation(
                "accountNumber",
                "Account number is required.",
            ));
        }
        let amount = parse_amount(amount)?;

        let clients = self.billing.list_clients().await.map_err(|e| match e {
            AppError::Lookup { .. } => e,
            other => AppError::lookup(other.to_string()),
        })?;

        let client = clients
            .iter()
            .find(|client| client.has_account_number(account_number))
            .ok_or_else(|| {
                info!("No client found for account number {}", account_number);
                AppError::account_not_found(account_number)
            })?;

        let identity = PendingIdentity {
            client_id: client.id,
            client_name: client.display_name(),
            account_number: account_number.to_string(),
            amount,
        };
        self.sessions.put(session_token, &identity).await?;

        info!(
            "Verified account {} for client {} (amount {})",
            account_number, identity.client_id, amount
        );

        self.step_two_view(session_token, identity)
    }

    /// Current step-2 view for a live session.
    pub async fn step_two(&self, session_token: &str) -> AppResult<StepTwo> {
        let identity = self
            .sessions
            .get(session_token)
            .await?
            .ok_or(AppError::SessionExpired)?;
        self.step_two_view(session_token, identity)
    }

    /// The receiving account to show today, if any is configured.
    pub fn active_account(&self) -> AppResult<Option<ReceivingAccount>> {
        let config = self.config.load_config()?;
        let day = self.clock.now().day();
        Ok(select_active_account(&config.accounts, day))
    }

    /// Step 2: record the claim under the reference number the payer received.
    pub async fn submit_reference(
        &self,
        session_token: &str,
        reference_number: &str,
    ) -> AppResult<PaymentClaim> {
        let reference_number = reference_number.trim();
        if reference_number.is_empty() {
            return Err(AppError::validation(
                "referenceNumber",
                "GCash reference number is required.",
            ));
        }

        let identity = self
            .sessions
            .get(session_token)
            .await?
            .ok_or(AppError::SessionExpired)?;

        let receiving = self.active_account()?;

        let mut claims = self.repository.load_all().await?;
        if reference_in_use(&claims, reference_number) {
            warn!("Duplicate reference number submitted: {}", reference_number);
            return Err(AppError::duplicate_reference(reference_number));
        }

        let claim = PaymentClaim {
            id: format!("gcash_{}", Uuid::new_v4().simple()),
            client_id: identity.client_id,
            client_name: identity.client_name,
            account_number: identity.account_number,
            amount: identity.amount,
            reference_number: reference_number.to_string(),
            status: ClaimStatus::Pending,
            created_at: self.clock.now(),
            approved_at: None,
            approved_by: None,
            rejected_at: None,
            rejected_by: None,
            uisp_payment_id: None,
            gcash_number: receiving
                .as_ref()
                .map(|account| account.number.clone())
                .unwrap_or_default(),
            gcash_name: receiving
                .as_ref()
                .map(|account| account.name.clone())
                .unwrap_or_default(),
        };

        claims.push(claim.clone());
        self.repository.save_all(&claims).await?;

        if let Err(e) = self.sessions.remove(session_token).await {
            // The claim is saved; a stale session only allows a rejected replay.
            warn!("Failed to clear session after submission: {}", e);
        }

        info!(
            "Pending claim {} recorded: client={} amount={} ref={}",
            claim.id, claim.client_id, claim.amount, claim.reference_number
        );
        Ok(claim)
    }

    fn step_two_view(&self, session_token: &str, identity: PendingIdentity) -> AppResult<StepTwo> {
        Ok(StepTwo {
            session_token: session_token.to_string(),
            client_name: identity.client_name,
            account_number: identity.account_number,
            amount: identity.amount,
            receiving_account: self.active_account()?,
        })
    }
}

/// Largest amount a single claim may carry
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 2);

/// Amounts carry at most centavo precision
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Parse a strictly positive amount of at most `MAX_AMOUNT`, with no more than two
/// significant decimal places.
pub fn parse_amount(raw: &str) -> AppResult<Decimal> {
    let invalid = || AppError::validation("amount", "Please enter a valid amount.");
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(invalid());
    }

    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| invalid())?;

    if amount <= Decimal::ZERO {
        return Err(invalid());
    }
    if amount > MAX_AMOUNT {
        return Err(AppError::validation(
            "amount",
            format!("Amount cannot exceed {}.", MAX_AMOUNT),
        ));
    }
    if amount.normalize().scale() > AMOUNT_DECIMAL_PLACES {
        return Err(AppError::validation(
            "amount",
            "Amount can have at most 2 decimal places.",
        ));
    }
    Ok(amount)
}
