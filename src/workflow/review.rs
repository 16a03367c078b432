//! Administrator review of pending claims.
//!
//! `approve` and `reject` only act on `pending` claims; `delete` acts on any claim.
//! Actions on unknown ids or on claims that are no longer pending change nothing and
//! come back as `ReviewOutcome::Ignored`.

use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{error, info, warn};

use crate::claims::{
    filter_newest_first, ClaimFilter, ClaimRepository, ClaimStatus, ClaimSummary, PaymentClaim,
};
use crate::config::ConfigProvider;
use crate::error::{AppError, AppResult};
use crate::payments::{BillingApi, CreatePaymentRequest};
use crate::workflow::Clock;

/// The administrator acting on a claim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reviewer {
    /// Platform user id, forwarded to the payment record
    pub user_id: Option<i64>,
    pub username: Option<String>,
}

impl Reviewer {
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("admin")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "reason", content = "status")]
pub enum IgnoreReason {
    NotFound,
    NotPending(ClaimStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum ReviewOutcome {
    #[serde(rename_all = "camelCase")]
    Approved { payment_id: String },
    Rejected,
    Deleted,
    Ignored { reason: IgnoreReason },
}

impl ReviewOutcome {
    pub fn message(&self) -> String {
        match self {
            ReviewOutcome::Approved { payment_id } => format!(
                "Payment approved and posted to UISP! Payment ID: {}",
                payment_id
            ),
            ReviewOutcome::Rejected => "Payment rejected.".to_string(),
            ReviewOutcome::Deleted => "Payment record deleted.".to_string(),
            ReviewOutcome::Ignored {
                reason: IgnoreReason::NotFound,
            } => "No payment record with that id.".to_string(),
            ReviewOutcome::Ignored {
                reason: IgnoreReason::NotPending(status),
            } => format!("Payment is already {}.", status),
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, ReviewOutcome::Ignored { .. })
    }
}

/// Admin listing: filtered claims, newest first, plus totals over all claims
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimListing {
    pub filter: ClaimFilter,
    pub claims: Vec<PaymentClaim>,
    pub summary: ClaimSummary,
}

fn uuid_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .expect("valid uuid pattern")
    })
}

pub fn payment_note(reference_number: &str) -> String {
    format!("GCash Payment - Ref: {}", reference_number)
}

pub struct ReviewWorkflow {
    repository: Arc<dyn ClaimRepository>,
    billing: Arc<dyn BillingApi>,
    config: Arc<dyn ConfigProvider>,
    clock: Arc<dyn Clock>,
}

impl ReviewWorkflow {
    pub fn new(
        repository: Arc<dyn ClaimRepository>,
        billing: Arc<dyn BillingApi>,
        config: Arc<dyn ConfigProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            billing,
            config,
            clock,
        }
    }

    pub async fn list(&self, filter: ClaimFilter) -> AppResult<ClaimListing> {
        let claims = self.repository.load_all().await?;
        Ok(ClaimListing {
            filter,
            summary: ClaimSummary::from_claims(&claims),
            claims: filter_newest_first(&claims, filter),
        })
    }

    /// Post the claim to the billing platform as a payment and mark it approved.
    ///
    /// Nothing is persisted unless the platform returns a payment id. If the final
    /// save fails after the payment was created, the claim stays pending on disk
    /// while the platform already holds the payment.
    pub async fn approve(&self, claim_id: &str, reviewer: &Reviewer) -> AppResult<ReviewOutcome> {
        let mut claims = self.repository.load_all().await?;
        let index = match pending_index(&claims, claim_id) {
            Ok(index) => index,
            Err(reason) => return Ok(ignored("approve", claim_id, reason)),
        };

        let claim = &claims[index];
        let request = CreatePaymentRequest {
            client_id: claim.client_id,
            amount: claim.amount,
            note: payment_note(&claim.reference_number),
            apply_to_invoices_automatically: true,
            user_id: reviewer.user_id,
            method_id: self.resolve_method_id().await?,
        };

        let response = self.billing.create_payment(request).await.map_err(|e| {
            error!("Payment creation failed for claim {}: {}", claim_id, e);
            match e {
                AppError::ExternalApi { .. } => e,
                other => AppError::external_api(other.to_string()),
            }
        })?;

        let payment_id = response.id.ok_or_else(|| {
            error!("Payment API returned no id for claim {}", claim_id);
            AppError::external_api("Failed to create payment in UISP.")
        })?;

        claims[index].mark_approved(payment_id.clone(), reviewer.display_name(), self.clock.now());
        self.repository.save_all(&claims).await?;

        info!(
            "Claim {} approved by {} as payment {}",
            claim_id,
            reviewer.display_name(),
            payment_id
        );
        Ok(ReviewOutcome::Approved { payment_id })
    }

    pub async fn reject(&self, claim_id: &str, reviewer: &Reviewer) -> AppResult<ReviewOutcome> {
        let mut claims = self.repository.load_all().await?;
        let index = match pending_index(&claims, claim_id) {
            Ok(index) => index,
            Err(reason) => return Ok(ignored("reject", claim_id, reason)),
        };

        claims[index].mark_rejected(reviewer.display_name(), self.clock.now());
        self.repository.save_all(&claims).await?;

        info!("Claim {} rejected by {}", claim_id, reviewer.display_name());
        Ok(ReviewOutcome::Rejected)
    }

    /// Remove a claim whatever its status.
    pub async fn delete(&self, claim_id: &str, reviewer: &Reviewer) -> AppResult<ReviewOutcome> {
        let mut claims = self.repository.load_all().await?;
        let Some(index) = claims.iter().position(|claim| claim.id == claim_id) else {
            return Ok(ignored("delete", claim_id, IgnoreReason::NotFound));
        };

        let removed = claims.remove(index);
        self.repository.save_all(&claims).await?;

        info!(
            "Claim {} ({}, ref {}) deleted by {}",
            claim_id,
            removed.status,
            removed.reference_number,
            reviewer.display_name()
        );
        Ok(ReviewOutcome::Deleted)
    }

    /// Turn the configured payment method selector into a method id.
    ///
    /// A UUID is used as is. Anything else is matched case-insensitively against the
    /// platform's method names; lookup failures and misses fall back to no method id.
    async fn resolve_method_id(&self) -> AppResult<Option<String>> {
        let Some(selector) = self.config.load_config()?.payment_method else {
            return Ok(None);
        };

        if uuid_pattern().is_match(&selector) {
            return Ok(Some(selector));
        }

        match self.billing.list_payment_methods().await {
            Ok(methods) => {
                let found = methods
                    .into_iter()
                    .find(|method| method.name.eq_ignore_ascii_case(&selector))
                    .map(|method| method.id);
                if found.is_none() {
                    warn!("No payment method named '{}', using platform default", selector);
                }
                Ok(found)
            }
            Err(e) => {
                warn!("Payment method lookup failed, using platform default: {}", e);
                Ok(None)
            }
        }
    }
}

fn pending_index(claims: &[PaymentClaim], claim_id: &str) -> Result<usize, IgnoreReason> {
    let index = claims
        .iter()
        .position(|claim| claim.id == claim_id)
        .ok_or(IgnoreReason::NotFound)?;
    match claims[index].status {
        ClaimStatus::Pending => Ok(index),
        status => Err(IgnoreReason::NotPending(status)),
    }
}

fn ignored(action: &str, claim_id: &str, reason: IgnoreReason) -> ReviewOutcome {
    warn!("Ignoring {} on claim {}: {:?}", action, claim_id, reason);
    ReviewOutcome::Ignored { reason }
}
