//! Payment claim records as persisted in the data file.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Status of a claim. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's claim that they sent a GCash payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentClaim {
    pub id: String,
    pub client_id: i64,
    pub client_name: String,
    pub account_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub reference_number: String,
    pub status: ClaimStatus,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub approved_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub rejected_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    /// Older data files store the platform's numeric id as a number
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::payments::types::string_or_number_id"
    )]
    pub uisp_payment_id: Option<String>,
    #[serde(default)]
    pub gcash_number: String,
    #[serde(default)]
    pub gcash_name: String,
}

impl PaymentClaim {
    pub fn is_pending(&self) -> bool {
        self.status == ClaimStatus::Pending
    }

    pub fn mark_approved(&mut self, payment_id: String, by: &str, at: NaiveDateTime) {
        self.status = ClaimStatus::Approved;
        self.uisp_payment_id = Some(payment_id);
        self.approved_at = Some(at);
        self.approved_by = Some(by.to_string());
    }

    pub fn mark_rejected(&mut self, by: &str, at: NaiveDateTime) {
        self.status = ClaimStatus::Rejected;
        self.rejected_at = Some(at);
        self.rejected_by = Some(by.to_string());
    }
}

/// Admin listing filter. Defaults to pending claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimFilter {
    #[default]
    Pending,
    Approved,
    Rejected,
    All,
}

impl ClaimFilter {
    pub fn matches(&self, claim: &PaymentClaim) -> bool {
        match self {
            ClaimFilter::Pending => claim.status == ClaimStatus::Pending,
            ClaimFilter::Approved => claim.status == ClaimStatus::Approved,
            ClaimFilter::Rejected => claim.status == ClaimStatus::Rejected,
            ClaimFilter::All => true,
        }
    }
}

impl FromStr for ClaimFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pending" => Ok(ClaimFilter::Pending),
            "approved" => Ok(ClaimFilter::Approved),
            "rejected" => Ok(ClaimFilter::Rejected),
            "all" => Ok(ClaimFilter::All),
            other => Err(AppError::validation(
                "filter",
                format!("Unknown filter '{}'", other),
            )),
        }
    }
}

/// Counts and totals per status, derived on every read. Totals saturate at `Decimal::MAX`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSummary {
    pub pending_count: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub total_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub pending_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub approved_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rejected_total: Decimal,
}

impl ClaimSummary {
    pub fn from_claims(claims: &[PaymentClaim]) -> Self {
        claims.iter().fold(Self::default(), |mut summary, claim| {
            summary.total_count += 1;
            match claim.status {
                ClaimStatus::Pending => {
                    summary.pending_count += 1;
                    summary.pending_total = summary.pending_total.saturating_add(claim.amount);
                }
                ClaimStatus::Approved => {
                    summary.approved_count += 1;
                    summary.approved_total = summary.approved_total.saturating_add(claim.amount);
                }
                ClaimStatus::Rejected => {
                    summary.rejected_count += 1;
                    summary.rejected_total = summary.rejected_total.saturating_add(claim.amount);
                }
            }
            summary
        })
    }
}

/// True when any stored claim, in any status, already uses `reference`.
pub fn reference_in_use(claims: &[PaymentClaim], reference: &str) -> bool {
    claims.iter().any(|claim| claim.reference_number == reference)
}

/// Filter and sort newest first. Ties keep insertion order.
pub fn filter_newest_first(claims: &[PaymentClaim], filter: ClaimFilter) -> Vec<PaymentClaim> {
    let mut selected: Vec<PaymentClaim> = claims
        .iter()
        .filter(|claim| filter.matches(claim))
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    selected
}

/// Local wall-clock timestamps in `YYYY-MM-DD HH:MM:SS` form.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    NaiveDateTime::parse_from_str(&raw, super::FORMAT)
                        .map_err(serde::de::Error::custom)
                })
                .transpose()
        }
    }
}
