//! Billing API types and data structures

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Customer record from the client directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingClient {
    pub id: i64,
    /// Customer-facing account number
    #[serde(default)]
    pub user_ident: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl BillingClient {
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    /// Exact, case-sensitive match on the account number.
    pub fn has_account_number(&self, account_number: &str) -> bool {
        self.user_ident.as_deref() == Some(account_number)
    }
}

/// Payment method configured in the platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentMethod {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Payment creation request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub client_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub note: String,
    /// Let the platform apply the payment to open invoices
    pub apply_to_invoices_automatically: bool,
    /// Acting administrator
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_id: Option<String>,
}

/// Payment creation response. Only the id matters here.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CreatePaymentResponse {
    #[serde(default, deserialize_with = "string_or_number_id")]
    pub id: Option<String>,
}

impl CreatePaymentResponse {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }
}

/// Accept ids sent either as JSON strings or numbers. Empty strings read as absent.
pub(crate) fn string_or_number_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_trims_missing_parts() {
        let client: BillingClient = serde_json::from_value(json!({
            "id": 5,
            "userIdent": "ACC100",
            "firstName": "Juan",
            "lastName": null
        }))
        .unwrap();

        assert_eq!(client.display_name(), "Juan");
        assert!(client.has_account_number("ACC100"));
        assert!(!client.has_account_number("acc100"));
    }

    #[test]
    fn test_response_id_string_or_number() {
        let numeric: CreatePaymentResponse = serde_json::from_value(json!({"id": 311})).unwrap();
        assert_eq!(numeric.id.as_deref(), Some("311"));

        let text: CreatePaymentResponse =
            serde_json::from_value(json!({"id": "pay_1", "amount": 10})).unwrap();
        assert_eq!(text.id.as_deref(), Some("pay_1"));

        let missing: CreatePaymentResponse =
            serde_json::from_value(json!({"message": "ok"})).unwrap();
        assert!(missing.id.is_none());
    }

    #[test]
    fn test_request_wire_shape() {
        let request = CreatePaymentRequest {
            client_id: 5,
            amount: Decimal::new(25000, 2),
            note: "GCash Payment - Ref: REF-001".to_string(),
            apply_to_invoices_automatically: true,
            user_id: None,
            method_id: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["clientId"], 5);
        assert_eq!(value["amount"].as_f64(), Some(250.0));
        assert_eq!(value["applyToInvoicesAutomatically"], true);
        assert!(value["userId"].is_null());
        assert!(value.get("methodId").is_none());
    }
}
