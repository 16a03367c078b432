use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppState;
use crate::error::AppError;
use crate::session::new_session_token;
use crate::workflow::StepTwo;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyAccountRequest {
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub account_number: String,
    /// Form posts send a string, API callers may send a number
    #[serde(default)]
    pub amount: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentRequest {
    #[serde(default)]
    pub session_token: String,
    #[serde(default)]
    pub reference_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentResponse {
    pub reference_number: String,
    pub message: String,
}

fn amount_text(amount: &Value) -> String {
    match amount {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

pub async fn verify_account(
    State(state): State<AppState>,
    Json(payload): Json<VerifyAccountRequest>,
) -> Result<Json<StepTwo>, AppError> {
    let token = payload
        .session_token
        .filter(|token| !token.trim().is_empty())
        .unwrap_or_else(new_session_token);

    let view = state
        .claims
        .verify_account(&token, &payload.account_number, &amount_text(&payload.amount))
        .await?;
    Ok(Json(view))
}

pub async fn session(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<StepTwo>, AppError> {
    Ok(Json(state.claims.step_two(&token).await?))
}

pub async fn submit_payment(
    State(state): State<AppState>,
    Json(payload): Json<SubmitPaymentRequest>,
) -> Result<(StatusCode, Json<SubmitPaymentResponse>), AppError> {
    let claim = state
        .claims
        .submit_reference(&payload.session_token, &payload.reference_number)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitPaymentResponse {
            message: format!(
                "Payment submitted successfully! Reference: {}. Please wait for verification.",
                claim.reference_number
            ),
            reference_number: claim.reference_number,
        }),
    ))
}
