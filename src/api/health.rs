use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub receiving_account_configured: bool,
    pub billing_api_configured: bool,
}

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let version = env!("CARGO_PKG_VERSION").to_string();

    let receiving_account_configured = state
        .plugin_config
        .load_config()
        .map(|config| config.default_account().is_some())
        .map_err(|e| {
            tracing::warn!("Health check could not read plugin config: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    let response = HealthResponse {
        status: "healthy".to_string(),
        version,
        environment: state.environment.clone(),
        receiving_account_configured,
        billing_api_configured: !state.billing_api_url.trim().is_empty(),
    };

    Ok(Json(response))
}
