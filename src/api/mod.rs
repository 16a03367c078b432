//! HTTP surface: the public two-step form, the admin review listing and health.
//!
//! Handlers only translate between JSON and the workflows.

pub mod admin;
pub mod health;
pub mod public;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ConfigProvider;
use crate::error::AppError;
use crate::workflow::{ClaimWorkflow, ReviewWorkflow};

#[derive(Clone)]
pub struct AppState {
    pub claims: Arc<ClaimWorkflow>,
    pub reviews: Arc<ReviewWorkflow>,
    pub plugin_config: Arc<dyn ConfigProvider>,
    pub environment: String,
    pub billing_api_url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/public/verify-account", post(public::verify_account))
        .route("/public/session/:token", get(public::session))
        .route("/public/submit-payment", post(public::submit_payment))
        .route("/admin/payments", get(admin::list_payments))
        .route("/admin/payments/:id/approve", post(admin::approve_payment))
        .route("/admin/payments/:id/reject", post(admin::reject_payment))
        .route("/admin/payments/:id", axum::routing::delete(admin::delete_payment))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AccountNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::DuplicateReference { .. } => StatusCode::CONFLICT,
            AppError::SessionExpired => StatusCode::GONE,
            AppError::Lookup { .. } | AppError::ExternalApi { .. } => StatusCode::BAD_GATEWAY,
            AppError::Storage { .. } | AppError::Configuration { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::AccountNotFound { .. } => "account_not_found",
            AppError::Lookup { .. } => "lookup_error",
            AppError::SessionExpired => "session_expired",
            AppError::DuplicateReference { .. } => "duplicate_reference",
            AppError::Storage { .. } => "storage_error",
            AppError::ExternalApi { .. } => "external_api_error",
            AppError::Configuration { .. } => "configuration_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let field = match &self {
            AppError::Validation { field, .. } => Some(*field),
            _ => None,
        };
        let body = json!({
            "error": self.code(),
            "message": self.to_string(),
            "field": field,
            "recoverable": self.is_recoverable(),
            "restart": self.restarts_submission(),
        });

        (status, Json(body)).into_response()
    }
}
