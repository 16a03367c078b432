use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AppState;
use crate::claims::ClaimFilter;
use crate::error::AppError;
use crate::workflow::{ClaimListing, ReviewOutcome, Reviewer};

pub const USER_ID_HEADER: &str = "x-uisp-user-id";
pub const USERNAME_HEADER: &str = "x-uisp-username";

/// Administrator identity forwarded by the platform's authenticating proxy
#[derive(Debug, Clone)]
pub struct AdminUser(pub Reviewer);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let user_id = header(USER_ID_HEADER);
        let username = header(USERNAME_HEADER);

        if user_id.is_none() && username.is_none() {
            return Err((
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "forbidden",
                    "message": "Access denied. Please log in to UISP.",
                })),
            ));
        }

        Ok(AdminUser(Reviewer {
            user_id: user_id.and_then(|id| id.parse().ok()),
            username,
        }))
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    #[serde(flatten)]
    pub outcome: ReviewOutcome,
    pub message: String,
}

impl From<ReviewOutcome> for ActionResponse {
    fn from(outcome: ReviewOutcome) -> Self {
        Self {
            message: outcome.message(),
            outcome,
        }
    }
}

pub async fn list_payments(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ClaimListing>, AppError> {
    let filter: ClaimFilter = query.filter.as_deref().unwrap_or_default().parse()?;
    Ok(Json(state.reviews.list(filter).await?))
}

pub async fn approve_payment(
    State(state): State<AppState>,
    AdminUser(reviewer): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let outcome = state.reviews.approve(&id, &reviewer).await?;
    Ok(Json(outcome.into()))
}

pub async fn reject_payment(
    State(state): State<AppState>,
    AdminUser(reviewer): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let outcome = state.reviews.reject(&id, &reviewer).await?;
    Ok(Json(outcome.into()))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    AdminUser(reviewer): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let outcome = state.reviews.delete(&id, &reviewer).await?;
    Ok(Json(outcome.into()))
}
