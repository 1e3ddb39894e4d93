//! Identity resolution — maps an opaque bearer token to a user row.
//!
//! Token issuance lives outside this service; here a token is only ever
//! looked up, never minted or decoded.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// The authenticated caller, extracted from `Authorization: Bearer <token>`.
///
/// Handlers take `AuthUser` as an argument; a missing or unknown token
/// rejects the request with 401 before the handler body runs.
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, job_title, job_description, created_at \
             FROM users WHERE api_token = $1",
        )
        .bind(token)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
