use crate::error::ServerError;
use crate::http::AppState;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use beacon_core::model::UserId;
use std::convert::Infallible;

/// Identity proven by a bearer token. Rejects the request with 401 when
/// the header is missing or the token is unknown.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: UserId,
    pub display_name: String,
}

impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_bearer(parts, state)
            .await
            .ok_or(ServerError::Unauthorized)
    }
}

/// Same lookup, but tolerates anonymous callers. Read endpoints use this
/// to degrade to an empty view instead of rejecting.
pub struct MaybeUser(pub Option<AuthedUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve_bearer(parts, state).await))
    }
}

async fn resolve_bearer(parts: &Parts, state: &AppState) -> Option<AuthedUser> {
    let header = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;

    let id = state.auth.resolve(token).await?;
    let display_name = state.auth.display_name(&id).await.unwrap_or_default();
    Some(AuthedUser { id, display_name })
}
