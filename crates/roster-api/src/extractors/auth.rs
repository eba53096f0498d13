//! Relay authentication extractor
//!
//! Every event and command request carries the shared relay secret as a
//! bearer token.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::response::ApiError;
use crate::state::AppState;

/// Marker for a request that presented the relay secret
#[derive(Debug, Clone, Copy)]
pub struct RelayAuth;

#[async_trait]
impl<S> FromRequestParts<S> for RelayAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);
        if !app_state.accepts_token(bearer.token()) {
            tracing::warn!("Rejected request with a wrong relay token");
            return Err(ApiError::InvalidToken);
        }

        Ok(RelayAuth)
    }
}
