//! # Access Control
//!
//! Credential verification and role authorization, exposed to handlers as
//! extractors. Adding `RequireUser` or `RequireAdmin` to a handler's
//! arguments runs the matching guard chain before the body executes.

pub mod gate;
pub mod token;

pub use gate::{is_admin, AccessGate, Guard, ADMIN_GUARDS, ADMIN_ROLE, USER_GUARDS};
pub use token::{bearer_token, TokenClaims, TokenService, TOKEN_LIFETIME_HOURS};

use crate::error::{error_to_response, ApiError};
use crate::state::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use parts_core::PartsError;

async fn run_guards(parts: &Parts, state: &AppState, guards: &[Guard]) -> Result<TokenClaims, ApiError> {
    AccessGate::new(&state.tokens, state.store.as_ref())
        .require(&parts.headers, guards)
        .await
        .and_then(|claims| {
            claims.ok_or_else(|| PartsError::Internal("Guard chain produced no identity".to_string()))
        })
        .map_err(error_to_response)
}

/// Extractor that requires a valid bearer token
#[derive(Debug, Clone)]
pub struct RequireUser(pub TokenClaims);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        run_guards(parts, state, USER_GUARDS).await.map(RequireUser)
    }
}

/// Extractor that requires a valid bearer token whose user is an admin
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub TokenClaims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        run_guards(parts, state, ADMIN_GUARDS).await.map(RequireAdmin)
    }
}
