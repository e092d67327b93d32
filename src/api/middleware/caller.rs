//! Caller identity extractor

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::api::types::ApiError;
use crate::domain::CallerIdentity;

/// Header carrying the name of the person issuing the request
pub const CALLER_IDENTITY_HEADER: &str = "x-caller-identity";

/// Optional caller identity taken from `X-Caller-Identity`.
///
/// A missing or blank header yields `None`; operations that need a caller
/// (`mine`, assign to `me`) reject that themselves.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<CallerIdentity>);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_caller(&parts.headers).map(Caller)
    }
}

fn extract_caller(headers: &HeaderMap) -> Result<Option<CallerIdentity>, ApiError> {
    let Some(value) = headers.get(CALLER_IDENTITY_HEADER) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| {
        ApiError::bad_request("Invalid X-Caller-Identity header encoding")
            .with_param(CALLER_IDENTITY_HEADER)
    })?;

    if value.trim().is_empty() {
        return Ok(None);
    }

    CallerIdentity::new(value)
        .map(Some)
        .map_err(|e| ApiError::from(e).with_param(CALLER_IDENTITY_HEADER))
}
