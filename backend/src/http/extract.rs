//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::AppError;
use crate::api::{Actor, Role};

pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_ID_HEADER: &str = "x-user-id";

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, AppError> {
    parts
        .headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(str::trim)
                .map_err(|_| AppError::BadRequest(format!("{} is not valid text", name)))
        })
        .transpose()
}

/// Caller identity from the `X-User-Role` and `X-User-Id` headers.
///
/// Requests without a role are treated as an anonymous student, which is
/// enough for every read endpoint.
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = match header(parts, USER_ROLE_HEADER)? {
            Some(raw) if !raw.is_empty() => raw.parse::<Role>().map_err(AppError::BadRequest)?,
            _ => Role::Student,
        };
        let user = header(parts, USER_ID_HEADER)?
            .filter(|u| !u.is_empty())
            .unwrap_or("anonymous");
        Ok(Actor::new(user, role))
    }
}
