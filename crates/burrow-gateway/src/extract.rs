use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;

pub const USER_ID_COOKIE: &str = "user_id";

/// The opaque caller id carried in the `user_id` cookie.
///
/// Empty when the cookie is absent; such callers are anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserId(pub String);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == USER_ID_COOKIE)
            .map(|(_, value)| value.trim_matches('"').to_string())
            .unwrap_or_default();

        Ok(UserId(id))
    }
}
