use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts},
    http::request::Parts,
    Json,
};

use crate::validate::Violations;

pub const USER_HEADER: &str = "user";

/// Display name taken from the `user` header. Absent, empty, or non UTF-8
/// values read as an anonymous caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User(pub Option<String>);

impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
        Ok(User(name))
    }
}

/// Unwraps a JSON body, turning a malformed one into a validation failure
/// rather than axum's plain-text rejection.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Violations> {
    body.map(|Json(body)| body)
        .map_err(|rejection| Violations::single("body", rejection.body_text()))
}
