// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device user extraction.
//!
//! The app shell owns identity: it generates a stable id per device and sends
//! it on every request. The server never mints or resolves ids itself.

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "X-User-Id";

const MAX_USER_ID_LEN: usize = 128;

/// User the request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceUser {
    pub user_id: String,
}

/// 1-128 characters from `[A-Za-z0-9_-]`.
pub fn is_valid_user_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_USER_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Middleware that requires a well-formed `X-User-Id` header.
///
/// Missing header is 401, malformed id is 400.
pub async fn require_user(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let raw = request
        .headers()
        .get(USER_ID_HEADER)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = raw
        .to_str()
        .ok()
        .filter(|id| is_valid_user_id(id))
        .ok_or(StatusCode::BAD_REQUEST)?
        .to_string();

    request.extensions_mut().insert(DeviceUser { user_id });

    Ok(next.run(request).await)
}
