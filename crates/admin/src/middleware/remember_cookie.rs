//! The `remember_admin` cookie.
//!
//! Written directly as `Set-Cookie` headers rather than through the session
//! layer, since it must outlive the session it restores.

use axum::http::{HeaderMap, HeaderValue, header};
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::cookie::{Cookie, SameSite};
use tracing::warn;

/// Cookie name.
pub const REMEMBER_COOKIE: &str = "remember_admin";

/// Value of the `remember_admin` cookie on the request, URL-decoded.
#[must_use]
pub fn read(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == REMEMBER_COOKIE)
        .map(|c| {
            urlencoding::decode(c.value())
                .map_or_else(|_| c.value().to_string(), |v| v.into_owned())
        })
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value that stores `value` for `days` days.
#[must_use]
pub fn issue(value: &str, days: i64) -> Option<HeaderValue> {
    let cookie = Cookie::build((REMEMBER_COOKIE, value.to_string()))
        .http_only(true)
        .secure(true)
        .path("/")
        .same_site(SameSite::Strict)
        .max_age(Duration::days(days))
        .build();
    to_header(&cookie)
}

/// `Set-Cookie` value that expires the cookie in the browser.
#[must_use]
pub fn clear() -> Option<HeaderValue> {
    let cookie = Cookie::build((REMEMBER_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .path("/")
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build();
    to_header(&cookie)
}

fn to_header(cookie: &Cookie<'_>) -> Option<HeaderValue> {
    HeaderValue::from_str(&cookie.to_string())
        .inspect_err(|e| warn!(error = %e, "Unencodable remember cookie"))
        .ok()
}
