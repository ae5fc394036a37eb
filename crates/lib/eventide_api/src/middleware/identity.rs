//! Caller identity resolution.
//!
//! Used to key rate limiting and conversation history. Client-supplied
//! identity headers are honoured only when `TRUST_IDENTITY_HEADERS` is set;
//! otherwise every caller is keyed on its peer address.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::AppState;

/// Header a trusted frontend may set to name the user.
pub const USER_ID_HEADER: &str = "x-user-id";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Identity of the caller.
///
/// With trusted headers: `x-user-id`, then the first `x-forwarded-for`
/// address, then the peer address. Without: the peer address only. Falls
/// back to `"anonymous"` when nothing is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn from_headers(headers: &HeaderMap) -> Option<CallerId> {
    if let Some(user) = header_value(headers, USER_ID_HEADER) {
        return Some(CallerId(format!("user:{user}")));
    }
    header_value(headers, FORWARDED_FOR_HEADER)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|ip| CallerId(format!("ip:{ip}")))
}

fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>, trust_headers: bool) -> CallerId {
    if trust_headers && let Some(caller) = from_headers(headers) {
        return caller;
    }
    match peer {
        Some(addr) => CallerId(format!("ip:{}", addr.ip())),
        None => CallerId("anonymous".to_string()),
    }
}

impl FromRequestParts<AppState> for CallerId {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let trust = state.config.trust_identity_headers;
        Ok(resolve(&parts.headers, peer, trust))
    }
}
