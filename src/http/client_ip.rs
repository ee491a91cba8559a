//! Client identifier extraction.
//!
//! The `X-Forwarded-For` header is trusted as-is. Any client can set it, so
//! keying on it is only sound when a proxy in front of the service
//! overwrites the header.

use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderMap;
use std::net::SocketAddr;
use tracing::debug;

/// Header carrying the originating client address when behind a proxy.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Identifier used when a request carries neither a forwarded address nor
/// connection info.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the rate limiting key for a request.
pub fn client_id(request: &Request) -> String {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string());

    derive_client_id(request.headers(), remote_addr.as_deref())
}

/// Derive a client identifier from request headers and the remote address.
///
/// Prefers the first entry of `X-Forwarded-For`, then the host part of
/// `remote_addr`, then `remote_addr` unmodified if it has no parsable port.
pub fn derive_client_id(headers: &HeaderMap, remote_addr: Option<&str>) -> String {
    if let Some(forwarded) = forwarded_for(headers) {
        return forwarded.to_string();
    }

    let Some(remote_addr) = remote_addr else {
        return UNKNOWN_CLIENT.to_string();
    };

    match split_host_port(remote_addr) {
        Some(host) => host.to_string(),
        None => {
            debug!(remote_addr = %remote_addr, "Failed to parse host from remote address");
            remote_addr.to_string()
        }
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(X_FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
}

/// Split `host:port` and return the host.
///
/// IPv6 hosts must be bracketed (`[::1]:80`). Returns `None` when there is
/// no port separator or the host part is malformed.
pub fn split_host_port(addr: &str) -> Option<&str> {
    let (host, _port) = addr.rsplit_once(':')?;

    if let Some(bracketed) = host.strip_prefix('[') {
        let inner = bracketed.strip_suffix(']')?;
        if inner.contains(['[', ']']) {
            return None;
        }
        return Some(inner);
    }

    if host.contains(['[', ']', ':']) {
        return None;
    }
    Some(host)
}
