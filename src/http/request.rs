//! Client address extraction.
//!
//! Priority: first `X-Forwarded-For` entry, then `X-Real-IP`, then the socket
//! peer, then the empty string. The result is normalized so IPv4 clients on a
//! dual-stack listener look like IPv4 clients.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

const IPV4_MAPPED_PREFIX: &str = "::ffff:";

/// Socket peer address, if the transport provided one.
///
/// Unlike `ConnectInfo`, this never rejects: it is `None` when the router
/// was not served with connect info (tests, serverless adapters).
#[derive(Debug, Clone, Copy)]
pub struct PeerAddr(pub Option<SocketAddr>);

impl<S: Send + Sync> FromRequestParts<S> for PeerAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(PeerAddr(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        ))
    }
}

/// Derive the normalized client address for a request.
pub fn extract_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    normalize_ip(&raw_client_ip(headers, peer))
}

fn raw_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = header_str(headers, X_FORWARDED_FOR)
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    if let Some(ip) = header_str(headers, X_REAL_IP)
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Strip an IPv4-mapped prefix and map IPv6 loopback to `127.0.0.1`.
pub fn normalize_ip(ip: &str) -> String {
    let ip = ip.trim();
    let ip = match ip.get(..IPV4_MAPPED_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(IPV4_MAPPED_PREFIX) => {
            &ip[IPV4_MAPPED_PREFIX.len()..]
        }
        _ => ip,
    };

    if ip == "::1" {
        "127.0.0.1".to_string()
    } else {
        ip.to_string()
    }
}
