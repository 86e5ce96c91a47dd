//! Client address resolution.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap},
};
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::api::AppState;

/// Client IP used for rate-limit buckets and session records.
///
/// Forwarded headers are client-controlled unless a proxy overwrites them,
/// so they are read only when `trust_proxy` is set: first `X-Forwarded-For`
/// hop, then `X-Real-IP`. Otherwise the socket address is used.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        if let Some(ip) = forwarded_ip(headers) {
            return Some(ip);
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    headers
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// Extractor form of [`client_ip`]
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let trust_proxy = AppState::from_ref(state).config.trust_proxy;
        Ok(ClientIp(client_ip(
            &parts.headers,
            &parts.extensions,
            trust_proxy,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn socket(ip: [u8; 4]) -> Extensions {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from((ip, 5000))));
        extensions
    }

    fn spoofed_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("X-Real-IP", HeaderValue::from_static("10.0.0.9"));
        headers
    }

    #[test]
    fn test_forwarded_for_wins_behind_proxy() {
        assert_eq!(
            client_ip(&spoofed_headers(), &socket([172, 17, 0, 2]), true),
            Some("10.0.0.1".to_string())
        );

        let mut real_ip_only = HeaderMap::new();
        real_ip_only.insert("X-Real-IP", HeaderValue::from_static(" 10.0.0.9 "));
        assert_eq!(
            client_ip(&real_ip_only, &Extensions::new(), true),
            Some("10.0.0.9".to_string())
        );
    }

    #[test]
    fn test_forwarded_headers_ignored_without_proxy() {
        assert_eq!(
            client_ip(&spoofed_headers(), &socket([192, 168, 1, 4]), false),
            Some("192.168.1.4".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_socket() {
        assert_eq!(
            client_ip(&HeaderMap::new(), &socket([192, 168, 1, 4]), true),
            Some("192.168.1.4".to_string())
        );
        assert_eq!(client_ip(&HeaderMap::new(), &Extensions::new(), false), None);
    }
}
