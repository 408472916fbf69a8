//! Client IP extraction from forwarding headers.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Resolves the client IP, preferring proxy forwarding headers over the
/// peer socket address.
///
/// Checks `X-Forwarded-For` (first hop), then `X-Real-IP`, then the socket
/// peer. Only deploy behind a proxy that strips these headers from untrusted
/// traffic.
pub fn client_ip(headers: &HeaderMap, addr: &SocketAddr) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    addr.ip().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn addr() -> SocketAddr {
        "10.0.0.1:443".parse().unwrap()
    }

    #[test]
    fn test_prefers_forwarded_for_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.2"),
        );

        assert_eq!(client_ip(&headers, &addr()), "203.0.113.7");
    }

    #[test]
    fn test_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));

        assert_eq!(client_ip(&headers, &addr()), "198.51.100.4");
    }

    #[test]
    fn test_falls_back_to_socket_peer() {
        assert_eq!(client_ip(&HeaderMap::new(), &addr()), "10.0.0.1");
    }
}
