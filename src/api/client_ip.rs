use std::{
    fmt,
    net::{IpAddr, SocketAddr},
    str::FromStr,
    sync::Arc,
    time::Instant,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{info, info_span, Instrument};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

#[derive(Debug, thiserror::Error)]
#[error("invalid trusted proxy \"{0}\": expected an IP address or CIDR range")]
pub struct ParseTrustedProxyError(String);

/// Address range whose forwarding headers are honoured. A bare IP is a single-address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedProxy {
    network: IpAddr,
    prefix_len: u8,
}

impl TrustedProxy {
    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (self.network, ip.to_canonical()) {
            (IpAddr::V4(network), IpAddr::V4(ip)) => {
                let mask = u32::MAX.checked_shl(32 - u32::from(self.prefix_len)).unwrap_or(0);

                u32::from(network) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(network), IpAddr::V6(ip)) => {
                let mask = u128::MAX.checked_shl(128 - u32::from(self.prefix_len)).unwrap_or(0);

                u128::from(network) & mask == u128::from(ip) & mask
            }
            _ => false,
        }
    }
}

impl FromStr for TrustedProxy {
    type Err = ParseTrustedProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseTrustedProxyError(s.to_string());

        let (address, prefix_len) = match s.split_once('/') {
            Some((address, prefix_len)) => (address, Some(prefix_len)),
            None => (s, None),
        };
        let network = address.parse::<IpAddr>().map_err(|_| invalid())?.to_canonical();
        let max_prefix_len = if network.is_ipv4() { 32 } else { 128 };

        let prefix_len = match prefix_len {
            Some(prefix_len) => prefix_len
                .parse::<u8>()
                .ok()
                .filter(|len| *len <= max_prefix_len)
                .ok_or_else(invalid)?,
            None => max_prefix_len,
        };

        Ok(Self {
            network,
            prefix_len,
        })
    }
}

impl fmt::Display for TrustedProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

fn is_trusted(ip: &IpAddr, trusted_proxies: &[TrustedProxy]) -> bool {
    trusted_proxies.iter().any(|proxy| proxy.contains(ip))
}

/// Client address of a request.
///
/// Forwarding headers are only honoured when the direct peer is a trusted proxy.
/// `X-Forwarded-For` is tried first, then `X-Real-IP`. Hops are walked from the closest one
/// outwards and the first untrusted address is the client. A header with a malformed hop is
/// skipped, and the peer address is used when no header yields a client.
pub fn resolve_client_ip(
    peer: Option<IpAddr>,
    headers: &HeaderMap,
    trusted_proxies: &[TrustedProxy],
) -> Option<IpAddr> {
    let peer = peer?;

    if !is_trusted(&peer, trusted_proxies) {
        return Some(peer);
    }

    [X_FORWARDED_FOR, X_REAL_IP]
        .into_iter()
        .find_map(|header| client_from_header(headers, header, trusted_proxies))
        .or(Some(peer))
}

fn client_from_header(
    headers: &HeaderMap,
    header: &str,
    trusted_proxies: &[TrustedProxy],
) -> Option<IpAddr> {
    let hops: Vec<&str> = headers
        .get_all(header)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .collect();

    for (position, hop) in hops.iter().enumerate().rev() {
        let ip = hop.parse::<IpAddr>().ok()?;

        if position == 0 || !is_trusted(&ip, trusted_proxies) {
            return Some(ip);
        }
    }

    None
}

/// Wraps each request in a span carrying its method, path and client address.
pub async fn trace_request(
    State(trusted_proxies): State<Arc<[TrustedProxy]>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client_ip = resolve_client_ip(peer, request.headers(), &trusted_proxies);

    let span = info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        client_ip = ?client_ip,
    );

    async move {
        let started_at = Instant::now();
        let response = next.run(request).await;

        info!(
            status = response.status().as_u16(),
            latency = ?started_at.elapsed(),
            "Request served"
        );

        response
    }
    .instrument(span)
    .await
}
