use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::error::LoginError;

/// Marker extension that lets [`ClientAddress`] read `X-Forwarded-For` and
/// `X-Real-IP`.
///
/// Clients can set these headers to anything, so only add this layer when the
/// server sits behind a proxy that overwrites them:
///
/// ```rust,ignore
/// let app = router.layer(axum::Extension(TrustForwardedHeaders));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustForwardedHeaders;

/// The client's IP address.
///
/// By default this is the socket peer address, which requires the server to be
/// started with `into_make_service_with_connect_info`. When the
/// [`TrustForwardedHeaders`] extension is present, the first `X-Forwarded-For`
/// entry, then `X-Real-IP`, take precedence over the peer address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddress(pub IpAddr);

impl<S> FromRequestParts<S> for ClientAddress
where
    S: Send + Sync,
{
    type Rejection = LoginError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parts.extensions.get::<TrustForwardedHeaders>().is_some() {
            if let Some(ip) = forwarded_ip(&parts.headers) {
                return Ok(ClientAddress(ip));
            }
        }

        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| ClientAddress(addr.ip()))
            .ok_or(LoginError::MissingClientAddress)
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded_for = headers
        .get("X-Forwarded-For")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());

    forwarded_for.or_else(|| {
        headers
            .get("X-Real-IP")
            .and_then(|header| header.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok())
    })
}
