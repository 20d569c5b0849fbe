use std::net::IpAddr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockResponse {
    pub identifier: String,
    pub was_blocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tracked_identifiers: usize,
}

/// How a login request is mapped to the identifier the guard tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifierStrategy {
    /// One counter per client IP address.
    #[default]
    ClientIp,
    /// One counter per account, regardless of where attempts come from.
    Username,
    /// One counter per (client IP, account) pair.
    ClientIpAndUsername,
}

impl IdentifierStrategy {
    /// Build the identifier for a request. Usernames are trimmed and lowercased
    /// so case variants share a counter.
    pub fn identifier(&self, ip: IpAddr, username: &str) -> String {
        let username = username.trim().to_lowercase();
        match self {
            IdentifierStrategy::ClientIp => ip.to_string(),
            IdentifierStrategy::Username => username,
            IdentifierStrategy::ClientIpAndUsername => format!("{ip}|{username}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_identifier_strategies() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1));

        assert_eq!(
            IdentifierStrategy::ClientIp.identifier(ip, "Alice"),
            "192.168.1.1"
        );
        assert_eq!(
            IdentifierStrategy::Username.identifier(ip, " Alice "),
            "alice"
        );
        assert_eq!(
            IdentifierStrategy::ClientIpAndUsername.identifier(ip, "Alice"),
            "192.168.1.1|alice"
        );
    }
}
