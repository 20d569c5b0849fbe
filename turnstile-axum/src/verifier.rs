use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::LoginError;

/// Checks a username/password pair.
///
/// The login route calls this only after the guard has allowed the attempt,
/// and reports the outcome back to the guard. Return `Ok(false)` for wrong
/// credentials; `Err` is reserved for failures of the verifier itself and does
/// not count as a failed attempt.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, LoginError>;
}

/// A fixed set of username/password pairs held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }

    /// Parse a `username:password` entry.
    pub fn parse_entry(entry: &str) -> Result<(String, String), LoginError> {
        match entry.split_once(':') {
            Some((username, password)) if !username.is_empty() && !password.is_empty() => {
                Ok((username.to_string(), password.to_string()))
            }
            _ => Err(LoginError::BadRequest(format!(
                "expected username:password, got {entry:?}"
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<(String, String)> for StaticCredentials {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            users: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, LoginError> {
        Ok(self
            .users
            .get(username)
            .is_some_and(|expected| expected == password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_credentials_verify() {
        let credentials = StaticCredentials::new().with_user("alice", "hunter2");

        assert!(credentials.verify("alice", "hunter2").await.unwrap());
        assert!(!credentials.verify("alice", "wrong").await.unwrap());
        assert!(!credentials.verify("bob", "hunter2").await.unwrap());
    }

    #[test]
    fn test_parse_entry() {
        assert_eq!(
            StaticCredentials::parse_entry("alice:pa:ss").unwrap(),
            ("alice".to_string(), "pa:ss".to_string())
        );
        assert!(StaticCredentials::parse_entry("alice").is_err());
        assert!(StaticCredentials::parse_entry(":secret").is_err());
        assert!(StaticCredentials::parse_entry("alice:").is_err());
    }

    #[test]
    fn test_from_iterator() {
        let credentials: StaticCredentials = [("a".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        assert_eq!(credentials.len(), 1);
        assert!(!credentials.is_empty());
    }
}
