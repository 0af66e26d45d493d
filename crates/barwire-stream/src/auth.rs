//! Access token collaborator boundary.

use async_trait::async_trait;
use thiserror::Error;

/// Error returned when a token refresh fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("token refresh failed: {0}")]
pub struct AuthError(pub String);

/// Supplies a fresh access token before each session establishment.
///
/// Barwire never interprets the token; it is embedded verbatim as a query
/// parameter in the stream URL. Acquisition and refresh semantics belong
/// entirely to the implementor.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns a token valid for the next session establishment.
    async fn refresh_access_token(&self) -> Result<String, AuthError>;
}

/// A provider that always returns the same token.
///
/// Suitable for tests and short-lived tooling where the token outlives
/// the process.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Creates a provider wrapping a fixed token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn refresh_access_token(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider::new("abc123");
        assert_eq!(provider.refresh_access_token().await.unwrap(), "abc123");
    }
}
