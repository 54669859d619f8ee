//! Credential provider port
//!
//! Resolves the bearer token sent with chat requests. The stream session
//! never reads ambient storage; it only receives the resolved token.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while resolving credentials
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Credential source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid credential: {0}")]
    Invalid(String),
}

/// Source of the bearer token for chat requests
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Resolve the current token.
    ///
    /// `Ok(None)` means "send the request unauthenticated".
    async fn bearer_token(&self) -> Result<Option<String>, CredentialError>;
}

/// Provider for unauthenticated use.
pub struct NoCredentials;

#[async_trait]
impl CredentialProvider for NoCredentials {
    async fn bearer_token(&self) -> Result<Option<String>, CredentialError> {
        Ok(None)
    }
}
