//! Credential provider adapters.
//!
//! The portal authenticates chat requests with a bearer token. Tokens can be
//! given inline, through an environment variable, or in a file; the chained
//! provider tries them in that order.

use crate::config::FileAuthConfig;
use async_trait::async_trait;
use campus_application::{CredentialError, CredentialProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

fn non_blank(token: &str) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Fixed token from configuration.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<Option<String>, CredentialError> {
        Ok(non_blank(&self.token))
    }
}

/// Token read from an environment variable at request time.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl CredentialProvider for EnvTokenProvider {
    async fn bearer_token(&self) -> Result<Option<String>, CredentialError> {
        match std::env::var(&self.var) {
            Ok(value) => Ok(non_blank(&value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(CredentialError::Invalid(format!(
                "{} is not valid UTF-8",
                self.var
            ))),
        }
    }
}

/// Token stored in a file (trimmed).
///
/// A configured file that cannot be read is an error rather than "no token",
/// so a typo in the path does not silently send unauthenticated requests.
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialProvider for FileTokenProvider {
    async fn bearer_token(&self) -> Result<Option<String>, CredentialError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CredentialError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(non_blank(&contents))
    }
}

/// Returns the first token any inner provider yields.
pub struct ChainedCredentialProvider {
    providers: Vec<Arc<dyn CredentialProvider>>,
}

impl ChainedCredentialProvider {
    pub fn new(providers: Vec<Arc<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Build the chain described by the `[auth]` section.
    pub fn from_config(auth: &FileAuthConfig) -> Self {
        let mut providers: Vec<Arc<dyn CredentialProvider>> = Vec::new();
        if let Some(token) = &auth.token {
            providers.push(Arc::new(StaticTokenProvider::new(token.clone())));
        }
        if let Some(var) = &auth.token_env {
            providers.push(Arc::new(EnvTokenProvider::new(var.clone())));
        }
        if let Some(path) = &auth.token_file {
            providers.push(Arc::new(FileTokenProvider::new(path.clone())));
        }
        Self::new(providers)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl CredentialProvider for ChainedCredentialProvider {
    async fn bearer_token(&self) -> Result<Option<String>, CredentialError> {
        for provider in &self.providers {
            if let Some(token) = provider.bearer_token().await? {
                return Ok(Some(token));
            }
        }
        debug!("No bearer token configured; sending unauthenticated");
        Ok(None)
    }
}
