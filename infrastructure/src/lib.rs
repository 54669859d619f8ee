//! Infrastructure layer for campus-chat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP chat transport, credential sources,
//! the in-memory message store, the JSONL stream log, and configuration
//! file loading.

pub mod config;
pub mod credentials;
pub mod http;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileApiConfig, FileAuthConfig, FileChatConfig,
    FileConfig, FileLoggingConfig,
};
pub use credentials::{
    ChainedCredentialProvider, EnvTokenProvider, FileTokenProvider, StaticTokenProvider,
};
pub use http::{HttpChatTransport, HttpTransportError};
pub use logging::JsonlStreamLogger;
pub use store::InMemoryMessageStore;
