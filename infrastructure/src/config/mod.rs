//! Configuration file loading for campus-chat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CAMPUS_CHAT_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./campus-chat.toml` or `./.campus-chat.toml`
//! 4. Global: `$XDG_CONFIG_HOME/campus-chat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileApiConfig, FileAuthConfig, FileChatConfig, FileConfig,
    FileLoggingConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
