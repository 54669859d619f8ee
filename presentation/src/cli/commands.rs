//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for campus-chat
#[derive(Parser, Debug)]
#[command(name = "campus-chat")]
#[command(author, version, about = "Stream answers from the campus portal AI assistant")]
#[command(long_about = r#"
campus-chat sends a message to the portal's AI assistant and prints the
reply as it streams in. Press Ctrl-C while a reply is streaming to stop it;
the text received so far is kept.

Configuration files are loaded from (in priority order):
1. CAMPUS_CHAT_* environment variables (e.g. CAMPUS_CHAT_API__BASE_URL)
2. --config <path>                         Explicit config file
3. ./campus-chat.toml                      Project-level config
4. ~/.config/campus-chat/config.toml       Global config

Example:
  campus-chat "When is the add/drop deadline?"
  campus-chat -m deepseek "Summarise chapter 3 of the syllabus"
  campus-chat --chat --conversation 42
"#)]
pub struct Cli {
    /// The message to send (not required in chat mode)
    pub message: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Model key to route the request to (qwen-public, qwen-internal, deepseek, ...)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Conversation id; a numeric id continues that backend session,
    /// anything else starts a new one
    #[arg(long, value_name = "ID")]
    pub conversation: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}
