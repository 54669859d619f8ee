//! CLI entrypoint for campus-chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use campus_application::{
    CompositeProjector, ConversationLogger, MessageProjector, NoConversationLogger,
    StartStreamInput, StreamChatUseCase,
};
use campus_domain::{ConversationId, ModelKey};
use campus_infrastructure::{
    ChainedCredentialProvider, ConfigLoader, FileConfig, HttpChatTransport, InMemoryMessageStore,
    JsonlStreamLogger,
};
use campus_presentation::{ChatRepl, Cli, ConsoleProjector, run_turn};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // === Configuration ===
    let config: FileConfig = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to load configuration")?
    };
    config.validate().context("Invalid configuration")?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("{}", ConfigLoader::render(&config)?);
        return Ok(());
    }

    info!(
        "Starting campus-chat against {} (active stream policy: {})",
        config.api.base_url, config.chat.active_stream_policy
    );

    let model = match &cli.model {
        Some(key) => {
            let Ok(key) = key.parse::<ModelKey>();
            key
        }
        None => config.chat.default_model.clone(),
    };
    let conversation_id = match &cli.conversation {
        Some(id) => ConversationId::new(id.as_str())?,
        None => ConversationId::generate(),
    };

    // === Dependency Injection ===
    let transport = Arc::new(HttpChatTransport::new(&config.api)?);
    let credentials = Arc::new(ChainedCredentialProvider::from_config(&config.auth));
    let store = Arc::new(InMemoryMessageStore::new());
    let console = Arc::new(ConsoleProjector::stdout());
    let projector = Arc::new(CompositeProjector::new(vec![
        store.clone() as Arc<dyn MessageProjector>,
        console.clone(),
    ]));

    let conversation_logger: Arc<dyn ConversationLogger> = match &config.logging.stream_log {
        Some(path) => match JsonlStreamLogger::open(path) {
            Some(logger) => Arc::new(logger),
            None => {
                warn!("Stream log disabled");
                Arc::new(NoConversationLogger)
            }
        },
        None => Arc::new(NoConversationLogger),
    };

    let use_case = Arc::new(
        StreamChatUseCase::new(transport, projector, credentials)
            .with_config(config.stream_config())
            .with_conversation_logger(conversation_logger),
    );

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(use_case, console, conversation_id, model);
        repl.run().await?;
        return Ok(());
    }

    // Single message mode - message is required
    let message = match cli.message {
        Some(m) => m,
        None => bail!("Message is required. Use --chat for interactive mode."),
    };

    let input = StartStreamInput::new(conversation_id.clone(), message, model);
    let outcome = run_turn(&use_case, &console, input).await?;

    info!(
        "Conversation {} now holds {} messages",
        conversation_id,
        store.messages(&conversation_id).len()
    );

    if outcome.is_failed() {
        // The failure reason was already printed under the reply
        bail!("Reply did not complete");
    }

    Ok(())
}
