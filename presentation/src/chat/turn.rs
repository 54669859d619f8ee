//! A single send-and-stream exchange in the terminal.

use crate::output::console::{ConsoleFormatter, ConsoleProjector};
use campus_application::{StartStreamError, StartStreamInput, StreamChatUseCase};
use campus_domain::StreamOutcome;
use std::io::Write;
use tracing::debug;

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Send `input` and stream the reply through `console` until it closes.
///
/// Ctrl-C cancels the stream; the text received so far stays in place.
pub async fn run_turn(
    use_case: &StreamChatUseCase,
    console: &ConsoleProjector,
    input: StartStreamInput,
) -> Result<StreamOutcome, StartStreamError> {
    print!("{}", ConsoleFormatter::reply_prefix(&input.model));
    let _ = std::io::stdout().flush();

    let handle = match use_case.start_stream(input).await {
        Ok(handle) => handle,
        Err(e) => {
            println!();
            return Err(e);
        }
    };

    let outcome = tokio::select! {
        outcome = handle.outcome() => outcome,
        _ = interrupted() => {
            debug!("Interrupted; cancelling {:?}", handle);
            handle.cancel();
            handle.outcome().await
        }
    };

    console.finish(handle.message_id());
    if let Some(status) = ConsoleFormatter::outcome_status(&outcome) {
        eprintln!("{}", status);
    }
    Ok(outcome)
}
