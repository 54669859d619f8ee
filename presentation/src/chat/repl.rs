//! REPL (Read-Eval-Print Loop) for interactive chat

use super::turn::run_turn;
use crate::output::console::{ConsoleFormatter, ConsoleProjector};
use campus_application::{StartStreamInput, StreamChatUseCase};
use campus_domain::{ConversationId, ModelKey};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;

/// What the loop should do after a slash command
#[derive(Debug, PartialEq, Eq)]
enum CommandResult {
    Continue,
    Exit,
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: Arc<StreamChatUseCase>,
    console: Arc<ConsoleProjector>,
    conversation_id: ConversationId,
    model: ModelKey,
}

impl ChatRepl {
    pub fn new(
        use_case: Arc<StreamChatUseCase>,
        console: Arc<ConsoleProjector>,
        conversation_id: ConversationId,
        model: ModelKey,
    ) -> Self {
        Self {
            use_case,
            console,
            conversation_id,
            model,
        }
    }

    /// Run the interactive REPL until `/quit` or end of input.
    ///
    /// Must run on the multi-threaded runtime; the prompt blocks its worker
    /// through `block_in_place` while stream tasks keep running elsewhere.
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = dirs::data_dir().map(|p| p.join("campus-chat").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        println!();
        println!("{}", ConsoleFormatter::welcome(&self.conversation_id, &self.model));
        self.print_help();

        loop {
            let readline = tokio::task::block_in_place(|| rl.readline(">>> "));

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) == CommandResult::Exit {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.send(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C (type /quit to exit)");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("{}", ConsoleFormatter::error(&err.to_string()));
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    async fn send(&self, text: &str) {
        let input = StartStreamInput::new(self.conversation_id.clone(), text, self.model.clone());
        if let Err(e) = run_turn(&self.use_case, &self.console, input).await {
            eprintln!("{}", ConsoleFormatter::error(&e.to_string()));
        }
        println!();
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  /help, /h, /?      - Show this help");
        println!("  /model [KEY]       - Show or switch the model");
        println!("  /models            - List known model keys");
        println!("  /new               - Start a new conversation");
        println!("  /quit, /exit, /q   - Exit chat");
        println!();
    }

    /// Handle slash commands.
    fn handle_command(&mut self, cmd: &str) -> CommandResult {
        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };

        match name {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return CommandResult::Exit;
            }
            "/help" | "/h" | "/?" => self.print_help(),
            "/model" if arg.is_empty() => println!("Current model: {}", self.model),
            "/model" => {
                let Ok(model) = arg.parse::<ModelKey>();
                self.model = model;
                println!("Model set to {}", self.model);
            }
            "/models" => {
                println!("Known models:");
                for model in ModelKey::known() {
                    let marker = if model == self.model { "*" } else { " " };
                    println!("  {} {}", marker, model);
                }
            }
            "/new" => {
                self.use_case.cancel_conversation(&self.conversation_id);
                self.conversation_id = ConversationId::generate();
                println!("New conversation: {}", self.conversation_id);
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        CommandResult::Continue
    }
}
