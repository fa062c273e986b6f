//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod chat_list;
pub mod say;
pub mod settings;
pub mod stats;


use std::error::Error;

use clap::{Parser, Subcommand};

use crate::auth::AuthManager;
use crate::core::app::CliOverrides;
use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_stderr_logging;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "ponder")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal chat client that shows the model's thinking")]
#[command(
    long_about = "Ponder is a full-screen terminal chat client for reasoning models served \
through an OpenAI-compatible API. Chats are kept on disk, and any <think> trace the \
model emits is split from the answer and can be shown or hidden.\n\n\
Authentication:\n\
  Run 'ponder auth' to store an API key in the system keyring, or set PONDER_API_KEY.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a newline\n\
  Ctrl+N            Start a new chat\n\
  Alt+Up/Alt+Down   Switch between chats\n\
  Ctrl+D            Delete the current chat\n\
  Ctrl+R            Rename the current chat\n\
  Ctrl+E            Edit an earlier message (repeat to go further back)\n\
  Ctrl+O            Show or hide thinking traces\n\
  Ctrl+Y            Copy the last answer, or the one to the message being edited\n\
  Ctrl+F            Search chats by title or content (Enter keeps the filter, Esc clears)\n\
  Ctrl+S            Settings\n\
  Ctrl+B            Toggle the chat list\n\
  PageUp/PageDown   Scroll\n\
  Ctrl+C            Quit\n\n\
Logging:\n\
  PONDER_LOG        tracing filter (e.g. 'debug'); the chat UI writes to ponder.log in the data directory"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use instead of the configured one
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// API base URL to use instead of the configured one
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send a single prompt and print the answer without saving it
    Say {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// List saved chats
    List,
    /// Show chat statistics
    Stats,
    /// Set a display setting or configuration value; without a key, show all
    Set {
        key: Option<String>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a setting or configuration value to its default
    Unset { key: String },
    /// Store an API key in the system keyring
    Auth,
    /// Remove the stored API key
    Deauth,
}

impl Args {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let overrides = args.overrides();
    let command = args.command.unwrap_or(Commands::Chat);
    if command != Commands::Chat {
        init_stderr_logging();
    }

    let result = match command {
        Commands::Chat => match Config::load() {
            Ok(config) => run_chat(config, overrides).await,
            Err(err) => Err(err.into()),
        },
        Commands::Say { prompt } => say::run_say(prompt, &overrides).await,
        Commands::List => chat_list::list_chats(),
        Commands::Stats => stats::print_stats(),
        Commands::Set { key, value } => settings::run_set(key, value),
        Commands::Unset { key } => settings::run_unset(&key),
        Commands::Auth => AuthManager::new().interactive_auth(),
        Commands::Deauth => AuthManager::new().interactive_deauth(),
    };

    if let Err(err) = result {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
    Ok(())
}
