//! TUI-less "say" command

use std::error::Error;

use crate::api::ChatMessage;
use crate::auth::AuthManager;
use crate::core::app::bootstrap::connect_client;
use crate::core::app::CliOverrides;
use crate::core::completion::{Completion, CompletionClient};
use crate::core::config::Config;
use crate::core::message::Role;

pub async fn run_say(prompt: Vec<String>, overrides: &CliOverrides) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err("Usage: ponder say <prompt>".into());
    }

    let config = Config::load()?;
    let completion = overrides.apply(&config)?;
    let client = connect_client(&completion, &AuthManager::new())?;
    let reply = say_once(&client, &prompt).await?;
    print!("{}", format_reply(&reply));
    Ok(())
}

/// One-turn conversation; nothing is persisted.
pub async fn say_once(
    client: &dyn CompletionClient,
    prompt: &str,
) -> Result<Completion, Box<dyn Error>> {
    let messages = [ChatMessage::new(Role::User.as_str(), prompt)];
    Ok(client.complete(&messages).await?)
}

pub fn format_reply(reply: &Completion) -> String {
    if reply.reasoning.is_empty() {
        return format!("{}\n", reply.answer);
    }
    format!(
        "Thinking ({} ms):\n{}\n\n{}\n",
        reply.reasoning_elapsed_ms, reply.reasoning, reply.answer
    )
}
