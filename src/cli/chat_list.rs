use std::error::Error;
use std::io::{self, Write};

use chrono::Local;

use crate::core::app::bootstrap::open_session_store;
use crate::core::chat::Chat;
use crate::core::config::Config;

pub fn list_chats() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let store = open_session_store(&config)?;
    let mut stdout = io::stdout().lock();
    write_chat_list(&mut stdout, store.chats())?;
    Ok(())
}

/// Most recent first, the order the sidebar shows.
pub fn write_chat_list<W: Write>(out: &mut W, chats: &[Chat]) -> io::Result<()> {
    if chats.is_empty() {
        writeln!(out, "No chats yet. Run `ponder` to start one.")?;
        return Ok(());
    }
    for chat in chats {
        let updated = chat.last_updated.with_timezone(&Local);
        writeln!(
            out,
            "{}  {}  ({} messages, updated {})",
            chat.id,
            chat.title,
            chat.turns.len(),
            updated.format("%Y-%m-%d %H:%M")
        )?;
    }
    Ok(())
}
