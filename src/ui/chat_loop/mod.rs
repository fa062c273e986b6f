//! The interactive chat session.
//!
//! Terminal input is polled with a short timeout so finished completions,
//! which arrive over the [`Conversation`](crate::core::conversation::Conversation)
//! channel, are applied promptly even while the user is idle.

mod keybindings;
mod lifecycle;

use std::{error::Error, sync::Arc, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::auth::AuthManager;
use crate::core::app::bootstrap::{connect_client, open_session_store};
use crate::core::app::{App, AppAction, CliOverrides, LoopControl, UiMode};
use crate::core::config::Config;
use crate::core::conversation::CompletionOutcome;
use crate::core::persistence::KeyValueStore;
use crate::ui::renderer::{max_scroll_offset, transcript_height, ui};
use crate::utils::logging::init_file_logging;

use keybindings::{resolve_key, KeyContext, KeyResult};
use lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub async fn run_chat(config: Config, overrides: CliOverrides) -> Result<(), Box<dyn Error>> {
    let completion = overrides.apply(&config)?;
    let data_dir = config.resolve_data_dir()?;
    let log_path = init_file_logging(&data_dir)?;
    info!(log = %log_path.display(), model = %completion.model, "starting chat session");

    // Fail on a missing key before the terminal switches to the alternate screen.
    let client = connect_client(&completion, &AuthManager::new())?;
    let store = open_session_store(&config)?;
    let (mut app, mut rx) = App::new(store, Arc::new(client), completion.model.clone());

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app, &mut rx);
    restore_terminal(&mut terminal)?;
    result
}

fn event_loop<S: KeyValueStore>(
    terminal: &mut ChatTerminal,
    app: &mut App<S>,
    rx: &mut mpsc::UnboundedReceiver<CompletionOutcome>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            let control = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let size = terminal.size()?;
                    let area = Rect::new(0, 0, size.width, size.height);
                    let ctx = KeyContext {
                        max_offset: max_scroll_offset(app, area),
                        page: transcript_height(app, area).max(1),
                    };
                    match resolve_key(app, key, ctx) {
                        KeyResult::Action(action) => app.apply_action(action),
                        KeyResult::InsertNewline => {
                            app.ui.textarea.insert_newline();
                            LoopControl::Continue
                        }
                        KeyResult::EditInput => {
                            app.ui.textarea.input(key);
                            LoopControl::Continue
                        }
                        KeyResult::Ignored => LoopControl::Continue,
                    }
                }
                Event::Paste(text) => {
                    match app.ui.mode {
                        UiMode::Search => app.ui.search_query.push_str(text.trim()),
                        UiMode::Normal if !app.is_waiting() => {
                            app.ui.textarea.insert_str(text);
                        }
                        _ => {}
                    }
                    LoopControl::Continue
                }
                _ => LoopControl::Continue,
            };
            if control == LoopControl::Quit {
                debug!("quit requested");
                return Ok(());
            }
        }

        while let Ok(outcome) = rx.try_recv() {
            app.apply_action(AppAction::CompletionFinished(outcome));
        }
    }
}
