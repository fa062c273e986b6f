//! Ponder is a full-screen terminal chat client for reasoning models.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chat session store, persistence, settings, the
//!   completion client, and the orchestration that ties a user turn to the
//!   reply that comes back for it.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input and display updates.
//! - [`cli`] parses arguments and dispatches the one-shot commands.
//! - [`auth`] resolves the API key from the environment or system keyring.
//! - [`api`] defines the chat completion payloads sent over the wire.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
