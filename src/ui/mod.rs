//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: terminal setup, key handling, and the event loop.
//! - [`renderer`]: frame composition (sidebar, transcript, input, overlays).
//! - [`theme`]: light and dark palettes and font-size density.
//! - [`wrap`]: word wrapping of transcript lines to the viewport width.
//!
//! State lives in [`crate::core::app`]; this layer only presents it and
//! captures input.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
pub mod wrap;
