pub mod app;
pub mod chat;
pub mod clock;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod keyring;
pub mod message;
pub mod persistence;
pub mod reasoning;
pub mod session;
pub mod settings;
pub mod stats;
