pub mod data;
pub mod io;

#[cfg(test)]
pub mod tests;

pub use data::{CompletionConfig, Config, CONFIG_KEYS};
pub use io::ConfigError;
