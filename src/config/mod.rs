//! Configuration and CLI handling

pub mod cli;
pub mod settings;

pub use cli::Cli;
pub use settings::{resolve_config_path, resolve_library_path, Settings};
