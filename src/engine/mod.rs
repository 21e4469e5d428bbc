//! Engine module: CLI parsing and handling, listing, progress

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use tools::{OutputRule, is_os_hidden_file, list_input_paths, path_relative_to};
