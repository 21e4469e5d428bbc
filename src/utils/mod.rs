pub mod config;
pub mod logger;
pub mod settings_toml;
pub mod tempfiles;

pub use config::*;
pub use logger::{Colors, STAGE_THREAD_PREFIX, setup_logging};
pub use settings_toml::{apply_file_to_opts, load_settings_toml};
pub use tempfiles::{ensure_dir, temp_path_for, write_atomically};
