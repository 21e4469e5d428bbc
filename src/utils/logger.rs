use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;
use std::thread;

/// Prefix of every pipeline stage thread's name; the rest is the stage name.
pub const STAGE_THREAD_PREFIX: &str = "stage-";

/// Stage name of the calling thread, if it is a pipeline stage thread.
pub fn current_stage() -> Option<String> {
    thread::current()
        .name()
        .and_then(|name| name.strip_prefix(STAGE_THREAD_PREFIX))
        .map(str::to_string)
}

pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // try_init: the library entry points may be driven by a caller that already installed a logger.
    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let tag = match current_stage() {
                Some(stage) => format!("{} {}", name.cyan(), stage.dimmed()),
                None => name.cyan().to_string(),
            };
            let line = match record.level() {
                Level::Error => format!("[{} {}] {}", tag, "ERROR".red(), record.args()),
                Level::Warn => format!("[{} {}] {}", tag, "WARN".yellow(), record.args()),
                _ => format!("[{}] {}", tag, record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}

/// Colors for per-item outcome lines.
pub struct Colors;

impl Colors {
    pub const SUCCESS: &'static str = "green";
    pub const FAILURE: &'static str = "red";
    pub const SKIPPED: &'static str = "yellow";

    /// Colorize `text` with one of the color names above.
    pub fn colorize(color: &str, text: &str) -> String {
        text.color(color).to_string()
    }
}
