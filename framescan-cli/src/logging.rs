// ============================================================================
// framescan-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger Backend for the CLI
//
// framescan-core logs through the `log` facade. The CLI installs env_logger
// writing to stderr, so stdout stays free for reports. `RUST_LOG` overrides
// the level picked from `--verbose`.
//
// AI-ASSISTANT-INFO: Logger initialization with colored level column

// ---- External crate imports ----
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use owo_colors::OwoColorize;

// ---- Standard library imports ----
use std::io::Write;

/// Level used when `RUST_LOG` is not set.
#[must_use]
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes the global logger. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_level(verbose).as_str());

    let _ = Builder::from_env(env)
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            let level = record.level();
            let level_str = format!("{:<5}", level.as_str());
            let level_colored = match level {
                Level::Error => level_str.bright_red().to_string(),
                Level::Warn => level_str.yellow().to_string(),
                Level::Info => level_str.green().to_string(),
                Level::Debug => level_str.blue().to_string(),
                Level::Trace => level_str.magenta().to_string(),
            };
            writeln!(
                buf,
                "{} {} {}",
                timestamp.to_string().white(),
                level_colored,
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .try_init();
}
