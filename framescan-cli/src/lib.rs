// framescan-cli/src/lib.rs
//
// Library portion of the Framescan CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;

// Re-exported for the `cli_error!` macro.
pub use framescan_core;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, InspectArgs, ModelArgs};
pub use commands::check::run_check;
pub use commands::inspect::{InspectStatus, run_inspect};
