//! `framescan check`: verifies the external pieces an inspection needs.

use crate::cli::ModelArgs;
use crate::cli_error;
use crate::commands::ollama_config;
use crate::error::{CliErrorContext, CliResult};

use console::style;
use framescan_core::capability::OllamaClient;
use framescan_core::check_dependency;

/// Checks for ffmpeg, the model server and the model. Every check runs;
/// the first failure is returned afterwards.
pub fn run_check(args: &ModelArgs) -> CliResult<()> {
    let mut failures = Vec::new();

    match check_dependency("ffmpeg") {
        Ok(_) => report_ok("ffmpeg found"),
        Err(e) => {
            report_failed(&e.to_string());
            failures.push(e.to_string());
        }
    }

    let client = OllamaClient::new(ollama_config(args, None))
        .cli_with_context(|| format!("Configuring model client for {}", args.host))?;
    let host = &client.config().host;
    let model = &client.config().model;
    match client.has_model() {
        Ok(true) => report_ok(&format!("{model} is available on {host}")),
        Ok(false) => {
            let message = format!("{host} is reachable but does not offer {model} (try `ollama pull {model}`)");
            report_failed(&message);
            failures.push(message);
        }
        Err(e) => {
            let message = format!("{host} is not reachable: {e}");
            report_failed(&message);
            failures.push(message);
        }
    }

    match failures.first() {
        None => Ok(()),
        Some(first) => Err(cli_error!("{} check(s) failed; first: {}", failures.len(), first)),
    }
}

fn report_ok(message: &str) {
    println!("{} {}", style("ok").green().bold(), message);
}

fn report_failed(message: &str) {
    println!("{} {}", style("failed").red().bold(), message);
}
