// framescan-cli/src/main.rs
//
// Entry point for the `framescan` binary.
//
// Responsibilities include:
// - Parsing user-provided arguments.
// - Setting up logging on stderr.
// - Dispatching to the `inspect` or `check` command.
// - Mapping outcomes to process exit codes: 0 when every video was
//   inspected, 1 on any failure, 2 for findings with `--fail-on-findings`.

use clap::Parser;
use framescan_cli::commands::check::run_check;
use framescan_cli::commands::inspect::{EXIT_FAILURE, run_inspect};
use framescan_cli::output::print_error;
use framescan_cli::{Cli, Commands, logging};
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let code = match cli.command {
        Commands::Inspect(args) => {
            let interactive = console::Term::stderr().is_term();
            match run_inspect(&args, interactive) {
                Ok(status) => status.exit_code(args.fail_on_findings),
                Err(e) => {
                    print_error(&e.to_string());
                    EXIT_FAILURE
                }
            }
        }
        Commands::Check(args) => match run_check(&args) {
            Ok(()) => 0,
            Err(e) => {
                print_error(&e.to_string());
                EXIT_FAILURE
            }
        },
    };

    process::exit(code);
}
