//! `postinstall` binary entry point.
use clap::{CommandFactory as _, Parser as _};
use std::process::ExitCode;
use std::sync::Arc;

use postinstall_cli::cli::Cli;
use postinstall_cli::commands::{self, Invocation};
use postinstall_cli::error::PostinstallError;
use postinstall_cli::logging::{self, Logger};

fn main() -> ExitCode {
    let args = Cli::parse();
    if args.is_empty() {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let parsed = Invocation::parse(&args.args, args.status);
    let log_name = parsed.as_ref().map_or_else(
        |_| args.mode().command().to_string(),
        Invocation::log_name,
    );
    logging::init_subscriber(args.verbose, &log_name);
    let log = Arc::new(Logger::new(&log_name));

    let invocation = match parsed {
        Ok(invocation) => invocation,
        Err(e) => return fail(&log, &PostinstallError::from(e).into()),
    };

    let result = commands::execute(&args, &invocation, &log);
    log.print_summary();
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&log, &e),
    }
}

fn print_usage() {
    println!("{}", Cli::command().render_help());
}

fn fail(log: &Logger, err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<PostinstallError>() {
        // Already reported as the component failed.
        Some(PostinstallError::Step(_)) => {}
        Some(e) if e.shows_usage() => {
            log.error(&e.to_string());
            print_usage();
        }
        _ => log.error(&format!("{err:#}")),
    }
    ExitCode::FAILURE
}
