mod args;
mod cli;
mod commands;
mod config;
mod module;
mod output;
mod resource;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use commands::Task;
use declarative::ApplyContext;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Some((module, args_file)) = module::invoked_as(std::env::args_os()) {
        init_logging(0, false);
        return output::finish(module::run_invoked(module, args_file.as_deref()));
    }

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let settings: config::ApiSettings = cli.api.into();
    let outcome = match cli.command {
        Command::Role(args) => {
            let ctx = ApplyContext::new(args.check);
            commands::execute(settings, &Task::Role(args.into()), &ctx)
        }
        Command::Group(args) => {
            let ctx = ApplyContext::new(args.check);
            commands::execute(settings, &Task::Group(args.into()), &ctx)
        }
        Command::RoleInfo { name } => {
            commands::execute(settings, &Task::RoleInfo(name), &ApplyContext::default())
        }
        Command::GroupInfo { name } => {
            commands::execute(settings, &Task::GroupInfo(name), &ApplyContext::default())
        }
        Command::Module { module, args_file } => module::run(module, &args_file),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "pvectl", &mut io::stdout());
            return ExitCode::SUCCESS;
        }
    };

    output::finish(outcome)
}

/// Logs go to stderr; stdout carries the JSON result
fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();
}
