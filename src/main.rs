//! Main application entry point.
//!
//! Parses the command line, applies the global options and hands over to the
//! matching command handler in [`photoperiod::commands`]. Errors are reported
//! in the logger's box style and turn into a non-zero exit status.

use photoperiod::args::{self, CliAction, Command, ParsedArgs};
use photoperiod::commands;
use photoperiod::config;
use photoperiod::constants::EXIT_FAILURE;
use photoperiod::{log_end, log_error_exit};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let result = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowUsageDueToError { command } => {
            commands::help::show_command_usage(command.as_deref().unwrap_or_default());
            log_end!();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            command,
        } => config::set_config_dir(config_dir).and_then(|_| run(command, debug_enabled)),
    };

    if let Err(e) = result {
        log_error_exit!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn run(command: Command, debug_enabled: bool) -> anyhow::Result<()> {
    match command {
        Command::Status { json, follow } => {
            commands::status::handle_status_command(json, follow, debug_enabled)
        }
        Command::Grid { json, days } => commands::grid::handle_grid_command(json, days),
        Command::Get { fields, json } => commands::get::handle_get_command(&fields, json),
        Command::Set { fields } => commands::set::handle_set_command(&fields),
        Command::Export { path } => commands::export::handle_export_command(path.as_deref()),
        Command::Import { path } => commands::import::handle_import_command(&path),
        Command::Simulate {
            start_time,
            end_time,
            multiplier,
            log_file,
        } => commands::simulate::handle_simulate_command(
            &start_time,
            &end_time,
            multiplier,
            log_file,
            debug_enabled,
        ),
        Command::Help { command } => commands::help::run_help_command(command.as_deref()),
    }
}
