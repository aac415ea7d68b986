//! Help command implementation for photoperiod.
//!
//! Dispatches to the per-command help screens, or shows the command list.

use anyhow::Result;

/// Show brief usage for a command (used for error messages)
pub fn show_command_usage(command: &str) {
    match command {
        "status" | "st" => log_block_start!("Usage: photoperiod status [--json] [--follow]"),
        "grid" | "gr" => log_block_start!("Usage: photoperiod grid [--json] [--days <n>]"),
        "get" | "g" => log_block_start!("Usage: photoperiod get [--json] <field> [<field>...]"),
        "set" | "s" => log_block_start!("Usage: photoperiod set <field>=<value> [<field>=<value>...]"),
        "export" | "e" => log_block_start!("Usage: photoperiod export [<file>]"),
        "import" | "i" => log_block_start!("Usage: photoperiod import <file>"),
        "simulate" | "S" => log_block_start!(
            "Usage: photoperiod simulate <start> <end> [<multiplier> | --fast-forward] [--log <file>]"
        ),
        _ => log_block_start!("Usage: photoperiod [OPTIONS] [COMMAND]"),
    }
}

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("status") | Some("st") => super::status::display_help(),
        Some("grid") | Some("gr") => super::grid::display_help(),
        Some("get") | Some("g") => super::get::display_help(),
        Some("set") | Some("s") => super::set::display_help(),
        Some("export") | Some("e") => super::export::display_help(),
        Some("import") | Some("i") => super::import::display_help(),
        Some("simulate") | Some("S") => super::simulate::display_help(),
        Some("help") | Some("h") => display_help_help(),
        Some(unknown) => {
            log_version!();
            log_pipe!();
            log_warning!("Unknown command: {}", unknown);
            log_end!();
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("status, st              Show the current phase (--follow to keep running)");
    log_indented!("grid, gr                Show the light/dark calendar grid");
    log_indented!("get, g <field>          Read configuration field(s)");
    log_indented!("set, s <field>=<value>  Update configuration field(s)");
    log_indented!("export, e [file]        Write the cycle settings as JSON");
    log_indented!("import, i <file>        Read cycle settings from JSON");
    log_indented!("simulate, S <start> <end>  Run the live view on a simulated clock");
    log_indented!("help, h [COMMAND]       Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'photoperiod help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'photoperiod --help' to see all options and general usage.");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: photoperiod help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("photoperiod help");
    log_indented!("photoperiod help grid");
    log_end!();
}
