//! Command-line argument parsing and processing.
//!
//! Global flags (`--config`, `--debug`, `--help`, `--version`) may appear
//! anywhere on the command line. The first remaining word selects the command;
//! everything after it belongs to that command. With no command at all the
//! live status view runs.

/// A command together with its own arguments.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Current phase, once or continuously
    Status { json: bool, follow: bool },
    /// Calendar grid, optionally overriding the number of days
    Grid { json: bool, days: Option<u32> },
    /// Read configuration fields
    Get { fields: Vec<String>, json: bool },
    /// Update configuration fields
    Set { fields: Vec<(String, String)> },
    /// Write the cycle record as JSON to a file or stdout
    Export { path: Option<String> },
    /// Read a cycle record from a JSON file
    Import { path: String },
    /// Run the live view on a simulated clock
    Simulate {
        start_time: String,
        end_time: String,
        multiplier: f64,
        log_file: Option<String>,
    },
    /// Help for one command, or the command list
    Help { command: Option<String> },
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run a command with these global settings
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        command: Command,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show usage after an argument error; the command name picks the usage line
    ShowUsageDueToError { command: Option<String> },
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments, program name first
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut config_dir: Option<String> = None;
        let mut rest: Vec<String> = Vec::new();

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        // Pull out the global flags, keep everything else in order
        let mut i = 0;
        while i < args_vec.len() {
            let arg = &args_vec[i];
            match arg.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--config" | "-c" => {
                    if i + 1 < args_vec.len() && !args_vec[i + 1].starts_with('-') {
                        config_dir = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        log_warning!("Missing directory for --config. Usage: --config <directory>");
                        return error(None);
                    }
                }
                _ => match arg.strip_prefix("--config=") {
                    Some(dir) if !dir.is_empty() => config_dir = Some(dir.to_string()),
                    _ => rest.push(arg.clone()),
                },
            }
            i += 1;
        }

        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if display_help {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }

        let command = match rest.split_first() {
            None => Command::Status {
                json: false,
                follow: true,
            },
            Some((name, command_args)) if !name.starts_with('-') => {
                match parse_command(name, command_args) {
                    Some(command) => command,
                    None => return error(Some(name.clone())),
                }
            }
            Some((flag, _)) => {
                log_warning!("Unknown option: {}", flag);
                return error(None);
            }
        };

        ParsedArgs {
            action: CliAction::Run {
                debug_enabled,
                config_dir,
                command,
            },
        }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

fn error(command: Option<String>) -> ParsedArgs {
    ParsedArgs {
        action: CliAction::ShowUsageDueToError { command },
    }
}

/// Parse one command and its arguments; `None` after logging what is wrong.
fn parse_command(name: &str, args: &[String]) -> Option<Command> {
    match name {
        "status" | "st" => {
            let mut json = false;
            let mut follow = false;
            for arg in args {
                match arg.as_str() {
                    "--json" | "-j" => json = true,
                    "--follow" | "-f" => follow = true,
                    other => return unexpected(name, other),
                }
            }
            Some(Command::Status { json, follow })
        }

        "grid" | "gr" => {
            let mut json = false;
            let mut days = None;
            let mut i = 0;
            while i < args.len() {
                let arg = args[i].as_str();
                let value = match arg {
                    "--json" | "-j" => {
                        json = true;
                        i += 1;
                        continue;
                    }
                    "--days" | "-n" => {
                        i += 1;
                        args.get(i).map(String::as_str)
                    }
                    _ => match arg.strip_prefix("--days=") {
                        Some(value) => Some(value),
                        None => return unexpected(name, arg),
                    },
                };
                match value.and_then(|v| v.parse::<u32>().ok()).filter(|d| *d >= 1) {
                    Some(parsed) => days = Some(parsed),
                    None => {
                        log_warning!("--days needs a whole number of at least 1");
                        return None;
                    }
                }
                i += 1;
            }
            Some(Command::Grid { json, days })
        }

        "get" | "g" => {
            let mut json = false;
            let mut fields = Vec::new();
            for arg in args {
                match arg.as_str() {
                    "--json" | "-j" => json = true,
                    other if other.starts_with('-') => return unexpected(name, other),
                    other => fields.push(other.to_string()),
                }
            }
            if fields.is_empty() {
                log_warning!("Missing field name. Usage: photoperiod get <field> [<field>...]");
                return None;
            }
            Some(Command::Get { fields, json })
        }

        "set" | "s" => {
            // Accepts `field=value` and `field value`, freely mixed
            let mut fields = Vec::new();
            let mut i = 0;
            while i < args.len() {
                let arg = &args[i];
                if let Some((field, value)) = arg.split_once('=') {
                    fields.push((field.to_string(), value.to_string()));
                } else if let Some(value) = args.get(i + 1) {
                    fields.push((arg.clone(), value.clone()));
                    i += 1;
                } else {
                    log_warning!("Missing value for '{}'", arg);
                    return None;
                }
                i += 1;
            }
            if fields.is_empty() || fields.iter().any(|(field, _)| field.is_empty()) {
                log_warning!("Missing field or value. Usage: photoperiod set <field>=<value>");
                log_warning!("Example: photoperiod set hoursLight=16 hoursDark=8");
                return None;
            }
            Some(Command::Set { fields })
        }

        "export" | "e" => match args {
            [] => Some(Command::Export { path: None }),
            [path] if !path.starts_with('-') => Some(Command::Export {
                path: Some(path.clone()),
            }),
            [path] => unexpected(name, path),
            [_, extra, ..] => unexpected(name, extra),
        },

        "import" | "i" => match args {
            [path] if !path.starts_with('-') => Some(Command::Import { path: path.clone() }),
            [] => {
                log_warning!("Missing file. Usage: photoperiod import <file>");
                None
            }
            [path] => unexpected(name, path),
            [_, extra, ..] => unexpected(name, extra),
        },

        "simulate" | "S" => parse_simulate(args),

        "help" | "h" => match args {
            [] => Some(Command::Help { command: None }),
            [command] => Some(Command::Help {
                command: Some(command.clone()),
            }),
            [_, extra, ..] => unexpected(name, extra),
        },

        _ => {
            log_warning!("Unknown command: {}", name);
            None
        }
    }
}

/// `simulate <start> <end> [multiplier] [--fast-forward] [--log <file>]`
fn parse_simulate(args: &[String]) -> Option<Command> {
    let mut positional = Vec::new();
    let mut fast_forward = false;
    let mut log_file = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--fast-forward" | "-f" => fast_forward = true,
            "--log" | "-l" => match args.get(i + 1) {
                Some(file) if !file.starts_with('-') => {
                    log_file = Some(file.clone());
                    i += 1;
                }
                _ => {
                    log_warning!("Missing file for --log. Usage: --log <file>");
                    return None;
                }
            },
            other if other.starts_with('-') => return unexpected("simulate", other),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let (start_time, end_time, multiplier) = match positional.as_slice() {
        [start, end] => (start.clone(), end.clone(), 0.0),
        [start, end, multiplier] => match multiplier.parse::<f64>() {
            Ok(m) if m.is_finite() && m > 0.0 => (start.clone(), end.clone(), m),
            _ => {
                log_warning!("Invalid multiplier: {}. Must be a positive number.", multiplier);
                return None;
            }
        },
        _ => {
            log_warning!(
                "Usage: photoperiod simulate <start> <end> [multiplier | --fast-forward] [--log <file>]"
            );
            return None;
        }
    };

    if fast_forward && multiplier != 0.0 {
        log_warning!("Use either a multiplier or --fast-forward, not both");
        return None;
    }

    Some(Command::Simulate {
        start_time,
        end_time,
        multiplier: if fast_forward {
            crate::commands::simulate::FAST_FORWARD
        } else {
            multiplier
        },
        log_file,
    })
}

fn unexpected(command: &str, arg: &str) -> Option<Command> {
    log_warning!("Unexpected argument for {}: {}", command, arg);
    None
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("photoperiod [OPTIONS] [COMMAND]");
    log_indented!("Without a command, follows the current phase live");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("status, st             Show the current phase [--json] [--follow]");
    log_indented!("grid, gr               Show the calendar grid [--json] [--days <n>]");
    log_indented!("get, g <field>         Read configuration field(s)");
    log_indented!("set, s <field>=<value> Update configuration field(s)");
    log_indented!("export, e [file]       Write the cycle settings as JSON");
    log_indented!("import, i <file>       Read cycle settings from JSON");
    log_indented!("simulate, S <start> <end> [multiplier | --fast-forward]");
    log_indented!("                       Run the live view on a simulated clock");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(command: Command) -> CliAction {
        CliAction::Run {
            debug_enabled: false,
            config_dir: None,
            command,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_no_args_follows_status() {
        let parsed = ParsedArgs::parse(vec!["photoperiod"]);
        assert_eq!(
            parsed.action,
            run(Command::Status {
                json: false,
                follow: true
            })
        );
    }

    #[test]
    fn test_parse_debug_and_config_anywhere() {
        let parsed = ParsedArgs::parse(vec!["photoperiod", "status", "-d", "--config", "/tmp/pp"]);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                debug_enabled: true,
                config_dir: Some("/tmp/pp".to_string()),
                command: Command::Status {
                    json: false,
                    follow: false
                },
            }
        );
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(ParsedArgs::parse(vec!["photoperiod", "-h"]).action, CliAction::ShowHelp);
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "grid", "--help"]).action,
            CliAction::ShowHelp
        );
        // Version takes precedence
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "--help", "-V"]).action,
            CliAction::ShowVersion
        );
    }

    #[test]
    fn test_parse_unknown_option_and_command() {
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "--unknown"]).action,
            CliAction::ShowUsageDueToError { command: None }
        );
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "sunrise"]).action,
            CliAction::ShowUsageDueToError {
                command: Some("sunrise".to_string())
            }
        );
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "status", "--loud"]).action,
            CliAction::ShowUsageDueToError {
                command: Some("status".to_string())
            }
        );
    }

    #[test]
    fn test_parse_status_flags() {
        let parsed = ParsedArgs::parse(vec!["photoperiod", "st", "-j", "--follow"]);
        assert_eq!(
            parsed.action,
            run(Command::Status {
                json: true,
                follow: true
            })
        );
    }

    #[test]
    fn test_parse_grid_days() {
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "grid", "--days", "14", "--json"]).action,
            run(Command::Grid {
                json: true,
                days: Some(14)
            })
        );
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "grid", "--days=3"]).action,
            run(Command::Grid {
                json: false,
                days: Some(3)
            })
        );
        assert!(matches!(
            ParsedArgs::parse(vec!["photoperiod", "grid", "--days", "0"]).action,
            CliAction::ShowUsageDueToError { .. }
        ));
        assert!(matches!(
            ParsedArgs::parse(vec!["photoperiod", "grid", "--days"]).action,
            CliAction::ShowUsageDueToError { .. }
        ));
    }

    #[test]
    fn test_parse_get() {
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "get", "--json", "hoursLight", "hoursDark"]).action,
            run(Command::Get {
                fields: strings(&["hoursLight", "hoursDark"]),
                json: true
            })
        );
        assert!(matches!(
            ParsedArgs::parse(vec!["photoperiod", "get"]).action,
            CliAction::ShowUsageDueToError { .. }
        ));
    }

    #[test]
    fn test_parse_set_mixed_syntax() {
        let parsed = ParsedArgs::parse(vec![
            "photoperiod",
            "set",
            "hoursLight=16",
            "hoursDark",
            "8",
            "startDate=2024-01-01T06:00",
        ]);
        assert_eq!(
            parsed.action,
            run(Command::Set {
                fields: vec![
                    ("hoursLight".to_string(), "16".to_string()),
                    ("hoursDark".to_string(), "8".to_string()),
                    ("startDate".to_string(), "2024-01-01T06:00".to_string()),
                ]
            })
        );
    }

    #[test]
    fn test_parse_set_missing_value() {
        assert!(matches!(
            ParsedArgs::parse(vec!["photoperiod", "set", "hoursLight"]).action,
            CliAction::ShowUsageDueToError { .. }
        ));
        assert!(matches!(
            ParsedArgs::parse(vec!["photoperiod", "set"]).action,
            CliAction::ShowUsageDueToError { .. }
        ));
        assert!(matches!(
            ParsedArgs::parse(vec!["photoperiod", "set", "=5"]).action,
            CliAction::ShowUsageDueToError { .. }
        ));
    }

    #[test]
    fn test_parse_export_and_import() {
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "export"]).action,
            run(Command::Export { path: None })
        );
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "export", "out.json"]).action,
            run(Command::Export {
                path: Some("out.json".to_string())
            })
        );
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "import", "in.json"]).action,
            run(Command::Import {
                path: "in.json".to_string()
            })
        );
        assert!(matches!(
            ParsedArgs::parse(vec!["photoperiod", "import"]).action,
            CliAction::ShowUsageDueToError { .. }
        ));
    }

    #[test]
    fn test_parse_simulate() {
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "simulate", "2024-01-01", "2024-01-02", "60"]).action,
            run(Command::Simulate {
                start_time: "2024-01-01".to_string(),
                end_time: "2024-01-02".to_string(),
                multiplier: 60.0,
                log_file: None,
            })
        );
        assert_eq!(
            ParsedArgs::parse(vec![
                "photoperiod",
                "-d",
                "S",
                "2024-01-01 06:00",
                "2024-01-09",
                "--fast-forward",
                "--log",
                "sim.log"
            ])
            .action,
            CliAction::Run {
                debug_enabled: true,
                config_dir: None,
                command: Command::Simulate {
                    start_time: "2024-01-01 06:00".to_string(),
                    end_time: "2024-01-09".to_string(),
                    multiplier: -1.0,
                    log_file: Some("sim.log".to_string()),
                },
            }
        );
    }

    #[test]
    fn test_parse_simulate_errors() {
        for args in [
            vec!["photoperiod", "simulate", "2024-01-01"],
            vec!["photoperiod", "simulate", "2024-01-01", "2024-01-02", "fast"],
            vec!["photoperiod", "simulate", "2024-01-01", "2024-01-02", "-5"],
            vec!["photoperiod", "simulate", "2024-01-01", "2024-01-02", "60", "-f"],
        ] {
            assert!(matches!(
                ParsedArgs::parse(args).action,
                CliAction::ShowUsageDueToError { .. }
            ));
        }
    }

    #[test]
    fn test_parse_help_command() {
        assert_eq!(
            ParsedArgs::parse(vec!["photoperiod", "help", "grid"]).action,
            run(Command::Help {
                command: Some("grid".to_string())
            })
        );
    }
}
