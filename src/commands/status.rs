//! Status command - report the phase active now.
//!
//! One-shot mode computes a single [`CycleStatus`] from the global time source.
//! Follow mode hands over to the [`LiveView`], which refreshes the status every
//! `refreshInterval` seconds until interrupted.

use anyhow::Result;

use crate::config::{self, Config};
use crate::cycle::{CycleConfig, CycleStatus};
use crate::live::LiveView;
use crate::signals::setup_signal_handler;
use crate::time_source;

/// Handle the status command.
///
/// # Arguments
/// * `json` - Output in JSON format
/// * `follow` - Keep running and refresh the status periodically
/// * `debug_enabled` - Report every tick and live view internals
pub fn handle_status_command(json: bool, follow: bool, debug_enabled: bool) -> Result<()> {
    let config = Config::load()?;

    if follow {
        return run_follow_mode(config, json, debug_enabled);
    }

    let cycle = config.cycle()?;
    let status = CycleStatus::at(&cycle, time_source::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        log_version!();
        display_status(&status, &cycle);
        log_end!();
    }

    Ok(())
}

/// Run the live view on the current time source until stopped.
pub(crate) fn run_follow_mode(config: Config, json: bool, debug_enabled: bool) -> Result<()> {
    let signal_state = setup_signal_handler(debug_enabled)?;

    if let Err(e) = config::start_config_watcher(signal_state.signal_sender.clone(), debug_enabled)
        && debug_enabled
    {
        log_pipe!();
        log_warning!("Config file watching unavailable: {}", e);
        log_indented!("Hot config reload disabled, use SIGUSR2 for manual reload");
    }

    if !json {
        if !time_source::is_simulated() {
            log_version!();
        }
        config.log_config();
        log_block_start!("Following the cycle (press Ctrl+C to stop)...");
    }

    LiveView::new(config, signal_state, debug_enabled)?
        .with_json(json)
        .run()
}

/// Print the full status block.
pub fn display_status(status: &CycleStatus, cycle: &CycleConfig) {
    log_block_start!(
        "Current phase: {} {}",
        status.phase.symbol(),
        status.phase.display_name()
    );
    log_indented!("Now: {}", status.now.format(crate::constants::DISPLAY_DATE_FORMAT));
    log_indented!(
        "Cycle: {}h light / {}h dark ({}h)",
        cycle.light_hours,
        cycle.dark_hours,
        cycle.light_hours + cycle.dark_hours
    );

    if !status.started {
        log_indented!(
            "Starts in {} ({})",
            format_hours_as_duration(-status.elapsed_hours),
            cycle.start.format(crate::constants::DISPLAY_DATE_FORMAT)
        );
    }

    match &status.next_transition {
        Some(event) => log_indented!(
            "Next: {} at {} (in {})",
            event.next_phase.display_name(),
            event.instant.format(crate::constants::DISPLAY_DATE_FORMAT),
            format_hours_as_duration(event.hours_remaining)
        ),
        None => log_indented!("Next: none, the cycle never changes phase"),
    }

    log_indented!("Days elapsed: {}", status.days_elapsed);
    log_indented!("Cycles completed: {}", status.super_cycle_count);
    log_indented!("Energy balance: {:+.1}h", status.energy_balance);
}

/// One-line summary used by the live view between full reports.
pub fn summary_line(status: &CycleStatus) -> String {
    let head = format!(
        "{} {} | day {} | cycle {}",
        status.phase.symbol(),
        status.phase.display_name(),
        status.days_elapsed,
        status.super_cycle_count
    );

    match &status.next_transition {
        Some(event) => format!(
            "{head} | {} in {}",
            event.next_phase.display_name().to_lowercase(),
            format_hours_as_duration(event.hours_remaining)
        ),
        None => format!("{head} | no transitions"),
    }
}

fn format_hours_as_duration(hours: f64) -> String {
    format_duration((hours.max(0.0) * 3600.0).round() as u64)
}

/// Format time duration consistently across all displays.
pub fn format_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        if hours > 0 {
            format!("{}d{}h", days, hours)
        } else {
            format!("{}d", days)
        }
    } else if hours > 0 {
        if minutes > 0 {
            format!("{}h{}m", hours, minutes)
        } else {
            format!("{}h", hours)
        }
    } else if minutes > 0 {
        if seconds > 30 {
            // Round up if more than 30 seconds
            format!("{}m", minutes + 1)
        } else {
            format!("{}m", minutes)
        }
    } else {
        format!("{}s", seconds)
    }
}

/// Display help for the status command.
pub fn display_help() {
    log_version!();
    log_block_start!("status - Display the current phase");
    log_block_start!("Usage: photoperiod status [--json] [--follow]");
    log_block_start!("Description:");
    log_indented!("Shows the active phase, the next transition, days and cycles");
    log_indented!("elapsed since the start date, and the energy balance against");
    log_indented!("an even 12/12 split.");
    log_block_start!("Options:");
    log_indented!("-j, --json     Output the status in JSON format");
    log_indented!("-f, --follow   Keep running and refresh every refreshInterval seconds");
    log_block_start!("Examples:");
    log_indented!("# Show the status once");
    log_indented!("photoperiod status");
    log_pipe!();
    log_indented!("# Follow phase changes as JSON lines");
    log_indented!("photoperiod status --json --follow");
    log_end!();
}
