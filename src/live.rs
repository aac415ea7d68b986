//! The live status view: the one periodic task in photoperiod.
//!
//! Every `refreshInterval` seconds the view samples the global time source,
//! recomputes [`CycleStatus`] and reports what changed. The grid is rebuilt
//! only when the cycle configuration changes (after a reload); between
//! reloads only the highlighted cell moves.
//!
//! The view holds a [`TickerGuard`] for as long as it runs. The guard is
//! released when [`LiveView::run`] returns, whether it stopped on a signal,
//! reached the end of a simulation or failed.
//!
//! ```no_run
//! use photoperiod::config::Config;
//! use photoperiod::live::LiveView;
//! use photoperiod::signals::setup_signal_handler;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let signal_state = setup_signal_handler(false)?;
//! LiveView::new(config, signal_state, false)?.run()?;
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::constants::SIGNAL_POLL_INTERVAL_MS;
use crate::cycle::{CalendarCell, CalendarGrid, CycleConfig, CycleStatus};
use crate::signals::{SignalMessage, SignalState};
use crate::time_source::{self, TimeSource};

static ACTIVE_TICKERS: AtomicUsize = AtomicUsize::new(0);

/// Number of live views currently holding a ticker.
pub fn active_tickers() -> usize {
    ACTIVE_TICKERS.load(Ordering::SeqCst)
}

/// Scoped ownership of the periodic refresh.
///
/// Acquired when a live view starts ticking and released on drop, so every
/// exit path out of the loop, including `?`, stops the ticker.
pub struct TickerGuard {
    debug_enabled: bool,
}

impl TickerGuard {
    pub fn acquire(debug_enabled: bool) -> Self {
        ACTIVE_TICKERS.fetch_add(1, Ordering::SeqCst);
        if debug_enabled {
            log_pipe!();
            log_debug!("Live view ticker started");
        }
        Self { debug_enabled }
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        ACTIVE_TICKERS.fetch_sub(1, Ordering::SeqCst);
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Live view ticker released");
        }
    }
}

/// What one tick observed.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub status: CycleStatus,
    /// The grid cell containing "now", when "now" is inside the grid.
    pub cell: Option<CalendarCell>,
    pub first_tick: bool,
    pub phase_changed: bool,
    pub day_changed: bool,
    pub grid_rebuilt: bool,
}

impl TickReport {
    /// Whether this tick is worth a line of output outside debug mode.
    pub fn is_notable(&self) -> bool {
        self.first_tick || self.phase_changed || self.day_changed || self.grid_rebuilt
    }
}

pub struct LiveView {
    config: Config,
    cycle: CycleConfig,
    grid: CalendarGrid,
    /// Cycle the current grid was built from.
    grid_cycle: CycleConfig,
    last_status: Option<CycleStatus>,
    signal_state: SignalState,
    debug_enabled: bool,
    json: bool,
}

impl LiveView {
    /// Build a live view from validated settings.
    pub fn new(config: Config, signal_state: SignalState, debug_enabled: bool) -> Result<Self> {
        let cycle = config.cycle()?;
        Ok(Self {
            grid: CalendarGrid::build(&cycle),
            grid_cycle: cycle,
            cycle,
            config,
            last_status: None,
            signal_state,
            debug_enabled,
            json: false,
        })
    }

    /// Emit one JSON status object per reported tick instead of log lines.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn cycle(&self) -> &CycleConfig {
        &self.cycle
    }

    pub fn grid(&self) -> &CalendarGrid {
        &self.grid
    }

    /// Recompute the status for `now` and compare it with the previous tick.
    pub fn tick(&mut self, now: NaiveDateTime) -> TickReport {
        let grid_rebuilt = self.grid_cycle != self.cycle;
        if grid_rebuilt {
            self.grid = CalendarGrid::build(&self.cycle);
            self.grid_cycle = self.cycle;
        }

        let status = CycleStatus::at(&self.cycle, now);
        let (first_tick, phase_changed, day_changed) = match &self.last_status {
            None => (true, false, false),
            Some(previous) => (
                false,
                previous.phase != status.phase,
                previous.now.date() != status.now.date(),
            ),
        };

        let report = TickReport {
            cell: self.grid.cell_at(now).copied(),
            status: status.clone(),
            first_tick,
            phase_changed,
            day_changed,
            grid_rebuilt,
        };

        self.last_status = Some(status);
        report
    }

    /// Apply new settings. Returns `true` when the cycle itself changed.
    ///
    /// Invalid settings are rejected and the previous ones stay active.
    pub fn apply_config(&mut self, config: Config) -> Result<bool> {
        let cycle = config.cycle()?;
        let changed = cycle != self.cycle;
        self.config = config;
        self.cycle = cycle;
        Ok(changed)
    }

    fn reload(&mut self) {
        let result = Config::load().and_then(|config| self.apply_config(config));
        match result {
            Ok(true) => {
                log_pipe!();
                log_info!("Configuration reloaded");
                self.config.log_config();
            }
            Ok(false) => {
                if self.debug_enabled {
                    log_pipe!();
                    log_debug!("Configuration reloaded, cycle unchanged");
                }
            }
            Err(e) => {
                log_pipe!();
                log_error!("Failed to reload config: {e}");
                log_indented!("Keeping the previous settings");
            }
        }
    }

    /// Run until a shutdown signal arrives or a simulation ends.
    pub fn run(mut self) -> Result<()> {
        let _ticker = TickerGuard::acquire(self.debug_enabled);

        let report = self.tick(time_source::now());
        self.report(&report)?;

        while self.signal_state.is_running() && !time_source::simulation_ended() {
            let interval = Duration::from_secs(self.config.refresh_interval());

            match self.wait(interval) {
                Some(SignalMessage::Shutdown) => break,
                Some(SignalMessage::Reload) => self.reload(),
                None => {}
            }

            if !self.signal_state.is_running() {
                break;
            }

            let report = self.tick(time_source::now());
            self.report(&report)?;
        }

        if !self.json {
            log_block_start!("Live view stopped");
            log_end!();
        }

        Ok(())
    }

    /// Sleep for `interval` on the global time source, returning early on a signal.
    fn wait(&self, interval: Duration) -> Option<SignalMessage> {
        let receiver = &self.signal_state.signal_receiver;
        if time_source::is_simulated() {
            return wait_simulated(time_source::source(), receiver, interval);
        }

        let poll = Duration::from_millis(SIGNAL_POLL_INTERVAL_MS);
        let start = Instant::now();
        loop {
            let remaining = interval.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return None;
            }
            match receiver.recv_timeout(remaining.min(poll)) {
                Ok(message) => return Some(message),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    std::thread::sleep(remaining.min(poll));
                }
            }
        }
    }

    fn report(&self, report: &TickReport) -> Result<()> {
        if !report.is_notable() && !self.debug_enabled {
            return Ok(());
        }

        if self.json {
            crate::logger::write_output(&format!("{}\n", serde_json::to_string(&report.status)?));
            return Ok(());
        }

        if report.first_tick {
            crate::commands::status::display_status(&report.status, &self.cycle);
        } else {
            log_block_start!("{}", crate::commands::status::summary_line(&report.status));
            if report.phase_changed {
                log_indented!("Phase changed to {}", report.status.phase.display_name());
            }
        }

        if self.debug_enabled
            && let Some(cell) = report.cell
        {
            log_debug!(
                "Grid cell day {} hour {:02}: {}",
                cell.day_index,
                cell.hour_index,
                if cell.is_light { "light" } else { "dark" }
            );
        }

        Ok(())
    }
}

/// Sleep `interval` on a simulated clock, one [`TimeSource::poll_step`] at a
/// time, checking for a signal before each step.
///
/// The clock only ever advances on this thread. A wait cut short by a signal
/// leaves nothing sleeping behind it.
fn wait_simulated(
    source: &dyn TimeSource,
    receiver: &Receiver<SignalMessage>,
    interval: Duration,
) -> Option<SignalMessage> {
    let step = source.poll_step().max(Duration::from_millis(1));
    let mut remaining = interval;

    loop {
        if let Ok(message) = receiver.try_recv() {
            return Some(message);
        }
        if remaining.is_zero() || source.is_ended() {
            return None;
        }
        let chunk = remaining.min(step);
        source.sleep(chunk);
        remaining -= chunk;
    }
}
