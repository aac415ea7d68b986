//! File watching for hot config reloading.
//!
//! The live view starts a [`ConfigWatcher`] so edits to `photoperiod.toml`
//! (by hand, `set` or `import`) are picked up without a restart.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use super::loading::private_path;
use crate::signals::SignalMessage;

/// Debounce duration for file change events (in milliseconds).
/// Editors often write a file in several steps; a reload waits until the
/// directory has been quiet this long.
const DEBOUNCE_MS: u64 = 500;

/// Trailing-edge debounce over a burst of file events.
struct Debounce {
    window: Duration,
    last_event: Option<Instant>,
}

impl Debounce {
    fn new(window: Duration) -> Self {
        Self {
            window,
            last_event: None,
        }
    }

    fn record(&mut self, at: Instant) {
        self.last_event = Some(at);
    }

    /// Quiet time still needed before the pending burst settles.
    /// `None` when no burst is pending.
    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.last_event
            .map(|at| self.window.saturating_sub(now.saturating_duration_since(at)))
    }

    /// Whether the pending burst has settled; clears it if so.
    fn take_due(&mut self, now: Instant) -> bool {
        if self.remaining(now) == Some(Duration::ZERO) {
            self.last_event = None;
            return true;
        }
        false
    }
}

/// Configuration file watcher that monitors for changes and triggers reloads.
pub struct ConfigWatcher {
    signal_sender: Sender<SignalMessage>,
    debug_enabled: bool,
    config_path: PathBuf,
}

impl ConfigWatcher {
    pub fn new(config_path: PathBuf, signal_sender: Sender<SignalMessage>, debug_enabled: bool) -> Self {
        Self {
            signal_sender,
            debug_enabled,
            config_path,
        }
    }

    /// Start watching the settings file on a background thread.
    ///
    /// The parent directory is watched rather than the file itself, which
    /// survives editors that save by replacing the file.
    pub fn start(self) -> Result<()> {
        let Some(config_dir) = self.config_path.parent().map(Path::to_path_buf) else {
            return Ok(());
        };

        if !config_dir.is_dir() {
            if self.debug_enabled {
                log_pipe!();
                log_debug!("No configuration directory to watch for hot reload");
            }
            return Ok(());
        }

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Starting config file watcher for hot reload:");
            log_indented!("Watching: {}", private_path(&self.config_path));
        }

        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    match event.kind {
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
                            let _ = tx.send(event);
                        }
                        _ => {}
                    }
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create file watcher")?;

        watcher
            .watch(&config_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {}", private_path(&config_dir)))?;

        let ConfigWatcher {
            signal_sender,
            debug_enabled,
            config_path,
        } = self;

        thread::spawn(move || {
            // The watcher stops when dropped
            let _watcher = watcher;
            let mut debounce = Debounce::new(Duration::from_millis(DEBOUNCE_MS));

            loop {
                let event = match debounce.remaining(Instant::now()) {
                    None => match rx.recv() {
                        Ok(event) => Some(event),
                        Err(_) => break,
                    },
                    Some(quiet) => match rx.recv_timeout(quiet) {
                        Ok(event) => Some(event),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    },
                };

                if let Some(event) = event
                    && event
                        .paths
                        .iter()
                        .any(|path| affects_config(path, &config_path))
                {
                    debounce.record(Instant::now());
                }

                if !debounce.take_due(Instant::now()) {
                    continue;
                }

                if debug_enabled {
                    log_pipe!();
                    log_info!("Configuration file change detected");
                }

                if signal_sender.send(SignalMessage::Reload).is_err() {
                    // Receiver gone, the live view has stopped
                    break;
                }
            }
        });

        Ok(())
    }
}

/// Whether an event on `event_path` concerns the settings file, including
/// editor temp files written next to it (`photoperiod.toml~`, `.swp`, ...).
fn affects_config(event_path: &Path, config_path: &Path) -> bool {
    if event_path == config_path {
        return true;
    }
    if event_path.parent() != config_path.parent() {
        return false;
    }

    let event_name = event_path.file_name().and_then(|n| n.to_str());
    let config_name = config_path.file_name().and_then(|n| n.to_str());
    match (event_name, config_name) {
        (Some(event_name), Some(config_name)) => {
            event_name.trim_start_matches('.').starts_with(config_name)
        }
        _ => false,
    }
}

/// Start the configuration file watcher for the active settings file.
pub fn start_config_watcher(
    signal_sender: Sender<SignalMessage>,
    debug_enabled: bool,
) -> Result<()> {
    let config_path = super::get_config_path()?;
    ConfigWatcher::new(config_path, signal_sender, debug_enabled).start()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affects_config_matches_file_and_temp_files() {
        let config = Path::new("/tmp/conf/photoperiod.toml");
        assert!(affects_config(config, config));
        assert!(affects_config(Path::new("/tmp/conf/photoperiod.toml~"), config));
        assert!(affects_config(Path::new("/tmp/conf/.photoperiod.toml.swp"), config));
        assert!(!affects_config(Path::new("/tmp/conf/other.toml"), config));
        assert!(!affects_config(Path::new("/tmp/elsewhere/photoperiod.toml"), config));
    }

    #[test]
    fn test_debounce_fires_after_the_last_event() {
        let window = Duration::from_millis(DEBOUNCE_MS);
        let mut debounce = Debounce::new(window);
        let t0 = Instant::now();
        assert_eq!(debounce.remaining(t0), None);
        assert!(!debounce.take_due(t0));

        // A burst of writes 300ms apart keeps pushing the reload back
        debounce.record(t0);
        let second = t0 + Duration::from_millis(300);
        assert!(!debounce.take_due(second));
        debounce.record(second);
        let third = second + Duration::from_millis(300);
        assert!(!debounce.take_due(third));
        debounce.record(third);

        assert_eq!(
            debounce.remaining(third + Duration::from_millis(200)),
            Some(Duration::from_millis(300))
        );
        assert!(!debounce.take_due(third + Duration::from_millis(499)));
        assert!(debounce.take_due(third + window));

        // Settled bursts fire once
        assert!(!debounce.take_due(third + window * 2));
        assert_eq!(debounce.remaining(third + window * 2), None);
    }
}
