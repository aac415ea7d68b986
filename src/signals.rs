//! Signal handling for the live view.
//!
//! SIGINT, SIGTERM and SIGHUP stop the live view; SIGUSR2 asks it to reload
//! `photoperiod.toml`. Signals and the config watcher share one channel so
//! the live loop has a single place to poll.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{Receiver, Sender},
    thread,
};

/// Message delivered to the live loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Configuration reload (SIGUSR2 or a settings file change)
    Reload,
    /// Shutdown (SIGTERM, SIGINT, SIGHUP)
    Shutdown,
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Cleared when a shutdown signal arrives
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Cloned into the config watcher
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// A state with no OS handlers attached, driven only through `signal_sender`.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = std::sync::mpsc::channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Set up signal handling for the live view.
///
/// Spawns a background thread that forwards signals into the returned
/// state's channel.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running = state.running.clone();
    let signal_sender = state.signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            let message = match sig {
                SIGUSR2 => {
                    if debug_enabled {
                        log_pipe!();
                        log_debug!("Received SIGUSR2, reloading configuration");
                    }
                    SignalMessage::Reload
                }
                _ => {
                    running.store(false, Ordering::SeqCst);
                    SignalMessage::Shutdown
                }
            };

            if signal_sender.send(message).is_err() || message == SignalMessage::Shutdown {
                break;
            }
        }
    });

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_state_delivers_messages() {
        let state = SignalState::detached();
        assert!(state.is_running());

        state.signal_sender.send(SignalMessage::Reload).unwrap();
        assert_eq!(state.signal_receiver.try_recv(), Ok(SignalMessage::Reload));

        state.stop();
        assert!(!state.is_running());
    }
}
