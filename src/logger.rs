//! Structured terminal output with box-drawing decoration.
//!
//! Every human-facing line photoperiod prints goes through the macros below so
//! that commands share one visual language:
//!
//! ```text
//! ┏ photoperiod v0.3.0 ━━╸
//! ┃
//! ┣ Loaded settings
//! ┃   Cycle: 12h light / 12h dark
//! ┣[WARNING] something looks off
//! ╹
//! ```
//!
//! ## Conventions
//!
//! - `log_block_start!` opens a new conceptual block (blank pipe, then `┣ message`).
//! - `log_decorated!` continues a block with `┣ message`.
//! - `log_indented!` prints nested detail as `┃   message`.
//! - `log_pipe!` inserts a single `┃` spacer, typically before a levelled message.
//! - `log_version!` / `log_end!` open and close a command's output.
//! - `log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`
//!   carry a coloured `[LEVEL]` tag.
//! - `log_error_exit!` terminates the flow with `┗[ERROR] message`.
//!
//! Output can be silenced with [`Log::set_enabled`], which tests use to keep
//! their output clean. When the global time source is simulated every line is
//! prefixed with the simulated wall-clock time.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Set once when `simulate --log` redirects output to a file
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Global switches for the logging macros.
pub struct Log;

impl Log {
    /// Enable or disable all macro output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Redirect all subsequent output to `file_path` until the guard is dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;
            while let Ok(LogMessage::Formatted(text)) = rx.recv() {
                file.write_all(text.as_bytes())?;
            }
            file.flush()?;
            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// `[HH:MM:SS] ` while running on simulated time, empty otherwise.
    pub fn timestamp_prefix() -> String {
        if crate::time_source::is_initialized() && crate::time_source::is_simulated() {
            format!("[{}] ", crate::time_source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Keeps the file logger thread alive; flushes and joins it on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Route a fully formatted chunk to stdout or the active log file.
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Format `message` behind `lead` (and the optional simulated timestamp) and emit it.
#[doc(hidden)]
pub fn emit(lead: &str, message: &str) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::timestamp_prefix();
    write_output(&format!("{prefix}{lead}{message}\n"));
}

/// Like [`emit`], preceded by an empty pipe line.
#[doc(hidden)]
pub fn emit_spaced(lead: &str, message: &str) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::timestamp_prefix();
    write_output(&format!("{prefix}┃\n{prefix}{lead}{message}\n"));
}

// # Logging Macros
//
// Each macro accepts either a format string with arguments or any `Display`
// expression.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_with {
    ($emit:ident, $lead:expr, $fmt:literal $($arg:tt)*) => {
        $crate::logger::$emit($lead, &format!($fmt $($arg)*))
    };
    ($emit:ident, $lead:expr, $expr:expr) => {
        $crate::logger::$emit($lead, &format!("{}", $expr))
    };
}

/// `┣ message`
#[macro_export]
macro_rules! log_decorated {
    ($($t:tt)*) => { $crate::__log_with!(emit, "┣ ", $($t)*) };
}

/// `┃   message`
#[macro_export]
macro_rules! log_indented {
    ($($t:tt)*) => { $crate::__log_with!(emit, "┃   ", $($t)*) };
}

/// A lone `┃` spacer.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit("┃", "")
    };
}

/// `┃` then `┣ message`
#[macro_export]
macro_rules! log_block_start {
    ($($t:tt)*) => { $crate::__log_with!(emit_spaced, "┣ ", $($t)*) };
}

/// `┏ photoperiod vX.Y.Z ━━╸`
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit(
            "┏ ",
            &format!("photoperiod v{} ━━╸", env!("CARGO_PKG_VERSION")),
        )
    };
}

/// `╹`
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit("╹", "")
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($t:tt)*) => { $crate::__log_with!(emit, "┣[\x1b[33mWARNING\x1b[0m] ", $($t)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($t:tt)*) => { $crate::__log_with!(emit, "┣[\x1b[31mERROR\x1b[0m] ", $($t)*) };
}

/// `┃` then `┗[ERROR] message`, closing the output.
#[macro_export]
macro_rules! log_error_exit {
    ($($t:tt)*) => { $crate::__log_with!(emit_spaced, "┗[\x1b[31mERROR\x1b[0m] ", $($t)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($t:tt)*) => { $crate::__log_with!(emit, "┣[\x1b[32mINFO\x1b[0m] ", $($t)*) };
}

#[macro_export]
macro_rules! log_debug {
    ($($t:tt)*) => { $crate::__log_with!(emit, "┣[\x1b[36mDEBUG\x1b[0m] ", $($t)*) };
}

#[macro_export]
macro_rules! log_critical {
    ($($t:tt)*) => { $crate::__log_with!(emit, "┣[\x1b[31mCRITICAL\x1b[0m] ", $($t)*) };
}
