//! Structured logging system with visual formatting.
//!
//! This module provides the box-drawing log output used by every duskcam
//! command. It includes different log levels and special formatting macros
//! for building readable, structured output with Unicode box drawing characters.
//!
//! The logger supports runtime enable/disable functionality for quiet operation
//! (`run --json`, tests), and can route all output to a file when a log path
//! is configured, which is how unattended cron/systemd invocations keep a
//! capture history.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

// Use an AtomicBool instead of thread_local for thread safety
static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Channel for routing output to file when a log file is active
static LOG_CHANNEL: OnceLock<Option<Sender<LogMessage>>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Main logging interface providing structured output formatting.
///
/// ## Logging Conventions
///
/// - **`log_block_start!`**: starts a new conceptual block (phase announcements,
///   "Loaded configuration", "Capture parameters"). Prints an empty `┃` line
///   followed by `┣ message`.
/// - **`log_indented!`**: nested detail under a block, `┃   message`.
/// - **`log_pipe!`**: a lone `┃` for spacing, typically before a
///   `log_warning!`/`log_error!` that begins its own block.
/// - **`log_version!`** / **`log_end!`**: the `┏ duskcam vX.Y.Z ━━╸` header and
///   the final `╹` marker.
/// - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`**: semantic
///   messages with a colored `[LEVEL]` tag. `log_error_exit!` closes the output
///   with `┗` instead of `┣`.
pub struct Log;

impl Log {
    /// Enable or disable logging temporarily.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Start file logging to the specified path.
    ///
    /// Lines are appended so that successive cron invocations build one log.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        if let Some(parent) = std::path::Path::new(&file_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        let (tx, rx) = channel();

        // Install the channel
        LOG_CHANNEL
            .set(Some(tx.clone()))
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        // Spawn logger thread
        let handle = std::thread::spawn(move || {
            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => {
                        file.write_all(text.as_bytes())?;
                    }
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix used while a pinned or simulated clock is installed.
    ///
    /// Returns an empty string on the real clock. Public for macro access.
    pub fn get_timestamp_prefix() -> String {
        // Check this without initializing the time source
        if crate::time_source::is_initialized() && crate::time_source::is_simulated() {
            format!("[{}] ", crate::time_source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Guard for file logging that ensures clean shutdown.
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
        // LOG_CHANNEL stays set; the process exits right after the command finishes
    }
}

/// Strip ANSI color sequences (`ESC [ ... m`) so log files stay plain text.
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for ch in chars.by_ref() {
                    if ch == 'm' {
                        break;
                    }
                }
            } else {
                result.push(ch);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// Public function that routes output (needed by macros)
pub fn write_output(text: &str) {
    if let Some(Some(tx)) = LOG_CHANNEL.get()
        && tx
            .send(LogMessage::Formatted(strip_ansi_codes(text)))
            .is_ok()
    {
        return;
    }
    // No log file, or its writer already shut down
    print!("{text}");
    let _ = std::io::stdout().flush();
}

// # Logging Macros
//
// Every macro formats its message and hands it to `emit` together with the
// marker that starts the line.

const INFO_TAG: &str = "[\x1b[32mINFO\x1b[0m] ";
const DEBUG_TAG: &str = "[\x1b[32mDEBUG\x1b[0m] ";
const WARNING_TAG: &str = "[\x1b[33mWARNING\x1b[0m] ";
const ERROR_TAG: &str = "[\x1b[31mERROR\x1b[0m] ";

/// Line markers understood by [`emit`].
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `┣ ` preceded by a lone `┃` line
    Block,
    /// `┃   `
    Indented,
    Info,
    Debug,
    Warning,
    /// Warning outside any block, no box drawing
    WarningStandalone,
    Error,
    /// `┗` error preceded by a lone `┃` line
    ErrorExit,
}

impl Marker {
    fn lead(self) -> (bool, &'static str, &'static str) {
        match self {
            Marker::Block => (true, "┣ ", ""),
            Marker::Indented => (false, "┃   ", ""),
            Marker::Info => (false, "┣", INFO_TAG),
            Marker::Debug => (false, "┣", DEBUG_TAG),
            Marker::Warning => (false, "┣", WARNING_TAG),
            Marker::WarningStandalone => (false, "", WARNING_TAG),
            Marker::Error => (false, "┣", ERROR_TAG),
            Marker::ErrorExit => (true, "┗", ERROR_TAG),
        }
    }
}

/// Format one message line, repeating `prefix` on the gap line.
fn format_line(prefix: &str, marker: Marker, message: std::fmt::Arguments) -> String {
    let (gap, lead, tag) = marker.lead();
    let gap = if gap { format!("{prefix}┃\n") } else { String::new() };
    format!("{gap}{prefix}{lead}{tag}{message}\n")
}

// Public for macro access
#[doc(hidden)]
pub fn emit(marker: Marker, message: std::fmt::Arguments) {
    if Log::is_enabled() {
        write_output(&format_line(&Log::get_timestamp_prefix(), marker, message));
    }
}

/// Write a fixed line such as `┃` or `╹`, with the timestamp prefix.
#[doc(hidden)]
pub fn emit_raw(text: &str) {
    if Log::is_enabled() {
        write_output(&format!("{}{text}\n", Log::get_timestamp_prefix()));
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_with {
    ($marker:ident, $fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Marker::$marker, format_args!($fmt $($arg)*))
    };
    ($marker:ident, $expr:expr) => {
        $crate::logger::emit($crate::logger::Marker::$marker, format_args!("{}", $expr))
    };
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => { $crate::__log_with!(Indented, $($arg)+) };
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit_raw("┃")
    };
}

/// Log a block start message, initiating a new conceptual block of information.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => { $crate::__log_with!(Block, $($arg)+) };
}

/// Log the `┏ duskcam vX.Y.Z ━━╸` header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit_raw(concat!("┏ duskcam v", env!("CARGO_PKG_VERSION"), " ━━╸"))
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit_raw("╹")
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => { $crate::__log_with!(Warning, $($arg)+) };
}

/// Warning outside a block, for help text.
#[macro_export]
macro_rules! log_warning_standalone {
    ($($arg:tt)+) => { $crate::__log_with!(WarningStandalone, $($arg)+) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::__log_with!(Error, $($arg)+) };
}

/// Log an error that terminates the flow, closing the output with `┗`.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => { $crate::__log_with!(ErrorExit, $($arg)+) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::__log_with!(Info, $($arg)+) };
}

/// Log a debug message; callers gate these behind `--debug`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::__log_with!(Debug, $($arg)+) };
}
