#![deny(missing_docs)]
//! Shared logging utilities for the tracker workspace.
//!
//! This crate provides the `tracker_*` logging macros used across the codebase,
//! a per-thread "scope" naming the mail thread currently being processed, and a
//! minimal test initializer for the global logger.

use std::cell::RefCell;

thread_local! {
    /// Identifier of the mail thread being processed on this OS thread, if any.
    static THREAD_SCOPE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Restores the previous scope when dropped.
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct ThreadScopeGuard {
    previous: Option<String>,
}

impl Drop for ThreadScopeGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        THREAD_SCOPE.with(|scope| *scope.borrow_mut() = previous);
    }
}

/// Tags every `tracker_*` log line emitted on this OS thread with `thread_id`
/// until the returned guard is dropped. Scopes nest.
pub fn enter_thread_scope(thread_id: impl Into<String>) -> ThreadScopeGuard {
    let next = Some(thread_id.into());
    let previous = THREAD_SCOPE.with(|scope| scope.replace(next));
    ThreadScopeGuard { previous }
}

/// Returns the mail thread id of the innermost active scope.
pub fn current_thread_scope() -> Option<String> {
    THREAD_SCOPE.with(|scope| scope.borrow().clone())
}

/// Prefix rendered in front of every scoped log line. Empty outside a scope.
#[doc(hidden)]
pub fn scope_prefix() -> String {
    THREAD_SCOPE.with(|scope| match scope.borrow().as_deref() {
        Some(id) => format!("[thread {id}] "),
        None => String::new(),
    })
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
