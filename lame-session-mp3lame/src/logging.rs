//! Process-wide switch for engine boundary diagnostics.
//!
//! When enabled, every call crossing into libmp3lame is reported at
//! `debug` level through the `log` facade. The switch outlives every
//! session and is off by default.

use std::sync::atomic::{AtomicBool, Ordering};

static ENGINE_LOGGING: AtomicBool = AtomicBool::new(false);

pub fn set_enabled(enabled: bool) {
    ENGINE_LOGGING.store(enabled, Ordering::Relaxed);
    log::info!("engine boundary logging {}", if enabled { "enabled" } else { "disabled" });
}

pub fn is_enabled() -> bool {
    ENGINE_LOGGING.load(Ordering::Relaxed)
}

/// Report one boundary call when logging is enabled.
macro_rules! boundary {
    ($($arg:tt)+) => {
        if $crate::logging::is_enabled() {
            log::debug!(target: "lame_session::engine", $($arg)+);
        }
    };
}

pub(crate) use boundary;

#[cfg(test)]
pub(crate) static TEST_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());
