//! Per-tween log filtering
//!
//! Every options node can carry a [`LogLevel`]. A tween diagnostic is emitted
//! through `tracing` only if its severity reaches the tween's resolved level,
//! so noisy tweens can be silenced without touching the global subscriber.

use std::fmt;

use crate::handle::TweenId;

/// Minimum severity of tween diagnostics that get emitted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    /// Emit nothing
    Off,
}

impl LogLevel {
    /// Whether a message of `severity` passes this threshold
    pub fn allows(self, severity: LogLevel) -> bool {
        self != LogLevel::Off && severity != LogLevel::Off && severity >= self
    }
}

/// Emit a tween diagnostic if `threshold` allows `severity`
pub fn emit(
    threshold: LogLevel,
    severity: LogLevel,
    tween: TweenId,
    property: &str,
    message: fmt::Arguments<'_>,
) {
    if !threshold.allows(severity) {
        return;
    }
    let tween = tween.to_raw();
    match severity {
        LogLevel::Debug => tracing::debug!(tween, property, "{}", message),
        LogLevel::Info => tracing::info!(tween, property, "{}", message),
        LogLevel::Warn => tracing::warn!(tween, property, "{}", message),
        LogLevel::Error => tracing::error!(tween, property, "{}", message),
        LogLevel::Off => {}
    }
}
