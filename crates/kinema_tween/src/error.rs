//! Error types for kinema_tween

use std::borrow::Cow;

use kinema_core::{HookError, HookKind, RetainError, ValueKind};
use thiserror::Error;

/// Reasons a tween ends in the `Error` state
///
/// These never propagate out of `Scheduler::tick`; they are recorded on the
/// tween, logged, and delivered through the error event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// No plugin filled a hook
    #[error("no plugin provides a {0} hook")]
    MissingHook(HookKind),

    /// Two strong plugins proposed the same hook
    #[error("{hook} hook conflict: '{candidate}' collides with '{installed}'")]
    PluginConflict {
        hook: HookKind,
        installed: Cow<'static, str>,
        candidate: Cow<'static, str>,
    },

    /// A loader registered as required declined the tween
    #[error("required plugin '{0}' declined the tween")]
    RequiredPluginDeclined(&'static str),

    /// A hook rejected the tween during initialization
    #[error("{plugin} {hook} hook failed to initialize: {message}")]
    HookInitFailed {
        plugin: Cow<'static, str>,
        hook: HookKind,
        message: String,
    },

    #[error("duration is undefined")]
    UndefinedDuration,

    #[error("duration must be positive and finite, got {0}")]
    InvalidDuration(f32),

    /// Supplied endpoint values have different kinds
    #[error("endpoint kinds differ: {start} and {end}")]
    KindMismatch { start: ValueKind, end: ValueKind },

    /// The tween method needs a value that was not supplied
    #[error("missing {0} value")]
    MissingValue(&'static str),

    /// The target was dropped or reported itself dead
    #[error("target is no longer alive")]
    TargetInvalidated,

    /// A hook failed while the tween was running
    #[error(transparent)]
    Hook(#[from] HookError),
}

/// Errors returned by scheduler calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// Handle refers to a tween that was recycled or never existed
    #[error("unknown tween handle")]
    UnknownTween,

    #[error("unknown group handle")]
    UnknownGroup,

    /// Neither the request nor its group supplied a target
    #[error("tween has no target")]
    MissingTarget,

    /// Plugins can only be attached before validation
    #[error("tween was already validated")]
    AlreadyValidated,

    #[error(transparent)]
    Retain(#[from] RetainError),
}

/// Result type for scheduler operations
pub type Result<T, E = SchedulerError> = std::result::Result<T, E>;
