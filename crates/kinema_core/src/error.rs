//! Core error types

use thiserror::Error;

use crate::flags::OverwriteFlags;
use crate::value::ValueKind;

/// Errors raised while configuring an options node
///
/// These are local contract violations: the offending call is rejected and the
/// node keeps its previous state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// The requested parent already has this node in its own parent chain
    #[error("options parent chain would form a cycle")]
    Cycle,

    /// More than one flag of a mutually exclusive overwrite group was set
    #[error("overwrite flags {flags:?} set more than one {group} flag")]
    ExclusiveFlags {
        flags: OverwriteFlags,
        group: &'static str,
    },
}

/// Errors raised by unbalanced retain/release calls
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetainError {
    /// `release()` called on an object that is not retained
    #[error("released more times than retained")]
    Underflow,
}

/// Errors raised by hooks while reading, writing or computing a value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HookError {
    /// The target does not expose the property
    #[error("property '{0}' not found on target")]
    PropertyNotFound(String),

    /// A value had a different kind than the hook expected
    #[error("expected a {expected} value, found {found}")]
    KindMismatch { expected: ValueKind, found: ValueKind },

    /// The target is not of the type the hook was written for
    #[error("target is not a {0}")]
    TargetType(&'static str),

    /// Hook-specific failure
    #[error("{0}")]
    Other(String),
}
