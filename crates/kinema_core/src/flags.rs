//! Policy and completion flags

use bitflags::bitflags;

use crate::error::OptionsError;

bitflags! {
    /// How a tween reacts when another tween claims the same property
    ///
    /// The flags form three mutually exclusive groups:
    /// - trigger: `ON_INITIALIZE` | `ON_START`
    /// - method: `STOP` | `FINISH` | `CANCEL`
    /// - scope: `ALL` | `OVERLAPPING`
    ///
    /// An empty set means the tween is never overwritten.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OverwriteFlags: u8 {
        /// Check when a competing tween is validated
        const ON_INITIALIZE = 1 << 0;
        /// Check when a competing tween starts
        const ON_START = 1 << 1;
        /// Leave the property at its current value
        const STOP = 1 << 2;
        /// Jump the property to the end value
        const FINISH = 1 << 3;
        /// Jump the property back to the start value
        const CANCEL = 1 << 4;
        /// Overwrite regardless of timing
        const ALL = 1 << 5;
        /// Overwrite only if the time windows overlap
        const OVERLAPPING = 1 << 6;
    }
}

impl OverwriteFlags {
    pub const TRIGGER_GROUP: OverwriteFlags =
        OverwriteFlags::ON_INITIALIZE.union(OverwriteFlags::ON_START);
    pub const METHOD_GROUP: OverwriteFlags = OverwriteFlags::STOP
        .union(OverwriteFlags::FINISH)
        .union(OverwriteFlags::CANCEL);
    pub const SCOPE_GROUP: OverwriteFlags = OverwriteFlags::ALL.union(OverwriteFlags::OVERLAPPING);

    /// Global default: stop overlapping tweens when a competitor starts
    pub const DEFAULT: OverwriteFlags = OverwriteFlags::ON_START
        .union(OverwriteFlags::STOP)
        .union(OverwriteFlags::OVERLAPPING);

    /// Reject combinations that set more than one flag of an exclusive group
    pub fn validate(self) -> Result<(), OptionsError> {
        let groups = [
            (Self::TRIGGER_GROUP, "trigger"),
            (Self::METHOD_GROUP, "method"),
            (Self::SCOPE_GROUP, "scope"),
        ];
        for (mask, group) in groups {
            if self.intersection(mask).bits().count_ones() > 1 {
                return Err(OptionsError::ExclusiveFlags { flags: self, group });
            }
        }
        Ok(())
    }

    /// The completion method selected by these flags
    pub fn method(self) -> Option<CompletionMethod> {
        if self.contains(Self::STOP) {
            Some(CompletionMethod::Stop)
        } else if self.contains(Self::FINISH) {
            Some(CompletionMethod::Finish)
        } else if self.contains(Self::CANCEL) {
            Some(CompletionMethod::Cancel)
        } else {
            None
        }
    }
}

impl Default for OverwriteFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

bitflags! {
    /// Which pooled objects return to their pool once released
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RecycleFlags: u8 {
        const TWEENS = 1 << 0;
        const GROUPS = 1 << 1;
        const ALL = Self::TWEENS.bits() | Self::GROUPS.bits();
    }
}

bitflags! {
    /// Why a tween completed
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CompletionReason: u8 {
        /// Reached the end of its duration
        const NATURAL = 1 << 0;
        const STOP = 1 << 1;
        const FINISH = 1 << 2;
        const CANCEL = 1 << 3;
        /// Completed because a competing tween took over the property
        const OVERWRITTEN = 1 << 4;
    }
}

/// How to complete a tween early
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionMethod {
    /// Keep the current value
    Stop,
    /// Write the value at position 1
    Finish,
    /// Write the value at position 0
    Cancel,
}

impl CompletionMethod {
    pub fn reason(self) -> CompletionReason {
        match self {
            CompletionMethod::Stop => CompletionReason::STOP,
            CompletionMethod::Finish => CompletionReason::FINISH,
            CompletionMethod::Cancel => CompletionReason::CANCEL,
        }
    }

    /// Position whose value is written on completion, if any
    pub fn position(self) -> Option<f32> {
        match self {
            CompletionMethod::Stop => None,
            CompletionMethod::Finish => Some(1.0),
            CompletionMethod::Cancel => Some(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_overwrite_is_valid() {
        assert!(OverwriteFlags::DEFAULT.validate().is_ok());
        assert!(OverwriteFlags::empty().validate().is_ok());
        assert_eq!(OverwriteFlags::DEFAULT.method(), Some(CompletionMethod::Stop));
    }

    #[test]
    fn test_exclusive_groups() {
        let both_triggers = OverwriteFlags::ON_INITIALIZE | OverwriteFlags::ON_START;
        assert_eq!(
            both_triggers.validate(),
            Err(OptionsError::ExclusiveFlags {
                flags: both_triggers,
                group: "trigger",
            })
        );

        let two_methods = OverwriteFlags::ON_START | OverwriteFlags::FINISH | OverwriteFlags::CANCEL;
        assert!(matches!(
            two_methods.validate(),
            Err(OptionsError::ExclusiveFlags { group: "method", .. })
        ));

        let two_scopes = OverwriteFlags::ALL | OverwriteFlags::OVERLAPPING;
        assert!(matches!(
            two_scopes.validate(),
            Err(OptionsError::ExclusiveFlags { group: "scope", .. })
        ));
    }

    #[test]
    fn test_completion_method_reason() {
        assert_eq!(CompletionMethod::Cancel.reason(), CompletionReason::CANCEL);
        assert_eq!(CompletionMethod::Finish.position(), Some(1.0));
        assert_eq!(CompletionMethod::Stop.position(), None);
    }
}
