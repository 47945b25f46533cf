//! Tween methods and lifecycle states

/// How a tween derives its start and end values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TweenMethod {
    /// Tween from the current value to a supplied end value
    To,
    /// Tween from a supplied start value to the current value
    From,
    /// Tween between two supplied values
    FromTo,
    /// Tween from the current value by a supplied delta
    By,
}

/// Lifecycle state of a tween
///
/// States are ordered so that `state >= TweenState::Complete` means the tween
/// is finished for good and never writes its property again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TweenState {
    /// Pooled, holds no parameters
    #[default]
    Unused,
    /// Parameters supplied, not yet validated
    Uninitialized,
    /// Validated, waiting for its start delay to elapse
    Waiting,
    /// Writing its property every update
    Tweening,
    /// Finished naturally or completed early
    Complete,
    /// Failed validation or a runtime hook call
    Error,
}

impl TweenState {
    /// Whether the tween still takes part in updates
    pub fn is_alive(self) -> bool {
        self < TweenState::Complete
    }

    /// Whether the tween passed validation
    pub fn is_validated(self) -> bool {
        matches!(self, TweenState::Waiting | TweenState::Tweening)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_order() {
        assert!(TweenState::Unused < TweenState::Uninitialized);
        assert!(TweenState::Waiting < TweenState::Tweening);
        assert!(TweenState::Tweening < TweenState::Complete);
        assert!(TweenState::Error > TweenState::Complete);
        assert!(TweenState::Tweening.is_alive());
        assert!(!TweenState::Error.is_alive());
    }
}
