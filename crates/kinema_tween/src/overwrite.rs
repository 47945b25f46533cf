//! Overwrite resolution
//!
//! When a tween is validated or starts, other live tweens on the same
//! (target, property) may have to give way. Each of those tweens decides by
//! its own overwrite policy:
//!
//! - the policy's trigger (`ON_INITIALIZE` or `ON_START`) must match the
//!   moment the competitor reached
//! - `ALL` always overwrites, `OVERLAPPING` only if the two time windows
//!   overlap
//! - the policy's method (`STOP`, `FINISH` or `CANCEL`) completes the tween

use kinema_core::{Clock, CompletionMethod, OverwriteFlags, TimeBase};

/// The span a tween occupies, in its own time base
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub start: f32,
    pub duration: f32,
    pub base: TimeBase,
}

impl Window {
    /// Build a window, or `None` for a tween that cannot overlap anything
    pub fn new(start: f32, duration: f32, base: TimeBase) -> Option<Self> {
        (start.is_finite() && duration.is_finite() && duration > 0.0).then_some(Self {
            start,
            duration,
            base,
        })
    }

    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// Express this window in another time base
    ///
    /// Both bases are anchored at the clock's current time. Returns `None`
    /// when the conversion collapses the window, e.g. under a zero time scale.
    pub fn convert_to(self, base: TimeBase, clock: &dyn Clock) -> Option<Self> {
        if self.base == base {
            return Some(self);
        }
        let factor = clock.span_factor(self.base, base);
        let start = clock.now(base) - (clock.now(self.base) - self.start) * factor;
        Window::new(start, self.duration * factor, base)
    }

    /// Whether either window's start lies in `[start, end)` of the other or
    /// either window's end lies in `(start, end]` of the other
    pub fn overlaps(&self, other: &Window) -> bool {
        let (a0, a1) = (self.start, self.end());
        let (b0, b1) = (other.start, other.end());
        let starts = (b0 >= a0 && b0 < a1) || (a0 >= b0 && a0 < b1);
        let ends = (b1 > a0 && b1 <= a1) || (a1 > b0 && a1 <= b1);
        starts || ends
    }
}

/// Decide whether a tween with `policy` gives way to a competitor
///
/// `trigger` is `ON_INITIALIZE` or `ON_START`. `subject` is the competitor's
/// window and `other` the window of the tween being checked; they are
/// compared in the competitor's time base.
pub fn should_overwrite(
    policy: OverwriteFlags,
    trigger: OverwriteFlags,
    subject: Option<Window>,
    other: Option<Window>,
    clock: &dyn Clock,
) -> Option<CompletionMethod> {
    if !policy.contains(trigger) {
        return None;
    }
    let method = policy.method()?;

    if policy.contains(OverwriteFlags::ALL) {
        return Some(method);
    }
    if policy.contains(OverwriteFlags::OVERLAPPING) {
        let subject = subject?;
        let other = other?.convert_to(subject.base, clock)?;
        return subject.overlaps(&other).then_some(method);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_core::ManualClock;

    fn window(start: f32, duration: f32) -> Option<Window> {
        Window::new(start, duration, TimeBase::Scaled)
    }

    #[test]
    fn test_overlap_cases() {
        let a = window(0.0, 2.0).unwrap();
        assert!(a.overlaps(&window(1.0, 2.0).unwrap()));
        assert!(a.overlaps(&window(-1.0, 2.0).unwrap()));
        assert!(a.overlaps(&window(0.5, 0.5).unwrap()));
        assert!(window(0.5, 0.5).unwrap().overlaps(&a));
        // Touching windows do not overlap
        assert!(!a.overlaps(&window(2.0, 1.0).unwrap()));
        assert!(!window(2.0, 1.0).unwrap().overlaps(&a));
    }

    #[test]
    fn test_disabled_windows() {
        assert!(window(0.0, 0.0).is_none());
        assert!(window(0.0, f32::INFINITY).is_none());
        assert!(window(0.0, -1.0).is_none());
    }

    #[test]
    fn test_convert_between_bases() {
        let clock = ManualClock::new();
        clock.set_time(10.0);
        clock.set_time_scale(2.0);

        // Started 2 unscaled seconds ago, lasting 4 unscaled seconds
        let unscaled = Window::new(8.0, 4.0, TimeBase::Unscaled).unwrap();
        let scaled = unscaled.convert_to(TimeBase::Scaled, &clock).unwrap();
        assert_eq!(scaled.start, 6.0);
        assert_eq!(scaled.duration, 8.0);

        clock.set_time_scale(0.0);
        assert!(unscaled.convert_to(TimeBase::Scaled, &clock).is_none());
    }

    #[test]
    fn test_policy_decisions() {
        let clock = ManualClock::new();
        let subject = window(1.0, 2.0);
        let other = window(0.0, 2.0);
        let far = window(10.0, 1.0);

        let default = OverwriteFlags::DEFAULT;
        assert_eq!(
            should_overwrite(default, OverwriteFlags::ON_START, subject, other, &clock),
            Some(CompletionMethod::Stop)
        );
        assert_eq!(
            should_overwrite(default, OverwriteFlags::ON_INITIALIZE, subject, other, &clock),
            None
        );
        assert_eq!(
            should_overwrite(default, OverwriteFlags::ON_START, subject, far, &clock),
            None
        );

        let all = OverwriteFlags::ON_INITIALIZE | OverwriteFlags::CANCEL | OverwriteFlags::ALL;
        assert_eq!(
            should_overwrite(all, OverwriteFlags::ON_INITIALIZE, subject, far, &clock),
            Some(CompletionMethod::Cancel)
        );

        // Disabled windows never overlap
        assert_eq!(
            should_overwrite(default, OverwriteFlags::ON_START, subject, None, &clock),
            None
        );
        assert_eq!(
            should_overwrite(OverwriteFlags::empty(), OverwriteFlags::ON_START, subject, other, &clock),
            None
        );
    }
}
