//! Time bases, update phases and clocks
//!
//! Tweens measure time in one of three bases:
//! - `Scaled`: game time, affected by the clock's time scale
//! - `Unscaled`: game time ignoring the time scale
//! - `Realtime`: wall-clock time since the clock started
//!
//! The host owns the clock and ticks the scheduler once per [`UpdatePhase`]
//! per frame.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Clock a tween measures its timing in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeBase {
    #[default]
    Scaled,
    Unscaled,
    Realtime,
}

/// Update slot in the host frame that ticks a tween
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdatePhase {
    /// Regular per-frame update
    #[default]
    Update,
    /// Fixed-step physics update
    FixedUpdate,
    /// Update after all regular updates ran
    LateUpdate,
}

impl UpdatePhase {
    pub const ALL: [UpdatePhase; 3] = [
        UpdatePhase::Update,
        UpdatePhase::FixedUpdate,
        UpdatePhase::LateUpdate,
    ];

    pub fn index(self) -> usize {
        match self {
            UpdatePhase::Update => 0,
            UpdatePhase::FixedUpdate => 1,
            UpdatePhase::LateUpdate => 2,
        }
    }
}

/// Host time source
pub trait Clock {
    /// Current time in seconds in the given base
    fn now(&self, base: TimeBase) -> f32;

    /// Factor applied to scaled time relative to unscaled time
    fn time_scale(&self) -> f32 {
        1.0
    }

    /// Factor converting a span measured in `from` into a span in `to`
    ///
    /// Returns a non-finite value when the conversion is undefined (a zero
    /// time scale seen from the unscaled side).
    fn span_factor(&self, from: TimeBase, to: TimeBase) -> f32 {
        match (from, to) {
            (TimeBase::Scaled, TimeBase::Scaled) => 1.0,
            (TimeBase::Scaled, _) => 1.0 / self.time_scale(),
            (_, TimeBase::Scaled) => self.time_scale(),
            _ => 1.0,
        }
    }
}

/// A moment captured in all three time bases
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timestamps {
    pub scaled: f32,
    pub unscaled: f32,
    pub realtime: f32,
}

impl Timestamps {
    /// Capture the clock's current time in every base
    pub fn capture(clock: &dyn Clock) -> Self {
        Self {
            scaled: clock.now(TimeBase::Scaled),
            unscaled: clock.now(TimeBase::Unscaled),
            realtime: clock.now(TimeBase::Realtime),
        }
    }

    pub fn get(&self, base: TimeBase) -> f32 {
        match base {
            TimeBase::Scaled => self.scaled,
            TimeBase::Unscaled => self.unscaled,
            TimeBase::Realtime => self.realtime,
        }
    }
}

// ============================================================================
// Manual Clock
// ============================================================================

#[derive(Debug, Default)]
struct ManualClockState {
    scaled: Cell<f32>,
    unscaled: Cell<f32>,
    realtime: Cell<f32>,
    time_scale: Cell<f32>,
}

/// A clock advanced explicitly by the host (or by tests)
///
/// Clones share the same state, so the host can keep one handle and give
/// another to the scheduler.
#[derive(Clone, Debug)]
pub struct ManualClock {
    state: Rc<ManualClockState>,
}

impl ManualClock {
    pub fn new() -> Self {
        let state = ManualClockState::default();
        state.time_scale.set(1.0);
        Self {
            state: Rc::new(state),
        }
    }

    /// Advance every base by `dt` seconds, scaled time by `dt * time_scale`
    pub fn advance(&self, dt: f32) {
        let s = &self.state;
        s.scaled.set(s.scaled.get() + dt * s.time_scale.get());
        s.unscaled.set(s.unscaled.get() + dt);
        s.realtime.set(s.realtime.get() + dt);
    }

    /// Set every base to the same absolute time
    pub fn set_time(&self, seconds: f32) {
        self.state.scaled.set(seconds);
        self.state.unscaled.set(seconds);
        self.state.realtime.set(seconds);
    }

    /// Set one base to an absolute time
    pub fn set(&self, base: TimeBase, seconds: f32) {
        match base {
            TimeBase::Scaled => self.state.scaled.set(seconds),
            TimeBase::Unscaled => self.state.unscaled.set(seconds),
            TimeBase::Realtime => self.state.realtime.set(seconds),
        }
    }

    pub fn set_time_scale(&self, scale: f32) {
        self.state.time_scale.set(scale);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self, base: TimeBase) -> f32 {
        match base {
            TimeBase::Scaled => self.state.scaled.get(),
            TimeBase::Unscaled => self.state.unscaled.get(),
            TimeBase::Realtime => self.state.realtime.get(),
        }
    }

    fn time_scale(&self) -> f32 {
        self.state.time_scale.get()
    }
}

// ============================================================================
// System Clock
// ============================================================================

/// A clock driven by `std::time::Instant`
///
/// Unscaled and realtime bases both report seconds since construction. Scaled
/// time accumulates at the current time scale, so changing the scale never
/// makes scaled time jump.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
    /// Unscaled seconds at the last time scale change
    anchor_unscaled: Cell<f64>,
    /// Scaled seconds at the last time scale change
    anchor_scaled: Cell<f64>,
    time_scale: Cell<f32>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            anchor_unscaled: Cell::new(0.0),
            anchor_scaled: Cell::new(0.0),
            time_scale: Cell::new(1.0),
        }
    }

    fn elapsed(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn scaled_at(&self, unscaled: f64) -> f64 {
        self.anchor_scaled.get()
            + (unscaled - self.anchor_unscaled.get()) * self.time_scale.get() as f64
    }

    pub fn set_time_scale(&self, scale: f32) {
        let now = self.elapsed();
        self.anchor_scaled.set(self.scaled_at(now));
        self.anchor_unscaled.set(now);
        self.time_scale.set(scale);
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self, base: TimeBase) -> f32 {
        let elapsed = self.elapsed();
        match base {
            TimeBase::Scaled => self.scaled_at(elapsed) as f32,
            TimeBase::Unscaled | TimeBase::Realtime => elapsed as f32,
        }
    }

    fn time_scale(&self) -> f32 {
        self.time_scale.get()
    }
}
