//! Tween state machine
//!
//! ```text
//! Unused → Uninitialized → Waiting → Tweening → Complete
//!              └──────────────┴─────────┴──────→ Error
//! ```
//!
//! - `prepare` fills a pooled tween and moves it to `Uninitialized`
//! - `validate` negotiates hooks and checks the duration (`Waiting`)
//! - `try_start` waits out the start delay and resolves the endpoints
//!   (`Tweening`)
//! - `sample` writes the eased value and completes at position 1
//! - `complete` and `fail` end the tween early
//!
//! Once a tween reaches `Complete` or `Error` it never writes its property
//! again. The scheduler drives these steps and runs overwrite resolution
//! between them.

use std::rc::Rc;

use kinema_core::log::emit;
use kinema_core::{
    Animatable, Clock, CompletionMethod, CompletionReason, Easing, EventKind, GroupId, HookKind,
    LogLevel,
    Options, PluginContext, PluginProposal, RetainCount, Target, TimeBase, Timestamps, TweenEvent,
    TweenId, TweenMethod, TweenState, TweenValue, UpdatePhase, ValueKind,
};

use crate::error::{SchedulerError, TweenError};
use crate::hooks::{negotiate, HookSet};
use crate::overwrite::Window;

/// Parameters supplied when a tween is taken from the pool
#[derive(Clone, Debug)]
pub(crate) struct TweenParams {
    pub method: TweenMethod,
    pub target: Target,
    pub property: Rc<str>,
    pub start: Option<TweenValue>,
    pub end: Option<TweenValue>,
    pub delta: Option<TweenValue>,
    pub duration: Option<f32>,
    pub plugins: Vec<PluginProposal>,
}

/// Resolved start, end and delta
#[derive(Clone, Copy, Debug, PartialEq)]
struct Endpoints {
    start: TweenValue,
    end: TweenValue,
    delta: TweenValue,
}

/// Options read once when the tween starts
#[derive(Clone, Copy, Debug, Default)]
struct Cache {
    easing: Easing,
    duration: f32,
    base: TimeBase,
    phase: UpdatePhase,
    update_listeners: bool,
}

/// Result of [`Tween::try_start`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// Start delay not elapsed yet
    NotYet,
    Started,
    /// Endpoint resolution failed; the tween is in `Error`
    Failed,
}

pub struct Tween {
    id: TweenId,
    group: GroupId,
    method: TweenMethod,
    target: Option<Target>,
    property: Rc<str>,
    supplied_start: Option<TweenValue>,
    supplied_end: Option<TweenValue>,
    supplied_delta: Option<TweenValue>,
    endpoints: Option<Endpoints>,
    state: TweenState,
    reason: CompletionReason,
    created: Timestamps,
    start_time: f32,
    options: Options,
    hooks: HookSet,
    manual: Vec<PluginProposal>,
    error: Option<TweenError>,
    last_value: Option<TweenValue>,
    cache: Cache,
    pub(crate) retain: RetainCount,
    /// Whether the owning group still holds its retain
    pub(crate) in_group: bool,
}

impl Tween {
    pub fn new() -> Self {
        Self {
            id: TweenId::default(),
            group: GroupId::default(),
            method: TweenMethod::To,
            target: None,
            property: Rc::from(""),
            supplied_start: None,
            supplied_end: None,
            supplied_delta: None,
            endpoints: None,
            state: TweenState::Unused,
            reason: CompletionReason::empty(),
            created: Timestamps::default(),
            start_time: 0.0,
            options: Options::new(),
            hooks: HookSet::new(),
            manual: Vec::new(),
            error: None,
            last_value: None,
            cache: Cache::default(),
            retain: RetainCount::new(),
            in_group: false,
        }
    }

    /// Fill an unused tween, moving it to `Uninitialized`
    pub(crate) fn prepare(
        &mut self,
        id: TweenId,
        group: GroupId,
        params: TweenParams,
        parent: &Options,
        created: Timestamps,
    ) {
        self.id = id;
        self.group = group;
        self.method = params.method;
        self.target = Some(params.target);
        self.property = params.property;
        self.supplied_start = params.start;
        self.supplied_end = params.end;
        self.supplied_delta = params.delta;
        self.created = created;
        self.options = Options::with_parent(parent);
        if let Some(duration) = params.duration {
            self.options.set_duration(duration);
        }
        self.manual = params.plugins;
        self.state = TweenState::Uninitialized;
        self.log(LogLevel::Debug, format_args!("tween prepared ({:?})", self.method));
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn method(&self) -> TweenMethod {
        self.method
    }

    pub fn state(&self) -> TweenState {
        self.state
    }

    pub fn reason(&self) -> CompletionReason {
        self.reason
    }

    pub fn error(&self) -> Option<&TweenError> {
        self.error.as_ref()
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn property(&self) -> &Rc<str> {
        &self.property
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    /// Last value written to the property
    pub fn last_value(&self) -> Option<TweenValue> {
        self.last_value
    }

    /// Update phase, cached when the tween leaves the fresh bucket
    pub fn phase(&self) -> UpdatePhase {
        self.cache.phase
    }

    pub(crate) fn cache_phase(&mut self) -> UpdatePhase {
        self.cache.phase = self.options.phase().unwrap_or_default();
        self.cache.phase
    }

    /// Attach a manual plugin proposal before validation
    pub(crate) fn add_plugin(&mut self, proposal: PluginProposal) -> Result<(), SchedulerError> {
        if self.state != TweenState::Uninitialized {
            return Err(SchedulerError::AlreadyValidated);
        }
        self.manual.push(proposal);
        Ok(())
    }

    fn time_base(&self) -> TimeBase {
        if self.state == TweenState::Tweening {
            self.cache.base
        } else {
            self.options.time_base().unwrap_or_default()
        }
    }

    /// The span this tween occupies, or `None` if it has no usable duration
    pub fn window(&self) -> Option<Window> {
        let base = self.time_base();
        if self.state == TweenState::Tweening {
            Window::new(self.start_time, self.cache.duration, base)
        } else {
            let delay = self.options.start_delay().unwrap_or(0.0);
            let duration = self.options.duration()?;
            Window::new(self.created.get(base) + delay, duration, base)
        }
    }

    fn log(&self, severity: LogLevel, message: std::fmt::Arguments<'_>) {
        let threshold = self.options.log_level().unwrap_or_default();
        emit(threshold, severity, self.id, &self.property, message);
    }

    fn event(&self, kind: EventKind) -> TweenEvent {
        TweenEvent::new(kind, self.id, self.group, Rc::clone(&self.property))
    }

    fn live_target(&self) -> Result<Rc<dyn Animatable>, TweenError> {
        self.target
            .as_ref()
            .and_then(Target::upgrade)
            .filter(|target| target.is_alive())
            .ok_or(TweenError::TargetInvalidated)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Kind shared by the supplied values the method needs
    fn supplied_kind(&self) -> Result<ValueKind, TweenError> {
        let (first, second) = match self.method {
            TweenMethod::To => (("end", self.supplied_end), None),
            TweenMethod::From => (("start", self.supplied_start), None),
            TweenMethod::FromTo => (
                ("start", self.supplied_start),
                Some(("end", self.supplied_end)),
            ),
            TweenMethod::By => (("delta", self.supplied_delta), None),
        };
        let kind = first.1.ok_or(TweenError::MissingValue(first.0))?.kind();
        if let Some((name, value)) = second {
            let other = value.ok_or(TweenError::MissingValue(name))?.kind();
            if other != kind {
                return Err(TweenError::KindMismatch {
                    start: kind,
                    end: other,
                });
            }
        }
        Ok(kind)
    }

    fn checked_duration(&self) -> Result<f32, TweenError> {
        let duration = self
            .options
            .duration()
            .ok_or(TweenError::UndefinedDuration)?;
        if duration > 0.0 && duration.is_finite() {
            Ok(duration)
        } else {
            Err(TweenError::InvalidDuration(duration))
        }
    }

    fn try_validate(&mut self) -> Result<(), TweenError> {
        let target = self.live_target()?;
        let kind = self.supplied_kind()?;
        let ctx = PluginContext {
            tween: self.id,
            method: self.method,
            property: &self.property,
            target: &*target,
            kind,
        };
        let registrations = self.options.resolved_plugins();
        let hooks = negotiate(&ctx, &registrations, &self.manual)?;
        self.checked_duration()?;
        self.hooks = hooks;
        Ok(())
    }

    /// Move from `Uninitialized` to `Waiting`
    ///
    /// Returns whether the tween is validated afterwards. Failures move the
    /// tween to `Error`.
    pub fn validate(&mut self) -> bool {
        if self.state != TweenState::Uninitialized {
            return self.state.is_validated();
        }
        match self.try_validate() {
            Ok(()) => {
                self.state = TweenState::Waiting;
                self.log(
                    LogLevel::Debug,
                    format_args!(
                        "validated with getter '{}', setter '{}', arithmetic '{}'",
                        self.hooks.plugin(HookKind::Getter).unwrap_or_default(),
                        self.hooks.plugin(HookKind::Setter).unwrap_or_default(),
                        self.hooks.plugin(HookKind::Arithmetic).unwrap_or_default(),
                    ),
                );
                self.options.fire(&self.event(EventKind::Initialize));
                true
            }
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    // ========================================================================
    // Start and update
    // ========================================================================

    fn resolve_endpoints(&mut self) -> Result<Endpoints, TweenError> {
        if let Some(endpoints) = self.endpoints {
            return Ok(endpoints);
        }
        let target = self.live_target()?;
        let missing = |name| TweenError::MissingValue(name);
        let read = |hooks: &HookSet, kind: ValueKind| -> Result<TweenValue, TweenError> {
            let value = hooks.get(&*target, &self.property)?;
            value.expect_kind(kind)?;
            Ok(value)
        };
        let hooks = &self.hooks;

        let endpoints = match self.method {
            TweenMethod::To => {
                let end = self.supplied_end.ok_or_else(|| missing("end"))?;
                let start = read(hooks, end.kind())?;
                Endpoints {
                    start,
                    end,
                    delta: hooks.delta(start, end)?,
                }
            }
            TweenMethod::From => {
                let start = self.supplied_start.ok_or_else(|| missing("start"))?;
                let end = read(hooks, start.kind())?;
                Endpoints {
                    start,
                    end,
                    delta: hooks.delta(start, end)?,
                }
            }
            TweenMethod::FromTo => {
                let start = self.supplied_start.ok_or_else(|| missing("start"))?;
                let end = self.supplied_end.ok_or_else(|| missing("end"))?;
                Endpoints {
                    start,
                    end,
                    delta: hooks.delta(start, end)?,
                }
            }
            TweenMethod::By => {
                let delta = self.supplied_delta.ok_or_else(|| missing("delta"))?;
                let start = read(hooks, delta.kind())?;
                Endpoints {
                    start,
                    end: hooks.endpoint(start, delta)?,
                    delta,
                }
            }
        };
        self.endpoints = Some(endpoints);
        Ok(endpoints)
    }

    /// Move from `Waiting` to `Tweening` once the start delay elapsed
    pub fn try_start(&mut self, clock: &dyn Clock) -> StartOutcome {
        if self.state != TweenState::Waiting {
            return if self.state == TweenState::Tweening {
                StartOutcome::Started
            } else {
                StartOutcome::Failed
            };
        }

        let base = self.options.time_base().unwrap_or_default();
        let delay = self.options.start_delay().unwrap_or(0.0);
        let now = clock.now(base);
        if now < self.created.get(base) + delay {
            return StartOutcome::NotYet;
        }

        let started = self
            .checked_duration()
            .and_then(|duration| self.resolve_endpoints().map(|_| duration));
        let duration = match started {
            Ok(duration) => duration,
            Err(err) => {
                self.fail(err);
                return StartOutcome::Failed;
            }
        };

        self.cache.easing = self.options.easing().unwrap_or_default();
        self.cache.duration = duration;
        self.cache.base = base;
        self.cache.update_listeners = self.options.has_listeners(EventKind::Update);
        self.start_time = now;
        self.state = TweenState::Tweening;
        self.log(LogLevel::Debug, format_args!("started at {now}"));

        let event = self.event(EventKind::Start).with_value(self.endpoints.map(|e| e.start));
        self.options.fire(&event);
        StartOutcome::Started
    }

    /// Write the value for the current time
    ///
    /// Returns whether the tween is still alive afterwards.
    pub fn sample(&mut self, clock: &dyn Clock) -> bool {
        if self.state != TweenState::Tweening {
            return self.state.is_alive();
        }
        let elapsed = clock.now(self.cache.base) - self.start_time;
        let position = (elapsed / self.cache.duration).clamp(0.0, 1.0);
        let eased = self.cache.easing.apply(position);

        if let Err(err) = self.write_at(eased) {
            self.fail(err);
            return false;
        }
        if self.cache.update_listeners {
            let event = self.event(EventKind::Update).with_value(self.last_value);
            self.options.fire(&event);
        }
        if position >= 1.0 {
            self.finish_with(CompletionReason::NATURAL);
            return false;
        }
        true
    }

    fn write_at(&mut self, position: f32) -> Result<(), TweenError> {
        let target = self.live_target()?;
        let endpoints = self.resolve_endpoints()?;
        let value = self
            .hooks
            .value_at(endpoints.start, endpoints.end, endpoints.delta, position)?;
        self.hooks.set(&*target, &self.property, value)?;
        self.last_value = Some(value);
        Ok(())
    }

    // ========================================================================
    // Completion
    // ========================================================================

    fn finish_with(&mut self, reason: CompletionReason) {
        self.state = TweenState::Complete;
        self.reason = reason;
        self.log(LogLevel::Debug, format_args!("completed ({reason:?})"));
        let event = self
            .event(EventKind::Complete)
            .with_reason(reason)
            .with_value(self.last_value);
        self.options.fire(&event);
        self.options.clear_listeners();
    }

    /// Complete early
    ///
    /// `Finish` and `Cancel` validate the tween first if needed and write the
    /// value at position 1 or 0. Returns whether the call changed the tween.
    pub fn complete(&mut self, method: CompletionMethod, overwritten: bool) -> bool {
        if !self.state.is_alive() {
            return false;
        }
        if let Some(position) = method.position() {
            if !self.validate() {
                return true;
            }
            if let Err(err) = self.write_at(position) {
                self.fail(err);
                return true;
            }
        }
        let mut reason = method.reason();
        if overwritten {
            reason |= CompletionReason::OVERWRITTEN;
        }
        self.finish_with(reason);
        true
    }

    /// Move to `Error`
    ///
    /// A dropped target is reported at debug level, everything else at error
    /// level.
    pub fn fail(&mut self, err: TweenError) {
        if !self.state.is_alive() {
            return;
        }
        let severity = if err == TweenError::TargetInvalidated {
            LogLevel::Debug
        } else {
            LogLevel::Error
        };
        self.log(severity, format_args!("tween failed: {err}"));

        self.state = TweenState::Error;
        let event = self.event(EventKind::Error).with_error(err.to_string());
        self.error = Some(err);
        self.options.fire(&event);
        self.options.clear_listeners();
    }

    /// Return to `Unused`, dropping every reference the tween holds
    pub(crate) fn reset(&mut self) {
        self.options.reset();
        *self = Tween::new();
    }
}

impl Default for Tween {
    fn default() -> Self {
        Self::new()
    }
}
