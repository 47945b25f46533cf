//! Tween scheduler
//!
//! Owns every tween and group and drives them from the host's frame loop.
//! The host calls [`Scheduler::tick`] once per [`UpdatePhase`] per frame:
//!
//! 1. Every active group drains its fresh bucket, newest tween first, so later
//!    tweens get the first chance to overwrite earlier ones. Each tween is
//!    validated and moved to the bucket of its update phase.
//! 2. The phase bucket is updated front to back. Completed tweens are compacted
//!    out afterwards and released by their group.
//! 3. A group left without tweens is released by the scheduler.
//!
//! Tweens and groups are referenced through generational handles. Once a
//! tween or group is recycled its old handle resolves to nothing.
//!
//! Event listeners run inside these calls and must not call back into the
//! scheduler that fired them.

use std::rc::Rc;

use kinema_core::{
    Animatable, Clock, CompletionMethod, CompletionReason, GroupId, Options, OverwriteFlags,
    PluginProposal, RecycleFlags, Release, RetainError, Target, TargetKey, Timestamps, TweenId,
    TweenMethod, TweenState, TweenValue, UpdatePhase,
};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::error::{Result, SchedulerError, TweenError};
use crate::group::Group;
use crate::overwrite;
use crate::plugins::register_defaults;
use crate::pool::Pool;
use crate::tween::{StartOutcome, Tween, TweenParams};

/// Host predicate consulted before every tween update
pub type LivenessCheck = Box<dyn Fn(&dyn Animatable) -> bool>;

/// Scheduler construction settings
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Recycled tweens kept for reuse
    pub tween_pool_capacity: usize,
    /// Recycled groups kept for reuse
    pub group_pool_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tween_pool_capacity: 256,
            group_pool_capacity: 32,
        }
    }
}

/// Snapshot of scheduler bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub tweens: usize,
    pub groups: usize,
    pub active_groups: usize,
    pub pooled_tweens: usize,
    pub pooled_groups: usize,
}

/// A tween to add to a group
///
/// ```rust
/// use kinema_tween::{TweenRequest, TweenValue};
///
/// let request = TweenRequest::by("x", 5.0f32).with_duration(0.5);
/// assert_eq!(request.delta(), Some(TweenValue::Float(5.0)));
/// ```
#[derive(Clone, Debug)]
pub struct TweenRequest {
    method: TweenMethod,
    target: Option<Target>,
    property: Rc<str>,
    start: Option<TweenValue>,
    end: Option<TweenValue>,
    delta: Option<TweenValue>,
    duration: Option<f32>,
    plugins: Vec<PluginProposal>,
}

impl TweenRequest {
    fn new(method: TweenMethod, property: impl Into<Rc<str>>) -> Self {
        Self {
            method,
            target: None,
            property: property.into(),
            start: None,
            end: None,
            delta: None,
            duration: None,
            plugins: Vec::new(),
        }
    }

    /// Tween from the current value to `end`
    pub fn to(property: impl Into<Rc<str>>, end: impl Into<TweenValue>) -> Self {
        let mut request = Self::new(TweenMethod::To, property);
        request.end = Some(end.into());
        request
    }

    /// Tween from `start` to the current value
    pub fn from(property: impl Into<Rc<str>>, start: impl Into<TweenValue>) -> Self {
        let mut request = Self::new(TweenMethod::From, property);
        request.start = Some(start.into());
        request
    }

    pub fn from_to(
        property: impl Into<Rc<str>>,
        start: impl Into<TweenValue>,
        end: impl Into<TweenValue>,
    ) -> Self {
        let mut request = Self::new(TweenMethod::FromTo, property);
        request.start = Some(start.into());
        request.end = Some(end.into());
        request
    }

    /// Tween from the current value by `delta`
    pub fn by(property: impl Into<Rc<str>>, delta: impl Into<TweenValue>) -> Self {
        let mut request = Self::new(TweenMethod::By, property);
        request.delta = Some(delta.into());
        request
    }

    /// Set the duration on the tween's own options
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Animate `target` instead of the group's default target
    pub fn on(mut self, target: impl Into<Target>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Attach a manual plugin proposal to this tween only
    pub fn with_plugin(mut self, proposal: PluginProposal) -> Self {
        self.plugins.push(proposal);
        self
    }

    pub fn method(&self) -> TweenMethod {
        self.method
    }

    pub fn start(&self) -> Option<TweenValue> {
        self.start
    }

    pub fn end(&self) -> Option<TweenValue> {
        self.end
    }

    pub fn delta(&self) -> Option<TweenValue> {
        self.delta
    }
}

/// Index key for tweens animating one property of one object
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PropertyKey {
    target: TargetKey,
    property: Rc<str>,
}

impl PropertyKey {
    fn of(tween: &Tween) -> Option<Self> {
        Some(Self {
            target: tween.target()?.key(),
            property: Rc::clone(tween.property()),
        })
    }
}

fn target_alive(liveness: &Option<LivenessCheck>, tween: &Tween) -> bool {
    tween
        .target()
        .and_then(Target::upgrade)
        .is_some_and(|target| {
            target.is_alive() && liveness.as_ref().map_or(true, |check| check(&*target))
        })
}

pub struct Scheduler {
    tweens: SlotMap<TweenId, Tween>,
    groups: SlotMap<GroupId, Group>,
    /// Groups holding at least one tween, in registration order
    active: Vec<GroupId>,
    index: FxHashMap<PropertyKey, SmallVec<[TweenId; 2]>>,
    tween_pool: Pool<Tween>,
    group_pool: Pool<Group>,
    liveness: Option<LivenessCheck>,
    defaults: Options,
    clock: Rc<dyn Clock>,
}

impl Scheduler {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self::with_config(clock, SchedulerConfig::default())
    }

    pub fn with_config(clock: Rc<dyn Clock>, config: SchedulerConfig) -> Self {
        let defaults = Options::global_defaults();
        register_defaults(&defaults);
        tracing::debug!(
            tween_pool = config.tween_pool_capacity,
            group_pool = config.group_pool_capacity,
            "scheduler created"
        );
        Self {
            tweens: SlotMap::with_key(),
            groups: SlotMap::with_key(),
            active: Vec::new(),
            index: FxHashMap::default(),
            tween_pool: Pool::new(config.tween_pool_capacity),
            group_pool: Pool::new(config.group_pool_capacity),
            liveness: None,
            defaults,
            clock,
        }
    }

    /// The global defaults node at the root of every options chain
    pub fn defaults(&self) -> &Options {
        &self.defaults
    }

    /// Create a template node below the global defaults
    ///
    /// Templates are owned by the caller and never recycled.
    pub fn create_template(&self) -> Options {
        Options::with_parent(&self.defaults)
    }

    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    /// Fail tweens whose target does not pass `check`
    pub fn set_liveness_check(&mut self, check: impl Fn(&dyn Animatable) -> bool + 'static) {
        self.liveness = Some(Box::new(check));
    }

    pub fn clear_liveness_check(&mut self) {
        self.liveness = None;
    }

    // ========================================================================
    // Groups
    // ========================================================================

    fn insert_group(&mut self, target: Option<Target>, parent: &Options) -> GroupId {
        let mut group = self.group_pool.take().unwrap_or_default();
        self.groups.insert_with_key(|id| {
            group.prepare(id, target, parent);
            group
        })
    }

    /// Create a group whose options inherit the global defaults
    ///
    /// The scheduler only releases a group once it held a tween. A group that
    /// never receives one stays alive until it is disposed with
    /// [`Scheduler::retain_group`] followed by [`Scheduler::release_group`].
    pub fn create_group(&mut self) -> GroupId {
        let defaults = self.defaults.clone();
        self.insert_group(None, &defaults)
    }

    /// Create a group whose options inherit `template`
    ///
    /// Disposal follows [`Scheduler::create_group`].
    pub fn create_group_with(&mut self, template: &Options) -> GroupId {
        self.insert_group(None, template)
    }

    /// Create a group with a default target
    ///
    /// Disposal follows [`Scheduler::create_group`].
    pub fn on<T: Animatable + 'static>(&mut self, target: &Rc<T>) -> GroupId {
        let defaults = self.defaults.clone();
        self.insert_group(Some(Target::new(target)), &defaults)
    }

    pub fn group_options(&self, group: GroupId) -> Result<Options> {
        self.groups
            .get(group)
            .map(|g| g.options().clone())
            .ok_or(SchedulerError::UnknownGroup)
    }

    /// Keep a group alive past the completion of its tweens
    pub fn retain_group(&mut self, group: GroupId) -> Result<u32> {
        let group = self
            .groups
            .get_mut(group)
            .ok_or(SchedulerError::UnknownGroup)?;
        Ok(group.retain.retain())
    }

    /// Drop a retain taken with [`Scheduler::retain_group`]
    ///
    /// An empty group is recycled by the release that takes its count to
    /// zero.
    pub fn release_group(&mut self, id: GroupId) -> Result<()> {
        let group = self.groups.get_mut(id).ok_or(SchedulerError::UnknownGroup)?;
        if group.user_retains() == 0 {
            tracing::error!(group = id.to_raw(), "group released more times than retained");
            return Err(RetainError::Underflow.into());
        }
        if group.retain.release()? == Release::Zero {
            self.recycle_group(id);
        }
        Ok(())
    }

    fn complete_group(&mut self, group: GroupId, method: CompletionMethod) -> Result<()> {
        let ids: Vec<TweenId> = self
            .groups
            .get(group)
            .ok_or(SchedulerError::UnknownGroup)?
            .tween_ids()
            .collect();
        for id in ids {
            if let Some(tween) = self.tweens.get_mut(id) {
                tween.complete(method, false);
            }
        }
        Ok(())
    }

    pub fn stop_group(&mut self, group: GroupId) -> Result<()> {
        self.complete_group(group, CompletionMethod::Stop)
    }

    pub fn finish_group(&mut self, group: GroupId) -> Result<()> {
        self.complete_group(group, CompletionMethod::Finish)
    }

    pub fn cancel_group(&mut self, group: GroupId) -> Result<()> {
        self.complete_group(group, CompletionMethod::Cancel)
    }

    // ========================================================================
    // Tweens
    // ========================================================================

    /// Add a tween to a group
    ///
    /// The tween is validated lazily on the next tick, or early through
    /// [`Scheduler::validate`].
    pub fn add(&mut self, group: GroupId, request: TweenRequest) -> Result<TweenId> {
        let owner = self.groups.get(group).ok_or(SchedulerError::UnknownGroup)?;
        let target = request
            .target
            .or_else(|| owner.target().cloned())
            .ok_or(SchedulerError::MissingTarget)?;
        let parent = owner.options().clone();

        let params = TweenParams {
            method: request.method,
            target,
            property: request.property,
            start: request.start,
            end: request.end,
            delta: request.delta,
            duration: request.duration,
            plugins: request.plugins,
        };
        let created = Timestamps::capture(&*self.clock);
        let mut tween = self.tween_pool.take().unwrap_or_default();
        let id = self.tweens.insert_with_key(|id| {
            tween.prepare(id, group, params, &parent, created);
            tween
        });

        if let Some(tween) = self.tweens.get_mut(id) {
            tween.retain.retain();
            tween.in_group = true;
            if let Some(key) = PropertyKey::of(tween) {
                self.index.entry(key).or_default().push(id);
            }
        }

        if let Some(owner) = self.groups.get_mut(group) {
            owner.fresh.push(id);
            if !owner.registered {
                owner.registered = true;
                owner.retain.retain();
                self.active.push(group);
            }
        }
        Ok(id)
    }

    pub fn to(
        &mut self,
        group: GroupId,
        property: &str,
        end: impl Into<TweenValue>,
        duration: f32,
    ) -> Result<TweenId> {
        self.add(group, TweenRequest::to(property, end).with_duration(duration))
    }

    pub fn from(
        &mut self,
        group: GroupId,
        property: &str,
        start: impl Into<TweenValue>,
        duration: f32,
    ) -> Result<TweenId> {
        self.add(group, TweenRequest::from(property, start).with_duration(duration))
    }

    pub fn from_to(
        &mut self,
        group: GroupId,
        property: &str,
        start: impl Into<TweenValue>,
        end: impl Into<TweenValue>,
        duration: f32,
    ) -> Result<TweenId> {
        self.add(
            group,
            TweenRequest::from_to(property, start, end).with_duration(duration),
        )
    }

    pub fn by(
        &mut self,
        group: GroupId,
        property: &str,
        delta: impl Into<TweenValue>,
        duration: f32,
    ) -> Result<TweenId> {
        self.add(group, TweenRequest::by(property, delta).with_duration(duration))
    }

    pub fn tween_options(&self, id: TweenId) -> Result<Options> {
        self.tweens
            .get(id)
            .map(|t| t.options().clone())
            .ok_or(SchedulerError::UnknownTween)
    }

    /// Attach a manual plugin proposal to a tween that was not validated yet
    pub fn add_plugin(&mut self, id: TweenId, proposal: PluginProposal) -> Result<()> {
        self.tweens
            .get_mut(id)
            .ok_or(SchedulerError::UnknownTween)?
            .add_plugin(proposal)
    }

    /// Validate a tween ahead of its first tick
    ///
    /// Returns whether the tween is validated. Failures leave the tween in
    /// `Error`, observable through [`Scheduler::error`].
    pub fn validate(&mut self, id: TweenId) -> Result<bool> {
        if !self.tweens.contains_key(id) {
            return Err(SchedulerError::UnknownTween);
        }
        Ok(self.validate_tween(id))
    }

    fn complete_tween(&mut self, id: TweenId, method: CompletionMethod) -> Result<()> {
        self.tweens
            .get_mut(id)
            .ok_or(SchedulerError::UnknownTween)?
            .complete(method, false);
        Ok(())
    }

    /// Complete a tween, leaving the property at its current value
    pub fn stop(&mut self, id: TweenId) -> Result<()> {
        self.complete_tween(id, CompletionMethod::Stop)
    }

    /// Complete a tween, writing its end value
    pub fn finish(&mut self, id: TweenId) -> Result<()> {
        self.complete_tween(id, CompletionMethod::Finish)
    }

    /// Complete a tween, writing its start value
    pub fn cancel(&mut self, id: TweenId) -> Result<()> {
        self.complete_tween(id, CompletionMethod::Cancel)
    }

    /// Stop every live tween animating `property` on `target`
    ///
    /// Returns the number of tweens stopped.
    pub fn stop_property(&mut self, target: &Target, property: &str) -> usize {
        let key = PropertyKey {
            target: target.key(),
            property: Rc::from(property),
        };
        let Some(ids) = self.index.get(&key).cloned() else {
            return 0;
        };
        ids.into_iter()
            .filter(|id| {
                self.tweens
                    .get_mut(*id)
                    .is_some_and(|tween| tween.complete(CompletionMethod::Stop, false))
            })
            .count()
    }

    /// Keep a tween queryable after it completes
    pub fn retain_tween(&mut self, id: TweenId) -> Result<u32> {
        let tween = self.tweens.get_mut(id).ok_or(SchedulerError::UnknownTween)?;
        Ok(tween.retain.retain())
    }

    /// Drop a retain taken with [`Scheduler::retain_tween`]
    pub fn release_tween(&mut self, id: TweenId) -> Result<()> {
        let tween = self.tweens.get_mut(id).ok_or(SchedulerError::UnknownTween)?;
        let held_by_group = u32::from(tween.in_group);
        if tween.retain.count() <= held_by_group {
            tracing::error!(tween = id.to_raw(), "tween released more times than retained");
            return Err(RetainError::Underflow.into());
        }
        if tween.retain.release()? == Release::Zero {
            self.recycle_tween(id);
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// State of a tween, `None` once it was recycled
    pub fn state(&self, id: TweenId) -> Option<TweenState> {
        self.tweens.get(id).map(Tween::state)
    }

    pub fn completion_reason(&self, id: TweenId) -> Option<CompletionReason> {
        self.tweens.get(id).map(Tween::reason)
    }

    pub fn error(&self, id: TweenId) -> Option<TweenError> {
        self.tweens.get(id).and_then(|t| t.error().cloned())
    }

    pub fn tween(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.get(id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            tweens: self.tweens.len(),
            groups: self.groups.len(),
            active_groups: self.active.len(),
            pooled_tweens: self.tween_pool.len(),
            pooled_groups: self.group_pool.len(),
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Run one update phase
    pub fn tick(&mut self, phase: UpdatePhase) {
        let groups: SmallVec<[GroupId; 8]> = self.active.iter().copied().collect();
        for group in groups {
            self.drain_fresh(group);
            self.update_bucket(group, phase);
            self.sweep_group(group);
        }
    }

    fn drain_fresh(&mut self, group: GroupId) {
        let fresh = match self.groups.get_mut(group) {
            Some(g) if !g.fresh.is_empty() => std::mem::take(&mut g.fresh),
            _ => return,
        };
        for &id in fresh.iter().rev() {
            self.validate_tween(id);
            let phase = match self.tweens.get_mut(id) {
                Some(tween) if tween.state().is_alive() => tween.cache_phase(),
                Some(_) => {
                    self.detach_tween(id);
                    continue;
                }
                None => continue,
            };
            if let Some(g) = self.groups.get_mut(group) {
                g.buckets[phase.index()].push(id);
            }
        }
    }

    fn update_bucket(&mut self, group: GroupId, phase: UpdatePhase) {
        let slot = phase.index();
        let len = match self.groups.get(group) {
            Some(g) => g.buckets[slot].len(),
            None => return,
        };
        for i in 0..len {
            let Some(id) = self
                .groups
                .get(group)
                .and_then(|g| g.buckets[slot].get(i).copied())
            else {
                break;
            };
            self.update_tween(id);
        }

        // Compact: overwrites may have completed tweens at any index
        let Some(g) = self.groups.get_mut(group) else {
            return;
        };
        let bucket = std::mem::take(&mut g.buckets[slot]);
        let (alive, done): (Vec<TweenId>, Vec<TweenId>) = bucket.into_iter().partition(|id| {
            self.tweens
                .get(*id)
                .is_some_and(|tween| tween.state().is_alive())
        });
        if let Some(g) = self.groups.get_mut(group) {
            g.buckets[slot] = alive;
        }
        for id in done {
            self.detach_tween(id);
        }
    }

    fn sweep_group(&mut self, id: GroupId) {
        let Some(group) = self.groups.get_mut(id) else {
            return;
        };
        if !group.registered || group.tween_count() > 0 {
            return;
        }
        group.registered = false;
        let released = group.retain.release();
        self.active.retain(|active| *active != id);
        match released {
            Ok(Release::Zero) => self.recycle_group(id),
            Ok(Release::Held(_)) => {}
            Err(err) => tracing::error!(group = id.to_raw(), %err, "group retain out of balance"),
        }
    }

    /// Validate an uninitialized tween and run `ON_INITIALIZE` overwrites
    fn validate_tween(&mut self, id: TweenId) -> bool {
        let liveness = &self.liveness;
        let Some(tween) = self.tweens.get_mut(id) else {
            return false;
        };
        if tween.state() != TweenState::Uninitialized {
            return tween.state().is_validated();
        }
        if !target_alive(liveness, tween) {
            tween.fail(TweenError::TargetInvalidated);
            return false;
        }
        if !tween.validate() {
            return false;
        }
        self.resolve_overwrites(id, OverwriteFlags::ON_INITIALIZE);
        true
    }

    /// Advance one tween, returning whether it is still alive
    ///
    /// Does nothing for tweens that already completed or failed.
    fn update_tween(&mut self, id: TweenId) -> bool {
        let liveness = &self.liveness;
        let Some(tween) = self.tweens.get_mut(id) else {
            return false;
        };
        if !tween.state().is_alive() {
            return false;
        }
        if !target_alive(liveness, tween) {
            tween.fail(TweenError::TargetInvalidated);
            return false;
        }
        if !self.validate_tween(id) {
            return false;
        }

        let clock = Rc::clone(&self.clock);
        let Some(tween) = self.tweens.get_mut(id) else {
            return false;
        };
        if tween.state() == TweenState::Waiting {
            match tween.try_start(&*clock) {
                StartOutcome::NotYet => return true,
                StartOutcome::Failed => return false,
                StartOutcome::Started => self.resolve_overwrites(id, OverwriteFlags::ON_START),
            }
        }

        match self.tweens.get_mut(id) {
            Some(tween) => tween.sample(&*clock),
            None => false,
        }
    }

    /// Complete live tweens on the same property whose policy gives way to
    /// `subject` at `trigger`
    fn resolve_overwrites(&mut self, subject: TweenId, trigger: OverwriteFlags) {
        let Some(tween) = self.tweens.get(subject) else {
            return;
        };
        let Some(key) = PropertyKey::of(tween) else {
            return;
        };
        let Some(others) = self.index.get(&key) else {
            return;
        };
        let others: SmallVec<[TweenId; 4]> =
            others.iter().copied().filter(|id| *id != subject).collect();
        let window = tween.window();
        let clock = Rc::clone(&self.clock);

        for id in others {
            let Some(other) = self.tweens.get_mut(id) else {
                continue;
            };
            if !other.state().is_alive() {
                continue;
            }
            let policy = other.options().overwrite().unwrap_or_default();
            let decision =
                overwrite::should_overwrite(policy, trigger, window, other.window(), &*clock);
            if let Some(method) = decision {
                tracing::debug!(
                    tween = id.to_raw(),
                    by = subject.to_raw(),
                    property = %key.property,
                    ?method,
                    "tween overwritten"
                );
                other.complete(method, true);
            }
        }
    }

    /// Drop the owning group's retain on a finished tween
    fn detach_tween(&mut self, id: TweenId) {
        let Some(tween) = self.tweens.get_mut(id) else {
            return;
        };
        if !tween.in_group {
            return;
        }
        tween.in_group = false;
        match tween.retain.release() {
            Ok(Release::Zero) => self.recycle_tween(id),
            Ok(Release::Held(_)) => {}
            Err(err) => tracing::error!(tween = id.to_raw(), %err, "tween retain out of balance"),
        }
    }

    fn recycle_tween(&mut self, id: TweenId) {
        let Some(mut tween) = self.tweens.remove(id) else {
            return;
        };
        if let Some(key) = PropertyKey::of(&tween) {
            if let Some(ids) = self.index.get_mut(&key) {
                ids.retain(|other| *other != id);
                if ids.is_empty() {
                    self.index.remove(&key);
                }
            }
        }
        let recycle = tween.options().recycle().unwrap_or(RecycleFlags::ALL);
        tween.reset();
        if recycle.contains(RecycleFlags::TWEENS) {
            self.tween_pool.give(tween);
        }
    }

    fn recycle_group(&mut self, id: GroupId) {
        let Some(mut group) = self.groups.remove(id) else {
            return;
        };
        if group.tween_count() > 0 {
            tracing::warn!(group = id.to_raw(), "recycling a group that still holds tweens");
        }
        let recycle = group.options().recycle().unwrap_or(RecycleFlags::ALL);
        group.reset();
        if recycle.contains(RecycleFlags::GROUPS) {
            self.group_pool.give(group);
        }
    }
}
