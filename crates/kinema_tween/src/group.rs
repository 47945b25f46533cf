//! Tween groups
//!
//! A group batches tweens that share an options node and, optionally, a
//! default target. Newly added tweens wait in the fresh bucket until the next
//! tick validates them and moves each into the bucket of its update phase.

use kinema_core::{GroupId, Options, RetainCount, Target, TweenId, UpdatePhase};

pub struct Group {
    id: GroupId,
    target: Option<Target>,
    options: Options,
    pub(crate) fresh: Vec<TweenId>,
    pub(crate) buckets: [Vec<TweenId>; 3],
    pub(crate) retain: RetainCount,
    /// Whether the scheduler holds a retain on this group
    pub(crate) registered: bool,
}

impl Group {
    pub fn new() -> Self {
        Self {
            id: GroupId::default(),
            target: None,
            options: Options::new(),
            fresh: Vec::new(),
            buckets: Default::default(),
            retain: RetainCount::new(),
            registered: false,
        }
    }

    pub(crate) fn prepare(&mut self, id: GroupId, target: Option<Target>, parent: &Options) {
        self.id = id;
        self.target = target;
        self.options = Options::with_parent(parent);
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Default target for tweens that do not name their own
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn bucket(&self, phase: UpdatePhase) -> &[TweenId] {
        &self.buckets[phase.index()]
    }

    /// Tweens across the fresh bucket and all phase buckets
    pub fn tween_count(&self) -> usize {
        self.fresh.len() + self.buckets.iter().map(Vec::len).sum::<usize>()
    }

    pub fn tween_ids(&self) -> impl Iterator<Item = TweenId> + '_ {
        self.fresh
            .iter()
            .chain(self.buckets.iter().flatten())
            .copied()
    }

    /// Retains held by users, excluding the scheduler's own
    pub(crate) fn user_retains(&self) -> u32 {
        self.retain.count() - u32::from(self.registered)
    }

    pub(crate) fn reset(&mut self) {
        self.id = GroupId::default();
        self.target = None;
        self.options.reset();
        self.fresh.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.retain.reset();
        self.registered = false;
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}
