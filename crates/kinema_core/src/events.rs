//! Tween lifecycle events and listener lists
//!
//! Every options node owns a [`ListenerTable`]. Firing an event on a node runs
//! the node's own listeners first and then bubbles to each ancestor, so a
//! listener on a group sees the events of all its tweens.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::flags::CompletionReason;
use crate::handle::{GroupId, TweenId};
use crate::value::TweenValue;

/// Kind of lifecycle event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Tween passed validation
    Initialize,
    /// Start delay elapsed and endpoints were resolved
    Start,
    /// Property written during an update
    Update,
    /// Tween completed naturally or early
    Complete,
    /// Tween failed
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Initialize,
        EventKind::Start,
        EventKind::Update,
        EventKind::Complete,
        EventKind::Error,
    ];

    pub fn index(self) -> usize {
        match self {
            EventKind::Initialize => 0,
            EventKind::Start => 1,
            EventKind::Update => 2,
            EventKind::Complete => 3,
            EventKind::Error => 4,
        }
    }
}

/// Payload passed to listeners
#[derive(Clone, Debug)]
pub struct TweenEvent {
    pub kind: EventKind,
    pub tween: TweenId,
    pub group: GroupId,
    pub property: Rc<str>,
    /// Set for `Complete` events
    pub reason: CompletionReason,
    /// Last value written, for `Update` and `Complete` events
    pub value: Option<TweenValue>,
    /// Failure message, for `Error` events
    pub error: Option<Rc<str>>,
}

impl TweenEvent {
    pub fn new(kind: EventKind, tween: TweenId, group: GroupId, property: Rc<str>) -> Self {
        Self {
            kind,
            tween,
            group,
            property,
            reason: CompletionReason::empty(),
            value: None,
            error: None,
        }
    }

    pub fn with_reason(mut self, reason: CompletionReason) -> Self {
        self.reason = reason;
        self
    }

    pub fn with_value(mut self, value: Option<TweenValue>) -> Self {
        self.value = value;
        self
    }

    pub fn with_error(mut self, error: impl Into<Rc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Event callback
pub type Listener = Rc<dyn Fn(&TweenEvent)>;

/// Identifies a listener within one table for removal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type ListenerList = SmallVec<[(ListenerId, Listener); 2]>;

/// One listener list per [`EventKind`]
#[derive(Default)]
pub struct ListenerTable {
    lists: [ListenerList; 5],
    next_id: u32,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.lists[kind.index()].push((id, listener));
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn remove(&mut self, kind: EventKind, id: ListenerId) -> bool {
        let list = &mut self.lists[kind.index()];
        match list.iter().position(|(existing, _)| *existing == id) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has(&self, kind: EventKind) -> bool {
        !self.lists[kind.index()].is_empty()
    }

    /// Copy of the listeners for `kind`
    ///
    /// Dispatch iterates a snapshot so listeners may subscribe or unsubscribe
    /// while the event is being delivered.
    pub fn snapshot(&self, kind: EventKind) -> SmallVec<[Listener; 2]> {
        self.lists[kind.index()]
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(|list| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(|list| list.is_empty())
    }

    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }
}

impl std::fmt::Debug for ListenerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerTable")
            .field("listeners", &self.len())
            .finish()
    }
}
