//! Layered options nodes
//!
//! An [`Options`] handle points to a node holding optional configuration
//! fields and an optional parent. Reading a field returns the nearest value
//! defined on the node or one of its ancestors; writing is always local.
//!
//! The engine builds chains of the form
//! `global defaults → template → group → tween`:
//!
//! ```rust
//! use kinema_core::{Options, UpdatePhase};
//!
//! let defaults = Options::global_defaults();
//! let group = Options::with_parent(&defaults);
//! group.set_phase(UpdatePhase::LateUpdate);
//!
//! let tween = Options::with_parent(&group);
//! assert_eq!(tween.phase(), Some(UpdatePhase::LateUpdate));
//! assert_eq!(tween.local_phase(), None);
//! ```
//!
//! Event listeners are local to a node, but firing an event on a node runs its
//! own listeners and then the listeners of every ancestor, nearest first.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::easing::Easing;
use crate::error::OptionsError;
use crate::events::{EventKind, Listener, ListenerId, ListenerTable, TweenEvent};
use crate::flags::{OverwriteFlags, RecycleFlags};
use crate::log::LogLevel;
use crate::plugin::{PluginLoader, PluginRegistration};
use crate::time::{TimeBase, UpdatePhase};

#[derive(Default)]
struct OptionsNode {
    parent: RefCell<Option<Options>>,
    duration: Cell<Option<f32>>,
    easing: Cell<Option<Easing>>,
    phase: Cell<Option<UpdatePhase>>,
    time_base: Cell<Option<TimeBase>>,
    start_delay: Cell<Option<f32>>,
    overwrite: Cell<Option<OverwriteFlags>>,
    recycle: Cell<Option<RecycleFlags>>,
    log_level: Cell<Option<LogLevel>>,
    plugins: RefCell<Vec<PluginRegistration>>,
    listeners: RefCell<ListenerTable>,
}

/// Shared handle to an options node
///
/// Cloning the handle shares the node.
#[derive(Clone, Default)]
pub struct Options {
    node: Rc<OptionsNode>,
}

macro_rules! options_fields {
    ($(
        $(#[$doc:meta])*
        $field:ident: $ty:ty => $local:ident, $set:ident, $with:ident;
    )*) => {
        impl Options {
            $(
                $(#[$doc])*
                pub fn $field(&self) -> Option<$ty> {
                    self.resolve(|node| node.$field.get())
                }

                pub fn $local(&self) -> Option<$ty> {
                    self.node.$field.get()
                }

                pub fn $set(&self, value: impl Into<Option<$ty>>) {
                    self.node.$field.set(value.into());
                }

                pub fn $with(self, value: $ty) -> Self {
                    self.$set(value);
                    self
                }
            )*
        }
    };
}

options_fields! {
    /// Tween duration in seconds of the tween's time base
    duration: f32 => local_duration, set_duration, with_duration;
    easing: Easing => local_easing, set_easing, with_easing;
    /// Update phase the tween is ticked in
    phase: UpdatePhase => local_phase, set_phase, with_phase;
    time_base: TimeBase => local_time_base, set_time_base, with_time_base;
    /// Delay in seconds between creation and start
    start_delay: f32 => local_start_delay, set_start_delay, with_start_delay;
    recycle: RecycleFlags => local_recycle, set_recycle, with_recycle;
    log_level: LogLevel => local_log_level, set_log_level, with_log_level;
}

impl Options {
    /// Create a detached node with every field undefined
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node whose unset fields resolve through `parent`
    pub fn with_parent(parent: &Options) -> Self {
        let options = Self::new();
        *options.node.parent.borrow_mut() = Some(parent.clone());
        options
    }

    /// Create a root node defining every field
    ///
    /// Plugin registrations are left to the owner of the defaults.
    pub fn global_defaults() -> Self {
        let options = Self::new()
            .with_duration(1.0)
            .with_easing(Easing::Linear)
            .with_phase(UpdatePhase::Update)
            .with_time_base(TimeBase::Scaled)
            .with_start_delay(0.0)
            .with_recycle(RecycleFlags::ALL)
            .with_log_level(LogLevel::Warn);
        options.node.overwrite.set(Some(OverwriteFlags::DEFAULT));
        options
    }

    pub fn parent(&self) -> Option<Options> {
        self.node.parent.borrow().clone()
    }

    /// Attach to a new parent, or detach with `None`
    ///
    /// Rejects a parent whose chain already contains this node.
    pub fn set_parent(&self, parent: Option<&Options>) -> Result<(), OptionsError> {
        if let Some(parent) = parent {
            if parent.chain().any(|ancestor| ancestor.ptr_eq(self)) {
                return Err(OptionsError::Cycle);
            }
        }
        *self.node.parent.borrow_mut() = parent.cloned();
        Ok(())
    }

    /// Whether both handles share the same node
    pub fn ptr_eq(&self, other: &Options) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Iterate this node and its ancestors, nearest first
    pub fn chain(&self) -> impl Iterator<Item = Options> {
        std::iter::successors(Some(self.clone()), |options| options.parent())
    }

    fn resolve<T>(&self, read: impl Fn(&OptionsNode) -> Option<T>) -> Option<T> {
        self.chain().find_map(|options| read(&options.node))
    }

    // ========================================================================
    // Overwrite policy
    // ========================================================================

    pub fn overwrite(&self) -> Option<OverwriteFlags> {
        self.resolve(|node| node.overwrite.get())
    }

    pub fn local_overwrite(&self) -> Option<OverwriteFlags> {
        self.node.overwrite.get()
    }

    /// Set the overwrite policy
    ///
    /// Flags combining more than one trigger, method or scope are rejected
    /// with a warning and the previous value is kept.
    pub fn set_overwrite(
        &self,
        flags: impl Into<Option<OverwriteFlags>>,
    ) -> Result<(), OptionsError> {
        let flags = flags.into();
        if let Some(flags) = flags {
            if let Err(err) = flags.validate() {
                if self.log_level().unwrap_or_default().allows(LogLevel::Warn) {
                    tracing::warn!(%err, "rejected overwrite flags, keeping previous policy");
                }
                return Err(err);
            }
        }
        self.node.overwrite.set(flags);
        Ok(())
    }

    /// Builder form of [`Options::set_overwrite`]; invalid flags are logged
    /// and ignored
    pub fn with_overwrite(self, flags: OverwriteFlags) -> Self {
        let _ = self.set_overwrite(flags);
        self
    }

    // ========================================================================
    // Plugin registrations
    // ========================================================================

    /// Register a plugin loader on this node
    ///
    /// Registering a loader with the same id again updates the existing entry
    /// in place.
    pub fn enable_plugin(&self, loader: Rc<dyn PluginLoader>, enabled: bool, required: bool) {
        let mut plugins = self.node.plugins.borrow_mut();
        let registration = PluginRegistration {
            loader,
            enabled,
            required,
        };
        match plugins.iter_mut().find(|r| r.id() == registration.id()) {
            Some(existing) => *existing = registration,
            None => plugins.push(registration),
        }
    }

    /// Disable a loader for this node and its descendants
    pub fn disable_plugin(&self, loader: Rc<dyn PluginLoader>) {
        self.enable_plugin(loader, false, false);
    }

    pub fn with_plugin(self, loader: Rc<dyn PluginLoader>, required: bool) -> Self {
        self.enable_plugin(loader, true, required);
        self
    }

    pub fn local_plugins(&self) -> Vec<PluginRegistration> {
        self.node.plugins.borrow().clone()
    }

    /// Registrations merged across the chain
    ///
    /// A descendant's entry replaces an ancestor's entry for the same loader
    /// but keeps the ancestor's position. Loaders first declared further down
    /// the chain come after those declared above.
    pub fn resolved_plugins(&self) -> Vec<PluginRegistration> {
        let nodes: Vec<Options> = self.chain().collect();
        let mut merged: IndexMap<&'static str, PluginRegistration> = IndexMap::new();
        for options in nodes.iter().rev() {
            for registration in options.node.plugins.borrow().iter() {
                merged.insert(registration.id(), registration.clone());
            }
        }
        merged.into_values().collect()
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Subscribe to an event on this node
    pub fn on(&self, kind: EventKind, listener: impl Fn(&TweenEvent) + 'static) -> ListenerId {
        self.add_listener(kind, Rc::new(listener))
    }

    pub fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId {
        self.node.listeners.borrow_mut().add(kind, listener)
    }

    pub fn on_initialize(&self, listener: impl Fn(&TweenEvent) + 'static) -> ListenerId {
        self.on(EventKind::Initialize, listener)
    }

    pub fn on_start(&self, listener: impl Fn(&TweenEvent) + 'static) -> ListenerId {
        self.on(EventKind::Start, listener)
    }

    pub fn on_update(&self, listener: impl Fn(&TweenEvent) + 'static) -> ListenerId {
        self.on(EventKind::Update, listener)
    }

    pub fn on_complete(&self, listener: impl Fn(&TweenEvent) + 'static) -> ListenerId {
        self.on(EventKind::Complete, listener)
    }

    pub fn on_error(&self, listener: impl Fn(&TweenEvent) + 'static) -> ListenerId {
        self.on(EventKind::Error, listener)
    }

    /// Unsubscribe, returning whether the listener was registered here
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        self.node.listeners.borrow_mut().remove(kind, id)
    }

    /// Whether this node or any ancestor listens for `kind`
    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.chain()
            .any(|options| options.node.listeners.borrow().has(kind))
    }

    /// Fire an event on this node and every ancestor, nearest first
    ///
    /// Each node's listener list is snapshotted right before dispatch, so a
    /// listener may subscribe or unsubscribe without affecting this delivery.
    pub fn fire(&self, event: &TweenEvent) {
        for options in self.chain() {
            let listeners = options.node.listeners.borrow().snapshot(event.kind);
            for listener in listeners {
                listener(event);
            }
        }
    }

    /// Remove every listener registered on this node
    pub fn clear_listeners(&self) {
        self.node.listeners.borrow_mut().clear();
    }

    /// Clear fields, registrations and listeners and detach from the parent
    pub fn reset(&self) {
        let node = &self.node;
        node.parent.borrow_mut().take();
        node.duration.set(None);
        node.easing.set(None);
        node.phase.set(None);
        node.time_base.set(None);
        node.start_delay.set(None);
        node.overwrite.set(None);
        node.recycle.set(None);
        node.log_level.set(None);
        node.plugins.borrow_mut().clear();
        node.listeners.borrow_mut().clear();
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = &self.node;
        f.debug_struct("Options")
            .field("has_parent", &node.parent.borrow().is_some())
            .field("duration", &node.duration.get())
            .field("easing", &node.easing.get())
            .field("phase", &node.phase.get())
            .field("time_base", &node.time_base.get())
            .field("start_delay", &node.start_delay.get())
            .field("overwrite", &node.overwrite.get())
            .field("recycle", &node.recycle.get())
            .field("log_level", &node.log_level.get())
            .field("plugins", &node.plugins.borrow())
            .field("listeners", &node.listeners.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{GroupId, TweenId};
    use crate::plugin::{PluginContext, PluginProposal};

    struct NamedLoader(&'static str);

    impl PluginLoader for NamedLoader {
        fn id(&self) -> &'static str {
            self.0
        }

        fn load(&self, _ctx: &PluginContext<'_>, _required: bool) -> Option<PluginProposal> {
            None
        }
    }

    fn event(kind: EventKind) -> TweenEvent {
        TweenEvent::new(kind, TweenId::default(), GroupId::default(), Rc::from("x"))
    }

    #[test]
    fn test_resolution_through_parent() {
        let parent = Options::new().with_duration(2.0);
        let child = Options::with_parent(&parent);
        child.set_duration(None);

        assert_eq!(child.duration(), Some(2.0));
        assert_eq!(child.local_duration(), None);

        child.set_duration(0.5);
        assert_eq!(child.duration(), Some(0.5));
        assert_eq!(parent.duration(), Some(2.0));
    }

    #[test]
    fn test_undefined_at_root() {
        let root = Options::new();
        let child = Options::with_parent(&root);
        assert_eq!(child.start_delay(), None);
        assert!(child.easing().is_none());
    }

    #[test]
    fn test_global_defaults_define_every_field() {
        let defaults = Options::global_defaults();
        assert_eq!(defaults.duration(), Some(1.0));
        assert!(matches!(defaults.easing(), Some(Easing::Linear)));
        assert_eq!(defaults.phase(), Some(UpdatePhase::Update));
        assert_eq!(defaults.time_base(), Some(TimeBase::Scaled));
        assert_eq!(defaults.start_delay(), Some(0.0));
        assert_eq!(defaults.overwrite(), Some(OverwriteFlags::DEFAULT));
        assert_eq!(defaults.recycle(), Some(RecycleFlags::ALL));
        assert_eq!(defaults.log_level(), Some(LogLevel::Warn));
    }

    #[test]
    fn test_invalid_overwrite_keeps_previous() {
        let options = Options::new().with_overwrite(OverwriteFlags::DEFAULT);
        let result = options.set_overwrite(OverwriteFlags::STOP | OverwriteFlags::FINISH);

        assert!(matches!(
            result,
            Err(OptionsError::ExclusiveFlags { group: "method", .. })
        ));
        assert_eq!(options.overwrite(), Some(OverwriteFlags::DEFAULT));

        assert!(options.set_overwrite(OverwriteFlags::empty()).is_ok());
        assert_eq!(options.overwrite(), Some(OverwriteFlags::empty()));
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let a = Options::new();
        let b = Options::with_parent(&a);
        let c = Options::with_parent(&b);

        assert_eq!(a.set_parent(Some(&c)), Err(OptionsError::Cycle));
        assert_eq!(a.set_parent(Some(&a)), Err(OptionsError::Cycle));
        assert!(a.parent().is_none());

        assert!(c.set_parent(Some(&a)).is_ok());
        assert!(c.parent().is_some_and(|p| p.ptr_eq(&a)));
    }

    #[test]
    fn test_events_bubble_nearest_first() {
        let root = Options::new();
        let group = Options::with_parent(&root);
        let tween = Options::with_parent(&group);
        let order = Rc::new(RefCell::new(Vec::new()));

        for (name, node) in [("root", &root), ("group", &group), ("tween", &tween)] {
            let order = Rc::clone(&order);
            node.on_complete(move |_| order.borrow_mut().push(name));
        }

        tween.fire(&event(EventKind::Complete));
        assert_eq!(*order.borrow(), vec!["tween", "group", "root"]);

        order.borrow_mut().clear();
        group.fire(&event(EventKind::Complete));
        assert_eq!(*order.borrow(), vec!["group", "root"]);

        assert!(tween.has_listeners(EventKind::Complete));
        assert!(!tween.has_listeners(EventKind::Update));
    }

    #[test]
    fn test_off_and_clear() {
        let parent = Options::new();
        let child = Options::with_parent(&parent);
        let id = child.on_start(|_| {});
        parent.on_start(|_| {});

        assert!(child.off(EventKind::Start, id));
        assert!(!child.off(EventKind::Start, id));
        assert!(child.has_listeners(EventKind::Start));

        parent.clear_listeners();
        assert!(!child.has_listeners(EventKind::Start));
    }

    #[test]
    fn test_plugin_merge_order() {
        let a: Rc<dyn PluginLoader> = Rc::new(NamedLoader("a"));
        let b: Rc<dyn PluginLoader> = Rc::new(NamedLoader("b"));
        let c: Rc<dyn PluginLoader> = Rc::new(NamedLoader("c"));

        let root = Options::new();
        root.enable_plugin(a.clone(), true, false);
        root.enable_plugin(b.clone(), true, false);

        let child = Options::with_parent(&root);
        child.enable_plugin(c, true, false);
        child.enable_plugin(a, true, true);

        let merged = child.resolved_plugins();
        let ids: Vec<_> = merged.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(merged[0].required);
        assert!(!root.resolved_plugins()[0].required);

        child.disable_plugin(b);
        let merged = child.resolved_plugins();
        assert!(!merged[1].enabled);
        assert_eq!(child.local_plugins().len(), 3);
    }

    #[test]
    fn test_reset() {
        let parent = Options::new().with_duration(3.0);
        let child = Options::with_parent(&parent).with_start_delay(1.0);
        child.on_error(|_| {});

        child.reset();
        assert!(child.parent().is_none());
        assert_eq!(child.duration(), None);
        assert_eq!(child.start_delay(), None);
        assert!(!child.has_listeners(EventKind::Error));
    }
}
