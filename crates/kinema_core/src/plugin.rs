//! Plugin hook contracts
//!
//! A tween needs three hooks before it can run:
//! - [`Getter`]: read the property's current value
//! - [`Setter`]: write a new value
//! - [`Arithmetic`]: compute values between the endpoints
//!
//! Hooks are proposed by plugins. A [`PluginLoader`] registered on an options
//! node is offered every tween below that node and may decline or return a
//! [`PluginProposal`] filling any subset of the hooks. Proposals can also be
//! attached directly to a single tween.
//!
//! Each hook carries an opaque [`HookData`] slot, owned by the tween, that
//! the hook may fill during `initialize` and read back on every call.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::error::HookError;
use crate::handle::TweenId;
use crate::lifecycle::TweenMethod;
use crate::target::Animatable;
use crate::value::{TweenValue, ValueKind};

/// Per-hook user data owned by the tween
pub type HookData = Option<Box<dyn Any>>;

/// The three hooks a tween needs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    Getter,
    Setter,
    Arithmetic,
}

impl HookKind {
    pub const ALL: [HookKind; 3] = [HookKind::Getter, HookKind::Setter, HookKind::Arithmetic];
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HookKind::Getter => "getter",
            HookKind::Setter => "setter",
            HookKind::Arithmetic => "arithmetic",
        })
    }
}

/// What a loader or hook gets to see about the tween being negotiated
#[derive(Clone, Copy)]
pub struct PluginContext<'a> {
    pub tween: TweenId,
    pub method: TweenMethod,
    pub property: &'a str,
    pub target: &'a dyn Animatable,
    /// Kind shared by the tween's supplied endpoint values
    pub kind: ValueKind,
}

impl fmt::Debug for PluginContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("tween", &self.tween)
            .field("method", &self.method)
            .field("property", &self.property)
            .field("kind", &self.kind)
            .finish()
    }
}

// ============================================================================
// Hook Traits
// ============================================================================

/// Reads a property's current value
pub trait Getter {
    /// Prepare the hook for one tween
    ///
    /// Errors abort the tween with the returned message attached.
    fn initialize(&self, _ctx: &PluginContext<'_>, _data: &mut HookData) -> Result<(), String> {
        Ok(())
    }

    fn get(
        &self,
        target: &dyn Animatable,
        property: &str,
        data: &HookData,
    ) -> Result<TweenValue, HookError>;
}

/// Writes a property value
pub trait Setter {
    fn initialize(&self, _ctx: &PluginContext<'_>, _data: &mut HookData) -> Result<(), String> {
        Ok(())
    }

    fn set(
        &self,
        target: &dyn Animatable,
        property: &str,
        value: TweenValue,
        data: &HookData,
    ) -> Result<(), HookError>;
}

/// Computes values between two endpoints
///
/// Implementations must be pure: the same inputs always give the same output.
pub trait Arithmetic {
    fn initialize(&self, _ctx: &PluginContext<'_>, _data: &mut HookData) -> Result<(), String> {
        Ok(())
    }

    /// Difference between `end` and `start`
    fn delta(
        &self,
        start: TweenValue,
        end: TweenValue,
        data: &HookData,
    ) -> Result<TweenValue, HookError>;

    /// End value reached by applying `delta` to `start`
    fn endpoint(
        &self,
        start: TweenValue,
        delta: TweenValue,
        data: &HookData,
    ) -> Result<TweenValue, HookError>;

    /// Value at an eased `position`, which may leave `[0, 1]`
    fn value_at(
        &self,
        start: TweenValue,
        end: TweenValue,
        delta: TweenValue,
        position: f32,
        data: &HookData,
    ) -> Result<TweenValue, HookError>;
}

// ============================================================================
// Proposals and Loaders
// ============================================================================

/// A set of hooks offered by a plugin for one tween
#[derive(Clone)]
pub struct PluginProposal {
    pub name: Cow<'static, str>,
    pub getter: Option<Rc<dyn Getter>>,
    pub setter: Option<Rc<dyn Setter>>,
    pub arithmetic: Option<Rc<dyn Arithmetic>>,
    /// Weak hooks may be replaced by later candidates
    pub weak: bool,
}

impl PluginProposal {
    /// Create an empty, strong proposal
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            getter: None,
            setter: None,
            arithmetic: None,
            weak: false,
        }
    }

    pub fn with_getter(mut self, getter: Rc<dyn Getter>) -> Self {
        self.getter = Some(getter);
        self
    }

    pub fn with_setter(mut self, setter: Rc<dyn Setter>) -> Self {
        self.setter = Some(setter);
        self
    }

    /// Use one object as both getter and setter
    pub fn with_accessor<A: Getter + Setter + 'static>(mut self, accessor: Rc<A>) -> Self {
        self.getter = Some(accessor.clone() as Rc<dyn Getter>);
        self.setter = Some(accessor as Rc<dyn Setter>);
        self
    }

    pub fn with_arithmetic(mut self, arithmetic: Rc<dyn Arithmetic>) -> Self {
        self.arithmetic = Some(arithmetic);
        self
    }

    pub fn weak(mut self) -> Self {
        self.weak = true;
        self
    }

    pub fn strong(mut self) -> Self {
        self.weak = false;
        self
    }

    pub fn provides(&self, hook: HookKind) -> bool {
        match hook {
            HookKind::Getter => self.getter.is_some(),
            HookKind::Setter => self.setter.is_some(),
            HookKind::Arithmetic => self.arithmetic.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        HookKind::ALL.iter().all(|hook| !self.provides(*hook))
    }
}

impl fmt::Debug for PluginProposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginProposal")
            .field("name", &self.name)
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .field("arithmetic", &self.arithmetic.is_some())
            .field("weak", &self.weak)
            .finish()
    }
}

/// Offers hooks to tweens below the options node it is registered on
pub trait PluginLoader {
    /// Stable identity used to merge registrations across the options chain
    fn id(&self) -> &'static str;

    /// Propose hooks for a tween, or decline with `None`
    ///
    /// `required` tells the loader that declining fails the tween.
    fn load(&self, ctx: &PluginContext<'_>, required: bool) -> Option<PluginProposal>;
}

/// A loader registered on one options node
#[derive(Clone)]
pub struct PluginRegistration {
    pub loader: Rc<dyn PluginLoader>,
    pub enabled: bool,
    pub required: bool,
}

impl PluginRegistration {
    pub fn id(&self) -> &'static str {
        self.loader.id()
    }
}

impl fmt::Debug for PluginRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistration")
            .field("loader", &self.id())
            .field("enabled", &self.enabled)
            .field("required", &self.required)
            .finish()
    }
}
