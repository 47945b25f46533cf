//! Closure-based accessors
//!
//! For targets that do not implement property lookup by name, a
//! [`CallbackAccessor`] pairs a typed getter and setter closure. The target is
//! downcast to `T` on every call and values are converted to and from `V`.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use kinema_tween::{CallbackAccessor, ManualClock, Scheduler, TweenRequest, UpdatePhase};
//!
//! struct Door {
//!     angle: Cell<f32>,
//! }
//! impl kinema_tween::Animatable for Door {}
//!
//! let clock = ManualClock::new();
//! let mut scheduler = Scheduler::new(Rc::new(clock.clone()));
//! let door = Rc::new(Door { angle: Cell::new(0.0) });
//!
//! let hinge = CallbackAccessor::new(|d: &Door| d.angle.get(), |d: &Door, v: f32| d.angle.set(v));
//! let group = scheduler.on(&door);
//! scheduler
//!     .add(
//!         group,
//!         TweenRequest::to("angle", 90.0f32)
//!             .with_duration(1.0)
//!             .with_plugin(hinge.proposal("hinge")),
//!     )
//!     .unwrap();
//!
//! scheduler.tick(UpdatePhase::Update);
//! clock.advance(1.0);
//! scheduler.tick(UpdatePhase::Update);
//! assert_eq!(door.angle.get(), 90.0);
//! ```

use std::any::{type_name, Any};
use std::borrow::Cow;
use std::marker::PhantomData;
use std::rc::Rc;

use kinema_core::{
    downcast_target, Animatable, Getter, HookData, HookError, PluginContext, PluginProposal,
    Setter, TweenValue,
};

type GetFn<T, V> = Box<dyn Fn(&T) -> V>;
type SetFn<T, V> = Box<dyn Fn(&T, V)>;

/// Typed getter and setter closures for targets of type `T`
pub struct CallbackAccessor<T, V> {
    get: GetFn<T, V>,
    set: SetFn<T, V>,
    _marker: PhantomData<fn(V) -> V>,
}

impl<T, V> CallbackAccessor<T, V>
where
    T: Any,
    V: Into<TweenValue> + TryFrom<TweenValue, Error = HookError> + 'static,
{
    pub fn new(get: impl Fn(&T) -> V + 'static, set: impl Fn(&T, V) + 'static) -> Self {
        Self {
            get: Box::new(get),
            set: Box::new(set),
            _marker: PhantomData,
        }
    }

    /// Wrap into a strong proposal that fills the getter and setter hooks
    pub fn proposal(self, name: impl Into<Cow<'static, str>>) -> PluginProposal {
        PluginProposal::new(name).with_accessor(Rc::new(self))
    }

    fn downcast<'a>(&self, target: &'a dyn Animatable) -> Result<&'a T, HookError> {
        downcast_target::<T>(target).ok_or(HookError::TargetType(type_name::<T>()))
    }
}

impl<T, V> Getter for CallbackAccessor<T, V>
where
    T: Any,
    V: Into<TweenValue> + TryFrom<TweenValue, Error = HookError> + 'static,
{
    fn initialize(&self, ctx: &PluginContext<'_>, _data: &mut HookData) -> Result<(), String> {
        let target = self.downcast(ctx.target).map_err(|err| err.to_string())?;
        let current: TweenValue = (self.get)(target).into();
        current.expect_kind(ctx.kind).map_err(|err| err.to_string())
    }

    fn get(
        &self,
        target: &dyn Animatable,
        _property: &str,
        _data: &HookData,
    ) -> Result<TweenValue, HookError> {
        let target = self.downcast(target)?;
        Ok((self.get)(target).into())
    }
}

impl<T, V> Setter for CallbackAccessor<T, V>
where
    T: Any,
    V: Into<TweenValue> + TryFrom<TweenValue, Error = HookError> + 'static,
{
    fn set(
        &self,
        target: &dyn Animatable,
        _property: &str,
        value: TweenValue,
        _data: &HookData,
    ) -> Result<(), HookError> {
        let target = self.downcast(target)?;
        (self.set)(target, V::try_from(value)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::cell::Cell;

    struct Node {
        offset: Cell<Vec2>,
    }

    impl Animatable for Node {}

    struct Other;

    impl Animatable for Other {}

    fn accessor() -> CallbackAccessor<Node, Vec2> {
        CallbackAccessor::new(|n: &Node| n.offset.get(), |n: &Node, v| n.offset.set(v))
    }

    #[test]
    fn test_typed_round_trip() {
        let node = Node {
            offset: Cell::new(Vec2::ZERO),
        };
        let accessor = accessor();
        accessor
            .set(&node, "offset", TweenValue::Vec2(Vec2::new(1.0, 2.0)), &None)
            .unwrap();
        assert_eq!(
            accessor.get(&node, "offset", &None),
            Ok(TweenValue::Vec2(Vec2::new(1.0, 2.0)))
        );
    }

    #[test]
    fn test_wrong_target_type() {
        let accessor = accessor();
        let err = accessor.get(&Other, "offset", &None).unwrap_err();
        assert!(matches!(err, HookError::TargetType(_)));
    }

    #[test]
    fn test_wrong_value_kind() {
        let node = Node {
            offset: Cell::new(Vec2::ZERO),
        };
        let err = accessor()
            .set(&node, "offset", TweenValue::Float(1.0), &None)
            .unwrap_err();
        assert!(matches!(err, HookError::KindMismatch { .. }));
    }
}
