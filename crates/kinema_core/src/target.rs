//! Tween targets
//!
//! The engine never owns the objects it animates. A [`Target`] holds a weak
//! reference to an [`Animatable`]; once the host drops the object, the tweens
//! on it fail gracefully on their next update.

use std::any::Any;
use std::rc::{Rc, Weak};

use crate::value::TweenValue;

/// Upcast helper so hooks can recover the concrete target type
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An object whose properties can be tweened
///
/// The default methods expose no properties; such targets can still be
/// animated through closure accessors that downcast them.
pub trait Animatable: AsAny {
    /// Read a property by name
    fn get_property(&self, _property: &str) -> Option<TweenValue> {
        None
    }

    /// Write a property by name, returning whether the property exists
    fn set_property(&self, _property: &str, _value: TweenValue) -> bool {
        false
    }

    /// Whether the host still considers this object usable
    ///
    /// Called on every update in addition to the weak-reference check.
    fn is_alive(&self) -> bool {
        true
    }
}

/// Downcast a target to its concrete type
///
/// Takes `&dyn Animatable` rather than the `Rc` so the blanket `AsAny` impl
/// on the smart pointer is never picked.
pub fn downcast_target<T: Any>(target: &dyn Animatable) -> Option<&T> {
    target.as_any().downcast_ref::<T>()
}

/// Identity of a target object, stable while the object lives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetKey(usize);

/// Weak reference to a tweened object
#[derive(Clone)]
pub struct Target {
    inner: Weak<dyn Animatable>,
}

impl Target {
    pub fn new<T: Animatable + 'static>(target: &Rc<T>) -> Self {
        let strong: Rc<dyn Animatable> = Rc::clone(target) as Rc<dyn Animatable>;
        Self::from_dyn(&strong)
    }

    pub fn from_dyn(target: &Rc<dyn Animatable>) -> Self {
        Self {
            inner: Rc::downgrade(target),
        }
    }

    pub fn upgrade(&self) -> Option<Rc<dyn Animatable>> {
        self.inner.upgrade()
    }

    /// Whether the object still exists and reports itself alive
    pub fn is_alive(&self) -> bool {
        self.upgrade().is_some_and(|target| target.is_alive())
    }

    pub fn key(&self) -> TargetKey {
        TargetKey(self.inner.as_ptr() as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &Target) -> bool {
        self.key() == other.key()
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("key", &self.key())
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl<T: Animatable + 'static> From<&Rc<T>> for Target {
    fn from(target: &Rc<T>) -> Self {
        Target::new(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Sprite {
        alpha: Cell<f32>,
        visible: Cell<bool>,
    }

    impl Animatable for Sprite {
        fn get_property(&self, property: &str) -> Option<TweenValue> {
            (property == "alpha").then(|| TweenValue::Float(self.alpha.get()))
        }

        fn is_alive(&self) -> bool {
            self.visible.get()
        }
    }

    #[test]
    fn test_weak_target() {
        let sprite = Rc::new(Sprite {
            alpha: Cell::new(0.5),
            visible: Cell::new(true),
        });
        let target = Target::new(&sprite);

        assert!(target.is_alive());
        let strong = target.upgrade().unwrap();
        assert_eq!(strong.get_property("alpha"), Some(TweenValue::Float(0.5)));
        assert!(downcast_target::<Sprite>(&*strong).is_some());
        drop(strong);

        sprite.visible.set(false);
        assert!(!target.is_alive());

        drop(sprite);
        assert!(target.upgrade().is_none());
    }

    #[test]
    fn test_target_key_identity() {
        let a = Rc::new(Sprite {
            alpha: Cell::new(0.0),
            visible: Cell::new(true),
        });
        let b = Rc::new(Sprite {
            alpha: Cell::new(0.0),
            visible: Cell::new(true),
        });
        assert_eq!(Target::new(&a).key(), Target::new(&a).key());
        assert_ne!(Target::new(&a).key(), Target::new(&b).key());
    }
}
