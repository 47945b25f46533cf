//! Accessor for targets exposing properties through [`Animatable`]

use std::rc::Rc;

use kinema_core::{
    Animatable, Getter, HookData, HookError, PluginContext, PluginLoader, PluginProposal,
    Setter, TweenValue,
};

/// Reads and writes properties with `Animatable::get_property` and
/// `Animatable::set_property`
///
/// As a loader it declines targets that do not expose the property, unless it
/// is registered as required, in which case initialization reports the
/// missing property.
#[derive(Clone, Copy, Debug, Default)]
pub struct PropertyAccessor;

impl PropertyAccessor {
    pub const ID: &'static str = "kinema.animatable";
}

impl Getter for PropertyAccessor {
    fn initialize(&self, ctx: &PluginContext<'_>, _data: &mut HookData) -> Result<(), String> {
        let current = ctx
            .target
            .get_property(ctx.property)
            .ok_or_else(|| format!("property '{}' not found on target", ctx.property))?;
        current.expect_kind(ctx.kind).map_err(|err| err.to_string())
    }

    fn get(
        &self,
        target: &dyn Animatable,
        property: &str,
        _data: &HookData,
    ) -> Result<TweenValue, HookError> {
        target
            .get_property(property)
            .ok_or_else(|| HookError::PropertyNotFound(property.to_string()))
    }
}

impl Setter for PropertyAccessor {
    fn set(
        &self,
        target: &dyn Animatable,
        property: &str,
        value: TweenValue,
        _data: &HookData,
    ) -> Result<(), HookError> {
        if target.set_property(property, value) {
            Ok(())
        } else {
            Err(HookError::PropertyNotFound(property.to_string()))
        }
    }
}

impl PluginLoader for PropertyAccessor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn load(&self, ctx: &PluginContext<'_>, required: bool) -> Option<PluginProposal> {
        if !required && ctx.target.get_property(ctx.property).is_none() {
            return None;
        }
        Some(PluginProposal::new(Self::ID).with_accessor(Rc::new(*self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_core::{TweenId, TweenMethod, ValueKind};
    use std::cell::Cell;

    struct Light {
        intensity: Cell<f32>,
    }

    impl Animatable for Light {
        fn get_property(&self, property: &str) -> Option<TweenValue> {
            match property {
                "intensity" => Some(TweenValue::Float(self.intensity.get())),
                _ => None,
            }
        }

        fn set_property(&self, property: &str, value: TweenValue) -> bool {
            match (property, value) {
                ("intensity", TweenValue::Float(v)) => {
                    self.intensity.set(v);
                    true
                }
                _ => false,
            }
        }
    }

    fn ctx<'a>(light: &'a Light, property: &'a str, kind: ValueKind) -> PluginContext<'a> {
        PluginContext {
            tween: TweenId::default(),
            method: TweenMethod::To,
            property,
            target: light,
            kind,
        }
    }

    #[test]
    fn test_read_write() {
        let light = Light {
            intensity: Cell::new(0.2),
        };
        let accessor = PropertyAccessor;
        assert_eq!(
            accessor.get(&light, "intensity", &None),
            Ok(TweenValue::Float(0.2))
        );
        accessor
            .set(&light, "intensity", TweenValue::Float(0.9), &None)
            .unwrap();
        assert_eq!(light.intensity.get(), 0.9);
        assert!(accessor.get(&light, "color", &None).is_err());
    }

    #[test]
    fn test_loader_declines_unknown_property() {
        let light = Light {
            intensity: Cell::new(0.0),
        };
        let accessor = PropertyAccessor;
        assert!(accessor
            .load(&ctx(&light, "color", ValueKind::Float), false)
            .is_none());
        assert!(accessor
            .load(&ctx(&light, "intensity", ValueKind::Float), false)
            .is_some());

        // A required loader proposes anyway and reports during initialization
        let required = ctx(&light, "color", ValueKind::Float);
        assert!(accessor.load(&required, true).is_some());
        let err = Getter::initialize(&accessor, &required, &mut None).unwrap_err();
        assert!(err.contains("color"));
    }

    #[test]
    fn test_initialize_checks_kind() {
        let light = Light {
            intensity: Cell::new(0.0),
        };
        let accessor = PropertyAccessor;
        let ctx = ctx(&light, "intensity", ValueKind::Vec3);
        assert!(Getter::initialize(&accessor, &ctx, &mut None).is_err());
    }
}
