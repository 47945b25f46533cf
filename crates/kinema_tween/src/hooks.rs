//! Hook negotiation
//!
//! Decides which plugin reads, writes and computes a tween's value. Candidates
//! are offered in two passes:
//!
//! 1. Automatic: every enabled loader registered on the tween's options chain,
//!    in merged registration order. Proposals from loaders that are not
//!    required are installed weak.
//! 2. Manual: proposals attached to the tween itself, in declaration order,
//!    with their own weak flag.
//!
//! Per hook, a candidate replaces a weak installed hook, is ignored against a
//! strong installed hook if the candidate is weak, and conflicts with a strong
//! installed hook if it is strong itself.

use std::borrow::Cow;
use std::rc::Rc;

use kinema_core::{
    Animatable, Arithmetic, Getter, HookData, HookKind, PluginContext, PluginProposal,
    PluginRegistration, Setter, TweenValue,
};

use crate::error::TweenError;

/// One filled hook
pub struct HookSlot<H: ?Sized> {
    pub hook: Rc<H>,
    pub weak: bool,
    /// Name of the plugin that proposed the hook
    pub plugin: Cow<'static, str>,
    pub data: HookData,
}

/// The getter, setter and arithmetic hooks of one tween
#[derive(Default)]
pub struct HookSet {
    pub getter: Option<HookSlot<dyn Getter>>,
    pub setter: Option<HookSlot<dyn Setter>>,
    pub arithmetic: Option<HookSlot<dyn Arithmetic>>,
}

fn install<H: ?Sized>(
    slot: &mut Option<HookSlot<H>>,
    kind: HookKind,
    hook: &Rc<H>,
    plugin: &Cow<'static, str>,
    weak: bool,
) -> Result<(), TweenError> {
    if let Some(installed) = slot.as_ref() {
        if !installed.weak {
            if weak {
                tracing::trace!(
                    hook = %kind,
                    installed = %installed.plugin,
                    candidate = %plugin,
                    "weak candidate ignored"
                );
                return Ok(());
            }
            return Err(TweenError::PluginConflict {
                hook: kind,
                installed: installed.plugin.clone(),
                candidate: plugin.clone(),
            });
        }
    }
    *slot = Some(HookSlot {
        hook: Rc::clone(hook),
        weak,
        plugin: plugin.clone(),
        data: None,
    });
    Ok(())
}

fn initialize_slot<H: ?Sized>(
    slot: &mut Option<HookSlot<H>>,
    kind: HookKind,
    init: impl FnOnce(&H, &mut HookData) -> Result<(), String>,
) -> Result<(), TweenError> {
    let Some(slot) = slot.as_mut() else {
        return Err(TweenError::MissingHook(kind));
    };
    init(&*slot.hook, &mut slot.data).map_err(|message| TweenError::HookInitFailed {
        plugin: slot.plugin.clone(),
        hook: kind,
        message,
    })
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer every hook of a proposal
    pub fn offer(&mut self, proposal: &PluginProposal, weak: bool) -> Result<(), TweenError> {
        if let Some(getter) = &proposal.getter {
            install(&mut self.getter, HookKind::Getter, getter, &proposal.name, weak)?;
        }
        if let Some(setter) = &proposal.setter {
            install(&mut self.setter, HookKind::Setter, setter, &proposal.name, weak)?;
        }
        if let Some(arithmetic) = &proposal.arithmetic {
            install(
                &mut self.arithmetic,
                HookKind::Arithmetic,
                arithmetic,
                &proposal.name,
                weak,
            )?;
        }
        Ok(())
    }

    pub fn is_filled(&self, hook: HookKind) -> bool {
        match hook {
            HookKind::Getter => self.getter.is_some(),
            HookKind::Setter => self.setter.is_some(),
            HookKind::Arithmetic => self.arithmetic.is_some(),
        }
    }

    /// Name of the plugin filling `hook`
    pub fn plugin(&self, hook: HookKind) -> Option<&str> {
        match hook {
            HookKind::Getter => self.getter.as_ref().map(|s| s.plugin.as_ref()),
            HookKind::Setter => self.setter.as_ref().map(|s| s.plugin.as_ref()),
            HookKind::Arithmetic => self.arithmetic.as_ref().map(|s| s.plugin.as_ref()),
        }
    }

    pub fn clear(&mut self) {
        self.getter = None;
        self.setter = None;
        self.arithmetic = None;
    }

    fn initialize(&mut self, ctx: &PluginContext<'_>) -> Result<(), TweenError> {
        initialize_slot(&mut self.getter, HookKind::Getter, |hook, data| {
            hook.initialize(ctx, data)
        })?;
        initialize_slot(&mut self.setter, HookKind::Setter, |hook, data| {
            hook.initialize(ctx, data)
        })?;
        initialize_slot(&mut self.arithmetic, HookKind::Arithmetic, |hook, data| {
            hook.initialize(ctx, data)
        })
    }

    // ========================================================================
    // Hook calls
    // ========================================================================

    pub fn get(&self, target: &dyn Animatable, property: &str) -> Result<TweenValue, TweenError> {
        let slot = self
            .getter
            .as_ref()
            .ok_or(TweenError::MissingHook(HookKind::Getter))?;
        Ok(slot.hook.get(target, property, &slot.data)?)
    }

    pub fn set(
        &self,
        target: &dyn Animatable,
        property: &str,
        value: TweenValue,
    ) -> Result<(), TweenError> {
        let slot = self
            .setter
            .as_ref()
            .ok_or(TweenError::MissingHook(HookKind::Setter))?;
        Ok(slot.hook.set(target, property, value, &slot.data)?)
    }

    fn arithmetic(&self) -> Result<&HookSlot<dyn Arithmetic>, TweenError> {
        self.arithmetic
            .as_ref()
            .ok_or(TweenError::MissingHook(HookKind::Arithmetic))
    }

    pub fn delta(&self, start: TweenValue, end: TweenValue) -> Result<TweenValue, TweenError> {
        let slot = self.arithmetic()?;
        Ok(slot.hook.delta(start, end, &slot.data)?)
    }

    pub fn endpoint(&self, start: TweenValue, delta: TweenValue) -> Result<TweenValue, TweenError> {
        let slot = self.arithmetic()?;
        Ok(slot.hook.endpoint(start, delta, &slot.data)?)
    }

    pub fn value_at(
        &self,
        start: TweenValue,
        end: TweenValue,
        delta: TweenValue,
        position: f32,
    ) -> Result<TweenValue, TweenError> {
        let slot = self.arithmetic()?;
        Ok(slot.hook.value_at(start, end, delta, position, &slot.data)?)
    }
}

/// Fill and initialize all three hooks for one tween
///
/// The result depends only on the order and weak flags of the candidates, so
/// negotiating the same tween twice yields the same assignment.
pub fn negotiate(
    ctx: &PluginContext<'_>,
    registrations: &[PluginRegistration],
    manual: &[PluginProposal],
) -> Result<HookSet, TweenError> {
    let mut hooks = HookSet::new();

    for registration in registrations.iter().filter(|r| r.enabled) {
        match registration.loader.load(ctx, registration.required) {
            Some(proposal) => {
                let weak = proposal.weak || !registration.required;
                hooks.offer(&proposal, weak)?;
            }
            None if registration.required => {
                return Err(TweenError::RequiredPluginDeclined(registration.id()));
            }
            None => {}
        }
    }

    for proposal in manual {
        hooks.offer(proposal, proposal.weak)?;
    }

    for hook in HookKind::ALL {
        if !hooks.is_filled(hook) {
            return Err(TweenError::MissingHook(hook));
        }
    }

    hooks.initialize(ctx)?;
    Ok(hooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_core::{HookError, PluginLoader, TweenId, TweenMethod, ValueKind};

    struct Dummy;

    impl Animatable for Dummy {}

    struct Fixed(f32);

    impl Getter for Fixed {
        fn get(&self, _: &dyn Animatable, _: &str, _: &HookData) -> Result<TweenValue, HookError> {
            Ok(TweenValue::Float(self.0))
        }
    }

    impl Setter for Fixed {
        fn set(
            &self,
            _: &dyn Animatable,
            _: &str,
            _: TweenValue,
            _: &HookData,
        ) -> Result<(), HookError> {
            Ok(())
        }
    }

    struct FailingInit;

    impl Setter for FailingInit {
        fn initialize(&self, _: &PluginContext<'_>, _: &mut HookData) -> Result<(), String> {
            Err("read-only property".to_string())
        }

        fn set(
            &self,
            _: &dyn Animatable,
            _: &str,
            _: TweenValue,
            _: &HookData,
        ) -> Result<(), HookError> {
            Ok(())
        }
    }

    struct Decline;

    impl PluginLoader for Decline {
        fn id(&self) -> &'static str {
            "decline"
        }

        fn load(&self, _: &PluginContext<'_>, _: bool) -> Option<PluginProposal> {
            None
        }
    }

    struct Proposes(&'static str, f32);

    impl PluginLoader for Proposes {
        fn id(&self) -> &'static str {
            self.0
        }

        fn load(&self, _: &PluginContext<'_>, _: bool) -> Option<PluginProposal> {
            Some(PluginProposal::new(self.0).with_accessor(Rc::new(Fixed(self.1))))
        }
    }

    fn ctx(target: &Dummy) -> PluginContext<'_> {
        PluginContext {
            tween: TweenId::default(),
            method: TweenMethod::To,
            property: "x",
            target,
            kind: ValueKind::Float,
        }
    }

    fn accessor(name: &'static str, value: f32) -> PluginProposal {
        PluginProposal::new(name).with_accessor(Rc::new(Fixed(value)))
    }

    fn arithmetic() -> PluginProposal {
        PluginProposal::new("linear")
            .with_arithmetic(Rc::new(crate::plugins::LinearArithmetic))
            .weak()
    }

    fn registration(loader: Rc<dyn PluginLoader>, required: bool) -> PluginRegistration {
        PluginRegistration {
            loader,
            enabled: true,
            required,
        }
    }

    #[test]
    fn test_strong_strong_conflict() {
        let target = Dummy;
        let manual = [accessor("p1", 1.0), accessor("p2", 2.0), arithmetic()];
        let err = negotiate(&ctx(&target), &[], &manual).err();
        assert_eq!(
            err,
            Some(TweenError::PluginConflict {
                hook: HookKind::Getter,
                installed: "p1".into(),
                candidate: "p2".into(),
            })
        );
    }

    #[test]
    fn test_weak_rules() {
        let target = Dummy;

        // weak <- weak: candidate wins
        let manual = [
            accessor("first", 1.0).weak(),
            accessor("second", 2.0).weak(),
            arithmetic(),
        ];
        let hooks = negotiate(&ctx(&target), &[], &manual).unwrap();
        assert_eq!(hooks.plugin(HookKind::Getter), Some("second"));

        // weak <- strong: candidate wins
        let manual = [accessor("weak", 1.0).weak(), accessor("strong", 2.0), arithmetic()];
        let hooks = negotiate(&ctx(&target), &[], &manual).unwrap();
        assert_eq!(hooks.plugin(HookKind::Setter), Some("strong"));
        assert_eq!(hooks.get(&target, "x").unwrap(), TweenValue::Float(2.0));

        // strong <- weak: candidate ignored
        let manual = [accessor("strong", 1.0), accessor("weak", 2.0).weak(), arithmetic()];
        let hooks = negotiate(&ctx(&target), &[], &manual).unwrap();
        assert_eq!(hooks.plugin(HookKind::Getter), Some("strong"));
    }

    #[test]
    fn test_automatic_proposals_are_weak() {
        let target = Dummy;
        let registrations = [
            registration(Rc::new(Proposes("auto-a", 1.0)), false),
            registration(Rc::new(Proposes("auto-b", 2.0)), false),
        ];
        let manual = [accessor("manual", 3.0), arithmetic()];
        let hooks = negotiate(&ctx(&target), &registrations, &manual).unwrap();
        assert_eq!(hooks.plugin(HookKind::Getter), Some("manual"));

        // Without a manual accessor the later automatic loader wins
        let hooks = negotiate(&ctx(&target), &registrations, &[arithmetic()]).unwrap();
        assert_eq!(hooks.plugin(HookKind::Getter), Some("auto-b"));
    }

    #[test]
    fn test_required_loader_is_strong() {
        let target = Dummy;
        let registrations = [registration(Rc::new(Proposes("required", 1.0)), true)];
        let manual = [accessor("manual", 2.0), arithmetic()];
        let err = negotiate(&ctx(&target), &registrations, &manual).err();
        assert!(matches!(err, Some(TweenError::PluginConflict { .. })));
    }

    #[test]
    fn test_required_decline_fails() {
        let target = Dummy;
        let registrations = [registration(Rc::new(Decline), true)];
        let err = negotiate(&ctx(&target), &registrations, &[]).err();
        assert_eq!(err, Some(TweenError::RequiredPluginDeclined("decline")));

        // Optional loaders may decline freely
        let registrations = [registration(Rc::new(Decline), false)];
        let manual = [accessor("manual", 0.0), arithmetic()];
        assert!(negotiate(&ctx(&target), &registrations, &manual).is_ok());
    }

    #[test]
    fn test_disabled_registration_skipped() {
        let target = Dummy;
        let mut disabled = registration(Rc::new(Decline), true);
        disabled.enabled = false;
        let manual = [accessor("manual", 0.0), arithmetic()];
        assert!(negotiate(&ctx(&target), &[disabled], &manual).is_ok());
    }

    #[test]
    fn test_missing_hook() {
        let target = Dummy;
        let err = negotiate(&ctx(&target), &[], &[accessor("only", 0.0)]).err();
        assert_eq!(err, Some(TweenError::MissingHook(HookKind::Arithmetic)));
    }

    #[test]
    fn test_init_failure_carries_message() {
        let target = Dummy;
        let manual = [
            accessor("reader", 0.0),
            PluginProposal::new("locked").with_setter(Rc::new(FailingInit)),
            arithmetic(),
        ];
        // The strong reader setter conflicts with the strong locked setter
        assert!(negotiate(&ctx(&target), &[], &manual).is_err());

        let manual = [
            accessor("reader", 0.0).weak(),
            PluginProposal::new("locked").with_setter(Rc::new(FailingInit)),
            arithmetic(),
        ];
        let err = negotiate(&ctx(&target), &[], &manual).err();
        assert_eq!(
            err,
            Some(TweenError::HookInitFailed {
                plugin: "locked".into(),
                hook: HookKind::Setter,
                message: "read-only property".to_string(),
            })
        );
    }

    #[test]
    fn test_negotiation_is_deterministic() {
        let target = Dummy;
        let registrations = [registration(Rc::new(Proposes("auto", 1.0)), false)];
        let manual = [accessor("weak", 2.0).weak(), arithmetic()];
        let first = negotiate(&ctx(&target), &registrations, &manual).unwrap();
        let second = negotiate(&ctx(&target), &registrations, &manual).unwrap();
        for hook in HookKind::ALL {
            assert_eq!(first.plugin(hook), second.plugin(hook));
        }
    }
}
