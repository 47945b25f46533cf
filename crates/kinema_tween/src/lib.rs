//! Kinema Tween
//!
//! Tween engine built on `kinema_core`.
//!
//! # Features
//!
//! - **Scheduler**: Owns tweens and groups, ticks them per update phase and
//!   recycles them through bounded pools
//! - **Plugin Negotiation**: Getter, setter and arithmetic hooks chosen per
//!   tween from automatic loaders and manual proposals
//! - **Overwrite Resolution**: Competing tweens on the same property give way
//!   according to their own overwrite policy
//! - **Built-in Plugins**: Name-based property access, typed closure
//!   accessors and linear arithmetic for every value kind
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use kinema_tween::{Animatable, ManualClock, Scheduler, TweenValue, UpdatePhase};
//!
//! struct Label {
//!     alpha: Cell<f32>,
//! }
//!
//! impl Animatable for Label {
//!     fn get_property(&self, property: &str) -> Option<TweenValue> {
//!         (property == "alpha").then(|| TweenValue::Float(self.alpha.get()))
//!     }
//!
//!     fn set_property(&self, property: &str, value: TweenValue) -> bool {
//!         match (property, value) {
//!             ("alpha", TweenValue::Float(v)) => {
//!                 self.alpha.set(v);
//!                 true
//!             }
//!             _ => false,
//!         }
//!     }
//! }
//!
//! let clock = ManualClock::new();
//! let mut scheduler = Scheduler::new(Rc::new(clock.clone()));
//! let label = Rc::new(Label { alpha: Cell::new(0.0) });
//!
//! let group = scheduler.on(&label);
//! scheduler.to(group, "alpha", 1.0f32, 0.5).unwrap();
//!
//! scheduler.tick(UpdatePhase::Update);
//! clock.advance(0.25);
//! scheduler.tick(UpdatePhase::Update);
//! assert_eq!(label.alpha.get(), 0.5);
//! ```

pub mod error;
pub mod group;
pub mod hooks;
pub mod overwrite;
pub mod plugins;
pub mod pool;
pub mod scheduler;
pub mod tween;

pub use kinema_core::*;

pub use error::{Result, SchedulerError, TweenError};
pub use group::Group;
pub use hooks::HookSet;
pub use overwrite::Window;
pub use plugins::{CallbackAccessor, LinearArithmetic, PropertyAccessor};
pub use scheduler::{LivenessCheck, Scheduler, SchedulerConfig, SchedulerStats, TweenRequest};
pub use tween::{StartOutcome, Tween};
