//! Kinema Core
//!
//! Foundational types shared by the Kinema tween engine:
//!
//! - **Options**: Layered configuration nodes that resolve unset fields through
//!   their parent chain (global defaults → template → group → tween)
//! - **Events**: Initialize/start/update/complete/error listener lists that
//!   bubble from a node to every ancestor
//! - **Plugin Contracts**: Getter, setter and arithmetic hook traits plus the
//!   loaders that propose them
//! - **Values**: A small enum of tweenable value kinds (scalars and `glam` vectors)
//! - **Time**: Time bases, update phases and the host clock abstraction
//! - **Retain Counts**: Explicit reference counts gating pooled object reuse
//!
//! # Example
//!
//! ```rust
//! use kinema_core::{Easing, Options};
//!
//! let defaults = Options::global_defaults();
//! let template = Options::with_parent(&defaults).with_easing(Easing::QuadOut);
//! let group = Options::with_parent(&template).with_duration(2.0);
//!
//! assert_eq!(group.duration(), Some(2.0));
//! assert!(matches!(group.easing(), Some(Easing::QuadOut)));
//! assert_eq!(defaults.duration(), Some(1.0));
//! ```

pub mod easing;
pub mod error;
pub mod events;
pub mod flags;
pub mod handle;
pub mod lifecycle;
pub mod log;
pub mod options;
pub mod plugin;
pub mod retain;
pub mod target;
pub mod time;
pub mod value;

pub use easing::Easing;
pub use error::{HookError, OptionsError, RetainError};
pub use events::{EventKind, Listener, ListenerId, ListenerTable, TweenEvent};
pub use flags::{CompletionMethod, CompletionReason, OverwriteFlags, RecycleFlags};
pub use handle::{GroupId, TweenId};
pub use lifecycle::{TweenMethod, TweenState};
pub use log::LogLevel;
pub use options::Options;
pub use plugin::{
    Arithmetic, Getter, HookData, HookKind, PluginContext, PluginLoader, PluginProposal,
    PluginRegistration, Setter,
};
pub use retain::{Release, RetainCount};
pub use target::{downcast_target, Animatable, AsAny, Target, TargetKey};
pub use time::{Clock, ManualClock, SystemClock, TimeBase, Timestamps, UpdatePhase};
pub use value::{TweenValue, ValueKind};
