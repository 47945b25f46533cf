//! Built-in plugins
//!
//! - [`PropertyAccessor`]: getter and setter for [`Animatable`] targets
//! - [`CallbackAccessor`]: getter and setter from typed closures
//! - [`LinearArithmetic`]: arithmetic for every built-in value kind
//!
//! [`Animatable`]: kinema_core::Animatable

mod callback;
mod linear;
mod property;

pub use callback::CallbackAccessor;
pub use linear::LinearArithmetic;
pub use property::PropertyAccessor;

use std::rc::Rc;

use kinema_core::Options;

/// Register the automatic loaders every scheduler starts with
pub fn register_defaults(options: &Options) {
    options.enable_plugin(Rc::new(PropertyAccessor), true, false);
    options.enable_plugin(Rc::new(LinearArithmetic), true, false);
}
