//! Scheduler-owned handles
//!
//! Tweens and groups live in slot maps owned by the scheduler. Handles carry a
//! generation, so a handle kept past the point where its object returned to
//! the pool resolves to nothing instead of aliasing the reused slot.

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a tween owned by a scheduler
    pub struct TweenId;
    /// Handle to a tween group owned by a scheduler
    pub struct GroupId;
}

impl TweenId {
    /// Convert to raw u64 for logging and external storage
    pub fn to_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

impl GroupId {
    /// Convert to raw u64 for logging and external storage
    pub fn to_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}
