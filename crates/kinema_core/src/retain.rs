//! Explicit retain counts
//!
//! Pooled objects stay reachable while something retains them. Every
//! `retain()` must be matched by exactly one `release()`; the release that
//! brings the count to zero hands the object back to its owner for recycling.

use crate::error::RetainError;

/// Outcome of a successful release
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// Still retained by this many holders
    Held(u32),
    /// Last holder released, the object may be recycled
    Zero,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetainCount {
    count: u32,
}

impl RetainCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_retained(&self) -> bool {
        self.count > 0
    }

    /// Add a holder, returning the new count
    pub fn retain(&mut self) -> u32 {
        self.count += 1;
        self.count
    }

    /// Drop a holder
    ///
    /// Releasing an object nobody retains is an error and leaves the count at
    /// zero.
    pub fn release(&mut self) -> Result<Release, RetainError> {
        match self.count {
            0 => Err(RetainError::Underflow),
            1 => {
                self.count = 0;
                Ok(Release::Zero)
            }
            n => {
                self.count = n - 1;
                Ok(Release::Held(self.count))
            }
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_retain_release() {
        let mut rc = RetainCount::new();
        assert_eq!(rc.retain(), 1);
        assert_eq!(rc.retain(), 2);
        assert_eq!(rc.release(), Ok(Release::Held(1)));
        assert_eq!(rc.release(), Ok(Release::Zero));
        assert!(!rc.is_retained());
    }

    #[test]
    fn test_double_release() {
        let mut rc = RetainCount::new();
        rc.retain();
        assert_eq!(rc.release(), Ok(Release::Zero));
        assert_eq!(rc.release(), Err(RetainError::Underflow));
        assert_eq!(rc.count(), 0);
    }
}
