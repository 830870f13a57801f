//! Re-entrancy guard for transitions.

/// Single flag that keeps transitions from overlapping.
///
/// A request that finds the guard engaged is dropped, not queued.
///
/// # Example
///
/// ```rust
/// use reelpath::core::TransitionGuard;
///
/// let mut guard = TransitionGuard::default();
/// assert!(guard.try_engage());
/// assert!(!guard.try_engage());
///
/// guard.release();
/// assert!(!guard.is_engaged());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransitionGuard {
    engaged: bool,
}

impl TransitionGuard {
    /// Engage the guard if it is free. Returns `false` when already engaged.
    pub fn try_engage(&mut self) -> bool {
        if self.engaged {
            return false;
        }
        self.engaged = true;
        true
    }

    pub fn release(&mut self) {
        self.engaged = false;
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_starts_released() {
        assert!(!TransitionGuard::default().is_engaged());
    }

    #[test]
    fn second_engage_is_refused() {
        let mut guard = TransitionGuard::default();
        assert!(guard.try_engage());
        assert!(!guard.try_engage());
        assert!(guard.is_engaged());
    }

    #[test]
    fn release_allows_engage_again() {
        let mut guard = TransitionGuard::default();
        guard.try_engage();
        guard.release();
        assert!(guard.try_engage());
    }

    #[test]
    fn release_is_idempotent() {
        let mut guard = TransitionGuard::default();
        guard.release();
        guard.release();
        assert!(!guard.is_engaged());
    }
}
