//! Cancellable deferred slot
//!
//! Holds at most one pending action with an absolute due time. Arming an
//! armed slot replaces the previous binding, so a newer command always
//! supersedes an older one for the same slot.

/// A single reschedulable delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deferred<T> {
    pending: Option<(u64, T)>,
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deferred<T> {
    /// Empty slot
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Arm the slot to fire at `due_ms`
    ///
    /// Returns true if a pending action was superseded.
    pub fn arm(&mut self, due_ms: u64, payload: T) -> bool {
        self.pending.replace((due_ms, payload)).is_some()
    }

    /// Drop the pending action, returning its payload
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    /// Due time of the pending action
    pub fn due_at(&self) -> Option<u64> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the payload if it is due at `now_ms`
    pub fn take_due(&mut self, now_ms: u64) -> Option<T> {
        match self.pending {
            Some((due, _)) if due <= now_ms => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_when_due() {
        let mut slot = Deferred::new();
        assert!(!slot.arm(100, 'a'));
        assert_eq!(slot.take_due(99), None);
        assert_eq!(slot.take_due(100), Some('a'));
        assert_eq!(slot.take_due(200), None);
        assert!(!slot.is_armed());
    }

    #[test]
    fn test_rearm_supersedes() {
        let mut slot = Deferred::new();
        slot.arm(100, 1);
        assert!(slot.arm(500, 2));
        assert_eq!(slot.take_due(100), None);
        assert_eq!(slot.due_at(), Some(500));
        assert_eq!(slot.take_due(600), Some(2));
    }

    #[test]
    fn test_cancel() {
        let mut slot = Deferred::new();
        slot.arm(10, ());
        assert_eq!(slot.cancel(), Some(()));
        assert_eq!(slot.due_at(), None);
        assert_eq!(slot.take_due(u64::MAX), None);
    }
}
