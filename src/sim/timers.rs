//! Bookkeeping for host-owned timers
//!
//! The collaborator owns the clock. The session only remembers which handles
//! it still expects and what each one should trigger; anything else that fires
//! is stale.

use std::collections::BTreeMap;

use super::events::{Collaborator, TimerHandle};

/// What a pending timer resolves when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    IntroFinished,
    RespawnResolved,
    LevelTransition,
    InvulnerabilityEnd,
}

#[derive(Debug, Default)]
pub struct PendingTimers {
    pending: BTreeMap<TimerHandle, TimerPurpose>,
}

impl PendingTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the collaborator for a timer and remember why
    pub fn schedule<C: Collaborator>(
        &mut self,
        collaborator: &mut C,
        duration_ms: u32,
        purpose: TimerPurpose,
    ) -> TimerHandle {
        let handle = collaborator.request_timer(duration_ms);
        if let Some(previous) = self.pending.insert(handle, purpose) {
            log::warn!(
                "Collaborator reused live timer handle {:?} ({:?} replaced by {:?})",
                handle,
                previous,
                purpose
            );
        }
        handle
    }

    /// Claim a fired handle. `None` means the timer was discarded or never ours.
    pub fn take(&mut self, handle: TimerHandle) -> Option<TimerPurpose> {
        self.pending.remove(&handle)
    }

    /// Drop every timer with the given purpose
    pub fn discard<C: Collaborator>(&mut self, collaborator: &mut C, purpose: TimerPurpose) {
        let stale: Vec<TimerHandle> = self
            .pending
            .iter()
            .filter(|(_, p)| **p == purpose)
            .map(|(h, _)| *h)
            .collect();
        for handle in stale {
            self.pending.remove(&handle);
            collaborator.cancel_timer(handle);
        }
    }

    /// Drop everything (session reset, level reload)
    pub fn discard_all<C: Collaborator>(&mut self, collaborator: &mut C) {
        for handle in std::mem::take(&mut self.pending).into_keys() {
            collaborator.cancel_timer(handle);
        }
    }

    pub fn is_pending(&self, purpose: TimerPurpose) -> bool {
        self.pending.values().any(|p| *p == purpose)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testing::RecordingCollaborator;

    #[test]
    fn test_take_once() {
        let mut collab = RecordingCollaborator::default();
        let mut timers = PendingTimers::new();
        let handle = timers.schedule(&mut collab, 1000, TimerPurpose::RespawnResolved);
        assert_eq!(collab.timers, vec![(handle, 1000)]);
        assert_eq!(timers.take(handle), Some(TimerPurpose::RespawnResolved));
        assert_eq!(timers.take(handle), None);
    }

    #[test]
    fn test_discard_by_purpose_cancels() {
        let mut collab = RecordingCollaborator::default();
        let mut timers = PendingTimers::new();
        let intro = timers.schedule(&mut collab, 2000, TimerPurpose::IntroFinished);
        let invuln = timers.schedule(&mut collab, 4400, TimerPurpose::InvulnerabilityEnd);

        timers.discard(&mut collab, TimerPurpose::IntroFinished);
        assert_eq!(collab.cancelled, vec![intro]);
        assert!(!timers.is_pending(TimerPurpose::IntroFinished));
        assert!(timers.is_pending(TimerPurpose::InvulnerabilityEnd));
        assert_eq!(timers.take(intro), None);
        assert_eq!(timers.take(invuln), Some(TimerPurpose::InvulnerabilityEnd));
    }

    #[test]
    fn test_discard_all() {
        let mut collab = RecordingCollaborator::default();
        let mut timers = PendingTimers::new();
        timers.schedule(&mut collab, 10, TimerPurpose::IntroFinished);
        timers.schedule(&mut collab, 20, TimerPurpose::LevelTransition);
        timers.discard_all(&mut collab);
        assert!(timers.is_empty());
        assert_eq!(collab.cancelled.len(), 2);
    }
}
