//! Refresh state machine: `Idle -> Refreshing -> Idle`

use keyway_domain::RefreshError;
use tokio::sync::oneshot;

/// What every waiter of one refresh cycle receives: the new access token or
/// the reason the cycle failed.
pub type RefreshOutcome = Result<String, RefreshError>;

pub(crate) type Waiter = oneshot::Sender<RefreshOutcome>;

/// Public view of the coordinator's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    /// No refresh in flight
    Idle,
    /// One refresh call in flight
    Refreshing {
        /// Callers waiting on its outcome
        waiters: usize,
    },
}

#[derive(Debug, Default)]
pub(crate) enum RefreshState {
    #[default]
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

impl RefreshState {
    pub(crate) fn phase(&self) -> RefreshPhase {
        match self {
            Self::Idle => RefreshPhase::Idle,
            Self::Refreshing { waiters } => RefreshPhase::Refreshing { waiters: waiters.len() },
        }
    }

    /// Enter `Refreshing` with the initiator as first waiter.
    pub(crate) fn begin(&mut self) -> oneshot::Receiver<RefreshOutcome> {
        let (tx, rx) = oneshot::channel();
        *self = Self::Refreshing { waiters: vec![tx] };
        rx
    }

    /// Join an in-flight cycle. Returns `None` when idle.
    pub(crate) fn join(&mut self) -> Option<oneshot::Receiver<RefreshOutcome>> {
        match self {
            Self::Idle => None,
            Self::Refreshing { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Some(rx)
            }
        }
    }

    /// Return to `Idle`, handing back the waiters of the closed cycle.
    pub(crate) fn finish(&mut self) -> Vec<Waiter> {
        match std::mem::take(self) {
            Self::Idle => Vec::new(),
            Self::Refreshing { waiters } => waiters,
        }
    }
}

/// Release every waiter with the same outcome. Waiters that stopped listening
/// (cancelled callers) are skipped.
pub(crate) fn release(waiters: Vec<Waiter>, outcome: &RefreshOutcome) -> usize {
    waiters
        .into_iter()
        .map(|waiter| waiter.send(outcome.clone()).is_ok())
        .filter(|delivered| *delivered)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_has_nobody_to_join() {
        let mut state = RefreshState::default();
        assert_eq!(state.phase(), RefreshPhase::Idle);
        assert!(state.join().is_none());
        assert!(state.finish().is_empty());
    }

    #[tokio::test]
    async fn finish_releases_every_waiter_once() {
        let mut state = RefreshState::default();
        let first = state.begin();
        let second = state.join().unwrap();
        let third = state.join().unwrap();
        assert_eq!(state.phase(), RefreshPhase::Refreshing { waiters: 3 });

        drop(third);
        let waiters = state.finish();
        assert_eq!(state.phase(), RefreshPhase::Idle);

        let delivered = release(waiters, &Ok("T2".to_string()));
        assert_eq!(delivered, 2);
        assert_eq!(first.await.unwrap(), Ok("T2".to_string()));
        assert_eq!(second.await.unwrap(), Ok("T2".to_string()));
    }
}
