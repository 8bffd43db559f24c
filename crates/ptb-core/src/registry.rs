//! Process-wide map from user to the single run they may have active.
//!
//! Each user gets their own slot mutex, so start/stop traffic for one user
//! never blocks another. The slot holds the run's cancellation token plus a
//! run id; deregistration matches on the id, which makes the
//! natural-completion vs. cancel race harmless: whoever clears the slot first
//! wins and the other side is a no-op.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::{RunKind, UserId};

#[derive(Clone, Debug)]
struct ActiveRun {
    run_id: u64,
    kind: RunKind,
    cancel: CancellationToken,
}

/// The task-side half of an acquired slot. The winning task keeps it for the
/// whole run and hands it back through [`SessionRegistry::finish`].
#[derive(Clone, Debug)]
pub struct RunSlot {
    pub user: UserId,
    pub kind: RunKind,
    pub cancel: CancellationToken,
    run_id: u64,
}

#[derive(Debug)]
pub enum StartOutcome {
    Acquired(RunSlot),
    AlreadyRunning(RunKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled(RunKind),
    NotRunning,
}

#[derive(Default)]
pub struct SessionRegistry {
    users: Mutex<HashMap<UserId, Arc<Mutex<Option<ActiveRun>>>>>,
    next_run_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, user: UserId) -> Arc<Mutex<Option<ActiveRun>>> {
        let mut map = self.users.lock().await;
        map.entry(user).or_default().clone()
    }

    /// Atomic check-and-insert: of two simultaneous calls for the same user,
    /// exactly one acquires.
    pub async fn try_start(&self, user: UserId, kind: RunKind) -> StartOutcome {
        let slot = self.slot(user).await;
        let mut guard = slot.lock().await;
        if let Some(active) = guard.as_ref() {
            return StartOutcome::AlreadyRunning(active.kind);
        }

        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        *guard = Some(ActiveRun {
            run_id,
            kind,
            cancel: cancel.clone(),
        });

        StartOutcome::Acquired(RunSlot {
            user,
            kind,
            cancel,
            run_id,
        })
    }

    /// Signal the active run (if any) to stop and clear the slot immediately,
    /// so a follow-up `try_start` acquires without waiting for the cancelled
    /// task to unwind. Cancelling an already-finished run reports NotRunning.
    pub async fn cancel(&self, user: UserId) -> CancelOutcome {
        let slot = self.slot(user).await;
        let mut guard = slot.lock().await;
        match guard.take() {
            Some(active) => {
                active.cancel.cancel();
                CancelOutcome::Cancelled(active.kind)
            }
            None => CancelOutcome::NotRunning,
        }
    }

    /// Deregister after natural completion. Idempotent: a slot already cleared
    /// by [`cancel`](Self::cancel), or re-occupied by a newer run, is left
    /// alone.
    pub async fn finish(&self, run: &RunSlot) {
        let slot = self.slot(run.user).await;
        let mut guard = slot.lock().await;
        if guard.as_ref().map(|a| a.run_id) == Some(run.run_id) {
            *guard = None;
        }
    }

    pub async fn is_active(&self, user: UserId) -> bool {
        let slot = self.slot(user).await;
        let guard = slot.lock().await;
        guard.is_some()
    }
}
