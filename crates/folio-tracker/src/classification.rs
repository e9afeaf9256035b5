//! Classification triggers and their de-duplication.
//!
//! The backend only acknowledges a trigger; the documents can keep reading as
//! "waiting" until its worker gets to them. A [`PendingClassification`]
//! remembers the counts at request time and stays outstanding until a later
//! snapshot shows the work was picked up and has settled. A request that is
//! never seen running expires after [`PICKUP_TIMEOUT`].

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use folio_core::{FolderId, ProgressSnapshot};
use folio_events::LockedJsonFile;
use serde::{Deserialize, Serialize};

use crate::error::TrackerResult;

/// How long an accepted trigger may sit unstarted before it is forgotten.
pub const PICKUP_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// File, inside the state directory, holding outstanding triggers per folder.
pub const LEDGER_FILE: &str = "classification.json";

/// Result of asking the backend to classify documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// Request accepted; progress polling will show completion.
    Queued,
    /// An earlier request has not settled yet; nothing was sent.
    AlreadyQueued,
    /// No document failed classification; nothing was sent.
    NothingFailed,
}

/// Which documents a trigger queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Documents waiting for their first classification.
    Waiting,
    /// Documents whose classification failed.
    Failed,
}

/// Where an outstanding trigger stands after a progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupStatus {
    /// Accepted but not seen running yet.
    Queued,
    /// Seen running, not settled.
    Running,
    /// Seen running and now settled.
    Finished,
    /// Never seen running within [`PICKUP_TIMEOUT`].
    Expired,
}

/// Trigger accepted by the backend whose completion has not been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClassification {
    /// Documents the trigger queued.
    pub kind: TriggerKind,
    /// `classification_waiting` when the trigger was sent.
    pub waiting_at_request: u64,
    /// `classification_failed` when the trigger was sent.
    pub failed_at_request: u64,
    /// `classification_done` when the trigger was sent.
    pub done_at_request: u64,
    /// When the backend accepted the trigger.
    pub requested_at: DateTime<Utc>,
    /// A snapshot has shown the queued work being processed.
    pub picked_up: bool,
}

impl PendingClassification {
    /// Record a trigger sent while `baseline` was current. `None` when the
    /// trigger queued nothing, so there is nothing to wait for.
    #[must_use]
    pub const fn new(
        kind: TriggerKind,
        baseline: &ProgressSnapshot,
        requested_at: DateTime<Utc>,
    ) -> Option<Self> {
        let queued = match kind {
            TriggerKind::Waiting => baseline.classification_waiting,
            TriggerKind::Failed => baseline.classification_failed,
        };
        if queued == 0 {
            return None;
        }
        Some(Self {
            kind,
            waiting_at_request: baseline.classification_waiting,
            failed_at_request: baseline.classification_failed,
            done_at_request: baseline.classification_done,
            requested_at,
            picked_up: false,
        })
    }

    const fn shows_pickup(&self, snapshot: &ProgressSnapshot) -> bool {
        if snapshot.classification_pending > 0 || snapshot.classification_done > self.done_at_request
        {
            return true;
        }
        match self.kind {
            TriggerKind::Waiting => snapshot.classification_waiting < self.waiting_at_request,
            TriggerKind::Failed => {
                snapshot.classification_waiting + snapshot.classification_failed
                    < self.waiting_at_request + self.failed_at_request
            }
        }
    }

    /// Fold a fresh snapshot into the request.
    pub fn observe(&mut self, snapshot: &ProgressSnapshot, now: DateTime<Utc>) -> PickupStatus {
        if !self.picked_up && self.shows_pickup(snapshot) {
            self.picked_up = true;
        }
        if self.picked_up {
            if snapshot.classification_settled() {
                PickupStatus::Finished
            } else {
                PickupStatus::Running
            }
        } else if (now - self.requested_at)
            .to_std()
            .is_ok_and(|elapsed| elapsed >= PICKUP_TIMEOUT)
        {
            PickupStatus::Expired
        } else {
            PickupStatus::Queued
        }
    }
}

/// Outstanding triggers persisted in the state directory, so separate
/// processes do not re-send a trigger another one is still waiting on.
#[derive(Debug, Clone)]
pub struct ClassificationLedger {
    file: LockedJsonFile,
}

impl ClassificationLedger {
    /// Ledger stored as [`LEDGER_FILE`] inside `state_dir`.
    #[must_use]
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            file: LockedJsonFile::new(state_dir.as_ref().join(LEDGER_FILE)),
        }
    }

    /// Outstanding trigger of `folder_id`, if any.
    #[must_use]
    pub fn load(&self, folder_id: FolderId) -> Option<PendingClassification> {
        self.file
            .read::<BTreeMap<String, PendingClassification>>()
            .get(&folder_id.to_string())
            .copied()
    }

    /// Replace (or clear, with `None`) the outstanding trigger of `folder_id`.
    ///
    /// # Errors
    /// Returns the persistence failure.
    pub fn store(
        &self,
        folder_id: FolderId,
        pending: Option<PendingClassification>,
    ) -> TrackerResult<()> {
        let key = folder_id.to_string();
        self.file
            .update(|map: &mut BTreeMap<String, PendingClassification>| match pending {
                Some(pending) => {
                    map.insert(key, pending);
                }
                None => {
                    map.remove(&key);
                }
            })?;
        Ok(())
    }
}
