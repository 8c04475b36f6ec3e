//! Optional diagnostic sink for battle events.
//!
//! Hosts that want more than `tracing` output can hand an observer to the
//! engine instead of installing process-wide state.

use std::sync::Mutex;

use tracing::warn;

use crate::meal::MealId;
use crate::record::Outcome;
use crate::storage::StorageError;

use super::Resolution;

/// Something that happened inside a [`BattleEngine`](crate::BattleEngine).
#[derive(Debug, Clone, PartialEq)]
pub enum BattleEvent {
    /// A meal entered the staging area.
    Staged {
        /// The staged meal.
        meal_id: MealId,
        /// Staging length after the insertion.
        staged: usize,
    },
    /// A battle finished and both outcomes were recorded.
    Resolved(Resolution),
    /// The record store rejected an outcome.
    ReportFailed {
        /// Meal whose outcome was rejected.
        meal_id: MealId,
        /// Outcome that was being recorded.
        outcome: Outcome,
        /// Store error.
        error: StorageError,
    },
    /// The staging area was emptied.
    Cleared {
        /// Number of meals removed.
        dropped: usize,
    },
}

/// Receives battle events synchronously.
pub trait BattleObserver: Send + Sync {
    /// Called once per event, in order.
    fn on_event(&self, event: &BattleEvent);
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<BattleEvent>>,
}

impl RecordingObserver {
    /// Creates an observer with no recorded events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    #[must_use]
    pub fn events(&self) -> Vec<BattleEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl BattleObserver for RecordingObserver {
    fn on_event(&self, event: &BattleEvent) {
        let mut events = self.events.lock().unwrap_or_else(|poisoned| {
            warn!(?event, "poisoned lock: recording observer, recovering");
            poisoned.into_inner()
        });
        events.push(event.clone());
    }
}
