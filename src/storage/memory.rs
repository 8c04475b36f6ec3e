//! In-memory storage backend.
//!
//! This module provides a thread-safe in-memory implementation of the storage
//! traits. It is intended for embedded usage, tests, and as a reference
//! implementation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use tracing::{debug, info, warn};

use crate::meal::{Difficulty, Meal, MealId};
use crate::record::{LeaderboardEntry, MealRecord, Outcome, SortBy};
use crate::storage::traits::{MealStore, OutcomeSink, StorageError};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

fn normalize_key(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

#[derive(Debug)]
struct MealState {
    by_id: BTreeMap<MealId, MealRecord>,
    by_name: HashMap<String, MealId>,
    next_id: u64,
}

impl Default for MealState {
    fn default() -> Self {
        Self {
            by_id: BTreeMap::new(),
            by_name: HashMap::new(),
            next_id: 1,
        }
    }
}

fn live_record(state: &MealState, id: MealId) -> Result<&MealRecord, StorageError> {
    let record = state.by_id.get(&id).ok_or(StorageError::MealNotFound(id))?;
    if record.deleted {
        return Err(StorageError::MealDeleted(id));
    }
    Ok(record)
}

fn live_record_mut(state: &mut MealState, id: MealId) -> Result<&mut MealRecord, StorageError> {
    let record = state
        .by_id
        .get_mut(&id)
        .ok_or(StorageError::MealNotFound(id))?;
    if record.deleted {
        return Err(StorageError::MealDeleted(id));
    }
    Ok(record)
}

fn compare_entries(sort_by: SortBy, a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    let primary = match sort_by {
        SortBy::Wins => b.wins.cmp(&a.wins),
        SortBy::WinPct => b.win_pct.total_cmp(&a.win_pct),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Thread-safe in-memory meal store.
///
/// Ids are assigned sequentially from 1 and never reused, even after
/// [`MealStore::clear`]. Names stay reserved after a soft delete.
#[derive(Debug, Default)]
pub struct InMemoryMealStore {
    state: RwLock<MealState>,
}

impl InMemoryMealStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Full record for a meal, including statistics and deleted records.
    ///
    /// # Errors
    ///
    /// Returns `MealNotFound` if the id was never assigned.
    pub fn record(&self, id: MealId) -> Result<MealRecord, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("meal.record"))?;
        state
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StorageError::MealNotFound(id))
    }

    /// Number of live (non-deleted) meals.
    ///
    /// # Errors
    ///
    /// Returns `Backend` if the lock is poisoned.
    pub fn live_count(&self) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("meal.live_count"))?;
        Ok(state.by_id.values().filter(|r| !r.deleted).count())
    }
}

impl OutcomeSink for InMemoryMealStore {
    fn report(&self, id: MealId, outcome: Outcome) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("meal.report"))?;
        let record = live_record_mut(&mut state, id).map_err(|e| {
            warn!(meal_id = %id, %outcome, error = %e, "rejected outcome report");
            e
        })?;
        record.apply(outcome);
        debug!(
            meal_id = %id,
            %outcome,
            battles = record.battles,
            wins = record.wins,
            "recorded outcome"
        );
        Ok(())
    }
}

impl MealStore for InMemoryMealStore {
    fn create(
        &self,
        name: &str,
        cuisine: &str,
        price: f64,
        difficulty: Difficulty,
    ) -> Result<MealId, StorageError> {
        Meal::validate_price(price)?;

        let mut state = self.state.write().map_err(|_| lock_err("meal.create"))?;
        let key = normalize_key(name);
        if state.by_name.contains_key(&key) {
            warn!(meal = name, "duplicate meal name");
            return Err(StorageError::DuplicateName(name.to_string()));
        }

        let id = MealId::new(state.next_id);
        let meal = Meal::new(id, name, cuisine, price, difficulty)?;
        state.next_id += 1;
        state.by_name.insert(key, id);
        state.by_id.insert(id, MealRecord::new(meal));

        info!(meal_id = %id, meal = name, "meal added");
        Ok(id)
    }

    fn delete(&self, id: MealId) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("meal.delete"))?;
        let record = live_record_mut(&mut state, id)?;
        record.deleted = true;
        info!(meal_id = %id, "meal marked as deleted");
        Ok(())
    }

    fn get(&self, id: MealId) -> Result<Meal, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("meal.get"))?;
        live_record(&state, id).map(|r| r.meal.clone())
    }

    fn get_by_name(&self, name: &str) -> Result<Meal, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("meal.get_by_name"))?;
        let id = state
            .by_name
            .get(&normalize_key(name))
            .copied()
            .ok_or_else(|| StorageError::NameNotFound(name.to_string()))?;
        live_record(&state, id).map(|r| r.meal.clone())
    }

    fn leaderboard(&self, sort_by: SortBy) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("meal.leaderboard"))?;
        let mut entries: Vec<LeaderboardEntry> = state
            .by_id
            .values()
            .filter(|r| !r.deleted)
            .filter_map(LeaderboardEntry::from_record)
            .collect();
        entries.sort_by(|a, b| compare_entries(sort_by, a, b));
        debug!(?sort_by, rows = entries.len(), "leaderboard retrieved");
        Ok(entries)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("meal.clear"))?;
        state.by_id.clear();
        state.by_name.clear();
        info!("all meals cleared");
        Ok(())
    }
}
