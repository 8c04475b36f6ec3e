//! Abstract storage traits for MealMax.
//!
//! These traits define the contract that record stores must implement.
//! By using traits, we enable:
//! - In-memory backends for testing and embedded use
//! - Database-backed stores owned by the host process

use thiserror::Error;

use crate::error::ValidationError;
use crate::meal::{Difficulty, Meal, MealId};
use crate::record::{LeaderboardEntry, Outcome, SortBy};

/// Errors that can occur during storage operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// No record with this id exists.
    #[error("Meal with ID {0} not found")]
    MealNotFound(MealId),

    /// No record with this name exists.
    #[error("Meal with name '{0}' not found")]
    NameNotFound(String),

    /// The record exists but has been soft-deleted.
    #[error("Meal with ID {0} has been deleted")]
    MealDeleted(MealId),

    /// A live or deleted record already uses this name.
    #[error("Meal with name '{0}' already exists")]
    DuplicateName(String),

    /// Input rejected before touching the store.
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationError),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Receives battle outcomes.
///
/// This is the only storage capability the battle engine needs.
pub trait OutcomeSink: Send + Sync {
    /// Records one outcome for a meal.
    ///
    /// # Errors
    /// - `MealNotFound`: no record with this id
    /// - `MealDeleted`: the record is soft-deleted
    fn report(&self, id: MealId, outcome: Outcome) -> Result<(), StorageError>;
}

/// Full record-store contract.
///
/// Lookups only ever expose non-deleted records.
pub trait MealStore: OutcomeSink {
    /// Validates and inserts a new meal, returning its assigned id.
    ///
    /// Names are unique after trimming and ASCII case folding, so `"burger"`
    /// is rejected once `"Burger"` exists. This is stricter than exact-match
    /// uniqueness. Names stay taken after a soft delete.
    ///
    /// # Errors
    /// - `Invalid`: price not positive, or blank name/cuisine
    /// - `DuplicateName`: the normalized name is already taken
    fn create(
        &self,
        name: &str,
        cuisine: &str,
        price: f64,
        difficulty: Difficulty,
    ) -> Result<MealId, StorageError>;

    /// Soft-deletes a meal.
    ///
    /// # Errors
    /// - `MealNotFound`: no record with this id
    /// - `MealDeleted`: already deleted
    fn delete(&self, id: MealId) -> Result<(), StorageError>;

    /// Gets a live meal by id.
    fn get(&self, id: MealId) -> Result<Meal, StorageError>;

    /// Gets a live meal by name (trimmed, case-insensitive).
    fn get_by_name(&self, name: &str) -> Result<Meal, StorageError>;

    /// Live meals that have fought at least once, best first.
    fn leaderboard(&self, sort_by: SortBy) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// Removes every record.
    fn clear(&self) -> Result<(), StorageError>;

    /// Same as [`OutcomeSink::report`].
    fn update_stats(&self, id: MealId, outcome: Outcome) -> Result<(), StorageError> {
        self.report(id, outcome)
    }
}
