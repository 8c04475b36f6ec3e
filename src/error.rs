//! Error types for MealMax.
//!
//! All errors in MealMax are strongly typed using thiserror.
//! This enables pattern matching on specific error conditions
//! and provides clear error messages.

use thiserror::Error;

use crate::meal::MealId;
use crate::random::RandomError;
use crate::record::Outcome;
use crate::storage::StorageError;

/// Validation errors raised while constructing values from raw input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Price {value} is invalid: price must be a positive number")]
    NonPositivePrice {
        value: f64,
    },

    #[error("Invalid difficulty '{value}': must be one of LOW, MED, HIGH")]
    InvalidDifficulty {
        value: String,
    },

    #[error("Field '{field}' cannot be empty")]
    EmptyField {
        field: &'static str,
    },

    #[error("Invalid outcome '{value}': expected 'win' or 'loss'")]
    InvalidOutcome {
        value: String,
    },

    #[error("Invalid sort key '{value}': expected 'wins' or 'win_pct'")]
    InvalidSortKey {
        value: String,
    },

    #[error("Delta scale {value} is invalid: must be a positive, finite number")]
    NonPositiveScale {
        value: f64,
    },
}

/// Top-level error type for MealMax.
///
/// Every error is raised synchronously to the caller of the operation that
/// detected it. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum MealMaxError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Staging area full: at most {capacity} combatants can be staged")]
    Capacity {
        capacity: usize,
    },

    #[error("Two combatants required: {staged} staged, {required} needed")]
    State {
        staged: usize,
        required: usize,
    },

    #[error("Random fetch failed: {0}")]
    RandomFetch(#[from] RandomError),

    #[error("Failed to record '{outcome}' for meal {meal_id}: {source}")]
    RecordUpdate {
        meal_id: MealId,
        outcome: Outcome,
        #[source]
        source: StorageError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl MealMaxError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if a combatant was staged into a full staging area.
    #[must_use]
    pub const fn is_capacity(&self) -> bool {
        matches!(self, Self::Capacity { .. })
    }

    /// Returns true if an operation was called in the wrong phase.
    #[must_use]
    pub const fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    /// Returns true if the randomness source failed.
    #[must_use]
    pub const fn is_random_fetch(&self) -> bool {
        matches!(self, Self::RandomFetch(_))
    }

    /// Returns true if the record store rejected an outcome report.
    #[must_use]
    pub const fn is_record_update(&self) -> bool {
        matches!(self, Self::RecordUpdate { .. })
    }

    /// Returns true if the host may reasonably retry the failed operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RandomFetch(e) => matches!(e, RandomError::Unavailable { .. }),
            Self::Storage(StorageError::Backend(_)) => true,
            _ => false,
        }
    }
}

/// Result type alias for MealMax operations.
pub type MealMaxResult<T> = Result<T, MealMaxError>;
