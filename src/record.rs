//! Battle records kept by the record store.
//!
//! The engine only produces [`Outcome`]s; the remaining types describe how
//! a store accumulates them and ranks meals.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::meal::{Difficulty, Meal, MealId};

/// Result of a single battle for one meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The meal won the battle.
    Win,
    /// The meal lost the battle.
    Loss,
}

impl Outcome {
    /// Textual form (`win` or `loss`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Self::Win),
            "loss" => Ok(Self::Loss),
            other => Err(ValidationError::InvalidOutcome {
                value: other.to_string(),
            }),
        }
    }
}

/// A persisted meal with its cumulative battle statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    /// The validated meal.
    pub meal: Meal,
    /// Battles fought (wins + losses).
    pub battles: u32,
    /// Battles won.
    pub wins: u32,
    /// Battles lost.
    pub losses: u32,
    /// Soft-delete marker. Deleted records are invisible to lookups.
    pub deleted: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the last outcome was recorded.
    pub last_battle_at: Option<DateTime<Utc>>,
}

impl MealRecord {
    /// Creates a fresh record with no battles.
    #[must_use]
    pub fn new(meal: Meal) -> Self {
        Self {
            meal,
            battles: 0,
            wins: 0,
            losses: 0,
            deleted: false,
            created_at: Utc::now(),
            last_battle_at: None,
        }
    }

    /// Applies one battle outcome.
    pub fn apply(&mut self, outcome: Outcome) {
        self.battles += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
        }
        self.last_battle_at = Some(Utc::now());
    }

    /// Win percentage rounded to one decimal place (ties to even), or `None`
    /// before the first battle.
    #[must_use]
    pub fn win_pct(&self) -> Option<f64> {
        if self.battles == 0 {
            return None;
        }
        let pct = f64::from(self.wins) / f64::from(self.battles) * 100.0;
        Some((pct * 10.0).round_ties_even() / 10.0)
    }
}

/// Leaderboard ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Most wins first.
    #[default]
    Wins,
    /// Highest win percentage first.
    WinPct,
}

impl FromStr for SortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wins" => Ok(Self::Wins),
            "win_pct" => Ok(Self::WinPct),
            other => Err(ValidationError::InvalidSortKey {
                value: other.to_string(),
            }),
        }
    }
}

/// One row of the leaderboard.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: MealId,
    pub meal: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
    pub battles: u32,
    pub wins: u32,
    /// Percentage in `[0, 100]`, one decimal place.
    pub win_pct: f64,
}

impl LeaderboardEntry {
    /// Builds a row from a record that has fought at least one battle.
    #[must_use]
    pub fn from_record(record: &MealRecord) -> Option<Self> {
        let win_pct = record.win_pct()?;
        Some(Self {
            id: record.meal.id(),
            meal: record.meal.name().to_string(),
            cuisine: record.meal.cuisine().to_string(),
            price: record.meal.price(),
            difficulty: record.meal.difficulty(),
            battles: record.battles,
            wins: record.wins,
            win_pct,
        })
    }
}
