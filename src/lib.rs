//! # MealMax - Two-meal battle resolution
//!
//! MealMax pits two meals against each other. Each meal gets a deterministic
//! score from its attributes; a single random draw then decides whether the
//! favourite wins or the underdog pulls off an upset. Outcomes are reported to
//! a record store that keeps cumulative win/loss counts.
//!
//! ## Core Concepts
//!
//! - **Meal**: a validated combatant (name, cuisine, price, difficulty)
//! - **BattleEngine**: the two-slot staging area and resolution algorithm
//! - **RandomSource**: port supplying one value in `[0, 1)` per battle
//! - **OutcomeSink / MealStore**: ports to the record store
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use mealmax::{BattleEngine, Difficulty, FixedSequence, InMemoryMealStore, MealStore};
//!
//! let store = Arc::new(InMemoryMealStore::new());
//! let burger = store.create("Burger", "American", 5.0, Difficulty::Med)?;
//! let pizza = store.create("Pizza", "Italian", 7.0, Difficulty::Low)?;
//!
//! let mut engine = BattleEngine::new(Arc::new(FixedSequence::new([0.05])), store.clone());
//! engine.stage(store.get(burger)?)?;
//! engine.stage(store.get(pizza)?)?;
//!
//! let winner = engine.resolve()?;
//! assert_eq!(winner.name(), "Pizza");
//! # Ok::<(), mealmax::MealMaxError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod battle;
pub mod config;
pub mod error;
pub mod meal;
pub mod random;
pub mod record;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use battle::{
    battle_score, decide, decide_scaled, score_delta, BattleEngine, BattleEvent, BattleObserver,
    BattlePhase, RecordingObserver, Resolution, Slot, STAGING_CAPACITY,
};
pub use config::BattleConfig;
pub use error::{MealMaxError, MealMaxResult, ValidationError};
pub use meal::{Difficulty, Meal, MealId};
pub use random::{
    ensure_unit_interval, parse_fraction, FixedSequence, OsRandom, RandomError, RandomSource,
    SeededRandom, TextFractionSource,
};
pub use record::{LeaderboardEntry, MealRecord, Outcome, SortBy};
pub use storage::{InMemoryMealStore, MealStore, OutcomeSink, StorageError};
