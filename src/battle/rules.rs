//! Scoring and the outcome rule.
//!
//! Both are pure functions so that a resolution can be replayed from the two
//! scores and the random draw alone.

use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::meal::Meal;

/// Position in the staging area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Staged first.
    First,
    /// Staged second.
    Second,
}

impl Slot {
    /// Index into the staging area.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// The opposing slot.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Battle score of a meal.
///
/// `price × cuisine length − penalty`, where the cuisine length counts
/// characters (not bytes) and the penalty is 3/2/1 for LOW/MED/HIGH.
///
/// # Examples
///
/// ```
/// use mealmax::{battle_score, Difficulty, Meal, MealId};
///
/// let burger = Meal::new(MealId::new(1), "Burger", "American", 5.0, Difficulty::Med).unwrap();
/// assert_eq!(battle_score(&burger), 38.0);
/// ```
#[must_use]
pub fn battle_score(meal: &Meal) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let len = meal.cuisine().chars().count() as f64;
    meal.price() * len - f64::from(meal.difficulty().penalty())
}

/// Normalized score gap.
#[must_use]
pub fn score_delta(s1: f64, s2: f64, scale: f64) -> f64 {
    (s1 - s2).abs() / scale
}

/// Decides the winning slot with the default delta scale.
#[must_use]
pub fn decide(s1: f64, s2: f64, r: f64) -> Slot {
    decide_scaled(s1, s2, r, BattleConfig::DEFAULT_DELTA_SCALE)
}

/// Decides the winning slot.
///
/// If the delta exceeds `r` the higher score wins, otherwise the lower score
/// wins. Equal scores always resolve to [`Slot::Second`], whatever `r` is.
#[must_use]
pub fn decide_scaled(s1: f64, s2: f64, r: f64, scale: f64) -> Slot {
    let delta = score_delta(s1, s2, scale);
    let (higher, lower) = if s1 > s2 {
        (Slot::First, Slot::Second)
    } else if s1 < s2 {
        (Slot::Second, Slot::First)
    } else {
        (Slot::Second, Slot::Second)
    };

    if delta > r {
        higher
    } else {
        lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::meal::{Difficulty, MealId};

    fn meal(cuisine: &str, price: f64, difficulty: Difficulty) -> Meal {
        Meal::new(MealId::new(1), "Dish", cuisine, price, difficulty).unwrap()
    }

    #[test]
    fn test_score_reference_values() {
        assert_eq!(battle_score(&meal("American", 5.0, Difficulty::Med)), 38.0);
        assert_eq!(battle_score(&meal("Italian", 7.0, Difficulty::Low)), 46.0);
        assert_eq!(battle_score(&meal("Japanese", 4.0, Difficulty::Low)), 29.0);
        assert_eq!(battle_score(&meal("Thai", 2.5, Difficulty::High)), 9.0);
    }

    #[test]
    fn test_score_counts_characters_not_bytes() {
        // "Crêpe" is 5 characters but 6 bytes.
        assert_eq!(battle_score(&meal("Crêpe", 2.0, Difficulty::High)), 9.0);
    }

    #[test]
    fn test_score_can_be_negative() {
        assert_eq!(battle_score(&meal("X", 1.0, Difficulty::Low)), -2.0);
    }

    #[test]
    fn test_decide_reference_scenarios() {
        // delta = |38 - 46| / 100 = 0.08
        assert_eq!(decide(38.0, 46.0, 0.1), Slot::First);
        assert_eq!(decide(38.0, 46.0, 0.05), Slot::Second);
        assert_eq!(decide(46.0, 38.0, 0.1), Slot::Second);
        assert_eq!(decide(46.0, 38.0, 0.05), Slot::First);
    }

    #[test]
    fn test_decide_delta_equal_to_draw_favours_underdog() {
        assert_eq!(decide(0.0, 50.0, 0.5), Slot::First);
    }

    #[test]
    fn test_decide_equal_scores_second_wins() {
        for r in [0.0, 0.3, 0.999] {
            assert_eq!(decide(10.0, 10.0, r), Slot::Second);
        }
    }

    #[test]
    fn test_decide_scaled() {
        // Same gap, smaller scale: delta 0.16 beats r = 0.1.
        assert_eq!(decide_scaled(38.0, 46.0, 0.1, 50.0), Slot::Second);
    }

    #[test]
    fn test_slot_helpers() {
        assert_eq!(Slot::First.index(), 0);
        assert_eq!(Slot::Second.index(), 1);
        assert_eq!(Slot::First.other(), Slot::Second);
    }
}
