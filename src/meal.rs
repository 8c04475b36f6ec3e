//! Meal types and attribute validation.
//!
//! A `Meal` is the combatant of a battle. It is validated once at
//! construction and never mutated afterwards; the battle engine only
//! reads it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Record-store assigned meal identifier.
///
/// The engine treats it as opaque: it is only handed back to the
/// outcome sink when a battle is reported.
///
/// # Examples
///
/// ```
/// use mealmax::MealId;
///
/// let id = MealId::new(42);
/// assert_eq!(id.get(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealId(u64);

impl MealId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MealId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<MealId> for u64 {
    fn from(id: MealId) -> Self {
        id.0
    }
}

/// How hard a meal is to prepare.
///
/// Harder meals receive a smaller scoring penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    /// Easy to prepare.
    Low,
    /// Moderate effort.
    Med,
    /// Demanding preparation.
    High,
}

impl Difficulty {
    /// All tiers, easiest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Med, Self::High];

    /// Points subtracted from a meal's battle score.
    #[must_use]
    pub const fn penalty(self) -> u8 {
        match self {
            Self::Low => 3,
            Self::Med => 2,
            Self::High => 1,
        }
    }

    /// Canonical textual form (`LOW`, `MED`, `HIGH`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Med => "MED",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    /// Parses the exact tier names; no case folding is applied.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "MED" => Ok(Self::Med),
            "HIGH" => Ok(Self::High),
            other => Err(ValidationError::InvalidDifficulty {
                value: other.to_string(),
            }),
        }
    }
}

/// A battle combatant.
///
/// Fields are private so that every `Meal` in existence has passed
/// validation: a finite price strictly above zero, a non-empty name and
/// cuisine, and a known difficulty tier.
///
/// # Examples
///
/// ```
/// use mealmax::{Difficulty, Meal, MealId};
///
/// let burger = Meal::new(MealId::new(1), "Burger", "American", 5.0, Difficulty::Med).unwrap();
/// assert_eq!(burger.cuisine(), "American");
///
/// assert!(Meal::from_raw(MealId::new(2), "Soup", "French", 0.0, "LOW").is_err());
/// assert!(Meal::from_raw(MealId::new(3), "Soup", "French", 4.0, "INVALID").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMeal", into = "RawMeal")]
pub struct Meal {
    id: MealId,
    name: String,
    cuisine: String,
    price: f64,
    difficulty: Difficulty,
}

impl Meal {
    /// Creates a meal with validation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NonPositivePrice` if `price` is not a finite
    /// number above zero, or `ValidationError::EmptyField` if the name or
    /// cuisine is blank.
    pub fn new(
        id: MealId,
        name: impl Into<String>,
        cuisine: impl Into<String>,
        price: f64,
        difficulty: Difficulty,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let cuisine = cuisine.into();
        Self::validate_price(price)?;
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "name" });
        }
        if cuisine.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "cuisine" });
        }
        Ok(Self {
            id,
            name,
            cuisine,
            price,
            difficulty,
        })
    }

    /// Creates a meal from persisted data where the difficulty is still text.
    ///
    /// # Errors
    ///
    /// Everything [`Meal::new`] rejects, plus
    /// `ValidationError::InvalidDifficulty` for a tier other than
    /// `LOW`, `MED` or `HIGH`.
    pub fn from_raw(
        id: MealId,
        name: impl Into<String>,
        cuisine: impl Into<String>,
        price: f64,
        difficulty: &str,
    ) -> Result<Self, ValidationError> {
        Self::validate_price(price)?;
        let difficulty: Difficulty = difficulty.parse()?;
        Self::new(id, name, cuisine, price, difficulty)
    }

    /// Checks the price invariant without building a meal.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NonPositivePrice` for zero, negative, NaN or
    /// infinite prices.
    pub fn validate_price(price: f64) -> Result<(), ValidationError> {
        if price.is_finite() && price > 0.0 {
            Ok(())
        } else {
            Err(ValidationError::NonPositivePrice { value: price })
        }
    }

    /// Store-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> MealId {
        self.id
    }

    /// Display name as given at creation.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cuisine label.
    #[must_use]
    pub fn cuisine(&self) -> &str {
        &self.cuisine
    }

    /// Price, always finite and positive.
    #[must_use]
    pub const fn price(&self) -> f64 {
        self.price
    }

    /// Preparation difficulty.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (#{}, {}, {:.2}, {})",
            self.name, self.id, self.cuisine, self.price, self.difficulty
        )
    }
}

/// Unvalidated wire form; deserialization goes through `Meal::new`.
#[derive(Serialize, Deserialize)]
struct RawMeal {
    id: MealId,
    name: String,
    cuisine: String,
    price: f64,
    difficulty: Difficulty,
}

impl TryFrom<RawMeal> for Meal {
    type Error = ValidationError;

    fn try_from(raw: RawMeal) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.name, raw.cuisine, raw.price, raw.difficulty)
    }
}

impl From<Meal> for RawMeal {
    fn from(meal: Meal) -> Self {
        Self {
            id: meal.id,
            name: meal.name,
            cuisine: meal.cuisine,
            price: meal.price,
            difficulty: meal.difficulty,
        }
    }
}
