//! Record storage for MealMax.
//!
//! The traits define what the battle engine and host processes need from a
//! record store; `memory` provides a thread-safe reference implementation.

mod memory;
mod traits;

pub use memory::InMemoryMealStore;
pub use traits::{MealStore, OutcomeSink, StorageError};
