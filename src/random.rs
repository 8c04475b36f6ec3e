//! Randomness sources for battle resolution.
//!
//! The engine draws exactly one value in `[0, 1)` per resolution through the
//! [`RandomSource`] port. Sources here cover production use (`OsRandom`,
//! `TextFractionSource`) and reproducible runs (`SeededRandom`,
//! `FixedSequence`).

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::warn;

/// Errors produced while obtaining a random draw.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RandomError {
    /// The upstream source could not be reached.
    #[error("random source unavailable: {message}")]
    Unavailable {
        message: String,
    },

    /// The upstream response was not a decimal fraction.
    #[error("malformed random response: {body:?}")]
    Malformed {
        body: String,
    },

    /// The value is not in `[0, 1)`.
    #[error("random value {value} is outside [0, 1)")]
    OutOfRange {
        value: f64,
    },

    /// A fixed sequence ran out of values.
    #[error("random sequence exhausted after {drawn} draws")]
    Exhausted {
        drawn: usize,
    },
}

/// Source of uniformly distributed values in `[0, 1)`.
///
/// Implementations must not substitute a default value on failure.
pub trait RandomSource: Send + Sync {
    /// Draws the next value.
    fn next_random(&self) -> Result<f64, RandomError>;
}

/// Checks that a drawn value lies in `[0, 1)`.
///
/// # Errors
///
/// Returns `RandomError::OutOfRange` for values outside the interval and NaN.
pub fn ensure_unit_interval(value: f64) -> Result<f64, RandomError> {
    if (0.0..1.0).contains(&value) {
        Ok(value)
    } else {
        Err(RandomError::OutOfRange { value })
    }
}

/// Parses a plain-text decimal fraction such as `"0.42\n"`.
///
/// # Errors
///
/// Returns `RandomError::Malformed` if the text is not a number and
/// `RandomError::OutOfRange` if it is not in `[0, 1)`.
pub fn parse_fraction(body: &str) -> Result<f64, RandomError> {
    let value: f64 = body.trim().parse().map_err(|_| RandomError::Malformed {
        body: body.to_string(),
    })?;
    ensure_unit_interval(value)
}

/// Thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_random(&self) -> Result<f64, RandomError> {
        Ok(rand::thread_rng().gen::<f64>())
    }
}

/// Deterministic generator seeded once at construction.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Creates a generator whose draws are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_random(&self) -> Result<f64, RandomError> {
        let mut rng = self.rng.lock().map_err(|_| RandomError::Unavailable {
            message: "poisoned lock: seeded rng".to_string(),
        })?;
        Ok(rng.gen::<f64>())
    }
}

#[derive(Debug, Default)]
struct SequenceState {
    queue: VecDeque<f64>,
    drawn: usize,
}

/// Yields a predetermined sequence of values, then fails.
///
/// Intended for tests and replays. Values are returned as given; the engine
/// validates the range.
///
/// # Examples
///
/// ```
/// use mealmax::{FixedSequence, RandomSource};
///
/// let source = FixedSequence::new([0.1, 0.05]);
/// assert_eq!(source.next_random().unwrap(), 0.1);
/// assert_eq!(source.next_random().unwrap(), 0.05);
/// assert!(source.next_random().is_err());
/// assert_eq!(source.drawn(), 2);
/// ```
#[derive(Debug, Default)]
pub struct FixedSequence {
    state: Mutex<SequenceState>,
}

impl FixedSequence {
    /// Creates a source that yields `values` in order.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            state: Mutex::new(SequenceState {
                queue: values.into_iter().collect(),
                drawn: 0,
            }),
        }
    }

    /// Appends a value to the end of the sequence.
    ///
    /// A poisoned lock is recovered with a warning; the value is still queued.
    pub fn push(&self, value: f64) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| {
            warn!(value, "poisoned lock: fixed sequence, recovering");
            poisoned.into_inner()
        });
        state.queue.push_back(value);
    }

    /// Number of values handed out so far.
    #[must_use]
    pub fn drawn(&self) -> usize {
        self.state.lock().map_or(0, |s| s.drawn)
    }

    /// Number of values left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.state.lock().map_or(0, |s| s.queue.len())
    }
}

impl RandomSource for FixedSequence {
    fn next_random(&self) -> Result<f64, RandomError> {
        let mut state = self.state.lock().map_err(|_| RandomError::Unavailable {
            message: "poisoned lock: fixed sequence".to_string(),
        })?;
        let value = state.queue.pop_front().ok_or(RandomError::Exhausted {
            drawn: state.drawn,
        })?;
        state.drawn += 1;
        Ok(value)
    }
}

/// Adapts a host-supplied fetch (typically an HTTP GET against a
/// random-number service returning one decimal fraction per line) into a
/// [`RandomSource`].
///
/// The closure returns the raw response body or a transport error message.
///
/// # Examples
///
/// ```
/// use mealmax::{RandomSource, TextFractionSource};
///
/// let source = TextFractionSource::new(|| Ok("0.37\n".to_string()));
/// assert_eq!(source.next_random().unwrap(), 0.37);
/// ```
pub struct TextFractionSource<F> {
    fetch: F,
}

impl<F> TextFractionSource<F>
where
    F: Fn() -> Result<String, String> + Send + Sync,
{
    /// Wraps `fetch`, which is called once per draw.
    pub const fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F> RandomSource for TextFractionSource<F>
where
    F: Fn() -> Result<String, String> + Send + Sync,
{
    fn next_random(&self) -> Result<f64, RandomError> {
        let body = (self.fetch)().map_err(|message| RandomError::Unavailable { message })?;
        parse_fraction(&body)
    }
}

impl<F> std::fmt::Debug for TextFractionSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextFractionSource").finish_non_exhaustive()
    }
}
