//! Battle resolution engine.
//!
//! A `BattleEngine` stages at most two meals, scores them, draws one random
//! value and picks a winner with [`decide_scaled`]. Outcomes go to an
//! [`OutcomeSink`]; the loser is then evicted while the winner stays staged
//! for the next challenger.
//!
//! ```text
//!   stage        stage          resolve (ok)
//! Empty ──▶ StagedOne ──▶ Ready ───────────▶ StagedOne
//!   ▲                                           │
//!   └────────────────── clear ◀─────────────────┘
//! ```

mod observer;
mod rules;

pub use observer::{BattleEvent, BattleObserver, RecordingObserver};
pub use rules::{battle_score, decide, decide_scaled, score_delta, Slot};

use std::sync::Arc;

use arrayvec::ArrayVec;
use tracing::{debug, info, warn};

use crate::config::BattleConfig;
use crate::error::{MealMaxError, MealMaxResult, ValidationError};
use crate::meal::{Meal, MealId};
use crate::random::{ensure_unit_interval, RandomSource};
use crate::record::Outcome;
use crate::storage::OutcomeSink;

/// Number of meals a battle needs.
pub const STAGING_CAPACITY: usize = 2;

/// Logical state of the staging area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattlePhase {
    /// Nothing staged.
    Empty,
    /// One meal staged, waiting for a challenger.
    StagedOne,
    /// Two meals staged; `resolve` may be called.
    Ready,
}

/// Everything needed to replay or audit one resolution.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub winner: Meal,
    pub loser: Meal,
    /// Slot the winner occupied before the loser was evicted.
    pub winner_slot: Slot,
    /// Scores of the first and second staged meal.
    pub scores: (f64, f64),
    pub delta: f64,
    /// The random draw.
    pub draw: f64,
}

/// Two-meal battle engine.
///
/// All mutating operations take `&mut self`; share an engine between threads
/// by wrapping it in a `Mutex`. Use one engine per independent battle.
#[derive(Clone)]
pub struct BattleEngine {
    staged: ArrayVec<Meal, STAGING_CAPACITY>,
    random: Arc<dyn RandomSource>,
    sink: Arc<dyn OutcomeSink>,
    config: BattleConfig,
    observer: Option<Arc<dyn BattleObserver>>,
}

impl BattleEngine {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new(random: Arc<dyn RandomSource>, sink: Arc<dyn OutcomeSink>) -> Self {
        Self {
            staged: ArrayVec::new(),
            random,
            sink,
            config: BattleConfig::default(),
            observer: None,
        }
    }

    /// Replaces the configuration.
    ///
    /// # Errors
    ///
    /// Returns the validation error of an unusable configuration.
    pub fn with_config(mut self, config: BattleConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Attaches a diagnostic observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn BattleObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Scoring configuration this engine was built with.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Current phase, derived from the staging length.
    #[must_use]
    pub fn phase(&self) -> BattlePhase {
        match self.staged.len() {
            0 => BattlePhase::Empty,
            1 => BattlePhase::StagedOne,
            _ => BattlePhase::Ready,
        }
    }

    /// Staged meals in staging order.
    #[must_use]
    pub fn staged(&self) -> &[Meal] {
        &self.staged
    }

    /// Adds a meal to the staging area.
    ///
    /// # Errors
    ///
    /// Returns `MealMaxError::Capacity` if two meals are already staged; the
    /// staging area is left untouched.
    pub fn stage(&mut self, meal: Meal) -> MealMaxResult<()> {
        let meal_id = meal.id();
        if self.staged.try_push(meal).is_err() {
            warn!(meal_id = %meal_id, "staging area full");
            return Err(MealMaxError::Capacity {
                capacity: STAGING_CAPACITY,
            });
        }

        let staged = self.staged.len();
        debug!(meal_id = %meal_id, staged, "meal staged");
        self.emit(&BattleEvent::Staged { meal_id, staged });
        Ok(())
    }

    /// Score of a meal; see [`battle_score`].
    #[must_use]
    pub fn score(&self, meal: &Meal) -> f64 {
        battle_score(meal)
    }

    /// Runs a battle and returns the winner.
    ///
    /// # Errors
    ///
    /// See [`BattleEngine::resolve_detailed`].
    pub fn resolve(&mut self) -> MealMaxResult<Meal> {
        self.resolve_detailed().map(|resolution| resolution.winner)
    }

    /// Runs a battle and returns the full resolution record.
    ///
    /// Draws exactly one random value, reports `Win` for the winner and then
    /// `Loss` for the loser, and evicts the loser. Both reports are attempted
    /// even when the first one fails. The first report is not rolled back if
    /// the second fails.
    ///
    /// # Errors
    ///
    /// - `State`: fewer than two meals staged; nothing else happens
    /// - `RandomFetch`: the draw failed or was outside `[0, 1)`; nothing is
    ///   reported
    /// - `RecordUpdate`: a report failed; the staging area is left as it was
    pub fn resolve_detailed(&mut self) -> MealMaxResult<Resolution> {
        if self.staged.len() < STAGING_CAPACITY {
            return Err(MealMaxError::State {
                staged: self.staged.len(),
                required: STAGING_CAPACITY,
            });
        }

        let s1 = battle_score(&self.staged[0]);
        let s2 = battle_score(&self.staged[1]);
        let delta = score_delta(s1, s2, self.config.delta_scale);

        let draw = self
            .random
            .next_random()
            .and_then(ensure_unit_interval)
            .map_err(|e| {
                warn!(error = %e, "random draw failed");
                e
            })?;

        let winner_slot = decide_scaled(s1, s2, draw, self.config.delta_scale);
        let loser_slot = winner_slot.other();
        let winner_id = self.staged[winner_slot.index()].id();
        let loser_id = self.staged[loser_slot.index()].id();

        let win_report = self.report(winner_id, Outcome::Win);
        let loss_report = self.report(loser_id, Outcome::Loss);
        win_report?;
        loss_report?;

        let loser = self.staged.remove(loser_slot.index());
        let winner = self.staged[0].clone();

        info!(
            winner = %winner.name(),
            loser = %loser.name(),
            score_1 = s1,
            score_2 = s2,
            delta,
            draw,
            "battle resolved"
        );

        let resolution = Resolution {
            winner,
            loser,
            winner_slot,
            scores: (s1, s2),
            delta,
            draw,
        };
        self.emit(&BattleEvent::Resolved(resolution.clone()));
        Ok(resolution)
    }

    /// Empties the staging area.
    pub fn clear(&mut self) {
        let dropped = self.staged.len();
        self.staged.clear();
        debug!(dropped, "staging area cleared");
        self.emit(&BattleEvent::Cleared { dropped });
    }

    fn report(&self, meal_id: MealId, outcome: Outcome) -> MealMaxResult<()> {
        self.sink.report(meal_id, outcome).map_err(|source| {
            warn!(meal_id = %meal_id, %outcome, error = %source, "outcome report failed");
            self.emit(&BattleEvent::ReportFailed {
                meal_id,
                outcome,
                error: source.clone(),
            });
            MealMaxError::RecordUpdate {
                meal_id,
                outcome,
                source,
            }
        })
    }

    fn emit(&self, event: &BattleEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(event);
        }
    }
}

impl std::fmt::Debug for BattleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleEngine")
            .field("staged", &self.staged)
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use crate::meal::Difficulty;
    use crate::random::{FixedSequence, RandomError};
    use crate::storage::StorageError;

    /// Sink that records every call and can be told to reject some ids.
    #[derive(Debug, Default)]
    struct RecordingSink {
        calls: Mutex<Vec<(MealId, Outcome)>>,
        reject: Vec<MealId>,
    }

    impl RecordingSink {
        fn rejecting(ids: &[MealId]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reject: ids.to_vec(),
            }
        }

        fn calls(&self) -> Vec<(MealId, Outcome)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl OutcomeSink for RecordingSink {
        fn report(&self, id: MealId, outcome: Outcome) -> Result<(), StorageError> {
            self.calls.lock().unwrap().push((id, outcome));
            if self.reject.contains(&id) {
                return Err(StorageError::MealDeleted(id));
            }
            Ok(())
        }
    }

    fn burger() -> Meal {
        Meal::new(MealId::new(1), "Burger", "American", 5.0, Difficulty::Med).unwrap()
    }

    fn pizza() -> Meal {
        Meal::new(MealId::new(2), "Pizza", "Italian", 7.0, Difficulty::Low).unwrap()
    }

    fn sushi() -> Meal {
        Meal::new(MealId::new(3), "Sushi", "Japanese", 4.0, Difficulty::Low).unwrap()
    }

    fn engine(draws: &[f64]) -> (BattleEngine, Arc<FixedSequence>, Arc<RecordingSink>) {
        let random = Arc::new(FixedSequence::new(draws.iter().copied()));
        let sink = Arc::new(RecordingSink::default());
        let engine = BattleEngine::new(random.clone(), sink.clone());
        (engine, random, sink)
    }

    #[test]
    fn new_engine_is_empty() {
        let (engine, _, _) = engine(&[]);
        assert!(engine.staged().is_empty());
        assert_eq!(engine.phase(), BattlePhase::Empty);
    }

    #[test]
    fn stage_moves_through_phases() {
        let (mut engine, _, _) = engine(&[]);
        engine.stage(burger()).unwrap();
        assert_eq!(engine.phase(), BattlePhase::StagedOne);
        assert_eq!(engine.staged()[0].name(), "Burger");
        engine.stage(pizza()).unwrap();
        assert_eq!(engine.phase(), BattlePhase::Ready);
        assert_eq!(engine.staged(), &[burger(), pizza()]);
    }

    #[test]
    fn third_stage_is_rejected_without_mutation() {
        let (mut engine, _, _) = engine(&[]);
        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();

        let err = engine.stage(sushi()).unwrap_err();
        assert!(err.is_capacity());
        assert_eq!(engine.staged(), &[burger(), pizza()]);
    }

    #[test]
    fn score_is_pure() {
        let (engine, _, _) = engine(&[]);
        let meal = burger();
        assert_eq!(engine.score(&meal), 38.0);
        assert_eq!(engine.score(&meal), engine.score(&meal));
        assert!(engine.staged().is_empty());
    }

    #[test]
    fn resolve_requires_two_meals() {
        let (mut engine, random, sink) = engine(&[0.5]);
        assert!(engine.resolve().unwrap_err().is_state());

        engine.stage(burger()).unwrap();
        let err = engine.resolve().unwrap_err();
        assert!(matches!(err, MealMaxError::State { staged: 1, required: 2 }));

        assert_eq!(engine.staged(), &[burger()]);
        assert_eq!(random.drawn(), 0);
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn underdog_wins_when_draw_exceeds_delta() {
        let (mut engine, random, sink) = engine(&[0.1]);
        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();

        let winner = engine.resolve().unwrap();
        assert_eq!(winner, burger());
        assert_eq!(engine.staged(), &[burger()]);
        assert_eq!(engine.phase(), BattlePhase::StagedOne);
        assert_eq!(random.drawn(), 1);
        assert_eq!(
            sink.calls(),
            vec![(MealId::new(1), Outcome::Win), (MealId::new(2), Outcome::Loss)]
        );
    }

    #[test]
    fn favourite_wins_when_delta_exceeds_draw() {
        let (mut engine, _, sink) = engine(&[0.05]);
        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();

        let resolution = engine.resolve_detailed().unwrap();
        assert_eq!(resolution.winner, pizza());
        assert_eq!(resolution.loser, burger());
        assert_eq!(resolution.winner_slot, Slot::Second);
        assert_eq!(resolution.scores, (38.0, 46.0));
        assert!((resolution.delta - 0.08).abs() < 1e-12);
        assert_eq!(engine.staged(), &[pizza()]);
        assert_eq!(
            sink.calls(),
            vec![(MealId::new(2), Outcome::Win), (MealId::new(1), Outcome::Loss)]
        );
    }

    #[test]
    fn equal_scores_second_staged_wins() {
        let twin = Meal::new(MealId::new(9), "Burger Deluxe", "American", 5.0, Difficulty::Med)
            .unwrap();
        let (mut engine, _, _) = engine(&[0.0]);
        engine.stage(burger()).unwrap();
        engine.stage(twin.clone()).unwrap();

        assert_eq!(engine.resolve().unwrap(), twin);
    }

    #[test]
    fn winner_stays_for_next_challenger() {
        let (mut engine, _, _) = engine(&[0.05, 0.99]);
        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();
        assert_eq!(engine.resolve().unwrap(), pizza());

        // Pizza (46) vs Sushi (29): delta 0.17 < 0.99, so Sushi upsets.
        engine.stage(sushi()).unwrap();
        assert_eq!(engine.resolve().unwrap(), sushi());
        assert_eq!(engine.staged(), &[sushi()]);
    }

    #[test]
    fn random_failure_propagates_without_reporting() {
        let (mut engine, _, sink) = engine(&[]);
        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();

        let err = engine.resolve().unwrap_err();
        assert!(matches!(
            err,
            MealMaxError::RandomFetch(RandomError::Exhausted { drawn: 0 })
        ));
        assert_eq!(engine.staged().len(), 2);
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn out_of_range_draw_is_rejected() {
        let (mut engine, _, sink) = engine(&[1.0]);
        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();

        let err = engine.resolve().unwrap_err();
        assert!(matches!(
            err,
            MealMaxError::RandomFetch(RandomError::OutOfRange { .. })
        ));
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn loser_report_failure_keeps_winner_recorded() {
        let random = Arc::new(FixedSequence::new([0.1]));
        let sink = Arc::new(RecordingSink::rejecting(&[MealId::new(2)]));
        let observer = Arc::new(RecordingObserver::new());
        let mut engine =
            BattleEngine::new(random, sink.clone()).with_observer(observer.clone());
        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();

        let err = engine.resolve().unwrap_err();
        assert!(matches!(
            err,
            MealMaxError::RecordUpdate { meal_id, outcome: Outcome::Loss, .. } if meal_id == MealId::new(2)
        ));
        assert_eq!(sink.calls().len(), 2);
        assert_eq!(engine.staged().len(), 2);
        assert!(observer
            .events()
            .iter()
            .any(|e| matches!(e, BattleEvent::ReportFailed { outcome: Outcome::Loss, .. })));
    }

    #[test]
    fn winner_report_failure_still_attempts_loser_report() {
        let random = Arc::new(FixedSequence::new([0.1]));
        let sink = Arc::new(RecordingSink::rejecting(&[MealId::new(1)]));
        let mut engine = BattleEngine::new(random, sink.clone());
        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();

        let err = engine.resolve().unwrap_err();
        assert!(matches!(
            err,
            MealMaxError::RecordUpdate { outcome: Outcome::Win, .. }
        ));
        assert_eq!(
            sink.calls(),
            vec![(MealId::new(1), Outcome::Win), (MealId::new(2), Outcome::Loss)]
        );
    }

    #[test]
    fn clear_is_idempotent() {
        let (mut engine, _, _) = engine(&[]);
        engine.clear();
        assert!(engine.staged().is_empty());

        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();
        engine.clear();
        assert_eq!(engine.phase(), BattlePhase::Empty);
        engine.clear();
        assert!(engine.staged().is_empty());
    }

    #[test]
    fn observer_sees_events_in_order() {
        let observer = Arc::new(RecordingObserver::new());
        let (engine, _, _) = engine(&[0.05]);
        let mut engine = engine.with_observer(observer.clone());
        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();
        engine.resolve().unwrap();
        engine.clear();

        let events = observer.events();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            BattleEvent::Staged {
                meal_id: MealId::new(1),
                staged: 1
            }
        );
        assert!(matches!(&events[2], BattleEvent::Resolved(r) if r.winner == pizza()));
        assert_eq!(events[3], BattleEvent::Cleared { dropped: 1 });
    }

    #[test]
    fn custom_delta_scale() {
        let (engine, _, _) = engine(&[0.1]);
        let mut engine = engine
            .with_config(BattleConfig { delta_scale: 50.0 })
            .unwrap();
        engine.stage(burger()).unwrap();
        engine.stage(pizza()).unwrap();
        // delta = 8 / 50 = 0.16 > 0.1
        assert_eq!(engine.resolve().unwrap(), pizza());

        let (engine, _, _) = self::engine(&[]);
        assert!(engine.with_config(BattleConfig { delta_scale: 0.0 }).is_err());
    }

    #[test]
    fn engine_is_shareable_behind_a_mutex() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BattleEngine>();

        let (engine, _, _) = engine(&[]);
        let shared = Arc::new(Mutex::new(engine));
        let handles: Vec<_> = [burger(), pizza(), sushi()]
            .into_iter()
            .map(|meal| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || shared.lock().unwrap().stage(meal).is_ok())
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(accepted, 2);
        assert_eq!(shared.lock().unwrap().staged().len(), 2);
    }
}
