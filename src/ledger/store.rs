//! Ledger store handle
//!
//! `LedgerStore` is the one owner of ledger state for a process. Clone the
//! handle to share it. It starts `Cold`; `hydrate` loads the durable snapshot
//! once and flips it to `Hydrated`. Mutations requested while cold are
//! buffered and replayed on top of the loaded state, and nothing is written to
//! disk until hydration finishes, so a slow startup read can neither drop an
//! early mutation nor be clobbered by an empty snapshot.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::aggregate::{calculate_day_totals, DailyTotals};
use super::date_key::{entry_timestamp, Clock, DateKey, SystemClock};
use super::error::{LedgerError, LedgerResult};
use super::state::{Counter, LedgerState, Mutation};
use crate::models::{ExerciseItem, ExerciseItemCreate, FoodItem, FoodItemCreate};
use crate::persistence::{
    LedgerSnapshot, SnapshotStore, SnapshotWriter, StoredSnapshot, WriteStatus,
};

/// Whether the durable snapshot has been loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HydrationState {
    #[default]
    Cold,
    Hydrated,
}

/// How mutations treat negative numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Accept any value
    #[default]
    Permissive,
    /// Reject negative calories, macros, durations and counter amounts
    NonNegative,
}

/// Everything logged for one day
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: DateKey,
    pub hydrated: bool,
    pub food: Vec<FoodItem>,
    pub exercise: Vec<ExerciseItem>,
    pub water: i64,
    pub steps: i64,
    pub active_minutes: i64,
    pub totals: DailyTotals,
}

struct Inner {
    state: LedgerState,
    pending: Vec<Mutation>,
    /// Continues from the stored snapshot's revision after hydration
    revision: u64,
    /// Revision the ledger was hydrated at; nothing newer has been written yet
    loaded_revision: u64,
    hydration: HydrationState,
}

#[derive(Clone)]
pub struct LedgerStore {
    inner: Arc<Mutex<Inner>>,
    clock: Arc<dyn Clock>,
    snapshots: Arc<dyn SnapshotStore>,
    writer: SnapshotWriter,
    policy: ValidationPolicy,
    next_seq: Arc<AtomicU64>,
    hydration_started: Arc<AtomicBool>,
    hydration_tx: Arc<watch::Sender<HydrationState>>,
    hydration_rx: watch::Receiver<HydrationState>,
}

impl LedgerStore {
    /// Cold store on the system clock. Must be called inside a tokio runtime.
    pub fn new(snapshots: Arc<dyn SnapshotStore>, policy: ValidationPolicy) -> Self {
        Self::with_clock(snapshots, Arc::new(SystemClock), policy)
    }

    pub fn with_clock(
        snapshots: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        policy: ValidationPolicy,
    ) -> Self {
        let (hydration_tx, hydration_rx) = watch::channel(HydrationState::Cold);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: LedgerState::default(),
                pending: Vec::new(),
                revision: 0,
                loaded_revision: 0,
                hydration: HydrationState::Cold,
            })),
            clock,
            writer: SnapshotWriter::spawn(Arc::clone(&snapshots)),
            snapshots,
            policy,
            next_seq: Arc::new(AtomicU64::new(0)),
            hydration_started: Arc::new(AtomicBool::new(false)),
            hydration_tx: Arc::new(hydration_tx),
            hydration_rx,
        }
    }

    /// Cold store with hydration already running in the background
    pub fn open(snapshots: Arc<dyn SnapshotStore>, policy: ValidationPolicy) -> Self {
        let store = Self::new(snapshots, policy);
        store.start_hydration();
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Hydration
    // ------------------------------------------------------------------

    /// Load the durable snapshot and wait until the ledger is hydrated.
    ///
    /// The load runs once, in its own task, so dropping this future only
    /// stops the wait. Later calls wait for the same load. Any read or parse
    /// failure starts the ledger empty instead.
    pub async fn hydrate(&self) -> HydrationState {
        self.start_hydration();
        self.wait_hydrated().await
    }

    /// Spawn the load task unless one was already started
    fn start_hydration(&self) {
        if self.hydration_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let handle = self.clone();
        tokio::spawn(async move { handle.run_hydration().await });
    }

    async fn run_hydration(self) {
        let snapshots = Arc::clone(&self.snapshots);
        let (loaded, stored_revision) =
            match tokio::task::spawn_blocking(move || snapshots.load()).await {
                Ok(Ok(Some(StoredSnapshot { revision, snapshot }))) => {
                    info!(
                        revision,
                        days = snapshot.food_logs.len(),
                        current_date = %snapshot.current_date,
                        "loaded ledger snapshot"
                    );
                    (LedgerState::from_snapshot(snapshot), revision)
                }
                Ok(Ok(None)) => {
                    info!("no stored ledger snapshot; starting empty");
                    (LedgerState::default(), 0)
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "could not read ledger snapshot; starting empty");
                    (LedgerState::default(), 0)
                }
                Err(e) => {
                    warn!(error = %e, "snapshot read task failed; starting empty");
                    (LedgerState::default(), 0)
                }
            };

        let mut inner = self.lock();
        inner.state = loaded;
        inner.revision = stored_revision;
        inner.loaded_revision = stored_revision;
        let pending = std::mem::take(&mut inner.pending);
        let replayed = pending.len();
        for mutation in pending {
            inner.state.apply(mutation);
            inner.revision += 1;
        }
        inner.hydration = HydrationState::Hydrated;
        if replayed > 0 {
            self.persist(&inner);
        }
        self.hydration_tx.send_replace(HydrationState::Hydrated);
        drop(inner);

        info!(replayed, revision = stored_revision + replayed as u64, "ledger hydrated");
    }

    pub fn hydration_state(&self) -> HydrationState {
        *self.hydration_rx.borrow()
    }

    /// Query results are only trustworthy once this is true
    pub fn is_hydrated(&self) -> bool {
        self.hydration_state() == HydrationState::Hydrated
    }

    pub async fn wait_hydrated(&self) -> HydrationState {
        let mut rx = self.hydration_rx.clone();
        // The sender lives in `self`, so the channel cannot close under us
        let _ = rx.wait_for(|s| *s == HydrationState::Hydrated).await;
        HydrationState::Hydrated
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn add_food(&self, data: FoodItemCreate, date: Option<DateKey>) -> LedgerResult<FoodItem> {
        if let Some((field, value)) = data.non_finite_field() {
            return Err(LedgerError::NonFiniteValue { field, value });
        }
        if let Some((field, value)) = data.negative_field() {
            self.check_non_negative(field, value)?;
        }
        let now = self.clock.now();
        let date = date.unwrap_or_else(|| DateKey::from_local(&now));
        let item = FoodItem::from_create(data, self.next_id(&now), entry_timestamp(&now));
        debug!(%date, id = %item.id, name = %item.name, "add food");
        self.submit(Mutation::AddFood {
            date,
            item: item.clone(),
        });
        Ok(item)
    }

    pub fn remove_food(&self, id: &str, date: Option<DateKey>) {
        let date = self.resolve(date);
        debug!(%date, id, "remove food");
        self.submit(Mutation::RemoveFood {
            date,
            id: id.to_string(),
        });
    }

    pub fn add_exercise(
        &self,
        data: ExerciseItemCreate,
        date: Option<DateKey>,
    ) -> LedgerResult<ExerciseItem> {
        if let Some((field, value)) = data.non_finite_field() {
            return Err(LedgerError::NonFiniteValue { field, value });
        }
        if let Some((field, value)) = data.negative_field() {
            self.check_non_negative(field, value)?;
        }
        let now = self.clock.now();
        let date = date.unwrap_or_else(|| DateKey::from_local(&now));
        let item = ExerciseItem::from_create(data, self.next_id(&now), entry_timestamp(&now));
        debug!(%date, id = %item.id, name = %item.name, "add exercise");
        self.submit(Mutation::AddExercise {
            date,
            item: item.clone(),
        });
        Ok(item)
    }

    pub fn remove_exercise(&self, id: &str, date: Option<DateKey>) {
        let date = self.resolve(date);
        debug!(%date, id, "remove exercise");
        self.submit(Mutation::RemoveExercise {
            date,
            id: id.to_string(),
        });
    }

    pub fn add_water(&self, ml: i64, date: Option<DateKey>) -> LedgerResult<()> {
        self.add_to_counter(Counter::Water, ml, date)
    }

    pub fn set_water(&self, ml: i64, date: Option<DateKey>) -> LedgerResult<()> {
        self.set_counter(Counter::Water, ml, date)
    }

    pub fn add_steps(&self, steps: i64, date: Option<DateKey>) -> LedgerResult<()> {
        self.add_to_counter(Counter::Steps, steps, date)
    }

    pub fn set_steps(&self, steps: i64, date: Option<DateKey>) -> LedgerResult<()> {
        self.set_counter(Counter::Steps, steps, date)
    }

    pub fn add_active_minutes(&self, minutes: i64, date: Option<DateKey>) -> LedgerResult<()> {
        self.add_to_counter(Counter::ActiveMinutes, minutes, date)
    }

    pub fn set_active_minutes(&self, minutes: i64, date: Option<DateKey>) -> LedgerResult<()> {
        self.set_counter(Counter::ActiveMinutes, minutes, date)
    }

    fn add_to_counter(&self, counter: Counter, amount: i64, date: Option<DateKey>) -> LedgerResult<()> {
        self.check_non_negative(counter.as_str(), amount as f64)?;
        let date = self.resolve(date);
        debug!(%date, counter = counter.as_str(), amount, "add to counter");
        self.submit(Mutation::AddToCounter {
            date,
            counter,
            amount,
        });
        Ok(())
    }

    fn set_counter(&self, counter: Counter, amount: i64, date: Option<DateKey>) -> LedgerResult<()> {
        self.check_non_negative(counter.as_str(), amount as f64)?;
        let date = self.resolve(date);
        debug!(%date, counter = counter.as_str(), amount, "set counter");
        self.submit(Mutation::SetCounter {
            date,
            counter,
            amount,
        });
        Ok(())
    }

    fn check_non_negative(&self, field: &'static str, value: f64) -> LedgerResult<()> {
        if self.policy == ValidationPolicy::NonNegative && value < 0.0 {
            return Err(LedgerError::NegativeValue { field, value });
        }
        Ok(())
    }

    fn resolve(&self, date: Option<DateKey>) -> DateKey {
        date.unwrap_or_else(|| self.today())
    }

    fn next_id(&self, now: &DateTime<Local>) -> String {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", now.timestamp_millis(), seq)
    }

    fn submit(&self, mutation: Mutation) {
        let mut inner = self.lock();
        if inner.hydration == HydrationState::Cold {
            debug!(pending = inner.pending.len() + 1, "ledger cold; buffering mutation");
            inner.pending.push(mutation);
            return;
        }
        inner.state.apply(mutation);
        inner.revision += 1;
        self.persist(&inner);
    }

    /// Hand the current state to the writer. Called with the lock held so
    /// snapshots reach the writer in revision order.
    fn persist(&self, inner: &Inner) {
        let snapshot = inner.state.to_snapshot(self.today());
        self.writer.submit(inner.revision, snapshot);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn today(&self) -> DateKey {
        DateKey::today(self.clock.as_ref())
    }

    pub fn food_on(&self, date: &DateKey) -> Vec<FoodItem> {
        self.lock().state.food_on(date).to_vec()
    }

    pub fn exercise_on(&self, date: &DateKey) -> Vec<ExerciseItem> {
        self.lock().state.exercise_on(date).to_vec()
    }

    pub fn water_on(&self, date: &DateKey) -> i64 {
        self.lock().state.counter_on(Counter::Water, date)
    }

    pub fn steps_on(&self, date: &DateKey) -> i64 {
        self.lock().state.counter_on(Counter::Steps, date)
    }

    pub fn active_minutes_on(&self, date: &DateKey) -> i64 {
        self.lock().state.counter_on(Counter::ActiveMinutes, date)
    }

    pub fn totals_on(&self, date: &DateKey) -> DailyTotals {
        let inner = self.lock();
        calculate_day_totals(inner.state.food_on(date), inner.state.exercise_on(date))
    }

    pub fn todays_food(&self) -> Vec<FoodItem> {
        self.food_on(&self.today())
    }

    pub fn todays_exercise(&self) -> Vec<ExerciseItem> {
        self.exercise_on(&self.today())
    }

    pub fn todays_water(&self) -> i64 {
        self.water_on(&self.today())
    }

    pub fn todays_steps(&self) -> i64 {
        self.steps_on(&self.today())
    }

    pub fn todays_active_minutes(&self) -> i64 {
        self.active_minutes_on(&self.today())
    }

    pub fn todays_totals(&self) -> DailyTotals {
        self.totals_on(&self.today())
    }

    /// All categories for one day, read under a single lock
    pub fn day(&self, date: &DateKey) -> DaySummary {
        let hydrated = self.is_hydrated();
        let inner = self.lock();
        let food = inner.state.food_on(date);
        let exercise = inner.state.exercise_on(date);
        DaySummary {
            date: *date,
            hydrated,
            totals: calculate_day_totals(food, exercise),
            food: food.to_vec(),
            exercise: exercise.to_vec(),
            water: inner.state.counter_on(Counter::Water, date),
            steps: inner.state.counter_on(Counter::Steps, date),
            active_minutes: inner.state.counter_on(Counter::ActiveMinutes, date),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.lock().state.to_snapshot(self.today())
    }

    /// Mutation counter, carried across restarts through the stored snapshot
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Mutations waiting for hydration
    pub fn pending_mutations(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn write_status(&self) -> WriteStatus {
        self.writer.status()
    }

    /// Wait until every mutation applied so far has been handed to storage
    pub async fn flush(&self) -> WriteStatus {
        let (revision, loaded_revision) = {
            let inner = self.lock();
            (inner.revision, inner.loaded_revision)
        };
        if revision <= loaded_revision {
            return self.write_status();
        }
        self.writer.wait_for_revision(revision).await
    }
}
