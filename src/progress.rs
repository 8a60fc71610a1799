//! Thread-safe per-run progress state.
//!
//! Decouples "the algorithm is computing" from "a client is polling": the
//! background execution appends iteration results here while pollers read
//! immutable snapshots. Each run's state sits behind its own lock, so one
//! run's write never blocks another run's read. The outer map lock is held
//! only long enough to locate, insert, or remove an entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::IterationResult;

/// Lifecycle status of an optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// An immutable copy of one run's progress.
///
/// The history is copied on read; pollers never alias the live state a
/// background execution is appending to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunProgressSnapshot {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub iteration_history: Vec<IterationResult>,
    pub best_distance: Option<f64>,
    pub execution_time_ms: u64,
    pub error_message: Option<String>,
}

#[derive(Debug)]
struct RunState {
    status: RunStatus,
    history: Vec<IterationResult>,
    best_distance: Option<f64>,
    execution_time_ms: u64,
    error_message: Option<String>,
}

struct RunEntry {
    state: Mutex<RunState>,
    cancel: Arc<AtomicBool>,
}

/// Concurrent map of in-flight run state, keyed by run id.
///
/// Unknown run ids are tolerated everywhere: a mutation against an already
/// evicted run is a no-op, and a snapshot of one is `None`. That keeps the
/// store safe against the natural races between a finishing execution, a
/// cancelling delete, and a late poll.
#[derive(Default)]
pub struct RunProgressStore {
    runs: RwLock<HashMap<Uuid, Arc<RunEntry>>>,
}

impl RunProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh `Running` state and returns its cancellation flag.
    ///
    /// Must be called before the background execution starts, so a poll
    /// arriving right after run creation never sees an unknown run.
    pub fn init_run(&self, run_id: Uuid) -> Arc<AtomicBool> {
        let cancel = Arc::new(AtomicBool::new(false));
        let entry = Arc::new(RunEntry {
            state: Mutex::new(RunState {
                status: RunStatus::Running,
                history: Vec::new(),
                best_distance: None,
                execution_time_ms: 0,
                error_message: None,
            }),
            cancel: Arc::clone(&cancel),
        });
        self.runs.write().insert(run_id, entry);
        cancel
    }

    fn entry(&self, run_id: Uuid) -> Option<Arc<RunEntry>> {
        self.runs.read().get(&run_id).cloned()
    }

    /// Appends one iteration result. No-op if the run is unknown.
    pub fn add_iteration(&self, run_id: Uuid, result: IterationResult) {
        if let Some(entry) = self.entry(run_id) {
            entry.state.lock().history.push(result);
        }
    }

    /// Transitions the run to `Completed`.
    pub fn complete_run(&self, run_id: Uuid, best_distance: f64, execution_time_ms: u64) {
        if let Some(entry) = self.entry(run_id) {
            let mut state = entry.state.lock();
            state.status = RunStatus::Completed;
            state.best_distance = Some(best_distance);
            state.execution_time_ms = execution_time_ms;
        }
    }

    /// Transitions the run to `Failed` with a user-facing message.
    pub fn fail_run(&self, run_id: Uuid, message: impl Into<String>) {
        if let Some(entry) = self.entry(run_id) {
            let mut state = entry.state.lock();
            state.status = RunStatus::Failed;
            state.error_message = Some(message.into());
        }
    }

    /// Copies the run's current state, or `None` for an unknown run.
    pub fn snapshot(&self, run_id: Uuid) -> Option<RunProgressSnapshot> {
        let entry = self.entry(run_id)?;
        let state = entry.state.lock();
        Some(RunProgressSnapshot {
            run_id,
            status: state.status,
            iteration_history: state.history.clone(),
            best_distance: state.best_distance,
            execution_time_ms: state.execution_time_ms,
            error_message: state.error_message.clone(),
        })
    }

    /// The run's cancellation flag, shared with its background execution.
    pub fn cancellation_flag(&self, run_id: Uuid) -> Option<Arc<AtomicBool>> {
        self.entry(run_id).map(|entry| Arc::clone(&entry.cancel))
    }

    /// Requests cooperative cancellation. No-op if the run is unknown.
    pub fn cancel(&self, run_id: Uuid) {
        if let Some(entry) = self.entry(run_id) {
            entry.cancel.store(true, Ordering::Relaxed);
        }
    }

    /// Cancels every registered run.
    pub fn cancel_all(&self) {
        for entry in self.runs.read().values() {
            entry.cancel.store(true, Ordering::Relaxed);
        }
    }

    /// Evicts the run's state.
    ///
    /// Called only after the terminal result has been durably persisted, so
    /// a late poll still sees the terminal snapshot until then.
    pub fn clean_up(&self, run_id: Uuid) {
        self.runs.write().remove(&run_id);
    }
}
