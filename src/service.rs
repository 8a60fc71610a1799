//! Run orchestrator.
//!
//! The only component allowed to start an algorithm execution. `start_run`
//! is fire-and-return: it persists the run record, registers progress
//! state, spawns the background execution, and hands the `Running` entity
//! back without waiting. Pollers read live snapshots from the progress
//! store until the terminal result has been persisted and the store entry
//! evicted; after that, polls answer from the persisted record.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::entity::{AlgorithmConfiguration, OptimizationRun, ProblemDefinition};
use crate::error::{Error, Result};
use crate::model::IterationResult;
use crate::progress::{RunProgressSnapshot, RunProgressStore};
use crate::repository::Repository;
use crate::strategy::{solve, SolveOptions};

pub struct OptimizationService {
    repository: Arc<dyn Repository>,
    progress: Arc<RunProgressStore>,
}

impl OptimizationService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self {
            repository,
            progress: Arc::new(RunProgressStore::new()),
        }
    }

    /// Creates a run record and starts its execution in the background.
    ///
    /// Returns the `Running` entity immediately; progress streams into the
    /// store as the solver iterates. Each run id gets exactly one
    /// execution, bound to its own cancellation flag.
    pub async fn start_run(
        &self,
        configuration_id: Uuid,
        problem_id: Uuid,
        owner_id: Uuid,
    ) -> Result<OptimizationRun> {
        let configuration = self
            .repository
            .load_configuration(configuration_id, owner_id)
            .await?;
        let problem = self.repository.load_problem(problem_id, owner_id).await?;
        if problem.city_count() < 2 {
            return Err(Error::Validation(
                "a problem needs at least 2 cities".to_string(),
            ));
        }

        let run = OptimizationRun::started(configuration_id, problem_id, owner_id);
        self.repository.save_run(&run).await?;
        let cancel = self.progress.init_run(run.id);

        info!(
            "run {} started: {} on \"{}\" ({} cities, {} iterations max)",
            run.id,
            configuration.algorithm,
            problem.name,
            problem.city_count(),
            configuration.max_iterations
        );

        let repository = Arc::clone(&self.repository);
        let progress = Arc::clone(&self.progress);
        let spawned = run.clone();
        tokio::spawn(async move {
            execute_run(repository, progress, spawned, configuration, problem, cancel).await;
        });

        Ok(run)
    }

    /// The latest known progress for a run the caller owns.
    ///
    /// While the execution is in flight this is the live snapshot. Once the
    /// run has been finalized and evicted from the store, the persisted
    /// terminal record answers instead, so pollers never hit a gap.
    pub async fn poll_progress(
        &self,
        run_id: Uuid,
        owner_id: Uuid,
    ) -> Result<RunProgressSnapshot> {
        let run = self.repository.load_run(run_id, owner_id).await?;
        if let Some(snapshot) = self.progress.snapshot(run_id) {
            return Ok(snapshot);
        }
        Ok(RunProgressSnapshot {
            run_id: run.id,
            status: run.status,
            iteration_history: run.iteration_history,
            best_distance: run.best_distance,
            execution_time_ms: run.execution_time_ms,
            error_message: run.error_message,
        })
    }

    pub async fn get_run(&self, run_id: Uuid, owner_id: Uuid) -> Result<OptimizationRun> {
        self.repository.load_run(run_id, owner_id).await
    }

    /// The caller's runs, newest first.
    pub async fn list_runs(
        &self,
        owner_id: Uuid,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<OptimizationRun>> {
        self.repository.list_runs(owner_id, page, page_size).await
    }

    /// Deletes a run, cancelling its execution first if still in flight.
    ///
    /// The background task may still attempt its terminal write against the
    /// deleted record; the repository's update-if-exists contract absorbs
    /// that race.
    pub async fn delete_run(&self, run_id: Uuid, owner_id: Uuid) -> Result<()> {
        self.repository.load_run(run_id, owner_id).await?;
        self.progress.cancel(run_id);
        self.repository.delete_run(run_id, owner_id).await
    }

    /// Signals every in-flight execution to stop. Wire this into the
    /// process shutdown path so background tasks exit at an iteration
    /// boundary instead of being killed mid-write.
    pub fn shutdown(&self) {
        debug!("cancelling all in-flight optimization runs");
        self.progress.cancel_all();
    }
}

impl Drop for OptimizationService {
    fn drop(&mut self) {
        self.progress.cancel_all();
    }
}

async fn execute_run(
    repository: Arc<dyn Repository>,
    progress: Arc<RunProgressStore>,
    mut run: OptimizationRun,
    configuration: AlgorithmConfiguration,
    problem: ProblemDefinition,
    cancel: Arc<AtomicBool>,
) {
    let run_id = run.id;
    let kind = configuration.algorithm;
    let max_iterations = configuration.max_iterations;
    let parameters = configuration.parameters;
    let cities = problem.cities;

    let progress_sink = Arc::clone(&progress);
    let solve_outcome = tokio::task::spawn_blocking(move || {
        let mut on_iteration =
            |entry: &IterationResult| progress_sink.add_iteration(run_id, entry.clone());
        solve(
            kind,
            &cities,
            max_iterations,
            &parameters,
            SolveOptions {
                on_iteration: Some(&mut on_iteration),
                cancel: Some(cancel),
                seed: None,
            },
        )
    })
    .await;

    match solve_outcome {
        Ok(result) => {
            info!(
                "run {run_id} completed: best distance {:.4} after {} iterations ({} ms)",
                result.best_distance, result.total_iterations, result.execution_time_ms
            );
            progress.complete_run(run_id, result.best_distance, result.execution_time_ms);
            run.complete(&result);
        }
        Err(join_error) => {
            // Full detail stays server-side; callers get the generic message.
            error!("run {run_id} failed inside {kind}: {join_error}");
            progress.fail_run(run_id, Error::Execution.to_string());
            run.fail(Error::Execution.to_string());
        }
    }

    if let Err(persist_error) = repository.update_run(&run).await {
        warn!("run {run_id}: terminal state could not be persisted: {persist_error}");
    }
    progress.clean_up(run_id);
}
