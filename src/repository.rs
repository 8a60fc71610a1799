//! Persistence collaborator interface.
//!
//! The orchestrator only talks to storage through [`Repository`]; the real
//! backing store lives outside this crate. [`InMemoryRepository`] is the
//! reference implementation used by the tests and by embedders that do not
//! need durable storage.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::entity::{AlgorithmConfiguration, OptimizationRun, ProblemDefinition};
use crate::error::{Error, Result};

/// Storage operations the orchestrator depends on.
///
/// Lookups are always scoped by owner; a missing record and an ownership
/// mismatch are indistinguishable to callers (both are `NotFound`).
#[async_trait]
pub trait Repository: Send + Sync {
    async fn load_configuration(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<AlgorithmConfiguration>;

    async fn load_problem(&self, id: Uuid, owner_id: Uuid) -> Result<ProblemDefinition>;

    /// Inserts a new run record.
    async fn save_run(&self, run: &OptimizationRun) -> Result<()>;

    /// Updates an existing run record.
    ///
    /// A missing record is not an error: the run may have been deleted
    /// while its execution was still in flight, and the terminal write must
    /// tolerate that race without resurrecting the record.
    async fn update_run(&self, run: &OptimizationRun) -> Result<()>;

    async fn load_run(&self, id: Uuid, owner_id: Uuid) -> Result<OptimizationRun>;

    /// Runs for one owner, newest first, 1-based page.
    async fn list_runs(
        &self,
        owner_id: Uuid,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<OptimizationRun>>;

    async fn delete_run(&self, id: Uuid, owner_id: Uuid) -> Result<()>;
}

/// Hash-map backed [`Repository`].
#[derive(Default)]
pub struct InMemoryRepository {
    configurations: RwLock<HashMap<Uuid, AlgorithmConfiguration>>,
    problems: RwLock<HashMap<Uuid, ProblemDefinition>>,
    runs: RwLock<HashMap<Uuid, OptimizationRun>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_configuration(&self, configuration: AlgorithmConfiguration) {
        self.configurations
            .write()
            .insert(configuration.id, configuration);
    }

    pub fn insert_problem(&self, problem: ProblemDefinition) {
        self.problems.write().insert(problem.id, problem);
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn load_configuration(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<AlgorithmConfiguration> {
        self.configurations
            .read()
            .get(&id)
            .filter(|config| config.owner_id == owner_id)
            .cloned()
            .ok_or(Error::NotFound("algorithm configuration"))
    }

    async fn load_problem(&self, id: Uuid, owner_id: Uuid) -> Result<ProblemDefinition> {
        self.problems
            .read()
            .get(&id)
            .filter(|problem| problem.owner_id == owner_id)
            .cloned()
            .ok_or(Error::NotFound("problem definition"))
    }

    async fn save_run(&self, run: &OptimizationRun) -> Result<()> {
        self.runs.write().insert(run.id, run.clone());
        Ok(())
    }

    async fn update_run(&self, run: &OptimizationRun) -> Result<()> {
        let mut runs = self.runs.write();
        if let Some(existing) = runs.get_mut(&run.id) {
            *existing = run.clone();
        }
        Ok(())
    }

    async fn load_run(&self, id: Uuid, owner_id: Uuid) -> Result<OptimizationRun> {
        self.runs
            .read()
            .get(&id)
            .filter(|run| run.owner_id == owner_id)
            .cloned()
            .ok_or(Error::NotFound("optimization run"))
    }

    async fn list_runs(
        &self,
        owner_id: Uuid,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<OptimizationRun>> {
        let mut runs: Vec<OptimizationRun> = self
            .runs
            .read()
            .values()
            .filter(|run| run.owner_id == owner_id)
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let page = page.max(1);
        Ok(runs
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect())
    }

    async fn delete_run(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let mut runs = self.runs.write();
        match runs.get(&id) {
            Some(run) if run.owner_id == owner_id => {
                runs.remove(&id);
                Ok(())
            }
            _ => Err(Error::NotFound("optimization run")),
        }
    }
}
