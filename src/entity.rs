//! Persisted domain entities.
//!
//! These are the records exchanged with the persistence collaborator; the
//! solver itself only ever sees the city list and the parameter map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{City, IterationResult, OptimizationResult, Params};
use crate::progress::RunStatus;
use crate::strategy::AlgorithmKind;

/// A stored algorithm configuration: which strategy to run and with what
/// parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfiguration {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub algorithm: AlgorithmKind,
    pub parameters: Params,
    pub max_iterations: usize,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AlgorithmConfiguration {
    pub fn new(
        name: impl Into<String>,
        algorithm: AlgorithmKind,
        parameters: Params,
        max_iterations: usize,
        owner_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            algorithm,
            parameters,
            max_iterations,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A stored problem instance: the cities to tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDefinition {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cities: Vec<City>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProblemDefinition {
    pub fn new(name: impl Into<String>, cities: Vec<City>, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            cities,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }
}

/// One optimization run: created `Running`, finalized exactly once by its
/// background execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRun {
    pub id: Uuid,
    pub configuration_id: Uuid,
    pub problem_id: Uuid,
    pub owner_id: Uuid,
    pub status: RunStatus,
    pub best_distance: Option<f64>,
    pub best_route: Option<Vec<usize>>,
    pub iteration_history: Vec<IterationResult>,
    pub total_iterations: usize,
    pub execution_time_ms: u64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OptimizationRun {
    /// A fresh run in `Running` state, ready to persist before the
    /// background execution starts.
    pub fn started(configuration_id: Uuid, problem_id: Uuid, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            configuration_id,
            problem_id,
            owner_id,
            status: RunStatus::Running,
            best_distance: None,
            best_route: None,
            iteration_history: Vec::new(),
            total_iterations: 0,
            execution_time_ms: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a finished solver result.
    pub fn complete(&mut self, result: &OptimizationResult) {
        self.status = RunStatus::Completed;
        self.best_distance = Some(result.best_distance);
        self.best_route = Some(result.best_route.clone());
        self.iteration_history = result.iteration_history.clone();
        self.total_iterations = result.total_iterations;
        self.execution_time_ms = result.execution_time_ms;
        self.updated_at = Utc::now();
    }

    /// Marks the run failed with a user-facing message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error_message = Some(message.into());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_run_is_running() {
        let run = OptimizationRun::started(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.best_distance.is_none());
        assert!(run.iteration_history.is_empty());
    }

    #[test]
    fn test_complete_copies_the_result() {
        let mut run = OptimizationRun::started(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let result = OptimizationResult {
            best_distance: 12.5,
            best_route: vec![2, 0, 1],
            iteration_history: vec![IterationResult {
                iteration: 0,
                best_distance: 12.5,
                best_route: vec![2, 0, 1],
                current_distance: 13.0,
            }],
            total_iterations: 1,
            execution_time_ms: 7,
        };
        run.complete(&result);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.best_distance, Some(12.5));
        assert_eq!(run.best_route.as_deref(), Some(&[2, 0, 1][..]));
        assert_eq!(run.total_iterations, 1);
    }

    #[test]
    fn test_fail_records_message_only() {
        let mut run = OptimizationRun::started(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        run.fail("An error occurred during optimization");
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.best_distance.is_none());
        assert_eq!(
            run.error_message.as_deref(),
            Some("An error occurred during optimization")
        );
    }

    #[test]
    fn test_new_configuration_owns_its_parameters() {
        let owner = Uuid::new_v4();
        let config = AlgorithmConfiguration::new(
            "tuned annealing",
            AlgorithmKind::SimulatedAnnealing,
            Params::new().with("initialTemperature", 5_000.0),
            1_000,
            owner,
        );
        assert_eq!(config.owner_id, owner);
        assert_eq!(config.max_iterations, 1_000);
        assert!((config.parameters.get("initialTemperature", 0.0) - 5_000.0).abs() < 1e-12);
    }
}
