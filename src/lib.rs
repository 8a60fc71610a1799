//! TSP metaheuristic optimization engine.
//!
//! Solves Traveling Salesman Problem instances with six interchangeable
//! strategies:
//!
//! - **Simulated Annealing (SA)**: 2-opt trajectory search with Metropolis
//!   acceptance and geometric cooling.
//! - **Ant Colony Optimization (ACO)**: pheromone-guided tour construction
//!   with evaporation and iteration-best deposit.
//! - **Genetic Algorithm (GA)**: elitist generational evolution with
//!   tournament selection and order crossover.
//! - **Particle Swarm Optimization (PSO)**: swap-sequence velocities with
//!   linearly decaying inertia.
//! - **Slime Mold Optimization (SMO)**: rank-weighted oscillation between
//!   exploration and best-route exploitation.
//! - **Tabu Search (TS)**: sampled 2-opt neighborhood with short-term
//!   memory and aspiration.
//!
//! # Architecture
//!
//! Every solve runs as a cancellable background job. The
//! [`service::OptimizationService`] orchestrator persists a run record,
//! spawns the strategy on a blocking task, and returns immediately; the
//! strategy streams one [`model::IterationResult`] per iteration into the
//! [`progress::RunProgressStore`], where pollers read snapshots until the
//! terminal result has been persisted. Storage stays behind the
//! [`repository::Repository`] trait.

pub mod entity;
pub mod error;
pub mod model;
pub mod progress;
pub mod repository;
pub mod service;
pub mod strategy;
