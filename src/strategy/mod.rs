//! Algorithm strategies and the shared solve wrapper.
//!
//! Each submodule implements one tour-optimization heuristic behind the
//! [`Strategy`] trait. The [`solve`] entry point owns everything the
//! strategies have in common: wall-clock timing, history accumulation, the
//! per-iteration callback, and the cooperative cancellation flag. Strategies
//! only run their search loop and return the best tour found.

mod aco;
mod ga;
mod pso;
mod sa;
mod smo;
mod tabu;

pub use aco::AntColonyOptimization;
pub use ga::GeneticAlgorithm;
pub use pso::ParticleSwarmOptimization;
pub use sa::SimulatedAnnealing;
pub use smo::SlimeMoldOptimization;
pub use tabu::TabuSearch;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::{City, IterationResult, OptimizationResult, Params};

/// Identifies one of the six tour-optimization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlgorithmKind {
    SimulatedAnnealing,
    AntColonyOptimization,
    GeneticAlgorithm,
    ParticleSwarmOptimization,
    SlimeMoldOptimization,
    TabuSearch,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 6] = [
        AlgorithmKind::SimulatedAnnealing,
        AlgorithmKind::AntColonyOptimization,
        AlgorithmKind::GeneticAlgorithm,
        AlgorithmKind::ParticleSwarmOptimization,
        AlgorithmKind::SlimeMoldOptimization,
        AlgorithmKind::TabuSearch,
    ];

    /// Maps this tag to its strategy instance.
    pub fn strategy(self) -> Box<dyn Strategy> {
        match self {
            AlgorithmKind::SimulatedAnnealing => Box::new(SimulatedAnnealing),
            AlgorithmKind::AntColonyOptimization => Box::new(AntColonyOptimization),
            AlgorithmKind::GeneticAlgorithm => Box::new(GeneticAlgorithm),
            AlgorithmKind::ParticleSwarmOptimization => Box::new(ParticleSwarmOptimization),
            AlgorithmKind::SlimeMoldOptimization => Box::new(SlimeMoldOptimization),
            AlgorithmKind::TabuSearch => Box::new(TabuSearch),
        }
    }

    fn tag(self) -> &'static str {
        match self {
            AlgorithmKind::SimulatedAnnealing => "simulatedAnnealing",
            AlgorithmKind::AntColonyOptimization => "antColonyOptimization",
            AlgorithmKind::GeneticAlgorithm => "geneticAlgorithm",
            AlgorithmKind::ParticleSwarmOptimization => "particleSwarmOptimization",
            AlgorithmKind::SlimeMoldOptimization => "slimeMoldOptimization",
            AlgorithmKind::TabuSearch => "tabuSearch",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AlgorithmKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| format!("unknown algorithm tag: {s}"))
    }
}

/// The problem instance handed to a strategy.
pub struct SolveTask<'a> {
    pub cities: &'a [City],
    pub max_iterations: usize,
    pub params: &'a Params,
}

/// Per-run bookkeeping shared by all strategies.
///
/// Owns the growing iteration history, the optional streaming callback, and
/// the optional cancellation flag. Strategies call [`SearchLog::record`]
/// exactly once per completed iteration and poll [`SearchLog::cancelled`]
/// at the top of each iteration.
pub struct SearchLog<'a> {
    history: Vec<IterationResult>,
    on_iteration: Option<&'a mut (dyn FnMut(&IterationResult) + Send + 'a)>,
    cancel: Option<Arc<AtomicBool>>,
}

impl SearchLog<'_> {
    /// True once cancellation has been requested. Cooperative: the current
    /// iteration is allowed to finish.
    pub fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Appends one history entry and streams it to the callback.
    ///
    /// The callback runs synchronously, so entries arrive in strictly
    /// increasing iteration order.
    pub fn record(
        &mut self,
        iteration: usize,
        best_distance: f64,
        best_route: &[usize],
        current_distance: f64,
    ) {
        let entry = IterationResult {
            iteration,
            best_distance,
            best_route: best_route.to_vec(),
            current_distance,
        };
        if let Some(callback) = self.on_iteration.as_deref_mut() {
            callback(&entry);
        }
        self.history.push(entry);
    }
}

/// Options for one [`solve`] call.
///
/// `seed` of `None` draws a fresh seed from the thread-local generator;
/// tests fix it for reproducibility.
#[derive(Default)]
pub struct SolveOptions<'a> {
    pub on_iteration: Option<&'a mut (dyn FnMut(&IterationResult) + Send + 'a)>,
    pub cancel: Option<Arc<AtomicBool>>,
    pub seed: Option<u64>,
}

/// A tour-optimization heuristic.
///
/// Implementations run their search loop over permutations of city indices,
/// recording one [`IterationResult`] per iteration via the log, and return
/// the best route with its tour distance. The returned distance must equal
/// the recomputed tour distance of the returned route.
pub trait Strategy: Send + Sync {
    fn run(
        &self,
        task: &SolveTask<'_>,
        log: &mut SearchLog<'_>,
        rng: &mut StdRng,
    ) -> (Vec<usize>, f64);
}

/// Runs one strategy to completion (or cancellation) and assembles the
/// result.
///
/// This wrapper owns the pieces every strategy shares: it measures
/// wall-clock time from start to loop exit, threads the callback and the
/// cancellation flag into the [`SearchLog`], and packages the history.
/// With `max_iterations == 0` the history is empty and the result is the
/// strategy's initial random route.
///
/// Callers must supply at least two cities; the orchestrator rejects
/// smaller problems before they reach a strategy.
pub fn solve(
    kind: AlgorithmKind,
    cities: &[City],
    max_iterations: usize,
    params: &Params,
    options: SolveOptions<'_>,
) -> OptimizationResult {
    let started = Instant::now();
    let mut rng = make_rng(options.seed);
    let task = SolveTask {
        cities,
        max_iterations,
        params,
    };
    let mut log = SearchLog {
        history: Vec::new(),
        on_iteration: options.on_iteration,
        cancel: options.cancel,
    };

    let (best_route, best_distance) = kind.strategy().run(&task, &mut log, &mut rng);

    OptimizationResult {
        best_distance,
        best_route,
        total_iterations: log.history.len(),
        iteration_history: log.history,
        execution_time_ms: started.elapsed().as_millis() as u64,
    }
}

pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::random()),
    }
}

/// Uniform random permutation of `0..n` (Fisher-Yates).
pub(crate) fn random_route<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut route: Vec<usize> = (0..n).collect();
    route.shuffle(rng);
    route
}

/// Reverses `route[i..=j]` in place. Self-inverse for fixed `i`, `j`.
pub(crate) fn reverse_segment(route: &mut [usize], mut i: usize, mut j: usize) {
    while i < j {
        route.swap(i, j);
        i += 1;
        j -= 1;
    }
}

/// Index of the smallest value. The slice must be non-empty.
pub(crate) fn min_index(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value < values[best] {
            best = i;
        }
    }
    best
}
