//! Genetic Algorithm with order crossover.
//!
//! Each generation copies the elite unchanged, then fills the remainder
//! with children of tournament-selected parents: an Order Crossover (OX)
//! that preserves the permutation invariant, followed by a probabilistic
//! swap mutation.

use rand::rngs::StdRng;
use rand::Rng;

use super::{min_index, random_route, SearchLog, SolveTask, Strategy};
use crate::model::tour_distance;

/// Parameters: `populationSize` (50), `mutationRate` (0.02),
/// `tournamentSize` (5), `eliteCount` (2).
pub struct GeneticAlgorithm;

impl Strategy for GeneticAlgorithm {
    fn run(
        &self,
        task: &SolveTask<'_>,
        log: &mut SearchLog<'_>,
        rng: &mut StdRng,
    ) -> (Vec<usize>, f64) {
        let population_size = task.params.get_usize("populationSize", 50).max(1);
        let mutation_rate = task.params.get("mutationRate", 0.02);
        let tournament_size = task.params.get_usize("tournamentSize", 5).max(1);
        let elite_count = task.params.get_usize("eliteCount", 2).min(population_size);

        let n = task.cities.len();
        let mut population: Vec<Vec<usize>> = (0..population_size)
            .map(|_| random_route(n, rng))
            .collect();
        let mut fitness: Vec<f64> = population
            .iter()
            .map(|route| tour_distance(route, task.cities))
            .collect();

        let best_idx = min_index(&fitness);
        let mut best = population[best_idx].clone();
        let mut best_distance = fitness[best_idx];

        for iteration in 0..task.max_iterations {
            if log.cancelled() {
                break;
            }

            let mut ranking: Vec<usize> = (0..population_size).collect();
            ranking.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));

            let mut next_population: Vec<Vec<usize>> = Vec::with_capacity(population_size);
            for &idx in ranking.iter().take(elite_count) {
                next_population.push(population[idx].clone());
            }

            while next_population.len() < population_size {
                let parent1 = tournament_select(&population, &fitness, tournament_size, rng);
                let parent2 = tournament_select(&population, &fitness, tournament_size, rng);
                let mut child = order_crossover(parent1, parent2, rng);
                if rng.random_range(0.0..1.0) < mutation_rate {
                    swap_mutation(&mut child, rng);
                }
                next_population.push(child);
            }

            population = next_population;
            for (route, slot) in population.iter().zip(fitness.iter_mut()) {
                *slot = tour_distance(route, task.cities);
            }

            let iteration_best = min_index(&fitness);
            if fitness[iteration_best] < best_distance {
                best = population[iteration_best].clone();
                best_distance = fitness[iteration_best];
            }

            log.record(iteration, best_distance, &best, fitness[iteration_best]);
        }

        (best, best_distance)
    }
}

fn tournament_select<'a, R: Rng + ?Sized>(
    population: &'a [Vec<usize>],
    fitness: &[f64],
    tournament_size: usize,
    rng: &mut R,
) -> &'a [usize] {
    let mut best = rng.random_range(0..population.len());
    for _ in 1..tournament_size {
        let candidate = rng.random_range(0..population.len());
        if fitness[candidate] < fitness[best] {
            best = candidate;
        }
    }
    &population[best]
}

/// Order Crossover (OX): copies `parent1[start..=end]` into the child, then
/// fills the remaining slots in `parent2` order starting after the segment,
/// skipping cities already present.
fn order_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    let n = parent1.len();
    let start = rng.random_range(0..n);
    let end = rng.random_range(start..n);

    let mut child = vec![usize::MAX; n];
    let mut in_child = vec![false; n];
    for i in start..=end {
        child[i] = parent1[i];
        in_child[parent1[i]] = true;
    }

    let mut pos = (end + 1) % n;
    for i in 0..n {
        let gene = parent2[(end + 1 + i) % n];
        if !in_child[gene] {
            child[pos] = gene;
            pos = (pos + 1) % n;
        }
    }

    child
}

fn swap_mutation<R: Rng + ?Sized>(route: &mut [usize], rng: &mut R) {
    let i = rng.random_range(0..route.len());
    let j = rng.random_range(0..route.len());
    route.swap(i, j);
}
