//! Ant Colony Optimization.
//!
//! Every iteration, each ant builds a full tour by roulette selection over
//! `pheromone^alpha * (1/distance)^beta` among unvisited cities. Pheromone
//! evaporates multiplicatively, then the iteration's best tour deposits
//! `pheromoneDeposit / tourDistance` on each of its edges in both
//! directions (the graph is undirected).
//!
//! # References
//!
//! - Dorigo & Gambardella (1997), "Ant Colony System"

use rand::rngs::StdRng;
use rand::Rng;

use super::{random_route, SearchLog, SolveTask, Strategy};
use crate::model::{tour_distance, City};

/// Parameters: `antCount` (20), `alpha` (1.0), `beta` (5.0),
/// `evaporationRate` (0.5), `pheromoneDeposit` (100).
pub struct AntColonyOptimization;

impl Strategy for AntColonyOptimization {
    fn run(
        &self,
        task: &SolveTask<'_>,
        log: &mut SearchLog<'_>,
        rng: &mut StdRng,
    ) -> (Vec<usize>, f64) {
        let ant_count = task.params.get_usize("antCount", 20).max(1);
        let alpha = task.params.get("alpha", 1.0);
        let beta = task.params.get("beta", 5.0);
        let evaporation_rate = task.params.get("evaporationRate", 0.5);
        let pheromone_deposit = task.params.get("pheromoneDeposit", 100.0);

        let n = task.cities.len();
        let distances = distance_matrix(task.cities);
        let mut pheromones = vec![vec![1.0_f64; n]; n];

        let mut best = random_route(n, rng);
        let mut best_distance = tour_distance(&best, task.cities);

        for iteration in 0..task.max_iterations {
            if log.cancelled() {
                break;
            }

            let mut iteration_best = best.clone();
            let mut iteration_best_distance = best_distance;

            for _ in 0..ant_count {
                let tour = construct_tour(n, &pheromones, &distances, alpha, beta, rng);
                let distance = tour_distance(&tour, task.cities);
                if distance < iteration_best_distance {
                    iteration_best = tour;
                    iteration_best_distance = distance;
                }
            }

            for row in pheromones.iter_mut() {
                for value in row.iter_mut() {
                    *value *= 1.0 - evaporation_rate;
                }
            }
            deposit(
                &mut pheromones,
                &iteration_best,
                iteration_best_distance,
                pheromone_deposit,
            );

            if iteration_best_distance < best_distance {
                best = iteration_best.clone();
                best_distance = iteration_best_distance;
            }

            log.record(iteration, best_distance, &best, iteration_best_distance);
        }

        (best, best_distance)
    }
}

fn distance_matrix(cities: &[City]) -> Vec<Vec<f64>> {
    let n = cities.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = cities[i].distance_to(&cities[j]);
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}

fn construct_tour(
    n: usize,
    pheromones: &[Vec<f64>],
    distances: &[Vec<f64>],
    alpha: f64,
    beta: f64,
    rng: &mut StdRng,
) -> Vec<usize> {
    let mut tour = Vec::with_capacity(n);
    let mut visited = vec![false; n];
    let start = rng.random_range(0..n);
    tour.push(start);
    visited[start] = true;

    while tour.len() < n {
        let current = tour[tour.len() - 1];
        let next = select_next_city(current, &visited, pheromones, distances, alpha, beta, rng);
        tour.push(next);
        visited[next] = true;
    }

    tour
}

fn select_next_city(
    current: usize,
    visited: &[bool],
    pheromones: &[Vec<f64>],
    distances: &[Vec<f64>],
    alpha: f64,
    beta: f64,
    rng: &mut StdRng,
) -> usize {
    let n = visited.len();
    let mut weights = vec![0.0; n];
    let mut sum = 0.0;

    for j in 0..n {
        if visited[j] {
            continue;
        }
        // Coincident cities would zero the heuristic term's denominator.
        let distance = if distances[current][j] == 0.0 {
            1e-4
        } else {
            distances[current][j]
        };
        weights[j] = pheromones[current][j].powf(alpha) * (1.0 / distance).powf(beta);
        sum += weights[j];
    }

    if sum == 0.0 {
        // All weights vanished; any unvisited city will do.
        for j in 0..n {
            if !visited[j] {
                return j;
            }
        }
    }

    let threshold = rng.random::<f64>() * sum;
    let mut cumulative = 0.0;
    for j in 0..n {
        if visited[j] {
            continue;
        }
        cumulative += weights[j];
        if cumulative >= threshold {
            return j;
        }
    }

    for j in 0..n {
        if !visited[j] {
            return j;
        }
    }
    0
}

fn deposit(pheromones: &mut [Vec<f64>], tour: &[usize], distance: f64, deposit: f64) {
    let amount = deposit / distance;
    for pair in tour.windows(2) {
        pheromones[pair[0]][pair[1]] += amount;
        pheromones[pair[1]][pair[0]] += amount;
    }
    let last = tour[tour.len() - 1];
    let first = tour[0];
    pheromones[last][first] += amount;
    pheromones[first][last] += amount;
}
