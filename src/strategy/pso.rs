//! Particle Swarm Optimization for permutation spaces.
//!
//! TSP has no continuous velocity, so a particle's velocity is a swap
//! sequence: the list of index swaps that moves its route toward a target
//! permutation. Each iteration blends retained swaps (inertia, linearly
//! decayed), swaps toward the personal best (cognitive), and swaps toward
//! the global best (social), capped at `n/2` applied swaps.

use rand::rngs::StdRng;
use rand::Rng;

use super::{min_index, random_route, SearchLog, SolveTask, Strategy};
use crate::model::tour_distance;

/// Parameters: `swarmSize` (30), `cognitiveWeight` (2.0), `socialWeight`
/// (2.0), `inertiaMax` (0.9), `inertiaMin` (0.4).
pub struct ParticleSwarmOptimization;

impl Strategy for ParticleSwarmOptimization {
    fn run(
        &self,
        task: &SolveTask<'_>,
        log: &mut SearchLog<'_>,
        rng: &mut StdRng,
    ) -> (Vec<usize>, f64) {
        let swarm_size = task.params.get_usize("swarmSize", 30).max(1);
        let cognitive_weight = task.params.get("cognitiveWeight", 2.0);
        let social_weight = task.params.get("socialWeight", 2.0);
        let inertia_max = task.params.get("inertiaMax", 0.9);
        let inertia_min = task.params.get("inertiaMin", 0.4);

        let n = task.cities.len();
        let mut particles: Vec<Vec<usize>> =
            (0..swarm_size).map(|_| random_route(n, rng)).collect();
        let mut personal_best = particles.clone();
        let mut personal_best_distance: Vec<f64> = particles
            .iter()
            .map(|route| tour_distance(route, task.cities))
            .collect();
        let mut velocities: Vec<Vec<(usize, usize)>> = vec![Vec::new(); swarm_size];

        let global_idx = min_index(&personal_best_distance);
        let mut global_best = personal_best[global_idx].clone();
        let mut global_best_distance = personal_best_distance[global_idx];

        let cognitive_share = cognitive_weight / (cognitive_weight + social_weight);
        let social_share = social_weight / (cognitive_weight + social_weight);

        for iteration in 0..task.max_iterations {
            if log.cancelled() {
                break;
            }

            let inertia = inertia_max
                - (inertia_max - inertia_min) * iteration as f64 / task.max_iterations as f64;
            let mut iteration_best_distance = f64::INFINITY;

            for i in 0..swarm_size {
                let personal_swaps = swap_sequence(&particles[i], &personal_best[i]);
                let global_swaps = swap_sequence(&particles[i], &global_best);

                let mut velocity = Vec::new();
                for &swap in &velocities[i] {
                    if rng.random_range(0.0..1.0) < inertia {
                        velocity.push(swap);
                    }
                }
                for &swap in &personal_swaps {
                    if rng.random_range(0.0..1.0) < cognitive_share {
                        velocity.push(swap);
                    }
                }
                for &swap in &global_swaps {
                    if rng.random_range(0.0..1.0) < social_share {
                        velocity.push(swap);
                    }
                }

                // Cap the move length, keeping the earliest swaps.
                velocity.truncate(n / 2);

                for &(a, b) in &velocity {
                    particles[i].swap(a, b);
                }
                velocities[i] = velocity;

                let distance = tour_distance(&particles[i], task.cities);
                if distance < iteration_best_distance {
                    iteration_best_distance = distance;
                }
                if distance < personal_best_distance[i] {
                    personal_best[i] = particles[i].clone();
                    personal_best_distance[i] = distance;
                }
                if distance < global_best_distance {
                    global_best = particles[i].clone();
                    global_best_distance = distance;
                }
            }

            log.record(
                iteration,
                global_best_distance,
                &global_best,
                iteration_best_distance,
            );
        }

        (global_best, global_best_distance)
    }
}

/// The swap sequence that transforms `current` into `target`.
///
/// Walks the positions left to right; whenever the cities differ, swaps the
/// wanted city into place and records the swap. A position map keeps each
/// lookup O(1).
fn swap_sequence(current: &[usize], target: &[usize]) -> Vec<(usize, usize)> {
    let mut swaps = Vec::new();
    let mut temp = current.to_vec();
    let mut position = vec![0usize; temp.len()];
    for (i, &city) in temp.iter().enumerate() {
        position[city] = i;
    }

    for i in 0..target.len() {
        if temp[i] != target[i] {
            let j = position[target[i]];
            swaps.push((i, j));
            position[temp[i]] = j;
            position[temp[j]] = i;
            temp.swap(i, j);
        }
    }

    swaps
}
