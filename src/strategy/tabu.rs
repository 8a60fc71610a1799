//! Tabu Search over a sampled 2-opt neighborhood.
//!
//! Each iteration samples `neighborhoodSize` random segment reversals,
//! selects the best admissible one, and accepts it unconditionally, even
//! when it worsens the current tour. A move is admissible when it is not
//! on the tabu list, or when it is tabu but would beat the all-time best
//! (aspiration criterion). Accepted moves join a FIFO tabu list capped at
//! `tabuTenure` entries.
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.

use std::collections::{HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::Rng;

use super::{random_route, reverse_segment, SearchLog, SolveTask, Strategy};
use crate::model::tour_distance;

/// Parameters: `tabuTenure` (10), `neighborhoodSize` (50).
pub struct TabuSearch;

impl Strategy for TabuSearch {
    fn run(
        &self,
        task: &SolveTask<'_>,
        log: &mut SearchLog<'_>,
        rng: &mut StdRng,
    ) -> (Vec<usize>, f64) {
        let tabu_tenure = task.params.get_usize("tabuTenure", 10);
        let neighborhood_size = task.params.get_usize("neighborhoodSize", 50);

        let n = task.cities.len();
        let mut current = random_route(n, rng);
        let mut current_distance = tour_distance(&current, task.cities);
        let mut best = current.clone();
        let mut best_distance = current_distance;

        // FIFO list of recent moves, with a set for O(1) membership checks.
        let mut tabu_queue: VecDeque<(usize, usize)> = VecDeque::new();
        let mut tabu_set: HashSet<(usize, usize)> = HashSet::new();

        for iteration in 0..task.max_iterations {
            if log.cancelled() {
                break;
            }

            let mut best_neighbor: Option<Vec<usize>> = None;
            let mut best_neighbor_distance = f64::INFINITY;
            let mut best_move = (0, 0);

            for _ in 0..neighborhood_size {
                let mut i = rng.random_range(0..n);
                let mut j = rng.random_range(0..n);
                if i == j {
                    continue;
                }
                if i > j {
                    std::mem::swap(&mut i, &mut j);
                }

                let mut neighbor = current.clone();
                reverse_segment(&mut neighbor, i, j);
                let neighbor_distance = tour_distance(&neighbor, task.cities);

                let is_tabu = tabu_set.contains(&(i, j));
                let aspiration_met = neighbor_distance < best_distance;

                if neighbor_distance < best_neighbor_distance && (!is_tabu || aspiration_met) {
                    best_neighbor = Some(neighbor);
                    best_neighbor_distance = neighbor_distance;
                    best_move = (i, j);
                }
            }

            if let Some(neighbor) = best_neighbor {
                current = neighbor;
                current_distance = best_neighbor_distance;

                tabu_queue.push_back(best_move);
                tabu_set.insert(best_move);
                if tabu_queue.len() > tabu_tenure {
                    if let Some(expired) = tabu_queue.pop_front() {
                        tabu_set.remove(&expired);
                    }
                }

                if current_distance < best_distance {
                    best = current.clone();
                    best_distance = current_distance;
                }
            }

            log.record(iteration, best_distance, &best, current_distance);
        }

        (best, best_distance)
    }
}
