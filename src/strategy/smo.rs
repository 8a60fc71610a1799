//! Slime Mold Optimization adapted to permutation spaces.
//!
//! Individuals are ranked by fitness each iteration and assigned a weight
//! from their rank and their fitness relative to the population's best and
//! worst. With probability `z` an individual restarts from a fresh random
//! route; otherwise it either oscillates toward the best route (weighted
//! random swaps plus a spliced segment of the best tour) or explores
//! locally with a smaller number of swaps. A move is kept only if it does
//! not worsen the individual.
//!
//! # References
//!
//! - Li et al. (2020), "Slime mould algorithm: A new method for stochastic
//!   optimization"

use rand::rngs::StdRng;
use rand::Rng;

use super::{min_index, random_route, SearchLog, SolveTask, Strategy};
use crate::model::tour_distance;

/// Parameters: `populationSize` (30), `z` (0.03).
pub struct SlimeMoldOptimization;

impl Strategy for SlimeMoldOptimization {
    fn run(
        &self,
        task: &SolveTask<'_>,
        log: &mut SearchLog<'_>,
        rng: &mut StdRng,
    ) -> (Vec<usize>, f64) {
        let population_size = task.params.get_usize("populationSize", 30).max(1);
        let z = task.params.get("z", 0.03);

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
            let best_fitness = fitness[ranking[0]];
            let worst_fitness = fitness[ranking[population_size - 1]];
            let mut ranks = vec![0usize; population_size];
            for (rank, &idx) in ranking.iter().enumerate() {
                ranks[idx] = rank;
            }

            let t = (iteration + 1) as f64 / task.max_iterations as f64;
            // Clamped away from 1.0 so atanh stays finite.
            let a = (1.0 - t).min(0.999).atanh();

            for i in 0..population_size {
                let weight = weight_for(
                    fitness[i],
                    best_fitness,
                    worst_fitness,
                    ranks[i],
                    population_size,
                    rng,
                );

                let candidate = if rng.random_range(0.0..1.0) < z {
                    random_route(n, rng)
                } else {
                    let mut candidate = population[i].clone();
                    let p = (fitness[i] - best_fitness).abs().tanh();
                    let vb = 2.0 * a * (rng.random_range(0.0..1.0) - 0.5);
                    let vc = 2.0 * a * (rng.random_range(0.0..1.0) - 0.5);

                    if rng.random_range(0.0..1.0) < p {
                        let swap_count =
                            (((weight * vb).abs() * n as f64 / 4.0) as usize).clamp(1, n);
                        random_swaps(&mut candidate, swap_count, rng);
                        splice_best_segment(&mut candidate, &best, rng);
                    } else {
                        let swap_count = ((vc.abs() * n as f64 / 4.0) as usize).clamp(1, n);
                        random_swaps(&mut candidate, swap_count, rng);
                    }
                    candidate
                };

                let candidate_distance = tour_distance(&candidate, task.cities);
                if candidate_distance < fitness[i] {
                    population[i] = candidate;
                    fitness[i] = candidate_distance;
                }
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

/// Rank-dependent weight: the upper half of the ranking is pushed above
/// 1.0, the lower half below, scaled by the individual's normalized gap to
/// the population best.
fn weight_for<R: Rng + ?Sized>(
    fitness: f64,
    best_fitness: f64,
    worst_fitness: f64,
    rank: usize,
    population_size: usize,
    rng: &mut R,
) -> f64 {
    let range = worst_fitness - best_fitness;
    if range == 0.0 {
        return 1.0;
    }
    let scaled = ((fitness - best_fitness) / range + 1.0).log10();
    if rank < population_size / 2 {
        1.0 + rng.random_range(0.0..1.0) * scaled
    } else {
        1.0 - rng.random_range(0.0..1.0) * scaled
    }
}

fn random_swaps<R: Rng + ?Sized>(route: &mut [usize], count: usize, rng: &mut R) {
    let n = route.len();
    for _ in 0..count {
        let i = rng.random_range(0..n);
        let j = rng.random_range(0..n);
        route.swap(i, j);
    }
}

/// Splices a random contiguous segment of the best route into `route`,
/// keeping the remaining cities in their current relative order.
fn splice_best_segment<R: Rng + ?Sized>(route: &mut Vec<usize>, best: &[usize], rng: &mut R) {
    let n = best.len();
    let segment_length = (n / 5).max(2).min(n);
    let start = if n > segment_length {
        rng.random_range(0..n - segment_length)
    } else {
        0
    };

    let segment = &best[start..start + segment_length];
    let mut in_segment = vec![false; n];
    for &city in segment {
        in_segment[city] = true;
    }

    let remaining: Vec<usize> = route.iter().copied().filter(|&c| !in_segment[c]).collect();
    let insert_pos = start.min(remaining.len());

    let mut rebuilt = Vec::with_capacity(n);
    rebuilt.extend_from_slice(&remaining[..insert_pos]);
    rebuilt.extend_from_slice(segment);
    rebuilt.extend_from_slice(&remaining[insert_pos..]);
    *route = rebuilt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Params;
    use crate::strategy::fixtures::{assert_permutation, random_cities, unit_square};
    use crate::strategy::{make_rng, solve, AlgorithmKind, SolveOptions};

    #[test]
    fn test_smo_finds_unit_square_perimeter() {
        let cities = unit_square();
        let result = solve(
            AlgorithmKind::SlimeMoldOptimization,
            &cities,
            150,
            &Params::default(),
            SolveOptions {
                seed: Some(42),
                ..Default::default()
            },
        );
        assert!(
            (result.best_distance - 4.0).abs() < 1e-9,
            "expected the perimeter, got {}",
            result.best_distance
        );
    }

    #[test]
    fn test_splice_keeps_permutation() {
        let mut rng = make_rng(Some(42));
        for n in [2, 5, 10, 20] {
            let best = random_route(n, &mut rng);
            for _ in 0..30 {
                let mut route = random_route(n, &mut rng);
                splice_best_segment(&mut route, &best, &mut rng);
                assert_permutation(&route, n);
            }
        }
    }

    #[test]
    fn test_weight_is_one_for_flat_population() {
        let mut rng = make_rng(Some(1));
        let w = weight_for(5.0, 5.0, 5.0, 0, 10, &mut rng);
        assert!((w - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weight_sign_depends_on_rank() {
        let mut rng = make_rng(Some(1));
        for _ in 0..20 {
            let upper = weight_for(12.0, 10.0, 20.0, 1, 10, &mut rng);
            let lower = weight_for(12.0, 10.0, 20.0, 8, 10, &mut rng);
            assert!(upper >= 1.0, "upper-half weight below 1.0: {upper}");
            assert!(lower <= 1.0, "lower-half weight above 1.0: {lower}");
        }
    }

    #[test]
    fn test_smo_individuals_never_worsen() {
        let cities = random_cities(10, 27);
        let result = solve(
            AlgorithmKind::SlimeMoldOptimization,
            &cities,
            60,
            &Params::default(),
            SolveOptions {
                seed: Some(42),
                ..Default::default()
            },
        );
        // Replacement is improve-only, so the population best (streamed as
        // current_distance) is non-increasing.
        for window in result.iteration_history.windows(2) {
            assert!(
                window[1].current_distance <= window[0].current_distance + 1e-12,
                "population best regressed: {} > {}",
                window[1].current_distance,
                window[0].current_distance
            );
        }
    }
}
