//! Cross-strategy invariants and end-to-end engine scenarios.

use std::sync::Arc;

use proptest::prelude::*;
use uuid::Uuid;

use tsp_metaheur::entity::{AlgorithmConfiguration, ProblemDefinition};
use tsp_metaheur::model::{tour_distance, City, Params};
use tsp_metaheur::progress::RunStatus;
use tsp_metaheur::repository::{InMemoryRepository, Repository};
use tsp_metaheur::service::OptimizationService;
use tsp_metaheur::strategy::{solve, AlgorithmKind, SolveOptions};

fn unit_square() -> Vec<City> {
    vec![
        City::new(0, 0.0, 0.0),
        City::new(1, 1.0, 0.0),
        City::new(2, 1.0, 1.0),
        City::new(3, 0.0, 1.0),
    ]
}

fn random_cities(n: usize, seed: u64) -> Vec<City> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            City::new(
                i as u32,
                rng.random_range(0.0..100.0),
                rng.random_range(0.0..100.0),
            )
        })
        .collect()
}

fn is_permutation(route: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    route.len() == n
        && route.iter().all(|&city| {
            if city >= n || seen[city] {
                return false;
            }
            seen[city] = true;
            true
        })
}

#[test]
fn test_every_strategy_reaches_the_unit_square_optimum() {
    let cities = unit_square();
    for kind in AlgorithmKind::ALL {
        let result = solve(
            kind,
            &cities,
            300,
            &Params::default(),
            SolveOptions {
                seed: Some(42),
                ..Default::default()
            },
        );
        assert!(
            (result.best_distance - 4.0).abs() < 1e-9,
            "{kind}: expected the perimeter 4.0, got {}",
            result.best_distance
        );
    }
}

#[test]
fn test_best_distance_always_matches_the_best_route() {
    let cities = random_cities(10, 99);
    for kind in AlgorithmKind::ALL {
        let result = solve(
            kind,
            &cities,
            80,
            &Params::default(),
            SolveOptions {
                seed: Some(7),
                ..Default::default()
            },
        );
        let recomputed = tour_distance(&result.best_route, &cities);
        assert!(
            (result.best_distance - recomputed).abs() < 1e-9,
            "{kind}: reported {} but the route measures {recomputed}",
            result.best_distance
        );
    }
}

#[test]
fn test_best_is_monotone_and_last_entry_matches_result() {
    let cities = random_cities(8, 123);
    for kind in AlgorithmKind::ALL {
        let result = solve(
            kind,
            &cities,
            60,
            &Params::default(),
            SolveOptions {
                seed: Some(11),
                ..Default::default()
            },
        );
        assert_eq!(result.total_iterations, result.iteration_history.len());
        for window in result.iteration_history.windows(2) {
            assert!(
                window[1].best_distance <= window[0].best_distance + 1e-12,
                "{kind}: best distance regressed"
            );
        }
        let last = result
            .iteration_history
            .last()
            .expect("60 iterations leave a history");
        let first = &result.iteration_history[0];
        assert!(last.best_distance <= first.best_distance);
        assert!((last.best_distance - result.best_distance).abs() < 1e-12);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn test_routes_and_history_stay_permutations(n in 4usize..10, seed in 0u64..1_000) {
        let cities = random_cities(n, seed);
        for kind in AlgorithmKind::ALL {
            let result = solve(
                kind,
                &cities,
                25,
                &Params::default(),
                SolveOptions { seed: Some(seed), ..Default::default() },
            );
            prop_assert!(
                is_permutation(&result.best_route, n),
                "{} produced a non-permutation route: {:?}",
                kind,
                result.best_route
            );
            for entry in &result.iteration_history {
                prop_assert!(is_permutation(&entry.best_route, n));
            }
        }
    }
}

fn seeded_service(
    kind: AlgorithmKind,
    max_iterations: usize,
    cities: Vec<City>,
) -> (OptimizationService, Uuid, Uuid, Uuid) {
    let repository = Arc::new(InMemoryRepository::new());
    let owner_id = Uuid::new_v4();
    let configuration = AlgorithmConfiguration::new(
        "engine test",
        kind,
        Params::default(),
        max_iterations,
        owner_id,
    );
    let configuration_id = configuration.id;
    repository.insert_configuration(configuration);
    let problem = ProblemDefinition::new("engine problem", cities, owner_id);
    let problem_id = problem.id;
    repository.insert_problem(problem);
    (
        OptimizationService::new(repository as Arc<dyn Repository>),
        configuration_id,
        problem_id,
        owner_id,
    )
}

#[tokio::test]
async fn test_full_run_streams_and_then_persists() {
    let (service, configuration_id, problem_id, owner_id) =
        seeded_service(AlgorithmKind::AntColonyOptimization, 40, unit_square());

    let run = service
        .start_run(configuration_id, problem_id, owner_id)
        .await
        .expect("start must succeed");
    assert_eq!(run.status, RunStatus::Running);

    let mut last_len = 0usize;
    let snapshot = loop {
        let snapshot = service
            .poll_progress(run.id, owner_id)
            .await
            .expect("poll must succeed");
        assert!(snapshot.iteration_history.len() >= last_len);
        last_len = snapshot.iteration_history.len();
        if snapshot.status == RunStatus::Completed {
            break snapshot;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    };

    assert_eq!(snapshot.iteration_history.len(), 40);
    let best = snapshot.best_distance.expect("completed run has a best");
    assert!(
        (best - 4.0).abs() < 1e-9,
        "40 ACO iterations must settle on the square perimeter, got {best}"
    );

    // The persisted record agrees with the final snapshot.
    let persisted = service
        .get_run(run.id, owner_id)
        .await
        .expect("record must load");
    assert_eq!(persisted.status, RunStatus::Completed);
    assert_eq!(persisted.total_iterations, 40);
    assert_eq!(persisted.best_distance, snapshot.best_distance);
}

#[tokio::test]
async fn test_polling_a_random_id_is_not_found() {
    let (service, _, _, owner_id) =
        seeded_service(AlgorithmKind::SimulatedAnnealing, 10, unit_square());
    assert!(service.poll_progress(Uuid::new_v4(), owner_id).await.is_err());
}
