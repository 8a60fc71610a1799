//! Tour model primitives: cities, distances, and solver result types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A city on the Euclidean plane.
///
/// Cities are immutable once constructed; routes refer to them by their
/// position in the problem's city list, not by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub name: Option<String>,
}

impl City {
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            name: None,
        }
    }

    pub fn named(id: u32, x: f64, y: f64, name: impl Into<String>) -> Self {
        Self {
            id,
            x,
            y,
            name: Some(name.into()),
        }
    }

    /// Euclidean distance to another city.
    pub fn distance_to(&self, other: &City) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Total length of the closed tour visiting `order` in sequence.
///
/// Sums the consecutive edges and the closing edge back to the first
/// city. `order` must be a permutation of `0..cities.len()`.
pub fn tour_distance(order: &[usize], cities: &[City]) -> f64 {
    if order.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    for pair in order.windows(2) {
        total += cities[pair[0]].distance_to(&cities[pair[1]]);
    }
    total + cities[order[order.len() - 1]].distance_to(&cities[order[0]])
}

/// One entry of a run's iteration history.
///
/// `best_distance` is non-increasing across the history of one run.
/// `current_distance` is the best candidate distance observed during that
/// iteration's exploration; it is explicitly noisy and may exceed
/// `best_distance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationResult {
    pub iteration: usize,
    pub best_distance: f64,
    pub best_route: Vec<usize>,
    pub current_distance: f64,
}

/// The finished product of one solver run.
///
/// Immutable after creation. `best_distance` always equals the recomputed
/// tour distance of `best_route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best_distance: f64,
    pub best_route: Vec<usize>,
    pub iteration_history: Vec<IterationResult>,
    pub total_iterations: usize,
    pub execution_time_ms: u64,
}

/// Numeric algorithm parameters keyed by name.
///
/// Every strategy reads its named keys with documented defaults; a missing
/// key yields the default, never an error. Configurations deserialize into
/// this uniform `f64` map, so the strategies never see mixed value shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(HashMap<String, f64>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, builder-style.
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    /// Reads a parameter, falling back to `default` when the key is absent.
    pub fn get(&self, key: &str, default: f64) -> f64 {
        self.0.get(key).copied().unwrap_or(default)
    }

    /// Reads an integer-valued parameter.
    ///
    /// Negative values saturate to zero.
    pub fn get_usize(&self, key: &str, default: usize) -> usize {
        self.get(key, default as f64).round() as usize
    }
}

impl From<HashMap<String, f64>> for Params {
    fn from(map: HashMap<String, f64>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_symmetric() {
        let a = City::new(0, 0.0, 0.0);
        let b = City::new(1, 3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert!((b.distance_to(&a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_tour_distance_closes_the_loop() {
        let cities = vec![
            City::new(0, 0.0, 0.0),
            City::new(1, 1.0, 0.0),
            City::new(2, 1.0, 1.0),
            City::new(3, 0.0, 1.0),
        ];
        let perimeter = tour_distance(&[0, 1, 2, 3], &cities);
        assert!(
            (perimeter - 4.0).abs() < 1e-12,
            "expected the unit-square perimeter, got {perimeter}"
        );

        // A crossing tour is strictly longer.
        let crossed = tour_distance(&[0, 2, 1, 3], &cities);
        assert!(crossed > perimeter);
    }

    #[test]
    fn test_tour_distance_rotation_invariant() {
        let cities = vec![
            City::new(0, 0.0, 0.0),
            City::new(1, 4.0, 0.0),
            City::new(2, 4.0, 3.0),
            City::new(3, 0.0, 3.0),
        ];
        let base = tour_distance(&[0, 1, 2, 3], &cities);
        let rotated = tour_distance(&[2, 3, 0, 1], &cities);
        assert!((base - rotated).abs() < 1e-12);
    }

    #[test]
    fn test_params_default_on_missing_key() {
        let params = Params::new().with("alpha", 2.5);
        assert!((params.get("alpha", 1.0) - 2.5).abs() < 1e-12);
        assert!((params.get("beta", 5.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_params_usize_conversion() {
        let params = Params::new()
            .with("antCount", 12.0)
            .with("populationSize", 49.6)
            .with("bogus", -3.0);
        assert_eq!(params.get_usize("antCount", 20), 12);
        assert_eq!(params.get_usize("populationSize", 50), 50);
        assert_eq!(params.get_usize("bogus", 10), 0);
        assert_eq!(params.get_usize("missing", 30), 30);
    }
}
