//! Roulette-wheel parent selection.
//!
//! Fitness values are shifted so the worst member has weight zero, then
//! normalized to sum to one. Weights are stored in rank order: `weights[k]`
//! belongs to member `ranking[k]`.

use rand::Rng;
use tracing::warn;

/// Draws of a second parent before falling back to the next ranked member.
pub const MAX_PARENT_DRAWS: usize = 64;

/// Computes rank-ordered selection weights.
///
/// If every member has the same fitness the weights are uniform.
pub fn compute_weights(fitness: &[f64], ranking: &[usize]) -> Vec<f64> {
    let n = ranking.len();
    if n == 0 {
        return Vec::new();
    }
    let min = fitness.iter().copied().fold(f64::INFINITY, f64::min);
    let mut weights: Vec<f64> = ranking.iter().map(|&m| fitness[m] - min).collect();
    let sum: f64 = weights.iter().sum();

    if sum > 0.0 && sum.is_finite() {
        for w in &mut weights {
            *w /= sum;
        }
    } else {
        weights.fill(1.0 / n as f64);
    }
    weights
}

/// Returns the first ranked member whose cumulative weight exceeds `r`.
///
/// `r` is a uniform draw from `[0, 1)`. Rounding can leave the total just
/// below `r`; the last member with positive weight is returned then.
pub fn roulette(weights: &[f64], ranking: &[usize], r: f64) -> usize {
    let mut sum = 0.0;
    for (k, &w) in weights.iter().enumerate() {
        sum += w;
        if r < sum {
            return ranking[k];
        }
    }
    weights
        .iter()
        .rposition(|&w| w > 0.0)
        .map_or(ranking[0], |k| ranking[k])
}

/// Draws two distinct parents.
///
/// Requires at least two ranked members.
pub fn select_parents<R: Rng>(weights: &[f64], ranking: &[usize], rng: &mut R) -> (usize, usize) {
    debug_assert!(ranking.len() >= 2);
    let mom = roulette(weights, ranking, rng.random::<f64>());
    for _ in 0..MAX_PARENT_DRAWS {
        let dad = roulette(weights, ranking, rng.random::<f64>());
        if dad != mom {
            return (mom, dad);
        }
    }

    let k = ranking.iter().position(|&m| m == mom).unwrap_or(0);
    let dad = ranking[(k + 1) % ranking.len()];
    warn!(mom, dad, "no distinct second parent drawn; using next ranked member");
    (mom, dad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_weights_normalized() {
        let fitness = [0.5, 0.9, 0.7];
        let ranking = [1, 2, 0];
        let w = compute_weights(&fitness, &ranking);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((w[0] - 0.4 / 0.6).abs() < 1e-12);
        assert!((w[1] - 0.2 / 0.6).abs() < 1e-12);
        assert_eq!(w[2], 0.0);
    }

    #[test]
    fn test_weights_uniform_when_equal() {
        let w = compute_weights(&[0.3, 0.3, 0.3, 0.3], &[0, 1, 2, 3]);
        assert!(w.iter().all(|&x| (x - 0.25).abs() < 1e-12));
    }

    #[test]
    fn test_roulette_cumulative() {
        let ranking = [4, 2, 7];
        let weights = [0.5, 0.3, 0.2];
        assert_eq!(roulette(&weights, &ranking, 0.0), 4);
        assert_eq!(roulette(&weights, &ranking, 0.49), 4);
        assert_eq!(roulette(&weights, &ranking, 0.5), 2);
        assert_eq!(roulette(&weights, &ranking, 0.85), 7);
    }

    #[test]
    fn test_roulette_rounding_fallback() {
        let ranking = [3, 1, 0];
        let weights = [0.6, 0.3999, 0.0];
        assert_eq!(roulette(&weights, &ranking, 0.99995), 1);
    }

    #[test]
    fn test_select_parents_distinct() {
        let mut rng = SmallRng::seed_from_u64(42);
        let ranking = [2, 0, 1, 3];
        let weights = compute_weights(&[0.2, 0.1, 0.9, 0.0], &ranking);
        for _ in 0..200 {
            let (mom, dad) = select_parents(&weights, &ranking, &mut rng);
            assert_ne!(mom, dad);
            assert_ne!(mom, 3, "worst member has zero weight");
        }
    }

    #[test]
    fn test_select_parents_single_weighted_member() {
        let mut rng = SmallRng::seed_from_u64(42);
        let ranking = [1, 0, 2];
        let weights = compute_weights(&[0.0, 1.0, 0.0], &ranking);
        let (mom, dad) = select_parents(&weights, &ranking, &mut rng);
        assert_eq!((mom, dad), (1, 0));
    }
}
