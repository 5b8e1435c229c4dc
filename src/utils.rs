use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use rand_distr::Uniform;

/// Seed of the current iteration, set by main before each scenario run
pub static RAND_SEED: AtomicU64 = AtomicU64::new(0);

/// Number of full games played since the counter was last reset
pub static TOTAL_SIMULATION_RUNS: AtomicU64 = AtomicU64::new(0);

/// When set, every auction is logged as a CSV line on LogEvent::Auction
pub static VERBOSE_AUCTION: AtomicBool = AtomicBool::new(false);

/// Combine a per-purpose base seed with the current iteration seed
/// so that every random stream is reproducible and independent
pub fn get_seed(base_seed: u64) -> u64 {
    base_seed.wrapping_add(RAND_SEED.load(Ordering::Relaxed).wrapping_mul(1_000_003))
}

/// Uniform distribution over [low, high) for values per click
pub fn uniform_dist(low: f64, high: f64) -> Uniform<f64> {
    Uniform::new(low, high)
}

/// Index of the first maximum; earlier entries win ties.
/// Returns None for an empty slice.
pub fn argmax_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if v <= best_value => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_first_wins_ties() {
        assert_eq!(argmax_index(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax_index(&[5.0, 5.0]), Some(0));
        assert_eq!(argmax_index(&[-4.0, -2.0, -3.0]), Some(1));
        assert_eq!(argmax_index(&[]), None);
    }

    #[test]
    fn test_get_seed_depends_on_base() {
        assert_ne!(get_seed(1991), get_seed(2992));
    }
}
