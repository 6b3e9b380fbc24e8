//! Weight vector operations for the genetic algorithm.
//!
//! - **Initialization**: [`random`] draws every gene uniformly from `[-1, 1]`
//! - **Crossover**: [`crossover`] takes each gene from one parent or the other with equal
//!   probability (uniform crossover)
//! - **Mutation**: [`mutate`] adds `N(0, 1)` noise to each gene with a fixed probability
//!   in `[0, 1]`
//!
//! Weights are not normalized: the placement score is a plain dot product, and the
//! ceiling rejection score is absolute.

use kickstack_evaluator::board_feature::{FEATURE_COUNT, Weights};
use rand::Rng;
use rand_distr::StandardNormal;

/// Largest magnitude of a freshly drawn gene.
pub const INITIAL_WEIGHT_RANGE: f64 = 1.0;

/// Draws a weight vector with every gene uniform in `[-1, 1]`.
pub fn random<R>(rng: &mut R) -> Weights
where
    R: Rng + ?Sized,
{
    std::array::from_fn(|_| rng.random_range(-INITIAL_WEIGHT_RANGE..=INITIAL_WEIGHT_RANGE))
}

/// Builds a child taking each gene from `p1` or `p2` with probability 1/2.
pub fn crossover<R>(p1: &Weights, p2: &Weights, rng: &mut R) -> Weights
where
    R: Rng + ?Sized,
{
    std::array::from_fn(|i| if rng.random_bool(0.5) { p1[i] } else { p2[i] })
}

/// Adds a standard normal perturbation to each gene with probability `rate`.
///
/// # Panics
///
/// Panics if `rate` is not in `[0, 1]` (including NaN). Callers taking the rate from
/// user input validate it with [`is_valid_rate`] first.
pub fn mutate<R>(weights: &mut Weights, rate: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    assert!(is_valid_rate(rate), "mutation rate {rate} is outside [0, 1]");
    for w in weights {
        if rng.random_bool(rate) {
            *w += rng.sample::<f64, _>(StandardNormal);
        }
    }
}

/// Returns `true` if `rate` is a probability accepted by [`mutate`].
#[must_use]
pub fn is_valid_rate(rate: f64) -> bool {
    (0.0..=1.0).contains(&rate)
}

/// Converts a slice into a weight vector, or `None` if it has the wrong length.
#[must_use]
pub fn from_slice(values: &[f64]) -> Option<Weights> {
    <[f64; FEATURE_COUNT]>::try_from(values).ok()
}
