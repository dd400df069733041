// trust/experience.rs - Direct Experience

use crate::scenario::HistoryEntry;

/// Direct-trust value of one pair: the posterior mean `α / (α + β)` of
/// `Beta(successes + 1, failures + 1)`.
///
/// Always defined and always strictly inside `(0, 1)`. Counts so large that
/// the quotient rounds to an endpoint yield the nearest value inside.
pub fn experience(history: HistoryEntry) -> f64 {
    let (alpha, beta) = history.shape();
    (alpha / (alpha + beta)).clamp(f64::MIN_POSITIVE, LARGEST_BELOW_ONE)
}

/// Largest `f64` strictly below one
const LARGEST_BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;
