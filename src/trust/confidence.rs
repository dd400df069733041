// trust/confidence.rs - Confidence in Direct Experience

use super::beta::definite_integral;
use super::TrustError;
use crate::scenario::HistoryEntry;

/// Half-width of the interval around the experience value
pub const ERROR_MARGIN: f64 = 0.2;

/// Posterior mass of `Beta(successes + 1, failures + 1)` within
/// [`ERROR_MARGIN`] of `experience_value`.
///
/// The result lies in `[0, 1]`; values near one mean the recipient's history
/// pins the sender's behavior down tightly.
pub fn confidence(experience_value: f64, history: HistoryEntry) -> Result<f64, TrustError> {
    confidence_with_margin(experience_value, history, ERROR_MARGIN)
}

/// [`confidence`] with an explicit margin
pub fn confidence_with_margin(
    experience_value: f64,
    history: HistoryEntry,
    margin: f64,
) -> Result<f64, TrustError> {
    if !(margin.is_finite() && margin > 0.0) {
        return Err(TrustError::Domain(format!(
            "error margin must be positive and finite, got {}",
            margin
        )));
    }

    let (alpha, beta) = history.shape();
    let numerator = definite_integral(
        experience_value - margin,
        experience_value + margin,
        alpha,
        beta,
    )?;
    let denominator = definite_integral(0.0, 1.0, alpha, beta)?;

    let ratio = numerator / denominator;
    if !ratio.is_finite() {
        return Err(TrustError::Domain(format!(
            "confidence for {} is not finite ({} / {})",
            history, numerator, denominator
        )));
    }
    Ok(ratio.clamp(0.0, 1.0))
}
