// trust/beta.rs - Beta Density and Definite Integral

//! Beta distribution statistics via the `statrs` crate.
//!
//! Definite integrals of the density are taken as differences of the
//! distribution function (the regularized incomplete beta `I_x(α, β)`), so
//! the cost does not grow with the shape parameters.

use statrs::distribution::{Beta, Continuous, ContinuousCDF};

use super::TrustError;

/// Beta probability density at `x` with shape parameters `alpha`, `beta`.
///
/// Fails with [`TrustError::Domain`] when either shape parameter is not a
/// positive finite number or `x` lies outside `[0, 1]`.
pub fn density(x: f64, alpha: f64, beta: f64) -> Result<f64, TrustError> {
    if !(0.0..=1.0).contains(&x) {
        return Err(TrustError::Domain(format!(
            "evaluation point {} is outside [0, 1]",
            x
        )));
    }
    let dist = distribution(alpha, beta)?;
    Ok(dist.pdf(x))
}

/// Integral of the beta density over `[lower, upper]`.
///
/// Bounds are clipped to `[0, 1]`; an interval that lies entirely outside
/// carries no mass and integrates to zero.
pub fn definite_integral(lower: f64, upper: f64, alpha: f64, beta: f64) -> Result<f64, TrustError> {
    if lower.is_nan() || upper.is_nan() {
        return Err(TrustError::Domain("integration bound is NaN".into()));
    }
    if lower > upper {
        return Err(TrustError::Domain(format!(
            "integration bounds are reversed: [{}, {}]",
            lower, upper
        )));
    }
    let dist = distribution(alpha, beta)?;

    let a = lower.max(0.0);
    let b = upper.min(1.0);
    if a >= b {
        return Ok(0.0);
    }

    // Above the mean both CDF values approach one; the survival function
    // keeps the small tail masses exact there.
    let mass = if a >= dist_mean(alpha, beta) {
        dist.sf(a) - dist.sf(b)
    } else {
        dist.cdf(b) - dist.cdf(a)
    };

    if !mass.is_finite() {
        return Err(TrustError::Domain(format!(
            "beta mass over [{}, {}] is not finite for alpha={}, beta={}",
            a, b, alpha, beta
        )));
    }
    Ok(mass.clamp(0.0, 1.0))
}

fn dist_mean(alpha: f64, beta: f64) -> f64 {
    alpha / (alpha + beta)
}

fn distribution(alpha: f64, beta: f64) -> Result<Beta, TrustError> {
    let valid = |p: f64| p.is_finite() && p > 0.0;
    if !valid(alpha) || !valid(beta) {
        return Err(TrustError::Domain(format!(
            "shape parameters must be positive and finite (alpha={}, beta={})",
            alpha, beta
        )));
    }
    Beta::new(alpha, beta).map_err(|e| TrustError::Domain(e.to_string()))
}
