/// Generate a random `f64` in the range `[low, high)`.
#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Generate a Gaussian draw with the given mean and standard deviation
/// via the Box-Muller transform of two uniform draws.
#[inline]
pub(crate) fn normal(rng: &mut fastrand::Rng, mu: f64, sigma: f64) -> f64 {
    // u1 must be strictly positive for the logarithm.
    let u1 = 1.0 - rng.f64();
    let u2 = rng.f64();
    let z = (-2.0 * u1.ln()).sqrt() * (core::f64::consts::TAU * u2).cos();
    mu + sigma * z
}
