//! Deterministic variant generator.
//!
//! Every function here is a pure function of its [`Seed`]: the same tile
//! picks the same texture variant and the same decoration on every redraw,
//! cache miss and reload. Only [`Seed::unpredictable`] draws from the OS RNG,
//! and it is never used for tile-level decisions.

/// Seed for a single deterministic draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed(pub f64);

impl Seed {
    /// Texture-variant stream for the tile at `(x, y)`.
    pub fn texture(x: i32, y: i32) -> Self {
        Self(f64::from(x) * 1000.0 + f64::from(y))
    }

    /// Decoration stream for the tile at `(x, y)`. Swapping the coordinate
    /// order keeps it independent of [`Seed::texture`].
    pub fn decoration(x: i32, y: i32) -> Self {
        Self(f64::from(y) * 1000.0 + f64::from(x))
    }

    /// One-off, non-reproducible seed.
    pub fn unpredictable() -> Self {
        Self(rand::random::<f64>() * 10000.0)
    }
}

/// Unit sample in `[0, 1)`.
pub fn unit(seed: Seed) -> f64 {
    let x = seed.0.sin() * 10000.0;
    let value = x - x.floor();
    // `x - floor(x)` can round up to exactly 1.0 for tiny negative x.
    if value >= 1.0 { 0.0 } else { value }
}

fn ordered(min: f64, max: f64) -> (f64, f64) {
    if min > max { (max, min) } else { (min, max) }
}

/// Float in `[min, max)`; bounds are swapped when given in reverse order.
pub fn random(min: f64, max: f64, seed: Seed) -> f64 {
    let (min, max) = ordered(min, max);
    unit(seed) * (max - min) + min
}

/// Integer in `[min, max)`; `min` when the range is empty.
pub fn random_int(min: i64, max: i64, seed: Seed) -> i64 {
    let (lo, hi) = if min > max { (max, min) } else { (min, max) };
    if lo == hi {
        return lo;
    }
    let value = random(lo as f64, hi as f64, seed).floor() as i64;
    value.clamp(lo, hi - 1)
}

/// Float in `[min, max)` pulled towards `bias`.
///
/// `influence` caps how far the sample moves towards `bias`; the actual mix
/// is drawn from the same seed so the result stays deterministic.
pub fn random_with_bias(min: f64, max: f64, seed: Seed, bias: f64, influence: f64) -> f64 {
    let (min, max) = ordered(min, max);
    let value = unit(seed) * (max - min) + min;
    let mix = unit(seed) * influence;
    value * (1.0 - mix) + bias * mix
}

/// Integer flavor of [`random_with_bias`].
pub fn random_with_bias_int(min: f64, max: f64, seed: Seed, bias: f64, influence: f64) -> i64 {
    random_with_bias(min, max, seed, bias, influence).floor() as i64
}

/// Decreasing weights in `[0, 1]`, largest first, for biasing spatial
/// distributions. Each step multiplies by `steepness` and adds a jitter in
/// `[-randomize, randomize)` drawn from `seed`; the sequence is then
/// normalized by its first element.
pub fn anti_exponential_distribution(n: usize, steepness: f64, randomize: f64, seed: Seed) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }

    // Built back to front, then reversed so the largest weight comes first.
    let mut weights = Vec::with_capacity(n);
    weights.push(1.0);
    for _ in 1..n {
        let last = weights[weights.len() - 1];
        weights.push(last * steepness + random(-randomize, randomize, seed));
    }
    weights.reverse();

    let max = weights[0];
    if max == 0.0 || !max.is_finite() {
        return vec![0.0; n];
    }
    weights
        .into_iter()
        .map(|w| (w / max).clamp(0.0, 1.0))
        .collect()
}
