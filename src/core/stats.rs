//! Welford running statistics and autoencoder reconstruction error.

use super::dense::FeedForward;
use super::fixed::{Fixed, FRAC_BITS};

/// Per-dimension running mean and unnormalized variance (`M2`).
///
/// `count` only grows; every `m2` entry stays ≥ 0 because `delta` and
/// `x - mean'` always share a sign under truncating division.
///
/// `m2` is held wide (i64, same `2^-FRAC_BITS` scale) so it keeps growing with
/// `count` for the life of the host. Only `variance` narrows back to `Fixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningStats<const N: usize> {
    mean: [Fixed; N],
    m2: [i64; N],
    count: u64,
}

impl<const N: usize> RunningStats<N> {
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            mean: [Fixed::ZERO; N],
            m2: [0; N],
            count: 0,
        }
    }

    /// Fold one observation in.
    #[inline]
    pub fn observe(&mut self, x: &[Fixed; N]) {
        self.count = self.count.saturating_add(1);
        for d in 0..N {
            let delta = x[d] - self.mean[d];
            self.mean[d] += delta.div_count(self.count);
            let spread = (delta.raw() as i64 * (x[d] - self.mean[d]).raw() as i64) >> FRAC_BITS;
            self.m2[d] = self.m2[d].saturating_add(spread);
        }
    }

    #[inline(always)]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[inline(always)]
    pub const fn mean(&self) -> &[Fixed; N] {
        &self.mean
    }

    /// Raw accumulator, before normalization. Scaled by `2^FRAC_BITS` like a `Fixed` raw.
    #[inline(always)]
    pub const fn m2(&self) -> &[i64; N] {
        &self.m2
    }

    /// Sample variance `m2 / (count - 1)`; `m2` itself while `count ≤ 1`.
    #[inline]
    pub fn variance(&self, dim: usize) -> Fixed {
        let Some(&m2) = self.m2.get(dim) else {
            return Fixed::ZERO;
        };
        let samples = self.count.saturating_sub(1).clamp(1, i64::MAX as u64) as i64;
        let var = m2 / samples;
        Fixed::from_raw(var.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    #[inline]
    pub fn std_dev(&self, dim: usize) -> Fixed {
        self.variance(dim).sqrt()
    }

    #[inline(always)]
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl<const N: usize> Default for RunningStats<N> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

/// Σ (x - decode(encode(x)))². Pure; saturates rather than wraps.
#[inline]
pub fn reconstruction_error(encoder: &FeedForward<'_>, decoder: &FeedForward<'_>, x: &[Fixed]) -> Fixed {
    let code = encoder.forward(x);
    let recon = decoder.forward(&code);
    x.iter().zip(recon.iter()).fold(Fixed::ZERO, |acc, (&xi, &ri)| {
        let diff = xi - ri;
        acc + diff * diff
    })
}
