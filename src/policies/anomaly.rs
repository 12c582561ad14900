//! Anomaly detector. Autoencoder reconstruction error against a running variance.
//!
//! Order per call: reconstruction error (pure), fold the sample into the stats
//! (locked), then judge the error against the updated spread. Until the tracked
//! dimension has non-zero variance nothing is flagged.

use log::warn;

use crate::core::activation::Activation;
use crate::core::dense::{FeedForward, LayerConfig, LayerWeights, NetworkConfig};
use crate::core::error::ModelError;
use crate::core::fixed::Fixed;
use crate::core::policy::Policy;
use crate::core::predictor::Predictor;
use crate::core::stats::{reconstruction_error, RunningStats};

pub const SEC_FEATURES: usize = 7;
pub const SEC_HIDDEN: usize = 16;

/// Multiplier for [`ThresholdRule::Variance`].
pub const VARIANCE_MULTIPLIER: i32 = 16;
/// Multiplier for [`ThresholdRule::StdDev`]. `4² == 16`, so both rules flag the same
/// shape of outlier, up to rounding.
pub const STD_DEV_MULTIPLIER: i32 = 4;

const SEC_ENCODER_LAYERS: [LayerConfig; 1] = [LayerConfig::new(SEC_HIDDEN, Activation::Relu)];
const SEC_DECODER_LAYERS: [LayerConfig; 1] = [LayerConfig::new(SEC_FEATURES, Activation::Identity)];

pub const SEC_ENCODER: NetworkConfig<'static> = NetworkConfig::new(SEC_FEATURES, &SEC_ENCODER_LAYERS);
pub const SEC_DECODER: NetworkConfig<'static> = NetworkConfig::new(SEC_HIDDEN, &SEC_DECODER_LAYERS);

pub type SecurityPolicy<'w> = AnomalyPolicy<'w, SEC_FEATURES>;

/// Result of one check. The host decides what to do with `Anomalous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Verdict {
    Ok = 0,
    Anomalous = 1,
}

impl Verdict {
    #[inline(always)]
    pub const fn is_anomalous(self) -> bool {
        matches!(self, Verdict::Anomalous)
    }
}

/// What the squared reconstruction error is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ThresholdRule {
    /// `error > k · σ²`.
    Variance = 0,
    /// `sqrt(error) > k · σ`.
    StdDev = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnomalyConfig {
    pub rule: ThresholdRule,
    pub multiplier: i32,
    /// Feature dimension whose spread sets the threshold. Out of range never flags.
    pub dim: usize,
}

impl AnomalyConfig {
    #[inline(always)]
    pub const fn variance() -> Self {
        Self {
            rule: ThresholdRule::Variance,
            multiplier: VARIANCE_MULTIPLIER,
            dim: 0,
        }
    }

    #[inline(always)]
    pub const fn std_dev() -> Self {
        Self {
            rule: ThresholdRule::StdDev,
            multiplier: STD_DEV_MULTIPLIER,
            dim: 0,
        }
    }

    /// Pure threshold test.
    #[inline]
    pub fn judge(&self, error: Fixed, variance: Fixed) -> Verdict {
        if !variance.is_positive() {
            return Verdict::Ok;
        }
        let over = match self.rule {
            ThresholdRule::Variance => error > variance.mul_int(self.multiplier),
            ThresholdRule::StdDev => error.sqrt() > variance.sqrt().mul_int(self.multiplier),
        };
        if over {
            Verdict::Anomalous
        } else {
            Verdict::Ok
        }
    }
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self::variance()
    }
}

/// Syscall-site sample, before normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyscallSample {
    pub nr: u64,
    pub arg1: u64,
    pub arg2: u64,
    pub pid: u64,
    pub ticks: u64,
    pub uid: u64,
    /// Random draw, mixed in so identical calls don't reconstruct identically.
    pub entropy: u32,
}

impl SyscallSample {
    #[inline]
    pub const fn features(&self) -> [Fixed; SEC_FEATURES] {
        [
            Fixed::from_ratio(self.nr, 400),
            Fixed::from_ratio(self.arg1, 1_000_000_000_000),
            Fixed::from_ratio(self.arg2, 1_000_000_000_000),
            Fixed::from_ratio(self.pid, 32_768),
            Fixed::from_ratio(self.ticks, 100_000),
            Fixed::from_ratio(self.uid, 65_536),
            Fixed::from_ratio(self.entropy as u64, u32::MAX as u64),
        ]
    }
}

/// Encoder `N → k`, decoder `k → N`, running stats over the raw features.
#[derive(Debug, Clone)]
pub struct AnomalyPolicy<'w, const N: usize> {
    encoder: FeedForward<'w>,
    decoder: FeedForward<'w>,
    config: AnomalyConfig,
}

impl<'w, const N: usize> AnomalyPolicy<'w, N> {
    pub fn new(
        encoder: FeedForward<'w>,
        decoder: FeedForward<'w>,
        config: AnomalyConfig,
    ) -> Result<Self, ModelError> {
        if encoder.inputs() != N {
            return Err(ModelError::SiteWidth {
                expected: N,
                actual: encoder.inputs(),
            });
        }
        if decoder.inputs() != encoder.outputs() {
            return Err(ModelError::LayerChain {
                layer: encoder.layers().len() as u8,
                expected: encoder.outputs(),
                actual: decoder.inputs(),
            });
        }
        if decoder.outputs() != N {
            return Err(ModelError::SiteWidth {
                expected: N,
                actual: decoder.outputs(),
            });
        }
        Ok(Self {
            encoder,
            decoder,
            config,
        })
    }

    #[inline(always)]
    pub const fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Σ (x - decode(encode(x)))².
    #[inline]
    pub fn error(&self, x: &[Fixed; N]) -> Fixed {
        reconstruction_error(&self.encoder, &self.decoder, x)
    }
}

impl<'w> SecurityPolicy<'w> {
    /// Bind the syscall-site autoencoder: one ReLU layer each way.
    pub fn from_tables(
        encoder: LayerWeights<'w>,
        decoder: LayerWeights<'w>,
        config: AnomalyConfig,
    ) -> Result<Self, ModelError> {
        let encoder = FeedForward::new(&SEC_ENCODER, &[encoder])?;
        let decoder = FeedForward::new(&SEC_DECODER, &[decoder])?;
        Self::new(encoder, decoder, config)
    }
}

/// Sample and its error, carried into the lock.
#[derive(Debug, Clone, Copy)]
pub struct Scored<const N: usize> {
    pub sample: [Fixed; N],
    pub error: Fixed,
}

impl<'w, const N: usize> Policy for AnomalyPolicy<'w, N> {
    type State = RunningStats<N>;
    type Input<'a> = &'a [Fixed; N];
    type Prepared = Scored<N>;
    /// Error and the tracked variance after the update.
    type Observation = (Fixed, Fixed);
    type Decision = Verdict;

    const NAME: &'static str = "anomaly";

    #[inline]
    fn prepare(&self, x: &[Fixed; N]) -> Scored<N> {
        Scored {
            sample: *x,
            error: self.error(x),
        }
    }

    #[inline]
    fn update(&self, stats: &mut RunningStats<N>, scored: Scored<N>) -> (Fixed, Fixed) {
        stats.observe(&scored.sample);
        (scored.error, stats.variance(self.config.dim))
    }

    #[inline]
    fn decide(&self, (error, variance): (Fixed, Fixed)) -> Verdict {
        let verdict = self.config.judge(error, variance);
        if verdict.is_anomalous() {
            warn!("{}: error {} over threshold (variance {})", Self::NAME, error, variance);
        }
        verdict
    }
}

impl<'w, const N: usize> Predictor<AnomalyPolicy<'w, N>> {
    #[inline]
    pub fn check_anomaly(&self, features: &[Fixed; N]) -> Verdict {
        self.predict(features)
    }
}

impl<'w> Predictor<SecurityPolicy<'w>> {
    #[inline]
    pub fn check_syscall(&self, sample: &SyscallSample) -> Verdict {
        self.predict(&sample.features())
    }
}
