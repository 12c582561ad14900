//! Scalar regressor. Stateless `1 → 40 → 40 → 1`, e.g. a sine approximator.

use crate::core::activation::Activation;
use crate::core::dense::{FeedForward, LayerConfig, LayerWeights, NetworkConfig};
use crate::core::error::ModelError;
use crate::core::fixed::Fixed;
use crate::core::policy::Policy;
use crate::core::predictor::Predictor;

pub const SINE_HIDDEN: usize = 40;

const SINE_LAYERS: [LayerConfig; 3] = [
    LayerConfig::new(SINE_HIDDEN, Activation::Relu),
    LayerConfig::new(SINE_HIDDEN, Activation::Relu),
    LayerConfig::new(1, Activation::Identity),
];

pub const SINE_NETWORK: NetworkConfig<'static> = NetworkConfig::new(1, &SINE_LAYERS);

#[derive(Debug, Clone)]
pub struct RegressPolicy<'w> {
    net: FeedForward<'w>,
}

impl<'w> RegressPolicy<'w> {
    pub fn new(weights: &[LayerWeights<'w>; 3]) -> Result<Self, ModelError> {
        Self::with_config(&SINE_NETWORK, weights)
    }

    /// Any scalar-to-scalar shape.
    pub fn with_config(config: &NetworkConfig<'_>, weights: &[LayerWeights<'w>]) -> Result<Self, ModelError> {
        let net = FeedForward::new(config, weights)?;
        for width in [net.inputs(), net.outputs()] {
            if width != 1 {
                return Err(ModelError::SiteWidth {
                    expected: 1,
                    actual: width,
                });
            }
        }
        Ok(Self { net })
    }

    #[inline]
    pub fn evaluate(&self, x: Fixed) -> Fixed {
        self.net.forward(&[x]).first().copied().unwrap_or(Fixed::ZERO)
    }
}

impl<'w> Policy for RegressPolicy<'w> {
    type State = ();
    type Input<'a> = Fixed;
    type Prepared = Fixed;
    type Observation = Fixed;
    type Decision = Fixed;

    const NAME: &'static str = "regress";

    #[inline(always)]
    fn prepare(&self, x: Fixed) -> Fixed {
        self.evaluate(x)
    }

    #[inline(always)]
    fn update(&self, _state: &mut (), y: Fixed) -> Fixed {
        y
    }

    #[inline(always)]
    fn decide(&self, y: Fixed) -> Fixed {
        y
    }
}

impl<'w> Predictor<RegressPolicy<'w>> {
    #[inline]
    pub fn regress(&self, x: Fixed) -> Fixed {
        self.predict(x)
    }
}
