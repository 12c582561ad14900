//! Dense layers and the generic feed-forward evaluator.
//!
//! Layers borrow their tables (`'w`); the host owns the weights, usually as statics.
//! Evaluation ping-pongs between two stack buffers of `MAX_WIDTH`. No heap, no state.

use arrayvec::ArrayVec;

use super::activation::Activation;
use super::error::{ModelError, Table};
use super::fixed::Fixed;

/// Widest layer any network may declare.
pub const MAX_WIDTH: usize = 64;

/// Deepest network (weight layers, input excluded).
pub const MAX_LAYERS: usize = 4;

/// Network output. Lives on the caller's stack.
pub type Output = ArrayVec<Fixed, MAX_WIDTH>;

/// One weight layer: `width` outputs, each through `activation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerConfig {
    pub width: usize,
    pub activation: Activation,
}

impl LayerConfig {
    #[inline(always)]
    pub const fn new(width: usize, activation: Activation) -> Self {
        Self { width, activation }
    }
}

/// Declared shape. `const`-constructible so each predictor site can pin its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig<'a> {
    pub inputs: usize,
    pub layers: &'a [LayerConfig],
}

impl<'a> NetworkConfig<'a> {
    #[inline(always)]
    pub const fn new(inputs: usize, layers: &'a [LayerConfig]) -> Self {
        Self { inputs, layers }
    }

    /// Width of the last layer, or of the input if there are no layers.
    #[inline]
    pub const fn outputs(&self) -> usize {
        match self.layers.last() {
            Some(layer) => layer.width,
            None => self.inputs,
        }
    }
}

/// Borrowed tables for one layer. Row-major: `weights[o * inputs + i]`.
#[derive(Debug, Clone, Copy)]
pub struct LayerWeights<'w> {
    pub weights: &'w [Fixed],
    pub bias: &'w [Fixed],
}

impl<'w> LayerWeights<'w> {
    #[inline(always)]
    pub const fn new(weights: &'w [Fixed], bias: &'w [Fixed]) -> Self {
        Self { weights, bias }
    }
}

/// `y = act(W·x + b)` with shape checked once at construction.
#[derive(Debug, Clone, Copy)]
pub struct DenseLayer<'w> {
    inputs: usize,
    outputs: usize,
    activation: Activation,
    weights: &'w [Fixed],
    bias: &'w [Fixed],
}

impl<'w> DenseLayer<'w> {
    pub fn new(
        inputs: usize,
        outputs: usize,
        activation: Activation,
        tables: LayerWeights<'w>,
    ) -> Result<Self, ModelError> {
        Self::new_at(0, inputs, outputs, activation, tables)
    }

    pub(crate) fn new_at(
        layer: u8,
        inputs: usize,
        outputs: usize,
        activation: Activation,
        tables: LayerWeights<'w>,
    ) -> Result<Self, ModelError> {
        for width in [inputs, outputs] {
            if width > MAX_WIDTH {
                return Err(ModelError::WidthExceeded {
                    max: MAX_WIDTH,
                    actual: width,
                });
            }
        }
        check_len(layer, Table::Weights, inputs * outputs, tables.weights.len())?;
        check_len(layer, Table::Bias, outputs, tables.bias.len())?;

        Ok(Self {
            inputs,
            outputs,
            activation,
            weights: tables.weights,
            bias: tables.bias,
        })
    }

    #[inline(always)]
    pub const fn inputs(&self) -> usize {
        self.inputs
    }

    #[inline(always)]
    pub const fn outputs(&self) -> usize {
        self.outputs
    }

    #[inline(always)]
    pub const fn activation(&self) -> Activation {
        self.activation
    }

    /// Writes `outputs()` values into `out`. `input` beyond `inputs()` is ignored;
    /// missing entries read as zero.
    #[inline]
    pub fn forward(&self, input: &[Fixed], out: &mut [Fixed]) {
        let rows = self.weights.chunks_exact(self.inputs.max(1));
        for ((slot, row), &bias) in out.iter_mut().zip(rows).zip(self.bias) {
            *slot = self.activation.apply(bias + dot(row, input));
        }
        // Zero-input layers have no rows; bias alone.
        if self.inputs == 0 {
            for (slot, &bias) in out.iter_mut().zip(self.bias) {
                *slot = self.activation.apply(bias);
            }
        }
    }
}

/// Σ row[i]·x[i]. One fixed multiply per term, saturating accumulate.
#[inline(always)]
pub fn dot(row: &[Fixed], x: &[Fixed]) -> Fixed {
    row.iter()
        .zip(x)
        .fold(Fixed::ZERO, |acc, (&w, &v)| acc + w * v)
}

/// Stateless multi-layer evaluator.
#[derive(Debug, Clone)]
pub struct FeedForward<'w> {
    inputs: usize,
    layers: ArrayVec<DenseLayer<'w>, MAX_LAYERS>,
}

impl<'w> FeedForward<'w> {
    /// Bind tables to a config. Every mismatch is reported here, never later.
    pub fn new(config: &NetworkConfig<'_>, weights: &[LayerWeights<'w>]) -> Result<Self, ModelError> {
        if config.layers.is_empty() {
            return Err(ModelError::EmptyNetwork);
        }
        if config.layers.len() > MAX_LAYERS {
            return Err(ModelError::TooManyLayers {
                max: MAX_LAYERS,
                actual: config.layers.len(),
            });
        }
        if weights.len() != config.layers.len() {
            return Err(ModelError::LayerCount {
                expected: config.layers.len(),
                actual: weights.len(),
            });
        }

        let mut layers = ArrayVec::new();
        let mut width = config.inputs;
        for (index, (layer, tables)) in config.layers.iter().zip(weights).enumerate() {
            let dense = DenseLayer::new_at(index as u8, width, layer.width, layer.activation, *tables)?;
            layers.push(dense);
            width = layer.width;
        }

        Ok(Self {
            inputs: config.inputs,
            layers,
        })
    }

    /// Chain pre-built layers. Each must read what the previous one writes.
    pub fn from_layers(layers: &[DenseLayer<'w>]) -> Result<Self, ModelError> {
        let first = layers.first().ok_or(ModelError::EmptyNetwork)?;
        if layers.len() > MAX_LAYERS {
            return Err(ModelError::TooManyLayers {
                max: MAX_LAYERS,
                actual: layers.len(),
            });
        }
        for (index, pair) in layers.windows(2).enumerate() {
            if pair[1].inputs != pair[0].outputs {
                return Err(ModelError::LayerChain {
                    layer: (index + 1) as u8,
                    expected: pair[0].outputs,
                    actual: pair[1].inputs,
                });
            }
        }

        let mut chain = ArrayVec::new();
        chain.extend(layers.iter().copied());
        Ok(Self {
            inputs: first.inputs,
            layers: chain,
        })
    }

    #[inline(always)]
    pub const fn inputs(&self) -> usize {
        self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> usize {
        self.layers.last().map_or(self.inputs, |layer| layer.outputs)
    }

    #[inline(always)]
    pub fn layers(&self) -> &[DenseLayer<'w>] {
        &self.layers
    }

    /// Run every layer. Pure: same input, same weights, same bits.
    #[inline]
    pub fn forward(&self, input: &[Fixed]) -> Output {
        let mut front = [Fixed::ZERO; MAX_WIDTH];
        let mut back = [Fixed::ZERO; MAX_WIDTH];

        let n = input.len().min(self.inputs);
        front[..n].copy_from_slice(&input[..n]);
        let mut width = self.inputs;

        for layer in &self.layers {
            layer.forward(&front[..width], &mut back[..layer.outputs]);
            core::mem::swap(&mut front, &mut back);
            width = layer.outputs;
        }

        let mut out = Output::new();
        out.extend(front[..width].iter().copied());
        out
    }
}

/// Index of the first maximum. `None` only for an empty slice.
#[inline]
pub fn argmax(values: &[Fixed]) -> Option<usize> {
    let (&first, rest) = values.split_first()?;
    let mut best = first;
    let mut index = 0;
    for (i, &v) in rest.iter().enumerate() {
        if v > best {
            best = v;
            index = i + 1;
        }
    }
    Some(index)
}

/// Index of the first value strictly above every earlier one, starting from `floor`.
/// `None` when nothing beats the floor.
#[inline]
pub fn argmax_above(values: &[Fixed], floor: Fixed) -> Option<usize> {
    let mut best = floor;
    let mut index = None;
    for (i, &v) in values.iter().enumerate() {
        if v > best {
            best = v;
            index = Some(i);
        }
    }
    index
}

#[inline(always)]
pub(crate) fn check_len(layer: u8, table: Table, expected: usize, actual: usize) -> Result<(), ModelError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            layer,
            table,
            expected,
            actual,
        })
    }
}
