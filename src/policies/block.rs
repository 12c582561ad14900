//! Block predictor: which identifier comes next, relative to the one just seen.
//!
//! Per call: push the raw id into the ring, take density features of the whole ring,
//! one LSTM step, linear head over `h`, pick an offset class. Class `k` means
//! `k - (C/2 - 1)`, so with `C = 8` the classes cover `-3..=+4`.

use crate::core::activation::Activation;
use crate::core::dense::{argmax_above, DenseLayer, LayerWeights, MAX_WIDTH};
use crate::core::error::ModelError;
use crate::core::fixed::Fixed;
use crate::core::policy::Policy;
use crate::core::predictor::Predictor;
use crate::core::recurrent::{History, LstmCell, LstmWeights, RecurrentState};

pub const CACHE_INPUTS: usize = 8;
pub const CACHE_HIDDEN: usize = 64;
pub const CACHE_CLASSES: usize = 8;

pub const IO_INPUTS: usize = 10;
pub const IO_HIDDEN: usize = 48;
pub const IO_CLASSES: usize = 10;

/// A class score must beat this to count.
pub const SCORE_FLOOR: Fixed = Fixed::from_raw(-Fixed::ONE.raw());

pub type CachePolicy<'w> = BlockPolicy<'w, CACHE_INPUTS, CACHE_HIDDEN, CACHE_CLASSES>;
pub type IoPolicy<'w> = BlockPolicy<'w, IO_INPUTS, IO_HIDDEN, IO_CLASSES>;

/// Offset of class `class` among `classes`.
#[inline(always)]
pub const fn class_offset(class: usize, classes: usize) -> i64 {
    class as i64 - (classes as i64 / 2 - 1)
}

/// Ring of raw ids plus the LSTM state. One per predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockState<const IN: usize, const H: usize> {
    pub history: History<IN>,
    pub recurrent: RecurrentState<H>,
}

impl<const IN: usize, const H: usize> Default for BlockState<IN, H> {
    #[inline(always)]
    fn default() -> Self {
        Self {
            history: History::new(),
            recurrent: RecurrentState::new(),
        }
    }
}

/// LSTM over `IN` density features, `H` hidden units, `C` offset classes.
#[derive(Debug, Clone, Copy)]
pub struct BlockPolicy<'w, const IN: usize, const H: usize, const C: usize> {
    cell: LstmCell<'w, IN, H>,
    head: DenseLayer<'w>,
}

impl<'w, const IN: usize, const H: usize, const C: usize> BlockPolicy<'w, IN, H, C> {
    const _FITS: () = assert!(H <= MAX_WIDTH && C <= MAX_WIDTH && C >= 2);

    /// Gates report as layers 0..=3 on mismatch, the head as layer 4.
    pub fn new(lstm: LstmWeights<'w>, head: LayerWeights<'w>) -> Result<Self, ModelError> {
        let () = Self::_FITS;
        let cell = LstmCell::new(lstm)?;
        let head = DenseLayer::new_at(4, H, C, Activation::Identity, head)?;
        Ok(Self { cell, head })
    }

    #[inline(always)]
    pub const fn cell(&self) -> &LstmCell<'w, IN, H> {
        &self.cell
    }

    /// Pure head: class scores for a hidden vector.
    #[inline]
    pub fn scores(&self, h: &[Fixed; H]) -> [Fixed; C] {
        let mut out = [Fixed::ZERO; C];
        self.head.forward(h, &mut out);
        out
    }
}

/// Raw id in, its successor's hidden vector out of the lock.
#[derive(Debug, Clone, Copy)]
pub struct BlockStep<const H: usize> {
    pub anchor: u64,
    pub h: [Fixed; H],
}

impl<'w, const IN: usize, const H: usize, const C: usize> Policy for BlockPolicy<'w, IN, H, C> {
    type State = BlockState<IN, H>;
    type Input<'a> = u64;
    type Prepared = u64;
    type Observation = BlockStep<H>;
    type Decision = Option<u64>;

    const NAME: &'static str = "block";

    #[inline(always)]
    fn prepare(&self, raw: u64) -> u64 {
        raw
    }

    #[inline]
    fn update(&self, state: &mut Self::State, raw: u64) -> BlockStep<H> {
        state.history.push(raw);
        let features = state.history.density_features();
        self.cell.step(&features, &mut state.recurrent);
        BlockStep {
            anchor: raw,
            h: state.recurrent.h,
        }
    }

    /// `None` when no class clears the floor or the offset leaves the u64 range.
    #[inline]
    fn decide(&self, step: BlockStep<H>) -> Option<u64> {
        let class = argmax_above(&self.scores(&step.h), SCORE_FLOOR)?;
        step.anchor.checked_add_signed(class_offset(class, C))
    }

    #[inline(always)]
    fn is_abstention(decision: &Option<u64>) -> bool {
        decision.is_none()
    }
}

impl<'w, const IN: usize, const H: usize, const C: usize> Predictor<BlockPolicy<'w, IN, H, C>> {
    /// Predicted next id after `raw`, if any.
    #[inline]
    pub fn predict_block(&self, raw: u64) -> Option<u64> {
        self.predict(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recurrent::GateWeights;

    const IN: usize = 4;
    const H: usize = 4;
    const C: usize = 8;

    static ZI: [Fixed; H * IN] = [Fixed::ZERO; H * IN];
    static ZR: [Fixed; H * H] = [Fixed::ZERO; H * H];
    static ZB: [Fixed; H] = [Fixed::ZERO; H];
    static HEAD_W: [Fixed; C * H] = [Fixed::ZERO; C * H];

    fn lstm() -> LstmWeights<'static> {
        let z = GateWeights::new(&ZI, &ZR, &ZB);
        LstmWeights {
            input_gate: z,
            forget_gate: z,
            candidate: z,
            output_gate: z,
        }
    }

    fn policy(bias: &'static [Fixed; C]) -> BlockPolicy<'static, IN, H, C> {
        BlockPolicy::new(lstm(), LayerWeights::new(&HEAD_W, bias)).unwrap()
    }

    #[test]
    fn test_class_offset() {
        assert_eq!(class_offset(0, 8), -3);
        assert_eq!(class_offset(3, 8), 0);
        assert_eq!(class_offset(7, 8), 4);
        assert_eq!(class_offset(0, 10), -4);
    }

    #[test]
    fn test_biased_head_predicts_offset() {
        // Class 5 → +2.
        static BIAS: [Fixed; C] = {
            let mut b = [Fixed::ZERO; C];
            b[5] = Fixed::ONE;
            b
        };
        let p = Predictor::new(policy(&BIAS));
        assert_eq!(p.predict_block(100), Some(102));
        assert_eq!(p.predict_block(7), Some(9));
        p.inspect(|s| assert_eq!(s.history.latest(), 7));
    }

    #[test]
    fn test_no_prediction_below_floor() {
        static BIAS: [Fixed; C] = [Fixed::from_raw(-4096); C];
        let p = Predictor::new(policy(&BIAS));
        assert_eq!(p.predict_block(100), None);
        assert_eq!(p.metrics().abstentions(), 1);
    }

    #[test]
    fn test_out_of_range_offset_is_no_prediction() {
        // Class 0 → -3.
        static LOW: [Fixed; C] = {
            let mut b = [Fixed::ZERO; C];
            b[0] = Fixed::ONE;
            b
        };
        let p = Predictor::new(policy(&LOW));
        assert_eq!(p.predict_block(2), None);
        assert_eq!(p.predict_block(3), Some(0));

        // Class 7 → +4.
        static HIGH: [Fixed; C] = {
            let mut b = [Fixed::ZERO; C];
            b[7] = Fixed::ONE;
            b
        };
        let p = Predictor::new(policy(&HIGH));
        assert_eq!(p.predict_block(u64::MAX - 3), None);
        assert_eq!(p.predict_block(u64::MAX - 4), Some(u64::MAX));
    }

    #[test]
    fn test_head_mismatch_is_layer_four() {
        static SHORT: [Fixed; C - 1] = [Fixed::ZERO; C - 1];
        let err = BlockPolicy::<IN, H, C>::new(lstm(), LayerWeights::new(&HEAD_W, &SHORT)).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { layer: 4, .. }));
    }
}
