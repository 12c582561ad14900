//! LSTM cell, its persistent state, and the raw-input history ring that feeds it.

use super::activation::{sigmoid, tanh};
use super::dense::{check_len, dot};
use super::error::{ModelError, Table};
use super::fixed::Fixed;

/// Forget-gate bias folded into the pre-activation. Biases the cell toward retention.
pub const FORGET_BIAS: Fixed = Fixed::ONE;

/// Density feature folds identifiers into windows of this size...
pub const DENSITY_WINDOW: u64 = 1024;

/// ...and measures distance from this centre.
pub const DENSITY_CENTER: u64 = 512;

/// Tables for one gate. `input` is `H × IN`, `recurrent` is `H × H`, row-major.
#[derive(Debug, Clone, Copy)]
pub struct GateWeights<'w> {
    pub input: &'w [Fixed],
    pub recurrent: &'w [Fixed],
    pub bias: &'w [Fixed],
}

impl<'w> GateWeights<'w> {
    #[inline(always)]
    pub const fn new(input: &'w [Fixed], recurrent: &'w [Fixed], bias: &'w [Fixed]) -> Self {
        Self {
            input,
            recurrent,
            bias,
        }
    }
}

/// The four gates, in the order the export pipeline writes them.
#[derive(Debug, Clone, Copy)]
pub struct LstmWeights<'w> {
    pub input_gate: GateWeights<'w>,
    pub forget_gate: GateWeights<'w>,
    pub candidate: GateWeights<'w>,
    pub output_gate: GateWeights<'w>,
}

impl<'w> LstmWeights<'w> {
    #[inline(always)]
    pub const fn gates(&self) -> [GateWeights<'w>; 4] {
        [
            self.input_gate,
            self.forget_gate,
            self.candidate,
            self.output_gate,
        ]
    }
}

/// Hidden and cell vectors. Zeroed at init, mutated by every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct RecurrentState<const H: usize> {
    pub h: [Fixed; H],
    pub c: [Fixed; H],
}

impl<const H: usize> RecurrentState<H> {
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            h: [Fixed::ZERO; H],
            c: [Fixed::ZERO; H],
        }
    }

    #[inline(always)]
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl<const H: usize> Default for RecurrentState<H> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

/// Single-step LSTM with `IN` inputs and `H` hidden units.
#[derive(Debug, Clone, Copy)]
pub struct LstmCell<'w, const IN: usize, const H: usize> {
    weights: LstmWeights<'w>,
}

impl<'w, const IN: usize, const H: usize> LstmCell<'w, IN, H> {
    /// Gate `k` of the tables is reported as layer `k` on mismatch.
    pub fn new(weights: LstmWeights<'w>) -> Result<Self, ModelError> {
        for (gate, tables) in weights.gates().iter().enumerate() {
            let gate = gate as u8;
            check_len(gate, Table::InputWeights, H * IN, tables.input.len())?;
            check_len(gate, Table::RecurrentWeights, H * H, tables.recurrent.len())?;
            check_len(gate, Table::Bias, H, tables.bias.len())?;
        }
        Ok(Self { weights })
    }

    #[inline(always)]
    pub const fn weights(&self) -> &LstmWeights<'w> {
        &self.weights
    }

    /// One step. All gates read the previous `h`; `(h, c)` is written afterwards.
    ///
    /// O(H·(IN+H)) multiply-adds. Caller holds the state exclusively.
    #[inline]
    pub fn step(&self, x: &[Fixed; IN], state: &mut RecurrentState<H>) {
        let mut next_h = [Fixed::ZERO; H];
        let w = &self.weights;

        for unit in 0..H {
            let i = sigmoid(pre_activation(&w.input_gate, unit, x, &state.h));
            let f = sigmoid(pre_activation(&w.forget_gate, unit, x, &state.h) + FORGET_BIAS);
            let g = tanh(pre_activation(&w.candidate, unit, x, &state.h));
            let o = sigmoid(pre_activation(&w.output_gate, unit, x, &state.h));

            let c = f * state.c[unit] + i * g;
            state.c[unit] = c;
            next_h[unit] = o * tanh(c);
        }

        state.h = next_h;
    }
}

#[inline(always)]
fn pre_activation<const IN: usize, const H: usize>(
    gate: &GateWeights<'_>,
    unit: usize,
    x: &[Fixed; IN],
    h: &[Fixed; H],
) -> Fixed {
    let input_row = &gate.input[unit * IN..(unit + 1) * IN];
    let recurrent_row = &gate.recurrent[unit * H..(unit + 1) * H];
    gate.bias[unit] + dot(input_row, x) + dot(recurrent_row, h)
}

/// Fixed-length ring of raw observations. Always full: starts as `N` zeros,
/// every push evicts the oldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct History<const N: usize> {
    slots: [u64; N],
    /// Index of the oldest entry.
    head: usize,
}

impl<const N: usize> History<N> {
    const _NONEMPTY: () = assert!(N > 0, "history needs at least one slot");

    #[inline(always)]
    pub const fn new() -> Self {
        let _ = Self::_NONEMPTY;
        Self {
            slots: [0; N],
            head: 0,
        }
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline(always)]
    pub fn push(&mut self, value: u64) {
        self.slots[self.head] = value;
        self.head = (self.head + 1) % N;
    }

    /// Most recent entry.
    #[inline(always)]
    pub fn latest(&self) -> u64 {
        self.slots[(self.head + N - 1) % N]
    }

    /// Oldest to newest.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..N).map(move |i| self.slots[(self.head + i) % N])
    }

    #[inline]
    pub fn to_array(&self) -> [u64; N] {
        let mut out = [0u64; N];
        for (slot, value) in out.iter_mut().zip(self.iter()) {
            *slot = value;
        }
        out
    }

    /// Density features of every entry, oldest first.
    #[inline]
    pub fn density_features(&self) -> [Fixed; N] {
        let mut out = [Fixed::ZERO; N];
        for (slot, raw) in out.iter_mut().zip(self.iter()) {
            *slot = density(raw);
        }
        out
    }
}

impl<const N: usize> Default for History<N> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

/// `1 / (1 + |(raw mod 1024) - 512|)`. Identifiers near the window centre score 1.
#[inline(always)]
pub const fn density(raw: u64) -> Fixed {
    let distance = (raw % DENSITY_WINDOW).abs_diff(DENSITY_CENTER);
    Fixed::from_ratio(1, 1 + distance)
}
