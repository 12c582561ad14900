//! Nonlinearities over `Fixed`. No libm, no tables, monotone over the whole i32 domain.

use super::fixed::{Fixed, FRAC_BITS, ONE};

/// |x| beyond this saturates the sigmoid to 0 / ONE.
pub const SIGMOID_SATURATION: i32 = 8 * ONE;

/// End of the tanh cubic segment. `x - x³/3` peaks here at 2/3.
pub const TANH_KNEE: i32 = ONE;

/// Where the tanh ramp reaches ONE.
pub const TANH_RAMP_END: i32 = 3 * ONE;

/// |x| beyond this saturates tanh to ±ONE.
pub const TANH_SATURATION: i32 = 5 * ONE;

/// Max |approx - reference| over the sigmoid band, in real units.
pub const SIGMOID_EPSILON: f64 = 0.17;

/// Max |approx - reference| over the whole tanh domain, in real units.
pub const TANH_EPSILON: f64 = 0.16;

/// cubic(TANH_KNEE): where the ramp starts.
const TANH_KNEE_VALUE: i32 = tanh_cubic(TANH_KNEE);

/// Per-layer activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Activation {
    /// Linear output.
    Identity = 0,
    Relu = 1,
    Sigmoid = 2,
    Tanh = 3,
}

impl Activation {
    #[inline(always)]
    pub fn apply(self, x: Fixed) -> Fixed {
        match self {
            Activation::Identity => x,
            Activation::Relu => relu(x),
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => tanh(x),
        }
    }
}

#[inline(always)]
pub const fn relu(x: Fixed) -> Fixed {
    if x.raw() > 0 {
        x
    } else {
        Fixed::ZERO
    }
}

/// `0.5 ± a/2` with `a = (|x|/4)·(1 - |x|/16)`, saturating outside ±8.
///
/// `a/2` is evaluated as `|x|·(16·ONE - |x|) >> (F + 7)` in one widening step.
/// Shifting `|x|` before the multiply loses low bits in both factors and breaks
/// monotonicity near the band edges; this form stays within one ulp of it.
#[inline]
pub const fn sigmoid(x: Fixed) -> Fixed {
    let raw = x.raw();
    if raw < -SIGMOID_SATURATION {
        return Fixed::ZERO;
    }
    if raw > SIGMOID_SATURATION {
        return Fixed::ONE;
    }
    let ax = raw.unsigned_abs() as i64;
    let half_a = ((ax * (16 * ONE as i64 - ax)) >> (FRAC_BITS + 7)) as i32;
    if raw < 0 {
        Fixed::from_raw((ONE >> 1) - half_a)
    } else {
        Fixed::from_raw((ONE >> 1) + half_a)
    }
}

/// Odd, monotone tanh: cubic `x - x³/(3·ONE²)` up to the knee, linear ramp to ONE
/// at `TANH_RAMP_END`, saturated from there (so exactly ±ONE beyond ±5).
#[inline]
pub const fn tanh(x: Fixed) -> Fixed {
    let raw = x.raw();
    if raw > TANH_SATURATION {
        return Fixed::ONE;
    }
    if raw < -TANH_SATURATION {
        return Fixed::from_raw(-ONE);
    }
    let ax = raw.unsigned_abs() as i32;
    let y = if ax <= TANH_KNEE {
        tanh_cubic(ax)
    } else if ax >= TANH_RAMP_END {
        ONE
    } else {
        let span = (TANH_RAMP_END - TANH_KNEE) as i64;
        let rise = (ONE - TANH_KNEE_VALUE) as i64;
        TANH_KNEE_VALUE + ((rise * (ax - TANH_KNEE) as i64) / span) as i32
    };
    if raw < 0 {
        Fixed::from_raw(-y)
    } else {
        Fixed::from_raw(y)
    }
}

#[inline(always)]
const fn tanh_cubic(ax: i32) -> i32 {
    let x = ax as i64;
    let one = ONE as i64;
    (x - (x * x * x) / (3 * one * one)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu() {
        assert_eq!(relu(Fixed::from_int(-3)), Fixed::ZERO);
        assert_eq!(relu(Fixed::from_int(3)), Fixed::from_int(3));
        assert_eq!(relu(Fixed::ZERO), Fixed::ZERO);
    }

    #[test]
    fn test_sigmoid_anchor_points() {
        assert_eq!(sigmoid(Fixed::ZERO), Fixed::HALF);
        assert_eq!(sigmoid(Fixed::from_raw(SIGMOID_SATURATION)), Fixed::ONE);
        assert_eq!(sigmoid(Fixed::from_raw(-SIGMOID_SATURATION)), Fixed::ZERO);
        assert_eq!(sigmoid(Fixed::MAX), Fixed::ONE);
        assert_eq!(sigmoid(Fixed::MIN), Fixed::ZERO);
    }

    #[test]
    fn test_sigmoid_symmetry() {
        for raw in [1, 100, ONE, 3 * ONE, 7 * ONE] {
            let pos = sigmoid(Fixed::from_raw(raw)).raw();
            let neg = sigmoid(Fixed::from_raw(-raw)).raw();
            assert_eq!(pos + neg, ONE);
        }
    }

    #[test]
    fn test_tanh_anchor_points() {
        assert_eq!(tanh(Fixed::ZERO), Fixed::ZERO);
        assert_eq!(tanh(Fixed::from_raw(TANH_KNEE)).raw(), 2731);
        assert_eq!(tanh(Fixed::from_raw(TANH_RAMP_END)), Fixed::ONE);
        assert_eq!(tanh(Fixed::from_raw(TANH_SATURATION + 1)), Fixed::ONE);
        assert_eq!(tanh(Fixed::from_raw(-TANH_SATURATION - 1)).raw(), -ONE);
        assert_eq!(tanh(Fixed::MIN).raw(), -ONE);
    }

    #[test]
    fn test_tanh_odd() {
        for raw in [1, 999, ONE, ONE + 1, 2 * ONE, 4 * ONE] {
            assert_eq!(
                tanh(Fixed::from_raw(raw)).raw(),
                -tanh(Fixed::from_raw(-raw)).raw()
            );
        }
    }

    #[test]
    fn test_activation_dispatch() {
        let x = Fixed::from_int(-2);
        assert_eq!(Activation::Identity.apply(x), x);
        assert_eq!(Activation::Relu.apply(x), Fixed::ZERO);
        assert_eq!(Activation::Sigmoid.apply(x), sigmoid(x));
        assert_eq!(Activation::Tanh.apply(x), tanh(x));
    }
}
