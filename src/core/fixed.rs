//! Fixed-point scalar. Q19.12 in an i32, one global scale, no floats on the hot path.
//!
//! Rounding contract (every downstream bit depends on it):
//! - `+`/`-`: raw integer ops, saturating at the i32 bounds.
//! - `*`: widen to i64, multiply raws, arithmetic `>> FRAC_BITS` (floor toward -inf),
//!   saturate back to i32.
//! - `div_count`: integer division by a sample count, truncating toward zero.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Fractional bits. Compile-time constant for the whole crate.
pub const FRAC_BITS: u32 = 12;

/// Raw value of 1.0.
pub const ONE: i32 = 1 << FRAC_BITS;

/// Scaled integer `raw / 2^FRAC_BITS`. Transparent over i32 so weight blobs cast in place.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(transparent)]
pub struct Fixed(i32);

const _: () = {
    assert!(core::mem::size_of::<Fixed>() == 4);
    assert!(core::mem::align_of::<Fixed>() == 4);
};

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(ONE);
    pub const HALF: Fixed = Fixed(ONE >> 1);
    pub const MIN: Fixed = Fixed(i32::MIN);
    pub const MAX: Fixed = Fixed(i32::MAX);

    #[inline(always)]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whole number. Saturates outside the representable range.
    #[inline(always)]
    pub const fn from_int(n: i32) -> Self {
        Self(saturate((n as i64) << FRAC_BITS))
    }

    /// `num / den` as fixed point, integer-only. `den == 0` saturates to `MAX`.
    ///
    /// This is how features get normalized on the hot path.
    #[inline]
    pub const fn from_ratio(num: u64, den: u64) -> Self {
        if den == 0 {
            return Self::MAX;
        }
        let q = ((num as u128) << FRAC_BITS) / den as u128;
        if q > i32::MAX as u128 {
            Self::MAX
        } else {
            Self(q as i32)
        }
    }

    /// Configuration and test oracles only. Truncates toward zero, saturates, NaN → 0.
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        // `as` from f64 saturates and maps NaN to 0.
        Self((value * ONE as f64) as i32)
    }

    /// Configuration and test oracles only.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / ONE as f64
    }

    #[inline(always)]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    #[inline(always)]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Fixed × fixed. Floor rounding, saturating.
    #[inline(always)]
    pub const fn mul(self, rhs: Self) -> Self {
        Self(saturate((self.0 as i64 * rhs.0 as i64) >> FRAC_BITS))
    }

    /// Fixed × plain integer (threshold multipliers). Saturating.
    #[inline(always)]
    pub const fn mul_int(self, k: i32) -> Self {
        Self(self.0.saturating_mul(k))
    }

    /// Divide by a sample count. Truncates toward zero. `count == 0` returns `self`.
    #[inline(always)]
    pub const fn div_count(self, count: u64) -> Self {
        if count == 0 {
            return self;
        }
        if count > i32::MAX as u64 {
            return Self::ZERO;
        }
        Self(saturate(self.0 as i64 / count as i64))
    }

    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    #[inline(always)]
    pub const fn max(self, other: Self) -> Self {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }

    #[inline(always)]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Square root, floor. Negative input → 0.
    #[inline]
    pub const fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        // sqrt(raw / 2^F) * 2^F == sqrt(raw * 2^F)
        let widened = (self.0 as u64) << FRAC_BITS;
        Self(widened.isqrt() as i32)
    }
}

#[inline(always)]
const fn saturate(wide: i64) -> i32 {
    if wide > i32::MAX as i64 {
        i32::MAX
    } else if wide < i32::MIN as i64 {
        i32::MIN
    } else {
        wide as i32
    }
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn add(self, rhs: Fixed) -> Fixed {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Fixed {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Fixed) {
        *self = self.saturating_add(rhs);
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn sub(self, rhs: Fixed) -> Fixed {
        self.saturating_sub(rhs)
    }
}

impl SubAssign for Fixed {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = self.saturating_sub(rhs);
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn mul(self, rhs: Fixed) -> Fixed {
        Fixed::mul(self, rhs)
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn neg(self) -> Fixed {
        Fixed(self.0.saturating_neg())
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({} = {:.4})", self.0, self.to_f64())
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}
