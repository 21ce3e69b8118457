//! Capacity rounding for amortized growth.
//!
//! Growable containers round every growth target up to a power of two, so `m` sequential appends
//! reallocate `O(log m)` times.

use num_traits::{PrimInt, Unsigned};

/// Returns the number of bits in `S`.
#[inline]
fn bits<S: PrimInt>() -> u32 {
    S::zero().count_zeros()
}

/// Returns the smallest `k` such that `2^k >= n` (0 for `n <= 1`).
pub fn ceil_log2<S: PrimInt + Unsigned>(n: S) -> u32 {
    if n <= S::one() {
        return 0;
    }
    bits::<S>() - (n - S::one()).leading_zeros()
}

/// Returns the smallest power of two that is greater than or equal to `n`, or `None` if it does
/// not fit in `S`.
///
/// Zero rounds up to one.
pub fn round_up_pow2<S: PrimInt + Unsigned>(n: S) -> Option<S> {
    if n <= S::one() {
        return Some(S::one());
    }

    let bits = bits::<S>();
    if bits.is_power_of_two() {
        // smear the highest set bit of (n - 1) into every lower bit
        let mut s = n - S::one();
        let mut shift = 1;
        while shift < bits {
            s = s | (s >> shift as usize);
            shift <<= 1;
        }
        s.checked_add(&S::one())
    } else {
        let exp = ceil_log2(n);
        if exp >= bits {
            None
        } else {
            Some(S::one() << exp as usize)
        }
    }
}
