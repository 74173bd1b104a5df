#![forbid(unsafe_code)]

//! 20.12 fixed-point helpers.
//!
//! Integer-parameter generators do their math in fixed point so that a frame
//! is bit-identical on every platform. Angles use a 16-bit "turn" unit where
//! `0x8000` is one full revolution.

/// Signed fixed point, 12 fractional bits.
pub type Fx = i32;

/// Number of fractional bits in [`Fx`].
pub const FRAC_BITS: u32 = 12;

/// `1.0` in fixed point.
pub const FX_ONE: Fx = 1 << FRAC_BITS;

/// One full revolution in angle units.
pub const TURN: i32 = 0x8000;

/// Integer to fixed point.
#[inline]
pub const fn fx(n: i32) -> Fx {
    n << FRAC_BITS
}

/// Fixed point to integer, rounding toward negative infinity.
#[inline]
pub const fn unfx(v: Fx) -> i32 {
    v >> FRAC_BITS
}

/// Fixed point to integer, rounding half up.
#[inline]
pub const fn unfx_round(v: Fx) -> i32 {
    (v + (1 << (FRAC_BITS - 1))) >> FRAC_BITS
}

/// Degrees to angle units (wrapping).
#[inline]
pub const fn degrees_to_angle(degrees: u16) -> i16 {
    (degrees as i32 * TURN / 360) as i16
}

/// Microsecond timestamp to seconds in 52.12 fixed point.
#[inline]
pub fn micros_to_seconds_fx(micros: i64) -> i64 {
    ((i128::from(micros) << FRAC_BITS) / 1_000_000) as i64
}

/// Sine of an angle in turn units, as fixed point in `[-1.0, 1.0]`.
///
/// Fifth-order polynomial fit over the first quadrant, mirrored into the
/// other three. Exact at the quadrant boundaries.
pub fn sin(angle: i16) -> Fx {
    const A1: u32 = 3_370_945_099;
    const B1: u32 = 2_746_362_156;
    const C1: u32 = 292_421;

    // Fold the input into [0, 8192] (a quarter turn) and remember the sign.
    let mut i = angle.wrapping_shl(1);
    let negative = i < 0;
    if i == (i | 0x4000) {
        i = ((1i32 << 15) - i32::from(i)) as i16;
    }
    let i = ((i32::from(i) & 0x7FFF) >> 1) as u32;

    let mut y = C1.wrapping_mul(i) >> 13;
    y = B1.wrapping_sub(i.wrapping_mul(y) >> 3);
    y = i.wrapping_mul(y >> 13);
    y = i.wrapping_mul(y >> 13);
    y = A1.wrapping_sub(y >> 1);
    y = i.wrapping_mul(y >> 13);
    y = (y + (1 << 18)) >> 19;

    if negative { -(y as i32) } else { y as i32 }
}

/// Cosine of an angle in turn units.
#[inline]
pub fn cos(angle: i16) -> Fx {
    sin(angle.wrapping_add(0x2000))
}

/// Square root of an integer, as fixed point.
///
/// Exact for every `u32`; `sqrt(u32::MAX)` is just under `fx(65536)`.
pub fn sqrt(v: u32) -> Fx {
    if v == 0 {
        return 0;
    }
    // Root of v * 2^32 carries 16 fractional bits.
    let mut rem = u64::from(v) << 32;
    let mut bit: u64 = 1 << 62;
    while bit > rem {
        bit >>= 2;
    }
    let mut root: u64 = 0;
    while bit > 0 {
        if rem >= root + bit {
            rem -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }
    if rem > root {
        root += 1;
    }
    // 16 fractional bits down to 12; at most 2^28, so it fits.
    (root >> 4) as Fx
}
