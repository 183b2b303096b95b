//! # 80-bit Extended Precision
//!
//! [`F80`] carries x87 extended-precision values between the mapped file and
//! callers. On-disk layout matches `long double` on x86-64 Linux: a 16-byte
//! slot whose low 10 bytes hold the 80-bit value little-endian (64-bit
//! significand with an explicit integer bit, 15-bit exponent biased 16383,
//! sign bit), with 6 bytes of zero padding above.
//!
//! The 64-bit significand represents every 64-bit integer exactly, which
//! f64 cannot. Parsing therefore takes an exact path for plain integer
//! literals; only non-integer decimals bottom out at f64 precision.

use std::fmt;

const EXP_BIAS: i32 = 16383;
const EXP_MASK: u16 = 0x7fff;
const SIGN_MASK: u16 = 0x8000;
const INT_BIT: u64 = 1 << 63;

/// x87 80-bit extended-precision value.
///
/// `se` packs the sign bit above the 15-bit biased exponent; `frac` is the
/// full 64-bit significand including the explicit integer bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct F80 {
    se: u16,
    frac: u64,
}

impl F80 {
    pub const ZERO: F80 = F80 { se: 0, frac: 0 };

    /// Exact widening conversion from f64.
    pub fn from_f64(v: f64) -> Self {
        let bits = v.to_bits();
        let sign = ((bits >> 63) as u16) << 15;
        let exp = ((bits >> 52) & 0x7ff) as i32;
        let frac = bits & ((1u64 << 52) - 1);

        if exp == 0x7ff {
            // Infinity keeps a bare integer bit; NaN keeps its payload with
            // the quiet bit forced.
            let frac = if frac == 0 {
                INT_BIT
            } else {
                INT_BIT | (1 << 62) | (frac << 11)
            };
            return F80 {
                se: sign | EXP_MASK,
                frac,
            };
        }
        if exp == 0 {
            if frac == 0 {
                return F80 { se: sign, frac: 0 };
            }
            // Subnormal f64: value is frac * 2^-1074. Normalize into the
            // explicit integer bit; the extended exponent range absorbs it.
            let msb = 63 - frac.leading_zeros() as i32;
            let e = msb - 1074;
            return F80 {
                se: sign | (e + EXP_BIAS) as u16,
                frac: frac << (63 - msb),
            };
        }
        F80 {
            se: sign | (exp - 1023 + EXP_BIAS) as u16,
            frac: INT_BIT | (frac << 11),
        }
    }

    /// Exact conversion from an unsigned 64-bit integer.
    pub fn from_u64(v: u64) -> Self {
        if v == 0 {
            return F80::ZERO;
        }
        let msb = 63 - v.leading_zeros() as i32;
        F80 {
            se: (msb + EXP_BIAS) as u16,
            frac: v << (63 - msb),
        }
    }

    /// Exact conversion from a signed 64-bit integer.
    pub fn from_i64(v: i64) -> Self {
        let mag = F80::from_u64(v.unsigned_abs());
        F80 {
            se: mag.se | if v < 0 { SIGN_MASK } else { 0 },
            frac: mag.frac,
        }
    }

    /// Narrowing conversion, rounded to the nearest f64.
    pub fn to_f64(&self) -> f64 {
        let sign = if self.se & SIGN_MASK != 0 { -1.0 } else { 1.0 };
        let exp = (self.se & EXP_MASK) as i32;
        if exp == EXP_MASK as i32 {
            return if self.frac & !INT_BIT == 0 {
                sign * f64::INFINITY
            } else {
                f64::NAN
            };
        }
        if self.frac == 0 {
            return sign * 0.0;
        }
        let e = if exp == 0 { -16382 } else { exp - EXP_BIAS };
        // `frac as f64` rounds the 64-bit significand to 53 bits; the scale
        // factor is an exact power of two so no further precision is lost.
        let scale = e - 63;
        if scale < -1022 {
            // One saturating pow2 factor would flush f64-subnormal results
            // to zero. Scale in two exact steps so the intermediate stays
            // normal and only the final multiply rounds into the subnormal
            // range.
            sign * ((self.frac as f64) * pow2(-1022)) * pow2(scale + 1022)
        } else {
            sign * (self.frac as f64) * pow2(scale)
        }
    }

    /// Returns the exactly-represented integer value, if this is one.
    pub fn to_exact_int(&self) -> Option<i128> {
        let exp = (self.se & EXP_MASK) as i32;
        if self.frac == 0 {
            return if exp == 0 { Some(0) } else { None };
        }
        if exp == EXP_MASK as i32 {
            return None;
        }
        let e = exp - EXP_BIAS;
        if !(0..=63).contains(&e) {
            return None;
        }
        let shift = (63 - e) as u32;
        if shift > 0 && self.frac & ((1u64 << shift) - 1) != 0 {
            return None;
        }
        let mag = (self.frac >> shift) as i128;
        Some(if self.se & SIGN_MASK != 0 { -mag } else { mag })
    }

    /// Parses decimal text. Plain integer literals in 64-bit range take the
    /// exact path; everything else goes through f64. Non-finite results are
    /// rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim();
        if let Ok(i) = t.parse::<i64>() {
            return Some(F80::from_i64(i));
        }
        if let Ok(u) = t.parse::<u64>() {
            return Some(F80::from_u64(u));
        }
        let v: f64 = t.parse().ok()?;
        if !v.is_finite() {
            return None;
        }
        Some(F80::from_f64(v))
    }

    /// Serializes into the 16-byte on-disk slot.
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.frac.to_le_bytes());
        out[8..10].copy_from_slice(&self.se.to_le_bytes());
        out
    }

    /// Deserializes from the 16-byte on-disk slot. Padding bytes are ignored.
    pub fn from_le_bytes(slot: &[u8; 16]) -> Self {
        let mut frac = [0u8; 8];
        frac.copy_from_slice(&slot[..8]);
        let mut se = [0u8; 2];
        se.copy_from_slice(&slot[8..10]);
        F80 {
            se: u16::from_le_bytes(se),
            frac: u64::from_le_bytes(frac),
        }
    }
}

impl fmt::Display for F80 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_exact_int() {
            Some(i) => write!(f, "{i}"),
            None => write!(f, "{}", self.to_f64()),
        }
    }
}

/// 2^k as f64, saturating to 0 / infinity outside the representable range.
fn pow2(k: i32) -> f64 {
    if k >= 1024 {
        f64::INFINITY
    } else if k < -1074 {
        0.0
    } else if k >= -1022 {
        f64::from_bits(((k + 1023) as u64) << 52)
    } else {
        // Subnormal range: the bit pattern 1 << (k + 1074) is 2^k exactly.
        f64::from_bits(1u64 << (k + 1074))
    }
}
