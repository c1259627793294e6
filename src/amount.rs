// Base-unit amounts. A single transfer value or fee is a uint256 on chain;
// sums are kept in 512 bits, which no realistic number of uint256 summands
// can overflow.

pub use primitive_types::{U256, U512};

use serde::Serialize;
use std::{cmp::Ordering, fmt};

/// Decimal as the explorer sends it, or 0x-prefixed hex as an RPC node would.
/// `None` for anything that is not a uint256.
pub fn parse_amount(s: &str) -> Option<U256> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => U256::from_dec_str(s).ok(),
        None => None,
    }
}

/// Widen a single amount for accumulation.
pub fn widen(value: U256) -> U512 {
    U512::from(value)
}

///
/// SignedTotal
///
/// Running balance as sign and magnitude, so received minus sent never
/// needs a bounded signed type. Zero is never negative.
///

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SignedTotal {
    negative: bool,
    magnitude: U512,
}

impl SignedTotal {
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude(&self) -> U512 {
        self.magnitude
    }

    pub fn credit(&mut self, amount: U512) {
        if self.negative {
            self.offset(amount);
        } else {
            self.magnitude = self.magnitude + amount;
        }
    }

    pub fn debit(&mut self, amount: U512) {
        if self.negative {
            self.magnitude = self.magnitude + amount;
        } else {
            self.offset(amount);
        }
    }

    // move towards (and possibly across) zero
    fn offset(&mut self, amount: U512) {
        match self.magnitude.cmp(&amount) {
            Ordering::Greater => self.magnitude = self.magnitude - amount,
            Ordering::Equal => *self = Self::default(),
            Ordering::Less => {
                self.magnitude = amount - self.magnitude;
                self.negative = !self.negative;
            }
        }
    }
}

impl fmt::Display for SignedTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

///
/// AsFloat
///
/// Lossy conversion for the display layer.
///

pub trait AsFloat {
    fn as_f64(&self) -> f64;
}

impl AsFloat for U256 {
    fn as_f64(&self) -> f64 {
        limbs_as_f64(&self.0)
    }
}

impl AsFloat for U512 {
    fn as_f64(&self) -> f64 {
        limbs_as_f64(&self.0)
    }
}

impl AsFloat for SignedTotal {
    fn as_f64(&self) -> f64 {
        let magnitude = self.magnitude.as_f64();
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

// little-endian 64-bit limbs
fn limbs_as_f64(limbs: &[u64]) -> f64 {
    limbs.iter().rev().fold(0.0, |acc, &limb| acc * 18_446_744_073_709_551_616.0 + limb as f64)
}
