//! Key encoders
//!
//! Pure functions from an attribute value to a key fragment. Numeric
//! encoders pad to a fixed width so byte-wise string order matches numeric
//! order (or its reverse).

use crate::error::{EntityKvError, Result};

use super::AttrValue;

/// Numeric range accepted by the padding encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// `0..=i32::MAX`, 10 digits
    W32,

    /// `0..=i64::MAX`, 19 digits
    W64,
}

impl Width {
    /// Largest accepted value
    pub const fn max(self) -> u64 {
        match self {
            Width::W32 => i32::MAX as u64,
            Width::W64 => i64::MAX as u64,
        }
    }

    /// Number of decimal digits of every fragment
    pub const fn digits(self) -> usize {
        match self {
            Width::W32 => 10,
            Width::W64 => 19,
        }
    }

    fn checked(self, value: &AttrValue) -> Result<u64> {
        let n = match value {
            AttrValue::Int(n) if *n < 0 => {
                return Err(EntityKvError::InvalidArgument(format!(
                    "padding encoders only accept non-negative integers, got {}",
                    n
                )));
            }
            other => other.as_non_negative().ok_or_else(|| {
                EntityKvError::InvalidArgument(format!(
                    "padding encoders only accept integers, got {:?}",
                    other
                ))
            })?,
        };

        if n > self.max() {
            return Err(EntityKvError::InvalidArgument(format!(
                "{} exceeds the {:?} maximum of {}",
                n,
                self,
                self.max()
            )));
        }

        Ok(n)
    }

    fn pad(self, n: u64) -> String {
        format!("{:0width$}", n, width = self.digits())
    }
}

/// Maps an attribute value to an order-preserving key fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoder {
    /// Textual form of the value
    #[default]
    Identity,

    /// Left-zero-padded decimal; string order equals numeric order
    ZeroPad(Width),

    /// `ZeroPad(max - value)`; string order is the reverse of numeric order
    ReverseZeroPad(Width),
}

impl Encoder {
    /// Encode a single value
    pub fn encode(&self, value: &AttrValue) -> Result<String> {
        match self {
            Encoder::Identity => {
                if value.is_null() {
                    return Err(EntityKvError::InvalidArgument(
                        "identity encoder cannot encode a null value".to_string(),
                    ));
                }
                Ok(value.to_string())
            }
            Encoder::ZeroPad(width) => Ok(width.pad(width.checked(value)?)),
            Encoder::ReverseZeroPad(width) => {
                let n = width.checked(value)?;
                Ok(width.pad(width.max() - n))
            }
        }
    }
}
