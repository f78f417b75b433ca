use crate::error::{Result, SubsampleError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many tokens a sample keeps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Keep exactly this many tokens.
    ExactCount(usize),
    /// Keep `floor(total * rate)` tokens, `rate` in `[0, 1]`.
    Rate(f64),
}

impl SelectionPolicy {
    /// Number of tokens to keep out of `total`.
    pub fn resolve(&self, total: usize) -> Result<usize> {
        match *self {
            Self::ExactCount(n) => {
                if n > total {
                    return Err(SubsampleError::TooManyTokens {
                        requested: n,
                        total,
                    });
                }
                Ok(n)
            }
            Self::Rate(rate) => {
                if !(0.0..=1.0).contains(&rate) {
                    return Err(SubsampleError::InvalidRate(rate));
                }
                // rate <= 1 keeps the product within total
                let count = (total as f64 * rate).floor() as usize;
                Ok(count.min(total))
            }
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ExactCount(n) => write!(f, "count={}", n),
            Self::Rate(rate) => write!(f, "rate={}", rate),
        }
    }
}
