//! Recipe price and its derived multiples.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::WorkflowError;

/// A positive, finite price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, WorkflowError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(WorkflowError::Validation(format!(
                "price must be a positive number, got {value}"
            )));
        }
        // price_3x must stay representable
        if !(value * 3.0).is_finite() {
            return Err(WorkflowError::Validation(format!("price {value} is too large")));
        }
        Ok(Self(value))
    }

    /// Parse user input such as `"10"` or `" 12.50 "`.
    pub fn parse(input: &str) -> Result<Self, WorkflowError> {
        let trimmed = input.trim();
        let value: f64 = trimmed.parse().map_err(|_| {
            WorkflowError::Validation(format!("price must be a number, got {trimmed:?}"))
        })?;
        Self::new(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn times(self, factor: u32) -> f64 {
        self.0 * f64::from(factor)
    }
}

impl TryFrom<f64> for Price {
    type Error = WorkflowError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Price plus the multiples stored next to it.
///
/// Only constructible from a `Price`, so the multiples always match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSheet {
    price: Price,
    price_2x: f64,
    price_3x: f64,
}

impl PriceSheet {
    pub fn price(&self) -> Price {
        self.price
    }

    pub fn price_2x(&self) -> f64 {
        self.price_2x
    }

    pub fn price_3x(&self) -> f64 {
        self.price_3x
    }
}

impl From<Price> for PriceSheet {
    fn from(price: Price) -> Self {
        Self {
            price,
            price_2x: price.times(2),
            price_3x: price.times(3),
        }
    }
}
