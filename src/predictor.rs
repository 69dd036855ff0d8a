use std::fmt;

use ndarray::prelude::*;

use crate::errors::{ChiliQualityError, Result};
use crate::features::Descriptor;

/// `intercept + red*r + green*g + blue*b` over the channel means of a [`Descriptor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl LinearModel {
    pub const VITAMIN_C: Self = Self::new(112.304, 0.713, -1.774, 2.569);
    pub const CAROTENE: Self = Self::new(310.983, -1.238, -8.033, 3.894);

    pub const fn new(intercept: f64, red: f64, green: f64, blue: f64) -> Self {
        Self {
            intercept,
            red,
            green,
            blue,
        }
    }

    /// Parse `[intercept, red, green, blue]` as given on the command line.
    pub fn from_slice(field: &str, values: &[f64]) -> Result<Self> {
        match values {
            &[intercept, red, green, blue] => Ok(Self::new(intercept, red, green, blue)),
            _ => Err(ChiliQualityError::validation(
                field,
                format!("expects 4 coefficients, got {}", values.len()),
            )),
        }
    }

    pub const fn row(&self) -> [f64; 4] {
        [self.intercept, self.red, self.green, self.blue]
    }

    fn validate(&self, field: &str) -> Result<()> {
        if self.row().iter().all(|c| c.is_finite()) {
            Ok(())
        } else {
            Err(ChiliQualityError::validation(
                field,
                "coefficients must be finite",
            ))
        }
    }
}

/// Predicted chemical content, truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualityEstimate {
    pub vitamin_c: i32,
    pub carotene: i32,
}

impl fmt::Display for QualityEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vitamin_c={} carotene={}", self.vitamin_c, self.carotene)
    }
}

/// Two independent linear models evaluated together as a 2x4 coefficient matrix
/// against the augmented feature vector `[1, red, green, blue]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityPredictor {
    coefficients: Array2<f64>,
}

impl QualityPredictor {
    pub fn new(vitamin_c: LinearModel, carotene: LinearModel) -> Result<Self> {
        vitamin_c.validate("vitamin_c_coefficients")?;
        carotene.validate("carotene_coefficients")?;

        Ok(Self {
            coefficients: arr2(&[vitamin_c.row(), carotene.row()]),
        })
    }

    pub fn predict(&self, features: &Descriptor) -> QualityEstimate {
        let input = array![
            1.0,
            f64::from(features.red()),
            f64::from(features.green()),
            f64::from(features.blue())
        ];
        let output = self.coefficients.dot(&input);

        QualityEstimate {
            vitamin_c: output[0].trunc() as i32,
            carotene: output[1].trunc() as i32,
        }
    }
}

impl Default for QualityPredictor {
    fn default() -> Self {
        Self {
            coefficients: arr2(&[LinearModel::VITAMIN_C.row(), LinearModel::CAROTENE.row()]),
        }
    }
}
