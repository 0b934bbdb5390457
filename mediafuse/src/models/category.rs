//! Weighted feature categories

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{FusionError, Result};

/// A feature extraction category (e.g. color, motion) and its fusion weight.
///
/// A weight of zero excludes the category from fusion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightedFeatureCategory {
    /// Category identifier, as used in the score stream
    pub id: String,

    /// Human readable name shown by presentation layers
    pub readable_name: String,

    /// Weight scaling this category's contribution
    pub weight: f64,
}

impl WeightedFeatureCategory {
    /// Create a category with the given weight, using the id as readable name
    ///
    /// # Panics
    ///
    /// Panics if the weight is negative or not finite.
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        let id = id.into();
        match Self::try_new(id.clone(), weight) {
            Ok(category) => category,
            Err(e) => panic!("Invalid feature category '{}': {}", id, e),
        }
    }

    /// Create a category, returning an error for an invalid weight or empty id
    pub fn try_new(id: impl Into<String>, weight: f64) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(FusionError::InvalidIdentifier(
                "feature category id".to_string(),
            ));
        }
        validate_weight(&id, weight)?;
        Ok(Self {
            readable_name: id.clone(),
            id,
            weight,
        })
    }

    /// Set a human readable name
    pub fn with_readable_name(mut self, name: impl Into<String>) -> Self {
        self.readable_name = name.into();
        self
    }

    /// Change the weight of this category
    pub fn set_weight(&mut self, weight: f64) -> Result<()> {
        validate_weight(&self.id, weight)?;
        self.weight = weight;
        Ok(())
    }

    /// Whether this category contributes to fusion at all
    pub fn is_excluded(&self) -> bool {
        self.weight <= 0.0
    }
}

impl fmt::Display for WeightedFeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.readable_name, self.weight)
    }
}

fn validate_weight(category: &str, weight: f64) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(FusionError::InvalidWeight {
            category: category.to_string(),
            weight,
        });
    }
    Ok(())
}
