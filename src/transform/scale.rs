//! Per-feature standardization fitted over a feature matrix.
//!
//! x_scaled = (x - mean) / std, with the population standard deviation and a
//! scale of 1 for constant columns.

use crate::error::{LifetimeError, Result};
use crate::features::{FeatureSchema, FeatureVector};
use crate::utils::{mean, population_std_dev};
use serde::{Deserialize, Serialize};

/// Standard deviations below this are treated as zero.
const MIN_SCALE: f64 = 1e-10;

/// Fitted per-feature (mean, std) pairs tied to a feature schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizationState {
    schema: FeatureSchema,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardizationState {
    /// Fit over rows laid out in `schema` order.
    pub fn fit<R: AsRef<[f64]>>(schema: &FeatureSchema, rows: &[R]) -> Result<Self> {
        if rows.is_empty() {
            return Err(LifetimeError::EmptyData);
        }
        let width = schema.len();
        for row in rows {
            if row.as_ref().len() != width {
                return Err(LifetimeError::DimensionMismatch {
                    expected: width,
                    got: row.as_ref().len(),
                });
            }
        }

        let mut means = vec![0.0; width];
        let mut scales = vec![1.0; width];

        for j in 0..width {
            let column: Vec<f64> = rows.iter().map(|r| r.as_ref()[j]).collect();
            let std = population_std_dev(&column);

            means[j] = mean(&column);
            scales[j] = if std.is_finite() && std >= MIN_SCALE {
                std
            } else {
                1.0
            };
        }

        Ok(Self {
            schema: schema.clone(),
            means,
            scales,
        })
    }

    /// Check internal consistency; inconsistencies are deployment errors.
    pub fn validate(&self) -> Result<()> {
        if self.means.len() != self.schema.len() || self.scales.len() != self.schema.len() {
            return Err(LifetimeError::Configuration(format!(
                "scaler has {} means and {} scales for {} features",
                self.means.len(),
                self.scales.len(),
                self.schema.len()
            )));
        }
        if self.means.iter().any(|m| !m.is_finite())
            || self.scales.iter().any(|s| !s.is_finite() || *s <= 0.0)
        {
            return Err(LifetimeError::Configuration(
                "scaler parameters must be finite with positive scales".to_string(),
            ));
        }
        Ok(())
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Scale a raw row laid out in schema order.
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        self.check_width(values)?;
        Ok(values
            .iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(&x, (&m, &s))| (x - m) / s)
            .collect())
    }

    /// Scale a feature vector after checking its schema.
    pub fn transform_vector(&self, vector: &FeatureVector) -> Result<Vec<f64>> {
        self.schema.ensure_matches(vector.schema())?;
        self.transform(vector.values())
    }

    /// Recover raw values from scaled ones.
    pub fn inverse_transform(&self, scaled: &[f64]) -> Result<Vec<f64>> {
        self.check_width(scaled)?;
        Ok(scaled
            .iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(&z, (&m, &s))| z * s + m)
            .collect())
    }

    fn check_width(&self, values: &[f64]) -> Result<()> {
        if values.len() != self.schema.len() {
            return Err(LifetimeError::SchemaMismatch {
                expected: self.schema.describe(),
                got: format!("{} unnamed values", values.len()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rows() -> Vec<Vec<f64>> {
        vec![
            vec![2.0, 10.0, 50.0],
            vec![3.0, 30.0, 100.0],
            vec![4.0, 50.0, 75.0],
        ]
    }

    #[test]
    fn fit_uses_population_std() {
        let state = StandardizationState::fit(&FeatureSchema::three_feature(), &rows()).unwrap();

        assert_relative_eq!(state.means()[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(state.means()[1], 30.0, epsilon = 1e-10);
        assert_relative_eq!(state.scales()[0], (2.0_f64 / 3.0).sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn constant_column_scales_by_one() {
        let rows = vec![vec![3.0, 1.0, 5.0], vec![3.0, 2.0, 6.0]];
        let state = StandardizationState::fit(&FeatureSchema::three_feature(), &rows).unwrap();

        assert_relative_eq!(state.scales()[0], 1.0, epsilon = 1e-10);
        let z = state.transform(&[3.0, 1.5, 5.5]).unwrap();
        assert_relative_eq!(z[0], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn transform_then_inverse_round_trips() {
        let state = StandardizationState::fit(&FeatureSchema::three_feature(), &rows()).unwrap();
        let raw = [5.0, 12.5, 61.0];

        let scaled = state.transform(&raw).unwrap();
        let recovered = state.inverse_transform(&scaled).unwrap();
        for (orig, rec) in raw.iter().zip(recovered.iter()) {
            assert_relative_eq!(orig, rec, epsilon = 1e-10);
        }
    }

    #[test]
    fn wrong_width_is_a_schema_mismatch() {
        let state = StandardizationState::fit(&FeatureSchema::three_feature(), &rows()).unwrap();
        let err = state.transform(&[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn vector_with_other_schema_is_rejected() {
        let state = StandardizationState::fit(&FeatureSchema::three_feature(), &rows()).unwrap();
        let v = FeatureVector::zeros(FeatureSchema::four_feature());
        assert!(matches!(
            state.transform_vector(&v),
            Err(LifetimeError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn fit_rejects_empty_and_ragged_input() {
        let schema = FeatureSchema::three_feature();
        let empty: Vec<Vec<f64>> = vec![];
        assert!(matches!(
            StandardizationState::fit(&schema, &empty),
            Err(LifetimeError::EmptyData)
        ));
        assert!(StandardizationState::fit(&schema, &[vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn validate_rejects_inconsistent_parameters() {
        let schema = FeatureSchema::three_feature();
        let state = |means: Vec<f64>, scales: Vec<f64>| StandardizationState {
            schema: schema.clone(),
            means,
            scales,
        };
        assert!(state(vec![0.0; 2], vec![1.0; 3]).validate().is_err());
        assert!(state(vec![0.0; 3], vec![0.0; 3]).validate().is_err());
        assert!(state(vec![0.0; 3], vec![1.0; 3]).validate().is_ok());
    }
}
