//! Named, ordered feature schemas and the vectors built against them.
//!
//! A schema travels with every fitted scaler and persisted model so that a
//! vector built in a different order is rejected instead of silently
//! mis-scaled.

use crate::error::{LifetimeError, Result};
use serde::{Deserialize, Serialize};

/// A single feature of the popularity-dynamics vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Character count of the term with whitespace removed.
    WordLength,
    /// Largest single-step increase between rise start and peak.
    MaxRisingSlope,
    /// Value of the series maximum.
    PeakValue,
    /// Sample standard deviation of the pre-peak values.
    InitialVolatility,
    /// Post-peak decay measure (see `DecayRateStrategy`).
    InitialDecayRate,
}

impl FeatureKind {
    /// Stable column name.
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::WordLength => "word_length",
            FeatureKind::MaxRisingSlope => "max_rising_slope",
            FeatureKind::PeakValue => "peak_value",
            FeatureKind::InitialVolatility => "initial_volatility",
            FeatureKind::InitialDecayRate => "initial_decay_rate",
        }
    }
}

/// Which of the two deployed feature sets a pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// `word_length, max_rising_slope, peak_value`
    ThreeFeature,
    /// `word_length, max_rising_slope, initial_volatility, initial_decay_rate`
    #[default]
    FourFeature,
}

impl FeatureSet {
    pub fn schema(&self) -> FeatureSchema {
        match self {
            FeatureSet::ThreeFeature => FeatureSchema::three_feature(),
            FeatureSet::FourFeature => FeatureSchema::four_feature(),
        }
    }
}

/// Ordered list of features.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<FeatureKind>", into = "Vec<FeatureKind>")]
pub struct FeatureSchema {
    kinds: Vec<FeatureKind>,
}

impl FeatureSchema {
    /// Create a schema; rejects empty or duplicated feature lists.
    pub fn new(kinds: Vec<FeatureKind>) -> Result<Self> {
        if kinds.is_empty() {
            return Err(LifetimeError::InvalidParameter(
                "feature schema must not be empty".to_string(),
            ));
        }
        for (i, kind) in kinds.iter().enumerate() {
            if kinds[..i].contains(kind) {
                return Err(LifetimeError::InvalidParameter(format!(
                    "duplicate feature '{}' in schema",
                    kind.name()
                )));
            }
        }
        Ok(Self { kinds })
    }

    pub fn three_feature() -> Self {
        Self {
            kinds: vec![
                FeatureKind::WordLength,
                FeatureKind::MaxRisingSlope,
                FeatureKind::PeakValue,
            ],
        }
    }

    pub fn four_feature() -> Self {
        Self {
            kinds: vec![
                FeatureKind::WordLength,
                FeatureKind::MaxRisingSlope,
                FeatureKind::InitialVolatility,
                FeatureKind::InitialDecayRate,
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> &[FeatureKind] {
        &self.kinds
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.kinds.iter().map(|k| k.name()).collect()
    }

    pub fn contains(&self, kind: FeatureKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn position(&self, kind: FeatureKind) -> Option<usize> {
        self.kinds.iter().position(|&k| k == kind)
    }

    /// Comma-separated column names.
    pub fn describe(&self) -> String {
        self.names().join(", ")
    }

    /// Fail with `SchemaMismatch` unless both schemas list the same features
    /// in the same order.
    pub fn ensure_matches(&self, other: &FeatureSchema) -> Result<()> {
        if self != other {
            return Err(LifetimeError::SchemaMismatch {
                expected: self.describe(),
                got: other.describe(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<FeatureKind>> for FeatureSchema {
    type Error = LifetimeError;

    fn try_from(kinds: Vec<FeatureKind>) -> Result<Self> {
        FeatureSchema::new(kinds)
    }
}

impl From<FeatureSchema> for Vec<FeatureKind> {
    fn from(schema: FeatureSchema) -> Self {
        schema.kinds
    }
}

/// Feature values laid out in the order of their schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Create a vector; the value count must equal the schema length.
    pub fn new(schema: FeatureSchema, values: Vec<f64>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(LifetimeError::DimensionMismatch {
                expected: schema.len(),
                got: values.len(),
            });
        }
        Ok(Self { schema, values })
    }

    /// All-zero vector for a schema.
    pub fn zeros(schema: FeatureSchema) -> Self {
        let values = vec![0.0; schema.len()];
        Self { schema, values }
    }

    /// Schema the values are ordered by.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Values in schema order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of `kind`, or `None` when the schema lacks it.
    pub fn get(&self, kind: FeatureKind) -> Option<f64> {
        self.schema.position(kind).map(|i| self.values[i])
    }

    /// Set a feature if the schema has it; NaN and infinities are stored as 0.
    pub(crate) fn set(&mut self, kind: FeatureKind, value: f64) {
        if let Some(i) = self.schema.position(kind) {
            self.values[i] = crate::utils::finite_or_zero(value);
        }
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_fixed_order() {
        assert_eq!(
            FeatureSchema::three_feature().names(),
            vec!["word_length", "max_rising_slope", "peak_value"]
        );
        assert_eq!(
            FeatureSchema::four_feature().names(),
            vec![
                "word_length",
                "max_rising_slope",
                "initial_volatility",
                "initial_decay_rate"
            ]
        );
        assert_eq!(FeatureSet::ThreeFeature.schema().len(), 3);
    }

    #[test]
    fn schema_rejects_duplicates_and_empty() {
        assert!(FeatureSchema::new(vec![]).is_err());
        assert!(FeatureSchema::new(vec![FeatureKind::PeakValue, FeatureKind::PeakValue]).is_err());
    }

    #[test]
    fn reordered_schema_is_a_mismatch() {
        let reordered = FeatureSchema::new(vec![
            FeatureKind::MaxRisingSlope,
            FeatureKind::WordLength,
            FeatureKind::PeakValue,
        ])
        .unwrap();

        let err = FeatureSchema::three_feature()
            .ensure_matches(&reordered)
            .unwrap_err();
        assert!(matches!(err, LifetimeError::SchemaMismatch { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn schema_serializes_as_name_list() {
        let json = serde_json::to_string(&FeatureSchema::three_feature()).unwrap();
        assert_eq!(json, r#"["word_length","max_rising_slope","peak_value"]"#);

        let back: FeatureSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FeatureSchema::three_feature());

        let dup: std::result::Result<FeatureSchema, _> =
            serde_json::from_str(r#"["peak_value","peak_value"]"#);
        assert!(dup.is_err());
    }

    #[test]
    fn vector_checks_length_and_sanitizes_values() {
        let schema = FeatureSchema::three_feature();
        assert!(FeatureVector::new(schema.clone(), vec![1.0, 2.0]).is_err());

        let mut v = FeatureVector::zeros(schema);
        v.set(FeatureKind::PeakValue, f64::NAN);
        v.set(FeatureKind::MaxRisingSlope, 12.0);
        v.set(FeatureKind::InitialVolatility, 3.0); // not in schema, ignored

        assert_eq!(v.values(), &[0.0, 12.0, 0.0]);
        assert_eq!(v.get(FeatureKind::MaxRisingSlope), Some(12.0));
        assert_eq!(v.get(FeatureKind::InitialVolatility), None);
    }
}
