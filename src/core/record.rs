//! Lifetime labels and training rows.

use crate::features::FeatureVector;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const ONGOING: &str = "Ongoing";

/// How long a term stayed alive.
///
/// Serialized as a bare integer or the literal string `"Ongoing"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifetimeLabel {
    /// Months from the anchor to the death boundary.
    Months(u32),
    /// No death boundary within the observed window.
    Ongoing,
}

impl LifetimeLabel {
    pub fn months(&self) -> Option<u32> {
        match self {
            LifetimeLabel::Months(m) => Some(*m),
            LifetimeLabel::Ongoing => None,
        }
    }

    pub fn is_ongoing(&self) -> bool {
        matches!(self, LifetimeLabel::Ongoing)
    }
}

impl fmt::Display for LifetimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifetimeLabel::Months(m) => write!(f, "{}", m),
            LifetimeLabel::Ongoing => f.write_str(ONGOING),
        }
    }
}

impl Serialize for LifetimeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            LifetimeLabel::Months(m) => serializer.serialize_u32(*m),
            LifetimeLabel::Ongoing => serializer.serialize_str(ONGOING),
        }
    }
}

struct LabelVisitor;

impl<'de> Visitor<'de> for LabelVisitor {
    type Value = LifetimeLabel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative month count or \"Ongoing\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<LifetimeLabel, E> {
        u32::try_from(v)
            .map(LifetimeLabel::Months)
            .map_err(|_| E::custom(format!("month count {} out of range", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<LifetimeLabel, E> {
        u32::try_from(v)
            .map(LifetimeLabel::Months)
            .map_err(|_| E::custom(format!("month count {} out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<LifetimeLabel, E> {
        if v.eq_ignore_ascii_case(ONGOING) {
            return Ok(LifetimeLabel::Ongoing);
        }
        v.trim()
            .parse::<u32>()
            .map(LifetimeLabel::Months)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for LifetimeLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(LabelVisitor)
    }
}

/// One labelled example: a term, its early-dynamics features and its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub word: String,
    pub features: FeatureVector,
    pub label: LifetimeLabel,
}

impl TrainingRow {
    pub fn new(word: impl Into<String>, features: FeatureVector, label: LifetimeLabel) -> Self {
        Self {
            word: word.into(),
            features,
            label,
        }
    }

    /// Whether the row has a numeric target.
    pub fn is_labelled(&self) -> bool {
        !self.label.is_ongoing()
    }
}
