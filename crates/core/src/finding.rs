//! Finding Sets
//!
//! The structured judgment a backend returns for one chunk of text: two
//! intensity ratings and four evidence arrays. Parsing is strict about the
//! shape of what is present (a wrong type or an evidence entry missing its
//! tag fails) and lenient about what is absent (missing arrays are empty,
//! missing ratings are `None`).

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, CoreResult};

/// Ordinal intensity scale used by both ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntensityLevel {
    None,
    Weak,
    Moderate,
    Strong,
    Extreme,
}

impl IntensityLevel {
    /// All levels in ascending order.
    pub const ALL: [IntensityLevel; 5] = [
        IntensityLevel::None,
        IntensityLevel::Weak,
        IntensityLevel::Moderate,
        IntensityLevel::Strong,
        IntensityLevel::Extreme,
    ];

    /// Numeric value of the level on the `[0, 1]` scale.
    pub fn value(self) -> f64 {
        match self {
            IntensityLevel::None => 0.0,
            IntensityLevel::Weak => 0.4,
            IntensityLevel::Moderate => 0.6,
            IntensityLevel::Strong => 0.8,
            IntensityLevel::Extreme => 1.0,
        }
    }

    /// Snap an arbitrary value to the closest scale value. Ties go up.
    pub fn nearest(value: f64) -> IntensityLevel {
        let mut best = IntensityLevel::None;
        let mut best_distance = f64::INFINITY;
        for level in Self::ALL {
            let distance = (level.value() - value).abs();
            if distance <= best_distance + f64::EPSILON {
                best = level;
                best_distance = distance.min(best_distance);
            }
        }
        best
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntensityLevel::None => "NONE",
            IntensityLevel::Weak => "WEAK",
            IntensityLevel::Moderate => "MODERATE",
            IntensityLevel::Strong => "STRONG",
            IntensityLevel::Extreme => "EXTREME",
        }
    }
}

impl Default for IntensityLevel {
    fn default() -> Self {
        Self::None
    }
}

impl std::fmt::Display for IntensityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evidence tagged with the ideology it is associated with.
/// Used for both ideological markers and promoted values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeologicalItem {
    pub quote: String,
    pub explanation: String,
    pub associated_ideology: String,
}

/// Evidence tagged with the emotion it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalItem {
    pub quote: String,
    pub explanation: String,
    pub target_emotion: String,
}

/// Evidence tagged with the fallacy it commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalItem {
    pub quote: String,
    pub explanation: String,
    pub fallacy_type: String,
}

/// The four evidence categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvidenceCategory {
    IdeologicalMarkers,
    PromotedValues,
    EmotionalManipulations,
    LogicalFallacies,
}

impl EvidenceCategory {
    pub const ALL: [EvidenceCategory; 4] = [
        EvidenceCategory::IdeologicalMarkers,
        EvidenceCategory::PromotedValues,
        EvidenceCategory::EmotionalManipulations,
        EvidenceCategory::LogicalFallacies,
    ];

    /// JSON key of the category in a finding set.
    pub fn key(self) -> &'static str {
        match self {
            EvidenceCategory::IdeologicalMarkers => "ideologicalMarkers",
            EvidenceCategory::PromotedValues => "promotedValues",
            EvidenceCategory::EmotionalManipulations => "emotionalManipulations",
            EvidenceCategory::LogicalFallacies => "logicalFallacies",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            EvidenceCategory::IdeologicalMarkers => "Ideological markers",
            EvidenceCategory::PromotedValues => "Promoted values",
            EvidenceCategory::EmotionalManipulations => "Emotional manipulations",
            EvidenceCategory::LogicalFallacies => "Logical fallacies",
        }
    }
}

/// One backend response's structured judgment for one chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideological_strength: Option<IntensityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_manipulation_strength: Option<IntensityLevel>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ideological_markers: Vec<IdeologicalItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub promoted_values: Vec<IdeologicalItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub emotional_manipulations: Vec<EmotionalItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub logical_fallacies: Vec<LogicalItem>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl FindingSet {
    /// Validate a parsed JSON value against the finding-set schema.
    ///
    /// Non-object values and schema violations are both errors; callers
    /// treat them exactly like unparseable text.
    pub fn from_value(value: serde_json::Value) -> CoreResult<Self> {
        if !value.is_object() {
            return Err(CoreError::parse("finding set must be a JSON object"));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Number of evidence entries in one category.
    pub fn count(&self, category: EvidenceCategory) -> usize {
        match category {
            EvidenceCategory::IdeologicalMarkers => self.ideological_markers.len(),
            EvidenceCategory::PromotedValues => self.promoted_values.len(),
            EvidenceCategory::EmotionalManipulations => self.emotional_manipulations.len(),
            EvidenceCategory::LogicalFallacies => self.logical_fallacies.len(),
        }
    }
}
