//! Report Models
//!
//! Aggregate of all valid finding sets of one analysis run.

use serde::{Deserialize, Serialize};
use undoctrinator_core::{EmotionalItem, EvidenceCategory, IdeologicalItem, IntensityLevel, LogicalItem};

/// Derived intensities and evidence counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub ideological_strength: IntensityLevel,
    pub emotional_manipulation_strength: IntensityLevel,
    pub ideological_markers_count: usize,
    pub promoted_values_count: usize,
    pub emotional_manipulations_count: usize,
    pub logical_fallacies_count: usize,
}

impl Summary {
    pub fn count(&self, category: EvidenceCategory) -> usize {
        match category {
            EvidenceCategory::IdeologicalMarkers => self.ideological_markers_count,
            EvidenceCategory::PromotedValues => self.promoted_values_count,
            EvidenceCategory::EmotionalManipulations => self.emotional_manipulations_count,
            EvidenceCategory::LogicalFallacies => self.logical_fallacies_count,
        }
    }
}

/// Evidence concatenated across chunks, in chunk order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proofs {
    pub ideological_markers: Vec<IdeologicalItem>,
    pub promoted_values: Vec<IdeologicalItem>,
    pub emotional_manipulations: Vec<EmotionalItem>,
    pub logical_fallacies: Vec<LogicalItem>,
}

/// Final report of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub summary: Summary,
    pub proofs: Proofs,
}

impl ReportData {
    /// Total evidence entries across all categories.
    pub fn total_evidence(&self) -> usize {
        EvidenceCategory::ALL
            .iter()
            .map(|c| self.summary.count(*c))
            .sum()
    }
}
