//! Report Aggregator
//!
//! Merges per-chunk finding sets into one `ReportData`. Evidence arrays are
//! concatenated in chunk order; intensities are the unweighted mean of the
//! per-chunk ratings, lifted by an evidence-count floor.

use undoctrinator_core::{FindingSet, IntensityLevel};

use crate::models::report::{Proofs, ReportData, Summary};

/// Evidence-count thresholds that floor a derived intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntensityPolicy {
    /// Signals needed for at least `STRONG`.
    pub strong_signals: usize,
    /// Signals needed for `EXTREME`.
    pub extreme_signals: usize,
}

impl Default for IntensityPolicy {
    fn default() -> Self {
        Self {
            strong_signals: 4,
            extreme_signals: 5,
        }
    }
}

impl IntensityPolicy {
    /// Lowest level a given number of signals may be reported as.
    pub fn floor(&self, evidence_count: usize) -> IntensityLevel {
        if evidence_count >= self.extreme_signals {
            IntensityLevel::Extreme
        } else if evidence_count >= self.strong_signals {
            IntensityLevel::Strong
        } else {
            IntensityLevel::None
        }
    }

    /// Derived level for a mean rating and an evidence count.
    pub fn level(&self, mean: f64, evidence_count: usize) -> IntensityLevel {
        IntensityLevel::nearest(mean).max(self.floor(evidence_count))
    }
}

/// Derived level under the default policy.
pub fn get_intensity_level(mean: f64, evidence_count: usize) -> IntensityLevel {
    IntensityPolicy::default().level(mean, evidence_count)
}

fn mean_of<F>(findings: &[FindingSet], rating: F) -> f64
where
    F: Fn(&FindingSet) -> Option<IntensityLevel>,
{
    if findings.is_empty() {
        return 0.0;
    }
    let total: f64 = findings
        .iter()
        .map(|f| rating(f).unwrap_or_default().value())
        .sum();
    total / findings.len() as f64
}

/// Aggregate under the default policy.
pub fn generate_report(findings: &[FindingSet]) -> ReportData {
    generate_report_with_policy(findings, IntensityPolicy::default())
}

pub fn generate_report_with_policy(findings: &[FindingSet], policy: IntensityPolicy) -> ReportData {
    if findings.is_empty() {
        return ReportData::default();
    }

    let mut proofs = Proofs::default();
    for set in findings {
        proofs
            .ideological_markers
            .extend(set.ideological_markers.iter().cloned());
        proofs
            .promoted_values
            .extend(set.promoted_values.iter().cloned());
        proofs
            .emotional_manipulations
            .extend(set.emotional_manipulations.iter().cloned());
        proofs
            .logical_fallacies
            .extend(set.logical_fallacies.iter().cloned());
    }

    // ideology is evidenced by markers, manipulation by its own list
    let summary = Summary {
        ideological_strength: policy.level(
            mean_of(findings, |f| f.ideological_strength),
            proofs.ideological_markers.len(),
        ),
        emotional_manipulation_strength: policy.level(
            mean_of(findings, |f| f.emotional_manipulation_strength),
            proofs.emotional_manipulations.len(),
        ),
        ideological_markers_count: proofs.ideological_markers.len(),
        promoted_values_count: proofs.promoted_values.len(),
        emotional_manipulations_count: proofs.emotional_manipulations.len(),
        logical_fallacies_count: proofs.logical_fallacies.len(),
    };

    ReportData { summary, proofs }
}
