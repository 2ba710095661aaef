//! Warning ordering.

use crate::PotentialDeficiencyWarning;

/// Order warnings by severity, most severe first
///
/// The sort is stable: warnings of equal severity keep the order in which
/// their nutrients were evaluated.
pub fn rank_warnings(mut warnings: Vec<PotentialDeficiencyWarning>) -> Vec<PotentialDeficiencyWarning> {
    warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
    warnings
}
