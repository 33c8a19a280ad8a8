use tracing::warn;

use crate::entities::pathway::PathwayResult;
use crate::sources::reactome::ReactomeEnrichedPathway;
use crate::utils::numeric::round_to;

/// `-log10(p)` rounded to two decimals.
///
/// A p-value of exactly 0 is clamped to the smallest positive normal `f64` so
/// the result stays finite; values above 1 clamp to 1. Negative and NaN
/// p-values have no significance.
pub fn significance(p_value: f64) -> Option<f64> {
    if p_value.is_nan() || p_value < 0.0 {
        return None;
    }
    let p = p_value.clamp(f64::MIN_POSITIVE, 1.0);
    Some(round_to(-p.log10(), 2))
}

pub fn from_reactome_pathway(row: ReactomeEnrichedPathway) -> Option<PathwayResult> {
    let Some(significance) = row.p_value.and_then(significance) else {
        warn!(
            source = "reactome",
            pathway = row.name.as_str(),
            p_value = ?row.p_value,
            "Pathway row without a usable p-value; skipping"
        );
        return None;
    };
    Some(PathwayResult {
        id: row.id,
        name: row.name,
        significance,
        p_value: row.p_value,
        fdr: row.fdr,
    })
}
