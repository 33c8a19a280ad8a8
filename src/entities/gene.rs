use serde::{Deserialize, Serialize};

/// Default evidence stringency applied to association scores.
pub const DEFAULT_MIN_SCORE: f64 = 0.20;

/// A target associated with the resolved disease.
///
/// `score` is the upstream overall association score, already rounded to
/// three decimals. Symbols are not guaranteed unique within one result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneAssociation {
    pub symbol: String,
    pub name: String,
    pub score: f64,
}

/// Keeps genes whose score meets `threshold`, preserving order.
pub fn filter_by_score(genes: &[GeneAssociation], threshold: f64) -> Vec<GeneAssociation> {
    genes
        .iter()
        .filter(|g| g.score >= threshold)
        .cloned()
        .collect()
}

/// Symbol projection used as input to enrichment and network lookups.
pub fn symbols(genes: &[GeneAssociation]) -> Vec<String> {
    genes.iter().map(|g| g.symbol.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene(symbol: &str, score: f64) -> GeneAssociation {
        GeneAssociation {
            symbol: symbol.to_string(),
            name: format!("{symbol} protein"),
            score,
        }
    }

    fn sample() -> Vec<GeneAssociation> {
        vec![
            gene("APOL1", 0.812),
            gene("UMOD", 0.2),
            gene("PKD1", 0.199),
            gene("COL4A5", 0.95),
            gene("APOL1", 0.41),
            gene("NPHS1", 0.0),
        ]
    }

    #[test]
    fn filter_keeps_scores_at_or_above_threshold_in_order() {
        let out = filter_by_score(&sample(), DEFAULT_MIN_SCORE);
        let syms = symbols(&out);
        assert_eq!(syms, vec!["APOL1", "UMOD", "COL4A5", "APOL1"]);
        assert!(out.iter().all(|g| g.score >= DEFAULT_MIN_SCORE));
    }

    #[test]
    fn raising_threshold_never_grows_the_set() {
        let genes = sample();
        let mut previous = genes.len();
        for step in 0..=20 {
            let t = f64::from(step) * 0.05;
            let kept = filter_by_score(&genes, t).len();
            assert!(kept <= previous, "threshold {t} grew the set");
            previous = kept;
        }
        assert_eq!(filter_by_score(&genes, 0.90).len(), 1);
    }

    #[test]
    fn filter_bounds() {
        let genes = sample();
        assert_eq!(filter_by_score(&genes, 0.0).len(), genes.len());
        assert!(filter_by_score(&genes, 1.0).is_empty());
        assert!(filter_by_score(&[], 0.2).is_empty());
    }

    #[test]
    fn duplicate_symbols_are_not_merged() {
        let out = filter_by_score(&sample(), 0.4);
        assert_eq!(out.iter().filter(|g| g.symbol == "APOL1").count(), 2);
    }
}
