use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::entities::drug::DrugRecord;
use crate::sources::opentargets::OpenTargetsDrugRow;

const MAX_TRIAL_PHASE: f64 = 4.0;

/// Maps an upstream phase value onto 0..=4.
///
/// Fractional phases (Open Targets reports "early phase 1" as 0.5) round down;
/// null, negative, non-finite and out-of-range values are unknown.
pub fn phase_from_upstream(value: Option<f64>) -> Option<u8> {
    let value = value?;
    if !value.is_finite() || !(0.0..=MAX_TRIAL_PHASE).contains(&value) {
        return None;
    }
    Some(value.floor() as u8)
}

/// Highest phase first; unknown phase after every known phase; then by name.
fn record_order(a: &DrugRecord, b: &DrugRecord) -> Ordering {
    match (a.max_phase, b.max_phase) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.drug_name.cmp(&b.drug_name))
}

/// Groups raw rows by `(drug_name, max_phase)` and unions their targets.
///
/// The result does not depend on input row order.
pub fn aggregate_drugs(rows: Vec<OpenTargetsDrugRow>) -> Vec<DrugRecord> {
    let mut groups: BTreeMap<(String, Option<u8>), BTreeSet<String>> = BTreeMap::new();
    for row in rows {
        let key = (row.drug_name, phase_from_upstream(row.max_phase));
        let targets = groups.entry(key).or_default();
        if let Some(symbol) = row.target_symbol {
            targets.insert(symbol);
        }
    }

    let mut out = groups
        .into_iter()
        .map(|((drug_name, max_phase), targets)| DrugRecord {
            drug_name,
            max_phase,
            targets: targets.into_iter().collect(),
        })
        .collect::<Vec<_>>();
    out.sort_by(record_order);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(drug: &str, phase: Option<f64>, target: Option<&str>) -> OpenTargetsDrugRow {
        OpenTargetsDrugRow {
            drug_name: drug.to_string(),
            max_phase: phase,
            target_symbol: target.map(str::to_string),
        }
    }

    #[test]
    fn rows_sharing_name_and_phase_merge_targets() {
        let out = aggregate_drugs(vec![
            row("DrugX", Some(3.0), Some("A")),
            row("DrugX", Some(3.0), Some("B")),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].drug_name, "DrugX");
        assert_eq!(out[0].max_phase, Some(3));
        assert_eq!(out[0].targets_label(), "A, B");
    }

    #[test]
    fn aggregation_is_order_independent_and_deduplicated() {
        let forward = vec![
            row("LOSARTAN", Some(4.0), Some("AGTR1")),
            row("CAPTOPRIL", Some(4.0), Some("ACE")),
            row("LOSARTAN", Some(4.0), Some("AGTR1")),
            row("LOSARTAN", Some(4.0), Some("AGTR2")),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = aggregate_drugs(forward);
        let b = aggregate_drugs(reversed);
        assert_eq!(a, b);
        let losartan = a.iter().find(|d| d.drug_name == "LOSARTAN").unwrap();
        assert_eq!(losartan.targets, vec!["AGTR1", "AGTR2"]);
    }

    #[test]
    fn different_phases_stay_separate_and_sort_descending_with_unknown_last() {
        let out = aggregate_drugs(vec![
            row("FINERENONE", None, Some("NR3C2")),
            row("DrugX", Some(2.0), Some("A")),
            row("DrugX", Some(3.0), Some("B")),
            row("ATRASENTAN", Some(3.0), Some("EDNRA")),
            row("DAPAGLIFLOZIN", Some(4.0), Some("SLC5A2")),
        ]);
        let order = out
            .iter()
            .map(|d| (d.drug_name.as_str(), d.max_phase))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                ("DAPAGLIFLOZIN", Some(4)),
                ("ATRASENTAN", Some(3)),
                ("DrugX", Some(3)),
                ("DrugX", Some(2)),
                ("FINERENONE", None),
            ]
        );
    }

    #[test]
    fn rows_without_target_keep_the_drug() {
        let out = aggregate_drugs(vec![
            row("BARDOXOLONE", Some(3.0), None),
            row("BARDOXOLONE", Some(3.0), Some("KEAP1")),
            row("SPARSENTAN", Some(3.0), None),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].targets, vec!["KEAP1"]);
        assert!(out[1].targets.is_empty());
    }

    #[test]
    fn phase_from_upstream_handles_edge_values() {
        assert_eq!(phase_from_upstream(Some(4.0)), Some(4));
        assert_eq!(phase_from_upstream(Some(0.0)), Some(0));
        assert_eq!(phase_from_upstream(Some(0.5)), Some(0));
        assert_eq!(phase_from_upstream(Some(-1.0)), None);
        assert_eq!(phase_from_upstream(Some(5.0)), None);
        assert_eq!(phase_from_upstream(Some(f64::NAN)), None);
        assert_eq!(phase_from_upstream(None), None);
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(aggregate_drugs(Vec::new()).is_empty());
    }
}
