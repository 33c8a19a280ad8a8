use std::collections::HashSet;

use crate::entities::network::{InteractionEdge, InteractionNetwork};
use crate::sources::string::StringInteraction;

fn clean_name(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Materializes both endpoints of every edge as nodes, coalesced by name.
///
/// Nodes keep first-seen order. Edges mirror upstream, parallel edges included.
pub fn from_string_interactions(rows: Vec<StringInteraction>) -> InteractionNetwork {
    let mut seen: HashSet<String> = HashSet::new();
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for row in rows {
        let (Some(node_a), Some(node_b)) = (
            clean_name(row.preferred_name_a),
            clean_name(row.preferred_name_b),
        ) else {
            continue;
        };
        for name in [&node_a, &node_b] {
            if seen.insert(name.clone()) {
                nodes.push(name.clone());
            }
        }
        edges.push(InteractionEdge {
            node_a,
            node_b,
            score: row.score,
        });
    }

    InteractionNetwork { nodes, edges }
}
