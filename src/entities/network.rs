use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::{Stage, settle};
use crate::error::{Outcome, PathoNetError};
use crate::sources::SourcesConfig;
use crate::sources::string::StringClient;
use crate::transform;

/// An undirected protein-protein interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEdge {
    pub node_a: String,
    pub node_b: String,
    /// STRING combined score; informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionNetwork {
    pub nodes: Vec<String>,
    pub edges: Vec<InteractionEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDegree {
    pub node: String,
    pub degree: usize,
}

impl InteractionNetwork {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Edges as index pairs into `nodes`.
    pub fn edge_indices(&self) -> Vec<(usize, usize)> {
        let index: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();
        self.edges
            .iter()
            .filter_map(|e| Some((*index.get(e.node_a.as_str())?, *index.get(e.node_b.as_str())?)))
            .collect()
    }

    /// Nodes ranked by incident edge count, highest first, ties by name.
    pub fn hubs(&self, limit: usize) -> Vec<NodeDegree> {
        let mut degree: HashMap<&str, usize> = HashMap::new();
        for edge in &self.edges {
            *degree.entry(edge.node_a.as_str()).or_default() += 1;
            *degree.entry(edge.node_b.as_str()).or_default() += 1;
        }
        let mut out = self
            .nodes
            .iter()
            .map(|n| NodeDegree {
                node: n.clone(),
                degree: degree.get(n.as_str()).copied().unwrap_or_default(),
            })
            .collect::<Vec<_>>();
        out.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.node.cmp(&b.node)));
        out.truncate(limit);
        out
    }
}

async fn try_build(config: &SourcesConfig, symbols: &[String]) -> Result<InteractionNetwork, PathoNetError> {
    let client = StringClient::new(config)?;
    let rows = client.network(symbols).await?;
    Ok(transform::network::from_string_interactions(rows))
}

/// Builds the human interaction network among `symbols`.
///
/// An empty symbol set returns `Empty` without contacting STRING.
pub async fn build_network(config: &SourcesConfig, symbols: &[String]) -> Outcome<InteractionNetwork> {
    if symbols.iter().all(|s| s.trim().is_empty()) {
        return Outcome::Empty;
    }
    settle(
        Stage::InteractionNetwork,
        try_build(config, symbols).await,
        InteractionNetwork::is_empty,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn edge(a: &str, b: &str) -> InteractionEdge {
        InteractionEdge {
            node_a: a.to_string(),
            node_b: b.to_string(),
            score: None,
        }
    }

    #[test]
    fn hubs_rank_by_degree_then_name() {
        let net = InteractionNetwork {
            nodes: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            edges: vec![edge("A", "B"), edge("B", "C"), edge("B", "D"), edge("C", "D")],
        };
        let hubs = net.hubs(3);
        assert_eq!(hubs[0], NodeDegree { node: "B".into(), degree: 3 });
        assert_eq!(hubs[1].node, "C");
        assert_eq!(hubs[2].node, "D");
        assert_eq!(net.edge_indices(), vec![(0, 1), (1, 2), (1, 3), (2, 3)]);
    }

    #[tokio::test]
    async fn build_network_materializes_nodes_and_edges() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/network"))
            .and(query_param("identifiers", "PKD1\rPKD2\rUMOD"))
            .and(query_param("species", "9606"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"preferredName_A": "PKD1", "preferredName_B": "PKD2", "score": 0.999},
                {"preferredName_A": "PKD2", "preferredName_B": "PKD1", "score": 0.999}
            ])))
            .mount(&server)
            .await;

        let config = SourcesConfig::with_base(server.uri());
        let symbols = vec!["PKD1".to_string(), "PKD2".to_string(), "UMOD".to_string()];
        let net = build_network(&config, &symbols).await.into_data_or_default();
        assert_eq!(net.nodes, vec!["PKD1", "PKD2"]);
        assert_eq!(net.edges.len(), 2);
    }

    #[tokio::test]
    async fn build_network_failure_is_empty_graph() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/network"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = SourcesConfig::with_base(server.uri());
        let outcome = build_network(&config, &["APOL1".to_string()]).await;
        assert_eq!(outcome.kind(), Some(FailureKind::Transport));
        assert!(outcome.into_data_or_default().is_empty());
    }

    #[tokio::test]
    async fn build_network_empty_symbols_short_circuit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = SourcesConfig::with_base(server.uri());
        assert_eq!(build_network(&config, &[]).await, Outcome::Empty);
    }
}
