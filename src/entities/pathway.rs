use serde::{Deserialize, Serialize};

use crate::entities::{Stage, settle};
use crate::error::{Outcome, PathoNetError};
use crate::sources::SourcesConfig;
use crate::sources::reactome::ReactomeClient;
use crate::transform;

/// An over-represented pathway for the working gene set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>, // Reactome stable id, e.g. R-HSA-381426
    pub name: String,
    /// `-log10(p)`, two decimals. Larger is more significant.
    pub significance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fdr: Option<f64>,
}

impl PathwayResult {
    pub fn url(&self) -> Option<String> {
        self.id
            .as_deref()
            .map(|id| format!("https://reactome.org/content/detail/{id}"))
    }
}

async fn try_fetch(config: &SourcesConfig, symbols: &[String]) -> Result<Vec<PathwayResult>, PathoNetError> {
    let client = ReactomeClient::new(config)?;
    let token = client.submit_identifiers(symbols).await?;
    let rows = client.analysis_pathways(&token).await?;
    Ok(rows
        .into_iter()
        .filter_map(transform::pathway::from_reactome_pathway)
        .collect())
}

/// Runs over-representation analysis for `symbols`; at most 10 pathways, upstream order.
///
/// An empty symbol set returns `Empty` without contacting Reactome.
pub async fn fetch_pathways(config: &SourcesConfig, symbols: &[String]) -> Outcome<Vec<PathwayResult>> {
    if symbols.iter().all(|s| s.trim().is_empty()) {
        return Outcome::Empty;
    }
    settle(
        Stage::PathwayEnrichment,
        try_fetch(config, symbols).await,
        Vec::is_empty,
    )
}
