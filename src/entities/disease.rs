use serde::{Deserialize, Serialize};

use crate::entities::{Stage, settle};
use crate::error::{Outcome, PathoNetError};
use crate::sources::SourcesConfig;
use crate::sources::opentargets::{OpenTargetsClient, OpenTargetsDiseaseHit};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseHit {
    pub id: String, // e.g. EFO_0003884
    pub name: String,
}

/// The canonical match for a phenotype query plus every candidate upstream ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseResolution {
    pub query: String,
    pub selected: DiseaseHit,
    pub hits: Vec<DiseaseHit>,
}

impl From<OpenTargetsDiseaseHit> for DiseaseHit {
    fn from(hit: OpenTargetsDiseaseHit) -> Self {
        Self {
            id: hit.id,
            name: hit.name,
        }
    }
}

/// Searches the knowledge graph for diseases matching `query`, in upstream rank order.
pub async fn search(config: &SourcesConfig, query: &str) -> Result<Vec<DiseaseHit>, PathoNetError> {
    let client = OpenTargetsClient::new(config)?;
    let hits = client.search_diseases(query).await?;
    Ok(hits.into_iter().map(DiseaseHit::from).collect())
}

/// Picks the first hit as the canonical disease. No ranking beyond upstream order.
pub fn select_first(query: &str, hits: Vec<DiseaseHit>) -> Result<DiseaseResolution, PathoNetError> {
    let Some(selected) = hits.first().cloned() else {
        return Err(PathoNetError::NotFound {
            entity: "disease".into(),
            id: query.to_string(),
            suggestion: "Try a broader phenotype, e.g. \"kidney disease\".".into(),
        });
    };
    Ok(DiseaseResolution {
        query: query.to_string(),
        selected,
        hits,
    })
}

/// Resolves free text to a canonical disease.
///
/// Transport errors, malformed responses and zero hits all leave the caller
/// without a disease; the returned [`Outcome`] tells them apart.
pub async fn resolve(config: &SourcesConfig, query: &str) -> Outcome<DiseaseResolution> {
    let query = query.trim();
    if query.is_empty() {
        return Outcome::Empty;
    }

    let result = async {
        let hits = search(config, query).await?;
        select_first(query, hits)
    }
    .await;
    settle(Stage::DiseaseResolution, result, |_| false)
}
