use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::entities::disease::{self, DiseaseResolution};
use crate::entities::drug::DrugRecord;
use crate::entities::gene::{self, GeneAssociation};
use crate::entities::molecular;
use crate::entities::network::{self, InteractionNetwork};
use crate::entities::pathway::{self, PathwayResult};
use crate::entities::Stage;
use crate::error::{FailureKind, Outcome, PathoNetError};
use crate::sources::SourcesConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Ok,
    Empty,
    Failed,
}

/// What happened in one stage of a run; surfaced only on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StageReport {
    fn from_outcome<T>(stage: Stage, outcome: &Outcome<T>) -> Self {
        let status = match outcome {
            Outcome::Data(_) => StageStatus::Ok,
            Outcome::Empty => StageStatus::Empty,
            Outcome::Failed { .. } => StageStatus::Failed,
        };
        Self {
            stage,
            status,
            kind: outcome.kind(),
            message: outcome.message().map(str::to_string),
        }
    }
}

/// Everything rendered for one `(query, min_score)` pair.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub query: String,
    pub min_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease: Option<DiseaseResolution>,
    /// Associated genes fetched before filtering.
    pub total_genes: usize,
    /// Genes passing `min_score`.
    pub genes: Vec<GeneAssociation>,
    pub drugs: Vec<DrugRecord>,
    pub pathways: Vec<PathwayResult>,
    pub network: InteractionNetwork,
    pub diagnostics: Vec<StageReport>,
}

impl Dashboard {
    fn new(query: &str, min_score: f64) -> Self {
        Self {
            query: query.trim().to_string(),
            min_score,
            disease: None,
            total_genes: 0,
            genes: Vec::new(),
            drugs: Vec::new(),
            pathways: Vec::new(),
            network: InteractionNetwork::default(),
            diagnostics: Vec::new(),
        }
    }

    fn record<T>(&mut self, stage: Stage, outcome: &Outcome<T>) {
        self.diagnostics
            .push(StageReport::from_outcome(stage, outcome));
    }

    pub fn symbols(&self) -> Vec<String> {
        gene::symbols(&self.genes)
    }
}

async fn within_budget<T, F>(stage: Stage, budget: Duration, fut: F) -> Outcome<T>
where
    F: Future<Output = Outcome<T>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(
                source = stage.source(),
                stage = %stage,
                timeout_secs = budget.as_secs_f64(),
                "Stage timed out"
            );
            Outcome::from_error(&PathoNetError::Timeout {
                stage: stage.to_string(),
                secs: budget.as_secs(),
            })
        }
    }
}

/// Runs the full pipeline for a phenotype query.
///
/// Resolution and the molecular fetch run in sequence; pathway enrichment and
/// the interaction network run concurrently on the filtered symbol set. Every
/// stage is bounded by `config.stage_timeout`. Nothing here fails: a stage
/// that produced nothing leaves its view empty and a report in `diagnostics`.
pub async fn explore(config: &SourcesConfig, query: &str, min_score: f64) -> Dashboard {
    let mut dashboard = Dashboard::new(query, min_score);
    let budget = config.stage_timeout;

    let resolution = within_budget(
        Stage::DiseaseResolution,
        budget,
        disease::resolve(config, query),
    )
    .await;
    dashboard.record(Stage::DiseaseResolution, &resolution);
    let Outcome::Data(resolution) = resolution else {
        return dashboard;
    };
    info!(
        query = dashboard.query.as_str(),
        disease_id = resolution.selected.id.as_str(),
        disease = resolution.selected.name.as_str(),
        "Resolved disease"
    );

    let molecular = within_budget(
        Stage::MolecularData,
        budget,
        molecular::fetch_molecular_data(config, &resolution.selected.id),
    )
    .await;
    dashboard.disease = Some(resolution);
    dashboard.record(Stage::MolecularData, &molecular);
    let data = molecular.into_data_or_default();

    dashboard.total_genes = data.genes.len();
    dashboard.genes = gene::filter_by_score(&data.genes, min_score);
    dashboard.drugs = data.drugs;

    let symbols = dashboard.symbols();
    let (pathways, network) = tokio::join!(
        within_budget(
            Stage::PathwayEnrichment,
            budget,
            pathway::fetch_pathways(config, &symbols),
        ),
        within_budget(
            Stage::InteractionNetwork,
            budget,
            network::build_network(config, &symbols),
        ),
    );
    dashboard.record(Stage::PathwayEnrichment, &pathways);
    dashboard.record(Stage::InteractionNetwork, &network);
    dashboard.pathways = pathways.into_data_or_default();
    dashboard.network = network.into_data_or_default();

    dashboard
}
