//! Pipeline entities and the stage workflows that produce them.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Outcome, PathoNetError};

pub mod dashboard;
pub mod disease;
pub mod drug;
pub mod gene;
pub mod molecular;
pub mod network;
pub mod pathway;

/// One step of the disease-to-mechanism pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DiseaseResolution,
    MolecularData,
    PathwayEnrichment,
    InteractionNetwork,
}

impl Stage {
    pub fn source(self) -> &'static str {
        match self {
            Self::DiseaseResolution | Self::MolecularData => "opentargets",
            Self::PathwayEnrichment => "reactome",
            Self::InteractionNetwork => "string",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DiseaseResolution => "disease resolution",
            Self::MolecularData => "molecular data",
            Self::PathwayEnrichment => "pathway enrichment",
            Self::InteractionNetwork => "interaction network",
        })
    }
}

/// Folds a stage result into an [`Outcome`], logging anything that is not data.
pub(crate) fn settle<T>(
    stage: Stage,
    result: Result<T, PathoNetError>,
    is_empty: impl FnOnce(&T) -> bool,
) -> Outcome<T> {
    let outcome = match result {
        Ok(value) => Outcome::non_empty(value, is_empty),
        Err(err) => Outcome::from_error(&err),
    };
    match &outcome {
        Outcome::Data(_) => {}
        Outcome::Empty => debug!(source = stage.source(), stage = %stage, "No data returned"),
        Outcome::Failed { kind, message } => warn!(
            source = stage.source(),
            stage = %stage,
            kind = %kind,
            "{} unavailable for {stage}: {message}",
            stage.source()
        ),
    }
    outcome
}
