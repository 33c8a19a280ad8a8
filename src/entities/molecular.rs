use serde::{Deserialize, Serialize};

use crate::entities::drug::DrugRecord;
use crate::entities::gene::GeneAssociation;
use crate::entities::{Stage, settle};
use crate::error::{Outcome, PathoNetError};
use crate::sources::SourcesConfig;
use crate::sources::opentargets::OpenTargetsClient;
use crate::transform;

/// Targets and therapeutics associated with one disease.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MolecularData {
    pub genes: Vec<GeneAssociation>,
    pub drugs: Vec<DrugRecord>,
}

impl MolecularData {
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty() && self.drugs.is_empty()
    }
}

async fn try_fetch(config: &SourcesConfig, disease_id: &str) -> Result<MolecularData, PathoNetError> {
    let client = OpenTargetsClient::new(config)?;
    let raw = client.disease_molecular_data(disease_id).await?;
    Ok(MolecularData {
        genes: raw
            .targets
            .into_iter()
            .map(transform::gene::from_opentargets_target)
            .collect(),
        drugs: transform::drug::aggregate_drugs(raw.drugs),
    })
}

/// Fetches up to 40 associated genes and the aggregated known drugs for a disease id.
pub async fn fetch_molecular_data(config: &SourcesConfig, disease_id: &str) -> Outcome<MolecularData> {
    settle(
        Stage::MolecularData,
        try_fetch(config, disease_id).await,
        MolecularData::is_empty,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_molecular_data_rounds_scores_and_merges_drugs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("DiseaseMolecularData"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"disease": {
                    "associatedTargets": {"rows": [
                        {"score": 0.87654, "target": {"approvedSymbol": "APOL1", "approvedName": "apolipoprotein L1"}},
                        {"score": 0.1234, "target": {"approvedSymbol": "UMOD", "approvedName": "uromodulin"}}
                    ]},
                    "knownDrugs": {"rows": [
                        {"drug": {"name": "DrugX", "maximumClinicalTrialPhase": 3.0}, "target": {"approvedSymbol": "B"}},
                        {"drug": {"name": "DrugX", "maximumClinicalTrialPhase": 3.0}, "target": {"approvedSymbol": "A"}},
                        {"drug": {"name": "LOSARTAN", "maximumClinicalTrialPhase": 4.0}, "target": {"approvedSymbol": "AGTR1"}}
                    ]}
                }}
            })))
            .mount(&server)
            .await;

        let config = SourcesConfig::with_base(server.uri());
        let data = fetch_molecular_data(&config, "EFO_0003884")
            .await
            .into_data_or_default();

        assert_eq!(data.genes.len(), 2);
        assert_eq!(data.genes[0].score, 0.877);
        assert_eq!(data.genes[1].score, 0.123);
        assert_eq!(data.drugs.len(), 2);
        assert_eq!(data.drugs[0].drug_name, "LOSARTAN");
        assert_eq!(data.drugs[1].drug_name, "DrugX");
        assert_eq!(data.drugs[1].max_phase, Some(3));
        assert_eq!(data.drugs[1].targets_label(), "A, B");
    }

    #[tokio::test]
    async fn fetch_molecular_data_failure_becomes_empty_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let config = SourcesConfig::with_base(server.uri());
        let outcome = fetch_molecular_data(&config, "EFO_0003884").await;
        assert_eq!(outcome.kind(), Some(FailureKind::Transport));
        let data = outcome.into_data_or_default();
        assert!(data.genes.is_empty());
        assert!(data.drugs.is_empty());
    }

    #[tokio::test]
    async fn fetch_molecular_data_malformed_body_is_format_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"disease": {"associatedTargets": {"rows": "nope"}}}})),
            )
            .mount(&server)
            .await;

        let config = SourcesConfig::with_base(server.uri());
        let outcome = fetch_molecular_data(&config, "EFO_0003884").await;
        assert_eq!(outcome.kind(), Some(FailureKind::UpstreamFormat));
    }
}
