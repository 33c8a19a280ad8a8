use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PathoNetError;
use crate::sources::SourcesConfig;
use crate::sources::config::endpoint;

const OPENTARGETS_API: &str = "opentargets";

/// Upper bound on associated targets requested per disease.
pub(crate) const MAX_ASSOCIATED_TARGETS: usize = 40;
/// Upper bound on raw known-drug rows processed per disease.
pub(crate) const MAX_KNOWN_DRUG_ROWS: usize = 80;
const SEARCH_PAGE_SIZE: usize = 10;

pub struct OpenTargetsClient {
    client: reqwest_middleware::ClientWithMiddleware,
    base: Cow<'static, str>,
}

impl OpenTargetsClient {
    pub fn new(config: &SourcesConfig) -> Result<Self, PathoNetError> {
        Ok(Self {
            client: crate::sources::http_client(config)?,
            base: config.opentargets_base.clone(),
        })
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: &GraphQlRequest<'_>,
    ) -> Result<T, PathoNetError> {
        let url = endpoint(&self.base, "graphql");
        let resp: GraphQlResponse<T> =
            crate::sources::send_json(OPENTARGETS_API, self.client.post(&url).json(body)).await?;

        if let Some(errors) = resp.errors {
            let msg = errors
                .into_iter()
                .filter_map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            if !msg.is_empty() {
                return Err(PathoNetError::GraphQl {
                    api: OPENTARGETS_API.to_string(),
                    message: msg,
                });
            }
        }

        resp.data.ok_or_else(|| PathoNetError::MissingField {
            api: OPENTARGETS_API.to_string(),
            field: format!("{operation}: data"),
        })
    }

    /// Runs a disease-only knowledge-graph search and returns hits in upstream rank order.
    pub async fn search_diseases(
        &self,
        query: &str,
    ) -> Result<Vec<OpenTargetsDiseaseHit>, PathoNetError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PathoNetError::InvalidArgument(
                "OpenTargets disease query is required".into(),
            ));
        }

        let body = GraphQlRequest {
            query: r#"
query SearchDisease($query: String!, $size: Int!) {
  search(queryString: $query, entityNames: ["disease"], page: {index: 0, size: $size}) {
    hits {
      id
      name
      entity
    }
  }
}
"#,
            variables: serde_json::json!({
                "query": query,
                "size": SEARCH_PAGE_SIZE,
            }),
        };

        let data: SearchData = self.graphql("SearchDisease", &body).await?;
        let Some(search) = data.search else {
            warn_missing_field("SearchDisease", "data.search");
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for hit in search.hits {
            if hit.entity.as_deref().is_some_and(|e| e != "disease") {
                continue;
            }
            let Some(id) = hit
                .id
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
            else {
                continue;
            };
            let name = hit
                .name
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| id.to_string());
            out.push(OpenTargetsDiseaseHit {
                id: id.to_string(),
                name,
            });
        }
        Ok(out)
    }

    /// Fetches associated targets and known-drug rows for one disease in a single call.
    ///
    /// Never returns more than [`MAX_ASSOCIATED_TARGETS`] targets or
    /// [`MAX_KNOWN_DRUG_ROWS`] drug rows, whatever upstream sends back.
    pub async fn disease_molecular_data(
        &self,
        disease_id: &str,
    ) -> Result<OpenTargetsMolecularData, PathoNetError> {
        let disease_id = disease_id.trim();
        if disease_id.is_empty() {
            return Err(PathoNetError::InvalidArgument(
                "OpenTargets disease id is required".into(),
            ));
        }

        let body = GraphQlRequest {
            query: r#"
query DiseaseMolecularData($efoId: String!, $targetSize: Int!, $drugSize: Int!) {
  disease(efoId: $efoId) {
    id
    name
    associatedTargets(page: {index: 0, size: $targetSize}) {
      rows {
        score
        target {
          approvedSymbol
          approvedName
        }
      }
    }
    knownDrugs(size: $drugSize) {
      rows {
        drug {
          name
          maximumClinicalTrialPhase
        }
        target {
          approvedSymbol
        }
      }
    }
  }
}
"#,
            variables: serde_json::json!({
                "efoId": disease_id,
                "targetSize": MAX_ASSOCIATED_TARGETS,
                "drugSize": MAX_KNOWN_DRUG_ROWS,
            }),
        };

        let data: DiseaseMolecularPayload = self.graphql("DiseaseMolecularData", &body).await?;
        let Some(disease) = data.disease else {
            return Err(PathoNetError::NotFound {
                entity: "disease".into(),
                id: disease_id.to_string(),
                suggestion: "OpenTargets has no disease record for this id.".into(),
            });
        };

        let mut targets = Vec::new();
        if let Some(associated) = disease.associated_targets {
            for row in associated.rows.into_iter().take(MAX_ASSOCIATED_TARGETS) {
                let Some(target) = row.target else { continue };
                let Some(symbol) = target
                    .approved_symbol
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                else {
                    continue;
                };
                let Some(score) = row.score.filter(|s| s.is_finite()) else {
                    warn!(
                        source = OPENTARGETS_API,
                        symbol = symbol.as_str(),
                        "Associated target without a usable score; skipping"
                    );
                    continue;
                };
                targets.push(OpenTargetsTargetRow {
                    symbol,
                    name: target
                        .approved_name
                        .map(|v| v.trim().to_string())
                        .unwrap_or_default(),
                    score,
                });
            }
        } else {
            warn_missing_field("DiseaseMolecularData", "data.disease.associatedTargets");
        }

        let mut drugs = Vec::new();
        if let Some(known) = disease.known_drugs {
            for row in known.rows.into_iter().take(MAX_KNOWN_DRUG_ROWS) {
                let Some(drug) = row.drug else { continue };
                let Some(drug_name) = drug
                    .name
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                else {
                    continue;
                };
                drugs.push(OpenTargetsDrugRow {
                    drug_name,
                    max_phase: drug.maximum_clinical_trial_phase,
                    target_symbol: row
                        .target
                        .and_then(|t| t.approved_symbol)
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty()),
                });
            }
        } else {
            warn_missing_field("DiseaseMolecularData", "data.disease.knownDrugs");
        }

        Ok(OpenTargetsMolecularData { targets, drugs })
    }
}

fn warn_missing_field(operation: &str, field: &str) {
    warn!(
        source = OPENTARGETS_API,
        operation = operation,
        field = field,
        "Missing expected GraphQL field; degrading response"
    );
}

#[derive(Debug, Clone)]
pub struct OpenTargetsDiseaseHit {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct OpenTargetsMolecularData {
    pub targets: Vec<OpenTargetsTargetRow>,
    pub drugs: Vec<OpenTargetsDrugRow>,
}

#[derive(Debug, Clone)]
pub struct OpenTargetsTargetRow {
    pub symbol: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct OpenTargetsDrugRow {
    pub drug_name: String,
    pub max_phase: Option<f64>,
    pub target_symbol: Option<String>,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: Option<String>,
    name: Option<String>,
    entity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiseaseMolecularPayload {
    disease: Option<DiseaseNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiseaseNode {
    associated_targets: Option<AssociatedTargets>,
    known_drugs: Option<KnownDrugs>,
}

#[derive(Debug, Deserialize)]
struct AssociatedTargets {
    #[serde(default)]
    rows: Vec<AssociatedTargetRow>,
}

#[derive(Debug, Deserialize)]
struct AssociatedTargetRow {
    score: Option<f64>,
    target: Option<TargetNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetNode {
    approved_symbol: Option<String>,
    approved_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KnownDrugs {
    #[serde(default)]
    rows: Vec<KnownDrugRow>,
}

#[derive(Debug, Deserialize)]
struct KnownDrugRow {
    drug: Option<DrugNode>,
    target: Option<TargetNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DrugNode {
    name: Option<String>,
    maximum_clinical_trial_phase: Option<f64>,
}
