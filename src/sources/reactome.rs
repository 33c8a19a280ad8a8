use std::borrow::Cow;

use serde::Deserialize;

use crate::error::PathoNetError;
use crate::sources::SourcesConfig;
use crate::sources::config::endpoint;
use crate::utils::serde::StringOrVec;

const REACTOME_API: &str = "reactome";

/// Maximum pathway rows fetched per analysis.
pub(crate) const MAX_PATHWAY_ROWS: usize = 10;

/// Client for the Reactome AnalysisService over-representation endpoints.
pub struct ReactomeClient {
    client: reqwest_middleware::ClientWithMiddleware,
    base: Cow<'static, str>,
}

impl ReactomeClient {
    pub fn new(config: &SourcesConfig) -> Result<Self, PathoNetError> {
        Ok(Self {
            client: crate::sources::http_client(config)?,
            base: config.reactome_base.clone(),
        })
    }

    /// Submits gene identifiers for projection to human and returns the analysis token.
    pub async fn submit_identifiers(&self, symbols: &[String]) -> Result<String, PathoNetError> {
        let payload = symbols
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if payload.is_empty() {
            return Err(PathoNetError::InvalidArgument(
                "Reactome analysis requires at least one identifier".into(),
            ));
        }

        let url = endpoint(&self.base, "identifiers/projection");
        let req = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(payload);
        let resp: AnalysisSubmission = crate::sources::send_json(REACTOME_API, req).await?;

        resp.summary
            .and_then(|s| s.token)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PathoNetError::MissingField {
                api: REACTOME_API.to_string(),
                field: "summary.token".into(),
            })
    }

    /// Fetches the top pathway rows of a finished analysis, at most [`MAX_PATHWAY_ROWS`].
    pub async fn analysis_pathways(
        &self,
        token: &str,
    ) -> Result<Vec<ReactomeEnrichedPathway>, PathoNetError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(PathoNetError::InvalidArgument(
                "Reactome analysis token is required".into(),
            ));
        }

        let url = endpoint(&self.base, &format!("token/{token}"));
        let page_size = MAX_PATHWAY_ROWS.to_string();
        let resp: AnalysisResult = crate::sources::send_json(
            REACTOME_API,
            self.client
                .get(&url)
                .query(&[("pageSize", page_size.as_str()), ("page", "1")]),
        )
        .await?;

        let mut out = Vec::new();
        for row in resp.pathways.into_iter().take(MAX_PATHWAY_ROWS) {
            let Some(name) = row
                .name
                .first()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
            else {
                continue;
            };
            let entities = row.entities.unwrap_or_default();
            out.push(ReactomeEnrichedPathway {
                id: row
                    .st_id
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty()),
                name,
                p_value: entities.p_value,
                fdr: entities.fdr,
            });
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct ReactomeEnrichedPathway {
    pub id: Option<String>,
    pub name: String,
    pub p_value: Option<f64>,
    pub fdr: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AnalysisSubmission {
    summary: Option<AnalysisSummary>,
}

#[derive(Debug, Deserialize)]
struct AnalysisSummary {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalysisResult {
    #[serde(default)]
    pathways: Vec<AnalysisPathwayRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisPathwayRow {
    st_id: Option<String>,
    #[serde(default)]
    name: StringOrVec,
    entities: Option<AnalysisEntities>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisEntities {
    p_value: Option<f64>,
    fdr: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ReactomeClient {
        ReactomeClient::new(&SourcesConfig::with_base(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn submit_identifiers_posts_newline_delimited_symbols() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identifiers/projection"))
            .and(header("content-type", "text/plain"))
            .and(body_string("APOL1\nUMOD\nPKD1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "summary": {"token": "MjAyNjEwMTkxMjAwMDBfMQ%3D%3D", "type": "OVERREPRESENTATION"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let symbols = vec!["APOL1".to_string(), " UMOD ".to_string(), "PKD1".to_string()];
        let token = client_for(&server).submit_identifiers(&symbols).await.unwrap();
        assert_eq!(token, "MjAyNjEwMTkxMjAwMDBfMQ%3D%3D");
    }

    #[tokio::test]
    async fn submit_identifiers_requires_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identifiers/projection"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "summary": {}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .submit_identifiers(&["APOL1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, PathoNetError::MissingField { .. }));
    }

    #[tokio::test]
    async fn submit_identifiers_rejects_empty_payload() {
        let client = ReactomeClient::new(&SourcesConfig::with_base("http://127.0.0.1:9")).unwrap();
        let err = client
            .submit_identifiers(&[" ".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, PathoNetError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn analysis_pathways_normalizes_names_and_caps_rows() {
        let server = MockServer::start().await;
        let mut rows = vec![
            serde_json::json!({
                "stId": "R-HSA-381426",
                "name": ["Regulation of IGF transport", "alias"],
                "entities": {"pValue": 0.01, "fdr": 0.2}
            }),
            serde_json::json!({
                "stId": "R-HSA-1474244",
                "name": "Extracellular matrix organization",
                "entities": {"pValue": 1.2e-5}
            }),
            serde_json::json!({"stId": "R-HSA-0", "name": [], "entities": {"pValue": 0.5}}),
        ];
        for i in 0..12 {
            rows.push(serde_json::json!({
                "stId": format!("R-HSA-{i}"),
                "name": format!("Pathway {i}"),
                "entities": {"pValue": 0.3}
            }));
        }

        Mock::given(method("GET"))
            .and(path("/token/abc123"))
            .and(query_param("pageSize", "10"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"pathways": rows})),
            )
            .mount(&server)
            .await;

        let out = client_for(&server).analysis_pathways("abc123").await.unwrap();
        assert_eq!(out.len(), 9);
        assert_eq!(out[0].name, "Regulation of IGF transport");
        assert_eq!(out[0].id.as_deref(), Some("R-HSA-381426"));
        assert_eq!(out[0].p_value, Some(0.01));
        assert_eq!(out[0].fdr, Some(0.2));
        assert_eq!(out[1].name, "Extracellular matrix organization");
        assert_eq!(out[1].fdr, None);
    }
}
