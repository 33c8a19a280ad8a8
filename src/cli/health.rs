use std::time::{Duration, Instant};

use crate::error::PathoNetError;
use crate::sources::SourcesConfig;
use crate::sources::config::endpoint;

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthRow {
    pub api: String,
    pub status: String,
    pub latency: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub healthy: usize,
    pub total: usize,
    pub rows: Vec<HealthRow>,
}

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        self.healthy == self.total
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# PathoNet Health Check\n\n");
        out.push_str("| API | Status | Latency |\n");
        out.push_str("|-----|--------|---------|\n");
        for row in &self.rows {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                row.api, row.status, row.latency
            ));
        }
        out.push_str(&format!(
            "\nStatus: {}/{} APIs healthy\n",
            self.healthy, self.total
        ));
        out
    }
}

async fn check_one(api: &str, req: reqwest::RequestBuilder) -> HealthRow {
    let start = Instant::now();
    match req.send().await {
        Ok(resp) => {
            let status = resp.status();
            let elapsed = start.elapsed().as_millis();
            if status.is_success() {
                HealthRow {
                    api: api.to_string(),
                    status: "ok".into(),
                    latency: format!("{elapsed}ms"),
                }
            } else {
                HealthRow {
                    api: api.to_string(),
                    status: "error".into(),
                    latency: format!("{elapsed}ms (HTTP {})", status.as_u16()),
                }
            }
        }
        Err(err) => {
            let reason = if err.is_timeout() {
                "timeout"
            } else if err.is_connect() {
                "connect"
            } else {
                "error"
            };
            HealthRow {
                api: api.to_string(),
                status: "error".into(),
                latency: reason.into(),
            }
        }
    }
}

fn health_http_client(config: &SourcesConfig) -> Result<reqwest::Client, PathoNetError> {
    reqwest::Client::builder()
        // Health checks never retry and never wait longer than a pipeline request would.
        .timeout(config.http_timeout.min(Duration::from_secs(10)))
        .connect_timeout(config.connect_timeout.min(Duration::from_secs(5)))
        .user_agent(concat!("pathonet/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(PathoNetError::HttpClientInit)
}

/// Checks the three upstream services concurrently.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be created.
pub async fn check(config: &SourcesConfig) -> Result<HealthReport, PathoNetError> {
    let client = health_http_client(config)?;

    let (opentargets, reactome, string) = tokio::join!(
        check_one(
            "Open Targets",
            client
                .get(endpoint(&config.opentargets_base, "graphql"))
                .query(&[("query", "{meta{name}}")])
        ),
        check_one(
            "Reactome",
            client.get(endpoint(&config.reactome_base, "database/version"))
        ),
        check_one(
            "STRING",
            client.get(endpoint(&config.string_base, "json/version"))
        ),
    );

    let rows = vec![opentargets, reactome, string];
    let healthy = rows.iter().filter(|r| r.status == "ok").count();
    Ok(HealthReport {
        healthy,
        total: rows.len(),
        rows,
    })
}
