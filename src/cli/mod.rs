use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::entities::dashboard;
use crate::entities::disease;
use crate::entities::gene::DEFAULT_MIN_SCORE;
use crate::error::PathoNetError;
use crate::render;
use crate::sources::SourcesConfig;

pub mod health;

#[derive(Parser, Debug)]
#[command(
    name = "pathonet",
    version,
    about = "Disease genomics navigator: targets, pathways, interaction network and drugs for a phenotype"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Genes,
    Pathways,
    Network,
    Drugs,
    All,
}

impl Section {
    fn as_str(self) -> &'static str {
        match self {
            Self::Genes => "genes",
            Self::Pathways => "pathways",
            Self::Network => "network",
            Self::Drugs => "drugs",
            Self::All => "all",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the dashboard for a disease or phenotype
    Explore {
        /// Free-text disease query, e.g. "Chronic Kidney Disease"
        query: String,

        /// Minimum association score for a gene to enter the working set (0.0-1.0)
        #[arg(long, default_value_t = DEFAULT_MIN_SCORE)]
        min_score: f64,

        /// Limit output to these views (repeatable)
        #[arg(long = "section", value_enum)]
        sections: Vec<Section>,

        /// Emit JSON instead of Markdown
        #[arg(long)]
        json: bool,

        /// Also write the interaction network as a standalone HTML page
        #[arg(long, value_name = "PATH")]
        network_html: Option<PathBuf>,

        /// Include per-stage status in the report
        #[arg(long)]
        diagnostics: bool,
    },

    /// List disease matches for a query, marking the one `explore` would use
    Resolve {
        query: String,

        /// Emit JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },

    /// Check connectivity to Open Targets, Reactome and STRING
    Health {
        /// Emit JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },
}

fn validate_min_score(min_score: f64) -> Result<f64, PathoNetError> {
    if !min_score.is_finite() || !(0.0..=1.0).contains(&min_score) {
        return Err(PathoNetError::InvalidArgument(format!(
            "--min-score must be between 0.0 and 1.0, got {min_score}"
        )));
    }
    Ok(min_score)
}

/// What a command printed and whether it should exit successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutput {
    pub text: String,
    pub success: bool,
}

impl From<String> for CliOutput {
    fn from(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<CliOutput> {
    execute(cli, &SourcesConfig::from_env()).await
}

/// Runs `cli` against the given upstreams.
pub async fn execute(cli: Cli, config: &SourcesConfig) -> anyhow::Result<CliOutput> {
    match cli.command {
        Commands::Explore {
            query,
            min_score,
            sections,
            json,
            network_html,
            diagnostics,
        } => {
            let min_score = validate_min_score(min_score)?;
            let dashboard = dashboard::explore(config, &query, min_score).await;

            let html_path = match network_html {
                Some(path) => {
                    let title = dashboard
                        .disease
                        .as_ref()
                        .map_or(dashboard.query.as_str(), |d| d.selected.name.as_str());
                    let page = render::html::network_html(title, &dashboard.network)?;
                    tokio::fs::write(&path, page)
                        .await
                        .map_err(PathoNetError::from)?;
                    info!(path = %path.display(), "Wrote network page");
                    Some(path.display().to_string())
                }
                None => None,
            };

            if json {
                return Ok(render::json::to_pretty(&dashboard)?.into());
            }
            let sections = sections
                .into_iter()
                .map(|s| s.as_str().to_string())
                .collect::<Vec<_>>();
            let view = render::markdown::DashboardView {
                sections: &sections,
                show_diagnostics: diagnostics,
                network_html: html_path.as_deref(),
            };
            Ok(render::markdown::dashboard_markdown(&dashboard, &view)?.into())
        }
        Commands::Resolve { query, json } => {
            let outcome = disease::resolve(config, &query).await;
            if json {
                let body = match outcome.data() {
                    Some(resolution) => render::json::to_pretty(resolution)?,
                    None => render::json::to_pretty(&serde_json::json!({
                        "query": query.trim(),
                        "hits": [],
                    }))?,
                };
                return Ok(body.into());
            }
            Ok(render::markdown::disease_search_markdown(&query, outcome.data())?.into())
        }
        Commands::Health { json } => {
            let report = health::check(config).await?;
            let text = if json {
                render::json::to_pretty(&report)?
            } else {
                report.to_markdown()
            };
            Ok(CliOutput {
                text,
                success: report.all_healthy(),
            })
        }
    }
}
