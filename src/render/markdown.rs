use std::sync::OnceLock;

use minijinja::{Environment, context};
use serde::Serialize;

use crate::entities::dashboard::{Dashboard, StageReport};
use crate::entities::disease::DiseaseResolution;
use crate::error::PathoNetError;

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Significance above which a pathway counts as enriched (p < 0.05).
pub const SIGNIFICANCE_CUTOFF: f64 = 1.30;
const HUB_ROWS: usize = 10;
const BAR_WIDTH: usize = 24;

pub(crate) fn env() -> Result<&'static Environment<'static>, PathoNetError> {
    if let Some(env) = ENV.get() {
        return Ok(env);
    }

    let mut env = Environment::new();
    env.add_filter("truncate", |s: String, max_bytes: usize| -> String {
        if s.len() <= max_bytes {
            return s;
        }
        if max_bytes == 0 {
            return "…".to_string();
        }
        let mut boundary = max_bytes;
        while boundary > 0 && !s.is_char_boundary(boundary) {
            boundary -= 1;
        }
        let mut out = s[..boundary].trim_end().to_string();
        out.push('…');
        out
    });
    env.add_filter("cell", |s: String| -> String { table_cell(&s) });
    env.add_filter("score", |v: f64| -> String { format!("{v:.3}") });
    env.add_filter("sig", |v: f64| -> String { format!("{v:.2}") });
    env.add_template(
        "dashboard.md.j2",
        include_str!("../../templates/dashboard.md.j2"),
    )?;
    env.add_template(
        "disease_search.md.j2",
        include_str!("../../templates/disease_search.md.j2"),
    )?;
    env.add_template(
        "network.html.j2",
        include_str!("../../templates/network.html.j2"),
    )?;

    Ok(ENV.get_or_init(|| env))
}

pub(crate) fn quote_arg(value: &str) -> String {
    let v = value.trim();
    if v.is_empty() {
        return String::new();
    }
    if v.chars().any(|c| c.is_whitespace()) {
        return format!("\"{}\"", v.replace('\"', "\\\""));
    }
    v.to_string()
}

/// Makes `value` safe inside a Markdown table cell.
fn table_cell(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

fn has_all_section(requested: &[String]) -> bool {
    requested
        .iter()
        .any(|s| s.trim().eq_ignore_ascii_case("all"))
}

fn is_section_only_requested(requested: &[String]) -> bool {
    !has_all_section(requested) && requested.iter().any(|s| !s.trim().is_empty())
}

/// Provenance line closing every report.
pub(crate) fn provenance_footer() -> String {
    let generated = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    format!(
        "Open Targets v24.09 | Reactome v89 | STRING-DB v12.0 | ChEMBL v34 | Generated {generated}\n\
         Research use only; not clinical advice."
    )
}

#[derive(Serialize)]
struct PathwayRow<'a> {
    name: &'a str,
    url: Option<String>,
    significance: f64,
    significant: bool,
    bar: String,
}

fn pathway_rows(dashboard: &Dashboard) -> Vec<PathwayRow<'_>> {
    let max = dashboard
        .pathways
        .iter()
        .map(|p| p.significance)
        .fold(0.0_f64, f64::max);
    dashboard
        .pathways
        .iter()
        .map(|p| {
            let filled = if max > 0.0 {
                ((p.significance / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            PathwayRow {
                name: &p.name,
                url: p.url(),
                significance: p.significance,
                significant: p.significance > SIGNIFICANCE_CUTOFF,
                bar: format!(
                    "{}{}",
                    "█".repeat(filled),
                    " ".repeat(BAR_WIDTH.saturating_sub(filled))
                ),
            }
        })
        .collect()
}

#[derive(Serialize)]
struct DiagnosticRow<'a> {
    stage: String,
    source: &'static str,
    status: &'static str,
    kind: Option<String>,
    message: &'a str,
}

fn diagnostic_rows(reports: &[StageReport]) -> Vec<DiagnosticRow<'_>> {
    use crate::entities::dashboard::StageStatus;

    reports
        .iter()
        .map(|r| DiagnosticRow {
            stage: r.stage.to_string(),
            source: r.stage.source(),
            status: match r.status {
                StageStatus::Ok => "ok",
                StageStatus::Empty => "empty",
                StageStatus::Failed => "failed",
            },
            kind: match r.status {
                StageStatus::Failed => r.kind.map(|k| k.to_string()),
                _ => None,
            },
            message: r.message.as_deref().unwrap_or("-"),
        })
        .collect()
}

/// Options for [`dashboard_markdown`].
#[derive(Debug, Clone, Default)]
pub struct DashboardView<'a> {
    pub sections: &'a [String],
    pub show_diagnostics: bool,
    /// Path of a written network page, mentioned in the network section.
    pub network_html: Option<&'a str>,
}

/// Renders the four dashboard views.
///
/// `sections` limits output to the named views (`genes`, `pathways`,
/// `network`, `drugs`); empty or `all` renders every view.
pub fn dashboard_markdown(dashboard: &Dashboard, view: &DashboardView<'_>) -> Result<String, PathoNetError> {
    let tmpl = env()?.get_template("dashboard.md.j2")?;
    let section_only = is_section_only_requested(view.sections);
    let has_requested = |name: &str| {
        view.sections
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(name))
    };
    let show = |name: &str| !section_only || has_requested(name);

    let diagnostics = if view.show_diagnostics {
        diagnostic_rows(&dashboard.diagnostics)
    } else {
        Vec::new()
    };

    let body = tmpl.render(context! {
        query => &dashboard.query,
        min_score => dashboard.min_score,
        disease => dashboard.disease.as_ref().map(|d| &d.selected),
        total_genes => dashboard.total_genes,
        genes => &dashboard.genes,
        pathways => pathway_rows(dashboard),
        node_count => dashboard.network.nodes.len(),
        edge_count => dashboard.network.edges.len(),
        hubs => dashboard.network.hubs(HUB_ROWS),
        network_html => view.network_html,
        drugs => &dashboard.drugs,
        diagnostics => diagnostics,
        show_genes => show("genes"),
        show_pathways => show("pathways"),
        show_network => show("network"),
        show_drugs => show("drugs"),
        footer => provenance_footer(),
    })?;
    Ok(body)
}

pub fn disease_search_markdown(query: &str, resolution: Option<&DiseaseResolution>) -> Result<String, PathoNetError> {
    let tmpl = env()?.get_template("disease_search.md.j2")?;
    let query = query.trim();
    let body = tmpl.render(context! {
        query => query,
        query_arg => quote_arg(query),
        count => resolution.map_or(0, |r| r.hits.len()),
        hits => resolution.map(|r| &r.hits),
        selected => resolution.map(|r| &r.selected),
    })?;
    Ok(body)
}
