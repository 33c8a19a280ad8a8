use minijinja::context;
use serde::Serialize;

use crate::entities::network::InteractionNetwork;
use crate::error::PathoNetError;
use crate::render::layout::{self, Canvas};
use crate::render::markdown::{env, provenance_footer};
use crate::sources::config::HUMAN_TAXON;

#[derive(Serialize)]
struct NodeView<'a> {
    name: &'a str,
    degree: usize,
    x: String,
    y: String,
    label_x: String,
    radius: String,
}

#[derive(Serialize)]
struct EdgeView {
    x1: String,
    y1: String,
    x2: String,
    y2: String,
}

fn px(v: f64) -> String {
    format!("{v:.1}")
}

/// Standalone HTML page drawing `network` with a force-directed layout.
pub fn network_html(title: &str, network: &InteractionNetwork) -> Result<String, PathoNetError> {
    let canvas = Canvas::default();
    let edges = network.edge_indices();
    let positions = layout::force_layout(network.nodes.len(), &edges, canvas);

    let mut degree = vec![0_usize; network.nodes.len()];
    for &(a, b) in &edges {
        degree[a] += 1;
        degree[b] += 1;
    }

    let nodes = network
        .nodes
        .iter()
        .zip(&positions)
        .zip(&degree)
        .map(|((name, p), &deg)| {
            let radius = 6.0 + (deg as f64).sqrt() * 2.5;
            NodeView {
                name,
                degree: deg,
                x: px(p.x),
                y: px(p.y),
                label_x: px(p.x + radius + 3.0),
                radius: px(radius),
            }
        })
        .collect::<Vec<_>>();
    let edge_views = edges
        .iter()
        .map(|&(a, b)| EdgeView {
            x1: px(positions[a].x),
            y1: px(positions[a].y),
            x2: px(positions[b].x),
            y2: px(positions[b].y),
        })
        .collect::<Vec<_>>();

    let tmpl = env()?.get_template("network.html.j2")?;
    Ok(tmpl.render(context! {
        title => title,
        species => HUMAN_TAXON,
        width => canvas.width,
        height => canvas.height,
        node_count => network.nodes.len(),
        edge_count => network.edges.len(),
        nodes => nodes,
        edges => edge_views,
        footer => provenance_footer(),
    })?)
}
