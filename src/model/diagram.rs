//! # Textual wiring diagram.
//!
//! Renders the registered vertices and edges as a mermaid flowchart. Emitted
//! once at startup so the live graph can be eyeballed against the intended
//! design; solder kinds use distinct arrows (`-->` default, `-.->` inject,
//! `==>` offer).

use crate::model::graph::{VertexKind, WiringGraph};
use crate::wires::SolderKind;

fn vertex_label(kind: VertexKind) -> &'static str {
    match kind {
        VertexKind::Scheduler(kind) => kind.as_label(),
        VertexKind::Heartbeat => "heartbeat",
        VertexKind::Source => "source",
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

pub(crate) fn render(graph: &WiringGraph) -> String {
    let mut out = String::from("flowchart LR\n");

    let mut vertices: Vec<(String, VertexKind, Option<String>)> = graph
        .vertices
        .iter()
        .map(|entry| (entry.key().clone(), entry.kind, entry.hyperlink.clone()))
        .collect();
    vertices.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, kind, hyperlink) in &vertices {
        let id = sanitize(name);
        out.push_str(&format!("    {id}[\"{name} ({})\"]\n", vertex_label(*kind)));
        if let Some(link) = hyperlink {
            out.push_str(&format!("    click {id} \"{link}\"\n"));
        }
    }

    for edge in graph.edges.lock().iter() {
        let arrow = match edge.kind {
            SolderKind::Default => "-->",
            SolderKind::Inject => "-.->",
            SolderKind::Offer => "==>",
        };
        out.push_str(&format!(
            "    {} {arrow}|{}| {}\n",
            sanitize(&edge.source),
            edge.label,
            sanitize(&edge.target),
        ));
    }

    out
}
