//! # The model's vertex/edge registry and its validation rules.
//!
//! Every scheduler, operator, heartbeat, and standalone output wire registers
//! a vertex; every solder records an edge. The registry backs three things:
//! build validation (duplicate names, unbound components, illegal cycles),
//! the textual wiring diagram, and nothing else; the hot path never touches
//! it.
//!
//! ## Cycle rule
//! A cycle can deadlock only if every hop on it both blocks and queues: a
//! Default solder into a SEQUENTIAL or CONCURRENT scheduler. INJECT edges
//! force their way past capacity, OFFER edges drop instead of blocking, and
//! DIRECT-family vertices hold no queue. Validation therefore searches for a
//! cycle in the subgraph of Default edges between backpressured vertices and
//! rejects the model if one exists.

use std::collections::HashMap;

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::BuildError;
use crate::schedulers::SchedulerKind;
use crate::wires::SolderKind;

/// What a vertex in the wiring graph is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VertexKind {
    /// A task scheduler of the given kind.
    Scheduler(SchedulerKind),
    /// A heartbeat tick source.
    Heartbeat,
    /// A standalone output wire fed by the embedder.
    Source,
}

impl VertexKind {
    /// Whether tasks queue behind this vertex and block submitters when full.
    fn is_backpressured(self) -> bool {
        matches!(
            self,
            VertexKind::Scheduler(SchedulerKind::Sequential)
                | VertexKind::Scheduler(SchedulerKind::Concurrent)
        )
    }
}

pub(crate) struct VertexInfo {
    pub(crate) kind: VertexKind,
    pub(crate) hyperlink: Option<String>,
    /// Set for component schedulers, which must be bound before start.
    pub(crate) component: AtomicBool,
    pub(crate) bound: AtomicBool,
}

#[derive(Clone)]
pub(crate) struct EdgeInfo {
    pub(crate) source: String,
    pub(crate) target: String,
    pub(crate) label: String,
    pub(crate) kind: SolderKind,
}

/// Registry of everything the model knows about its graph.
pub(crate) struct WiringGraph {
    pub(crate) vertices: DashMap<String, VertexInfo>,
    pub(crate) edges: Mutex<Vec<EdgeInfo>>,
    defects: Mutex<Vec<BuildError>>,
}

impl WiringGraph {
    pub(crate) fn new() -> Self {
        Self {
            vertices: DashMap::new(),
            edges: Mutex::new(Vec::new()),
            defects: Mutex::new(Vec::new()),
        }
    }

    /// Registers a vertex, recording a duplicate-name defect on collision.
    pub(crate) fn register_vertex(
        &self,
        name: &str,
        kind: VertexKind,
        hyperlink: Option<String>,
    ) {
        let info = VertexInfo {
            kind,
            hyperlink,
            component: AtomicBool::new(false),
            bound: AtomicBool::new(false),
        };
        if self.vertices.insert(name.to_string(), info).is_some() {
            self.defects.lock().push(BuildError::DuplicateScheduler {
                name: name.to_string(),
            });
        }
    }

    /// Records a defect surfaced later by `validate`.
    pub(crate) fn record_defect(&self, defect: BuildError) {
        self.defects.lock().push(defect);
    }

    pub(crate) fn record_edge(&self, source: &str, target: &str, label: &str, kind: SolderKind) {
        self.edges.lock().push(EdgeInfo {
            source: source.to_string(),
            target: target.to_string(),
            label: label.to_string(),
            kind,
        });
    }

    /// Marks a vertex as a component scheduler that requires binding.
    pub(crate) fn mark_component(&self, name: &str) {
        if let Some(v) = self.vertices.get(name) {
            v.component.store(true, Ordering::Release);
        }
    }

    /// Marks a component vertex as bound to an instance.
    pub(crate) fn mark_bound(&self, name: &str) {
        if let Some(v) = self.vertices.get(name) {
            v.bound.store(true, Ordering::Release);
        }
    }

    /// Returns the first defect found, in priority order: recorded defects,
    /// unbound components, then illegal cycles.
    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if let Some(defect) = self.defects.lock().drain(..).next() {
            return Err(defect);
        }
        for entry in self.vertices.iter() {
            if entry.component.load(Ordering::Acquire) && !entry.bound.load(Ordering::Acquire) {
                return Err(BuildError::UnboundComponent {
                    name: entry.key().clone(),
                });
            }
        }
        if let Some(cycle) = self.find_backpressure_cycle() {
            return Err(BuildError::CyclicBackpressure { cycle });
        }
        Ok(())
    }

    /// Searches for a cycle made entirely of Default edges between
    /// backpressured vertices. Returns the cycle path if found.
    fn find_backpressure_cycle(&self) -> Option<Vec<String>> {
        let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
        for edge in self.edges.lock().iter() {
            if edge.kind != SolderKind::Default {
                continue;
            }
            let blocking = |name: &str| {
                self.vertices
                    .get(name)
                    .map(|v| v.kind.is_backpressured())
                    .unwrap_or(false)
            };
            if blocking(&edge.source) && blocking(&edge.target) {
                adjacency
                    .entry(edge.source.clone())
                    .or_default()
                    .push(edge.target.clone());
            }
        }

        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut colors: HashMap<&str, Color> = adjacency
            .keys()
            .map(|k| (k.as_str(), Color::White))
            .collect();
        for targets in adjacency.values() {
            for t in targets {
                colors.entry(t.as_str()).or_insert(Color::White);
            }
        }

        fn visit<'a>(
            node: &'a str,
            adjacency: &'a HashMap<String, Vec<String>>,
            colors: &mut HashMap<&'a str, Color>,
            stack: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            colors.insert(node, Color::Gray);
            stack.push(node);
            if let Some(targets) = adjacency.get(node) {
                for target in targets {
                    let target = target.as_str();
                    match colors.get(target).copied().unwrap_or(Color::White) {
                        Color::Gray => {
                            let start = stack.iter().position(|n| *n == target).unwrap_or(0);
                            let mut cycle: Vec<String> =
                                stack[start..].iter().map(|s| s.to_string()).collect();
                            cycle.push(target.to_string());
                            return Some(cycle);
                        }
                        Color::White => {
                            if let Some(cycle) = visit(target, adjacency, colors, stack) {
                                return Some(cycle);
                            }
                        }
                        Color::Black => {}
                    }
                }
            }
            stack.pop();
            colors.insert(node, Color::Black);
            None
        }

        let nodes: Vec<&str> = colors.keys().copied().collect();
        for node in nodes {
            if colors.get(node) == Some(&Color::White) {
                let mut stack = Vec::new();
                if let Some(cycle) = visit(node, &adjacency, &mut colors, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(graph: &WiringGraph, name: &str) {
        graph.register_vertex(name, VertexKind::Scheduler(SchedulerKind::Sequential), None);
    }

    #[test]
    fn default_edge_cycle_is_rejected() {
        let graph = WiringGraph::new();
        sequential(&graph, "a");
        sequential(&graph, "b");
        graph.record_edge("a", "b", "x", SolderKind::Default);
        graph.record_edge("b", "a", "y", SolderKind::Default);
        assert!(matches!(
            graph.validate(),
            Err(BuildError::CyclicBackpressure { .. })
        ));
    }

    #[test]
    fn inject_edge_breaks_the_cycle() {
        let graph = WiringGraph::new();
        sequential(&graph, "a");
        sequential(&graph, "b");
        graph.record_edge("a", "b", "x", SolderKind::Default);
        graph.record_edge("b", "a", "y", SolderKind::Inject);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn direct_vertex_breaks_the_cycle() {
        let graph = WiringGraph::new();
        sequential(&graph, "a");
        graph.register_vertex("d", VertexKind::Scheduler(SchedulerKind::Direct), None);
        graph.record_edge("a", "d", "x", SolderKind::Default);
        graph.record_edge("d", "a", "y", SolderKind::Default);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn duplicate_vertex_is_a_defect() {
        let graph = WiringGraph::new();
        sequential(&graph, "a");
        sequential(&graph, "a");
        assert!(matches!(
            graph.validate(),
            Err(BuildError::DuplicateScheduler { .. })
        ));
    }

    #[test]
    fn unbound_component_is_a_defect() {
        let graph = WiringGraph::new();
        sequential(&graph, "a");
        graph.mark_component("a");
        assert!(matches!(
            graph.validate(),
            Err(BuildError::UnboundComponent { .. })
        ));
        graph.mark_bound("a");
        assert!(graph.validate().is_ok());
    }
}
