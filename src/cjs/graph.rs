//! The dependency-graph sink CJS rewriting reports into (spec.md §6's
//! "dependency graph builder" consumer interface), mirroring the teacher's
//! `CodeGraph`/`GraphNode`/`EdgeKind` shape but narrowed to what a
//! provide/require relationship needs: one node per namespaced module, one
//! edge per `goog.require`.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Directed;

/// Metadata recorded for a single rewritten CJS module (spec.md §4.3's
/// script-entry trigger fires this once per file).
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    /// The namespaced module identifier (spec.md §4.5), e.g. `module$a$b`.
    pub module_id: String,
    /// The source file path this module was rewritten from.
    pub source_path: String,
}

/// What the CJS rewriter reports into as it rewrites a script (spec.md §6).
/// Kept as a trait so a caller that doesn't care about dependency tracking
/// can pass a no-op sink instead of building a `DependencyGraph`.
pub trait DependencySink {
    /// Record that `module_id` is provided by the file currently being rewritten.
    fn provide(&mut self, module_id: &str);
    /// Record that the module currently being rewritten requires `module_id`.
    fn require(&mut self, from: &str, module_id: &str);
    /// Record the full metadata for a rewritten module.
    fn record_module(&mut self, record: ModuleRecord);
}

/// A no-op sink for callers that only want the rewrite, not the graph.
#[derive(Debug, Default)]
pub struct NullSink;

impl DependencySink for NullSink {
    fn provide(&mut self, _module_id: &str) {}
    fn require(&mut self, _from: &str, _module_id: &str) {}
    fn record_module(&mut self, _record: ModuleRecord) {}
}

/// A single file's provide/require facts, collected independently of any
/// shared graph so a parallel per-file worker can own one without
/// synchronization (spec.md §5: the dependency graph sink is the only
/// cross-script shared resource, and it is built by folding per-script
/// results after the parallel map rather than by concurrent mutation).
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub requires: Vec<(String, String)>,
    pub provided: Vec<String>,
    pub module: Option<ModuleRecord>,
}

impl DependencySink for RecordingSink {
    fn provide(&mut self, module_id: &str) {
        self.provided.push(module_id.to_string());
    }

    fn require(&mut self, from: &str, module_id: &str) {
        self.requires.push((from.to_string(), module_id.to_string()));
    }

    fn record_module(&mut self, record: ModuleRecord) {
        self.module = Some(record);
    }
}

impl RecordingSink {
    /// Replay this file's recorded facts into a shared graph. Call
    /// sequentially after the parallel map that produced each `RecordingSink`.
    pub fn fold_into(self, graph: &mut DependencyGraph) {
        for (from, to) in self.requires {
            graph.require(&from, &to);
        }
        for module_id in self.provided {
            graph.provide(&module_id);
        }
        if let Some(record) = self.module {
            graph.record_module(record);
        }
    }
}

#[derive(Debug, Clone)]
enum GraphNode {
    /// A module whose providing file has been rewritten and recorded.
    Module(ModuleRecord),
    /// A module referenced by a `goog.require` whose own file hasn't been
    /// rewritten (or seen) yet — a placeholder, upgraded to `Module` if its
    /// provide arrives later.
    Placeholder(String),
}

impl GraphNode {
    fn module_id(&self) -> &str {
        match self {
            GraphNode::Module(record) => &record.module_id,
            GraphNode::Placeholder(id) => id,
        }
    }
}

/// The in-memory provide/require graph: one node per module identifier, one
/// directed edge per `goog.require` relationship, pointing from the
/// requiring module to the required one.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: StableGraph<GraphNode, (), Directed>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node_for(&mut self, module_id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(module_id) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode::Placeholder(module_id.to_string()));
        self.index.insert(module_id.to_string(), idx);
        idx
    }

    /// Number of distinct module identifiers referenced (provided or required).
    pub fn module_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The modules `module_id` requires, if it's been seen.
    pub fn requires_of(&self, module_id: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(module_id) else {
            return Vec::new();
        };
        self.graph
            .neighbors(idx)
            .map(|n| self.graph[n].module_id())
            .collect()
    }
}

impl DependencySink for DependencyGraph {
    fn provide(&mut self, module_id: &str) {
        let idx = self.node_for(module_id);
        if matches!(self.graph[idx], GraphNode::Placeholder(_)) {
            self.graph[idx] = GraphNode::Module(ModuleRecord {
                module_id: module_id.to_string(),
                source_path: String::new(),
            });
        }
    }

    fn require(&mut self, from: &str, module_id: &str) {
        let from_idx = self.node_for(from);
        let to_idx = self.node_for(module_id);
        self.graph.add_edge(from_idx, to_idx, ());
    }

    fn record_module(&mut self, record: ModuleRecord) {
        let idx = self.node_for(&record.module_id);
        self.graph[idx] = GraphNode::Module(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_provide_then_require() {
        let mut graph = DependencyGraph::new();
        graph.record_module(ModuleRecord {
            module_id: "module$a".into(),
            source_path: "a.js".into(),
        });
        graph.require("module$a", "module$b");
        assert_eq!(graph.module_count(), 2);
        assert_eq!(graph.requires_of("module$a"), vec!["module$b"]);
    }

    #[test]
    fn placeholder_upgrades_to_module_on_provide() {
        let mut graph = DependencyGraph::new();
        graph.require("module$a", "module$b");
        assert_eq!(graph.module_count(), 2);
        graph.provide("module$b");
        assert_eq!(graph.module_count(), 2, "provide must not duplicate the placeholder node");
    }

    #[test]
    fn unknown_module_has_no_requires() {
        let graph = DependencyGraph::new();
        assert!(graph.requires_of("module$missing").is_empty());
    }

    #[test]
    fn recording_sink_folds_into_a_shared_graph() {
        let mut sink = RecordingSink::default();
        sink.require("module$a", "module$b");
        sink.provide("module$a");
        sink.record_module(ModuleRecord {
            module_id: "module$a".into(),
            source_path: "a.js".into(),
        });

        let mut graph = DependencyGraph::new();
        sink.fold_into(&mut graph);
        assert_eq!(graph.requires_of("module$a"), vec!["module$b"]);
        assert_eq!(graph.module_count(), 2);
    }
}
