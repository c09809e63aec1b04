//! Topological ordering of a processor set.
//!
//! DFS with three-color marking (white/gray/black); a gray node
//! revisited mid-DFS means a cycle, reported with every node on it.
//! Nodes are iterated from a `BTreeMap`, and a node's own `depends_on`
//! list is sorted before recursing, so two runs over the same input
//! always produce the same order — independent nodes tie-break by
//! name ascending.

use std::collections::BTreeMap;
use std::sync::Arc;

use courier_types::{ChainError, Item};
use tracing::{debug, instrument};

use crate::processor::Processor;
use crate::state::StateAccessor;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("node '{node}' depends on unknown node '{dependency}'")]
    UnknownDependency { node: String, dependency: String },
    #[error("cyclic processor dependency: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// A processor set with a fixed, validated execution order.
pub struct ProcessorGraph {
    order: Vec<String>,
    nodes: BTreeMap<String, Arc<dyn Processor>>,
}

impl ProcessorGraph {
    /// Validate and topologically sort `nodes`. Fails if a `depends_on`
    /// entry names an unknown node or the graph has a cycle.
    pub fn build(nodes: BTreeMap<String, Arc<dyn Processor>>) -> Result<Self, ExecutorError> {
        for (name, node) in &nodes {
            for dep in node.depends_on() {
                if !nodes.contains_key(dep) {
                    return Err(ExecutorError::UnknownDependency {
                        node: name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let order = topo_sort(&nodes)?;
        Ok(Self { order, nodes })
    }

    /// The computed execution order (dependencies before dependents).
    pub fn order(&self) -> &[String] {
        &self.order
    }

    #[instrument(skip_all, fields(item_id = item.id()))]
    pub async fn execute(&self, state: &StateAccessor, item: &Item) -> Result<(), ChainError> {
        for name in &self.order {
            let node = self
                .nodes
                .get(name)
                .expect("order only contains names present in nodes");
            debug!(processor = %name, "running processor");
            node.process(state, item).await?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

fn topo_sort(
    nodes: &BTreeMap<String, Arc<dyn Processor>>,
) -> Result<Vec<String>, ExecutorError> {
    let mut color: BTreeMap<String, Color> =
        nodes.keys().map(|k| (k.clone(), Color::White)).collect();
    let mut order = Vec::with_capacity(nodes.len());
    let mut path: Vec<String> = Vec::new();

    for name in nodes.keys() {
        if color[name] == Color::White {
            visit(name, nodes, &mut color, &mut order, &mut path)?;
        }
    }

    Ok(order)
}

fn visit(
    name: &str,
    nodes: &BTreeMap<String, Arc<dyn Processor>>,
    color: &mut BTreeMap<String, Color>,
    order: &mut Vec<String>,
    path: &mut Vec<String>,
) -> Result<(), ExecutorError> {
    match color.get(name).copied().expect("color initialized for every node") {
        Color::Black => return Ok(()),
        Color::Gray => {
            let start = path.iter().position(|n| n == name).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].to_vec();
            cycle.push(name.to_string());
            return Err(ExecutorError::Cycle(cycle));
        }
        Color::White => {}
    }

    color.insert(name.to_string(), Color::Gray);
    path.push(name.to_string());

    let mut deps: Vec<String> = nodes[name].depends_on().to_vec();
    deps.sort();
    for dep in &deps {
        visit(dep, nodes, color, order, path)?;
    }

    path.pop();
    color.insert(name.to_string(), Color::Black);
    order.push(name.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubProcessor;

    fn node(name: &str, deps: &[&str]) -> Arc<dyn Processor> {
        Arc::new(StubProcessor::new(name, deps))
    }

    #[test]
    fn linear_chain_orders_dependencies_first() {
        let nodes = BTreeMap::from([
            ("c".to_string(), node("c", &["b"])),
            ("a".to_string(), node("a", &[])),
            ("b".to_string(), node("b", &["a"])),
        ]);
        let graph = ProcessorGraph::build(nodes).unwrap();
        assert_eq!(graph.order(), &["a", "b", "c"]);
    }

    #[test]
    fn independent_nodes_tie_break_by_name() {
        let nodes = BTreeMap::from([
            ("zeta".to_string(), node("zeta", &[])),
            ("alpha".to_string(), node("alpha", &[])),
            ("mid".to_string(), node("mid", &[])),
        ]);
        let graph = ProcessorGraph::build(nodes).unwrap();
        assert_eq!(graph.order(), &["alpha", "mid", "zeta"]);
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let nodes = BTreeMap::from([("a".to_string(), node("a", &["ghost"]))]);
        let err = ProcessorGraph::build(nodes).unwrap_err();
        assert_eq!(
            err,
            ExecutorError::UnknownDependency {
                node: "a".to_string(),
                dependency: "ghost".to_string()
            }
        );
    }

    #[test]
    fn cycle_is_detected_and_named() {
        let nodes = BTreeMap::from([
            ("a".to_string(), node("a", &["b"])),
            ("b".to_string(), node("b", &["a"])),
        ]);
        let err = ProcessorGraph::build(nodes).unwrap_err();
        match err {
            ExecutorError::Cycle(cycle) => {
                assert!(cycle.contains(&"a".to_string()));
                assert!(cycle.contains(&"b".to_string()));
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn diamond_dependency_orders_all_parents_before_child() {
        let nodes = BTreeMap::from([
            ("root".to_string(), node("root", &[])),
            ("left".to_string(), node("left", &["root"])),
            ("right".to_string(), node("right", &["root"])),
            ("leaf".to_string(), node("leaf", &["left", "right"])),
        ]);
        let graph = ProcessorGraph::build(nodes).unwrap();
        let order = graph.order();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("root") < pos("left"));
        assert!(pos("root") < pos("right"));
        assert!(pos("left") < pos("leaf"));
        assert!(pos("right") < pos("leaf"));
    }
}
