// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::NodeId;
use crate::collectors::{CollectorSpec, CollectorState};
use crate::functions::{Function, FunctionState};

/// Which input of the receiving node an edge feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRole {
    Value,
    /// Arms a collector's `if` condition.
    Condition,
    /// Names the entity an entity collector builds.
    EntityName,
}

/// Where an edge delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    /// The morph's output stream.
    Output,
    /// Back into the path registry under the value's name.
    Feedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub target: Target,
    pub role: EdgeRole,
}

#[derive(Debug)]
pub enum NodeKind {
    /// Entry point of a data rule; renames the value if `name` is set.
    Data { name: Option<String> },
    Function(Box<dyn Function>),
    Collector(CollectorSpec),
    /// Flushes `collector` when its path is seen.
    Flush { collector: NodeId },
}

#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub edges: Vec<Edge>,
}

impl Node {
    pub fn describe(&self) -> String {
        match &self.kind {
            NodeKind::Data { .. } => "data".to_string(),
            NodeKind::Function(function) => format!("function '{}'", function.name()),
            NodeKind::Collector(spec) => format!("collector '{}'", spec.collect.kind()),
            NodeKind::Flush { .. } => "flush".to_string(),
        }
    }
}

/// Mutable per-stream state of one node.
#[derive(Debug)]
pub enum NodeState {
    Data { name: Option<String> },
    Function(FunctionState),
    Collector(CollectorState),
    Flush { collector: NodeId },
}

impl NodeState {
    pub fn reset_stream(&mut self) {
        match self {
            NodeState::Function(state) => state.reset(),
            NodeState::Collector(state) => state.reset_stream(),
            NodeState::Data { .. } | NodeState::Flush { .. } => {}
        }
    }
}

/// The dataflow topology: an arena of nodes and their outgoing edges.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            edges: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Adds an edge from `source` to `target`. Fan-out follows the order
    /// edges were added. Collectors learn about their value and entity-name
    /// sources here.
    pub fn connect(&mut self, source: NodeId, target: Target, role: EdgeRole) {
        if let Target::Node(id) = target {
            if let NodeKind::Collector(spec) = &mut self.nodes[id].kind {
                match role {
                    EdgeRole::Condition => spec.has_condition = true,
                    EdgeRole::Value | EdgeRole::EntityName => spec.collect.on_source_added(source),
                }
            }
        }
        self.nodes[source].edges.push(Edge { target, role });
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn edges(&self, id: NodeId) -> &[Edge] {
        &self.nodes[id].edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn collector_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Collector(_)))
            .count()
    }

    /// Fresh state for every node, index-aligned with the graph.
    pub fn instantiate(&self) -> Vec<NodeState> {
        self.nodes
            .iter()
            .map(|node| match &node.kind {
                NodeKind::Data { name } => NodeState::Data { name: name.clone() },
                NodeKind::Function(function) => {
                    NodeState::Function(FunctionState::new(function.boxed_clone()))
                }
                NodeKind::Collector(spec) => NodeState::Collector(spec.instantiate()),
                NodeKind::Flush { collector } => NodeState::Flush {
                    collector: *collector,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::Combine;
    use crate::functions::Trim;

    #[test]
    fn test_connect_keeps_fan_out_order() {
        let mut graph = Graph::new();
        let data = graph.add_node(NodeKind::Data { name: None });
        let trim = graph.add_node(NodeKind::Function(Box::new(Trim)));
        let collector = graph.add_node(NodeKind::Collector(CollectorSpec::new(Box::new(Combine::new()))));

        graph.connect(data, Target::Node(trim), EdgeRole::Value);
        graph.connect(data, Target::Output, EdgeRole::Value);
        graph.connect(data, Target::Node(collector), EdgeRole::Condition);

        assert_eq!(
            graph.edges(data),
            &[
                Edge {
                    target: Target::Node(trim),
                    role: EdgeRole::Value
                },
                Edge {
                    target: Target::Output,
                    role: EdgeRole::Value
                },
                Edge {
                    target: Target::Node(collector),
                    role: EdgeRole::Condition
                },
            ]
        );
        let NodeKind::Collector(spec) = &graph.node(collector).kind else {
            panic!("expected a collector");
        };
        assert!(spec.has_condition);
        assert_eq!(graph.collector_count(), 1);
        assert_eq!(graph.node(trim).describe(), "function 'trim'");
    }

    #[test]
    fn test_instantiate_gives_independent_state() {
        let mut graph = Graph::new();
        graph.add_node(NodeKind::Data {
            name: Some("out".to_string()),
        });
        graph.add_node(NodeKind::Flush { collector: 0 });

        let first = graph.instantiate();
        let second = graph.instantiate();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert!(matches!(&first[0], NodeState::Data { name: Some(n) } if n == "out"));
        assert!(matches!(second[1], NodeState::Flush { collector: 0 }));
    }
}
