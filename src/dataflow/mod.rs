// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named values and the graph they flow through.
//!
//! The graph is an arena: nodes are addressed by [`NodeId`] and edges are
//! stored on their source node in the order they were connected, which is
//! also the order values fan out at delivery time.

mod graph;

pub use graph::{Edge, EdgeRole, Graph, Node, NodeKind, NodeState, Target};

use crate::events::Event;

pub type NodeId = usize;

/// A value travelling through the graph, stamped with the counters current
/// when it entered the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedValue {
    pub name: String,
    pub value: String,
    pub record_count: u64,
    pub entity_count: u64,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>, record_count: u64, entity_count: u64) -> Self {
        NamedValue {
            name: name.into(),
            value: value.into(),
            record_count,
            entity_count,
        }
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        NamedValue {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn with_value(&self, value: impl Into<String>) -> Self {
        NamedValue {
            value: value.into(),
            ..self.clone()
        }
    }
}

/// A complete entity built by an entity collector: its name and the events
/// that belong between its `start_entity` and `end_entity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFragment {
    pub name: String,
    pub events: Vec<Event>,
    pub record_count: u64,
    pub entity_count: u64,
}

/// What a node hands to its downstream edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Value(NamedValue),
    Fragment(EntityFragment),
}

impl Emission {
    pub fn record_count(&self) -> u64 {
        match self {
            Emission::Value(value) => value.record_count,
            Emission::Fragment(fragment) => fragment.record_count,
        }
    }

    pub fn entity_count(&self) -> u64 {
        match self {
            Emission::Value(value) => value.entity_count,
            Emission::Fragment(fragment) => fragment.entity_count,
        }
    }
}
