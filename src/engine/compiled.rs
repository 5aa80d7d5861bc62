// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::dataflow::{Graph, NodeId, NodeState};
use crate::maps::MapStore;
use crate::registry::PathRegistry;

/// The immutable result of building a rule specification.
///
/// Holds the path registry, the dataflow graph and the maps. It carries no
/// per-stream state, so one compiled morph is shared behind an `Arc` by any
/// number of [`Morph`](crate::engine::Morph) instances, each driving its own
/// stream.
#[derive(Debug)]
pub struct CompiledMorph {
    registry: PathRegistry<NodeId>,
    graph: Graph,
    /// Collectors in flush order, children before their parents.
    flush_order: Vec<NodeId>,
    /// Same-entity collectors keyed by the entity depth whose end flushes
    /// them, in flush order.
    entity_flushes: Vec<(usize, NodeId)>,
    maps: MapStore,
    entity_marker: String,
    max_feedback_depth: usize,
}

impl CompiledMorph {
    pub(crate) fn new(
        registry: PathRegistry<NodeId>,
        graph: Graph,
        flush_order: Vec<NodeId>,
        entity_flushes: Vec<(usize, NodeId)>,
        maps: MapStore,
        entity_marker: String,
        max_feedback_depth: usize,
    ) -> Self {
        CompiledMorph {
            registry,
            graph,
            flush_order,
            entity_flushes,
            maps,
            entity_marker,
            max_feedback_depth,
        }
    }

    pub fn registry(&self) -> &PathRegistry<NodeId> {
        &self.registry
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn flush_order(&self) -> &[NodeId] {
        &self.flush_order
    }

    /// Collectors flushed when an entity at `depth` closes, children first.
    pub fn entity_flushes(&self, depth: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.entity_flushes
            .iter()
            .filter(move |(at, _)| *at == depth)
            .map(|(_, collector)| *collector)
    }

    pub fn maps(&self) -> &MapStore {
        &self.maps
    }

    pub fn entity_marker(&self) -> &str {
        &self.entity_marker
    }

    pub fn max_feedback_depth(&self) -> usize {
        self.max_feedback_depth
    }

    pub fn node_count(&self) -> usize {
        self.graph.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.registry.len()
    }

    pub fn collector_count(&self) -> usize {
        self.graph.collector_count()
    }

    pub(crate) fn instantiate(&self) -> Vec<NodeState> {
        self.graph.instantiate()
    }
}
