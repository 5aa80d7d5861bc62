// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Collect, EmitContext, SourceTracker};
use crate::config::Options;
use crate::dataflow::{Emission, EntityFragment, NodeId};
use crate::errors::ConfigurationError;
use crate::events::Event;

/// Buffers literals (and child entities) and emits them as one entity.
///
/// The entity's name is the last value received on an entity-name edge, or
/// the collector's configured name. Empty entities are never written.
#[derive(Debug, Clone, Default)]
pub struct Entity {
    sources: SourceTracker,
    events: Vec<Event>,
    current_name: Option<String>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(_options: &Options) -> Result<Box<dyn Collect>, ConfigurationError> {
        Ok(Box::new(Self::new()))
    }
}

impl Collect for Entity {
    fn kind(&self) -> &'static str {
        "entity"
    }

    fn on_source_added(&mut self, source: NodeId) {
        self.sources.add(source);
    }

    fn receive(&mut self, source: NodeId, name: &str, value: &str) {
        self.events.push(Event::literal(name, value));
        self.sources.fired(source);
    }

    fn receive_name(&mut self, source: NodeId, value: &str) {
        self.current_name = Some(value.to_string());
        self.sources.fired(source);
    }

    fn receive_fragment(&mut self, source: NodeId, fragment: &EntityFragment) -> bool {
        if !fragment.events.is_empty() {
            self.events.push(Event::start_entity(&fragment.name));
            self.events.extend(fragment.events.iter().cloned());
            self.events.push(Event::EndEntity);
        }
        self.sources.fired(source);
        true
    }

    fn accepts_fragments(&self) -> bool {
        true
    }

    fn produces_fragments(&self) -> bool {
        true
    }

    fn is_complete(&self) -> bool {
        self.sources.all_fired()
    }

    fn clear(&mut self) {
        self.sources.reset();
        self.events.clear();
        self.current_name = None;
    }

    fn emit(&mut self, context: &EmitContext<'_>) -> Vec<Emission> {
        let name = self
            .current_name
            .clone()
            .or_else(|| context.name.map(str::to_string))
            .unwrap_or_default();
        vec![Emission::Fragment(EntityFragment {
            name,
            events: self.events.clone(),
            record_count: context.record_count,
            entity_count: context.entity_count,
        })]
    }

    fn boxed_clone(&self) -> Box<dyn Collect> {
        Box::new(self.clone())
    }
}
