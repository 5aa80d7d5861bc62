// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Collect, EmitContext, SourceTracker};
use crate::config::Options;
use crate::dataflow::{Emission, NamedValue, NodeId};
use crate::errors::ConfigurationError;

const DEFAULT_VALUE: &str = "true";

/// Emits once every source has delivered at least one value.
#[derive(Debug, Clone, Default)]
pub struct All {
    sources: SourceTracker,
    emitted: bool,
}

impl All {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(_options: &Options) -> Result<Box<dyn Collect>, ConfigurationError> {
        Ok(Box::new(Self::new()))
    }
}

impl Collect for All {
    fn kind(&self) -> &'static str {
        "all"
    }

    fn on_source_added(&mut self, source: NodeId) {
        self.sources.add(source);
    }

    fn receive(&mut self, source: NodeId, _name: &str, _value: &str) {
        self.sources.fired(source);
    }

    fn is_complete(&self) -> bool {
        !self.emitted && self.sources.all_fired()
    }

    fn clear(&mut self) {
        self.sources.reset();
        self.emitted = false;
    }

    fn emit(&mut self, context: &EmitContext<'_>) -> Vec<Emission> {
        if !self.is_complete() {
            return Vec::new();
        }
        self.emitted = true;
        vec![Emission::Value(NamedValue::new(
            context.name.unwrap_or_default(),
            context.value.unwrap_or(DEFAULT_VALUE),
            context.record_count,
            context.entity_count,
        ))]
    }

    fn boxed_clone(&self) -> Box<dyn Collect> {
        Box::new(self.clone())
    }
}
