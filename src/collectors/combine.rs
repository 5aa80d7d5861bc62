// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Collect, EmitContext, SourceTracker};
use crate::config::Options;
use crate::dataflow::{Emission, NamedValue, NodeId};
use crate::errors::ConfigurationError;
use crate::utils::format_template;
use std::collections::HashMap;

/// Fills `${name}` variables from each source and emits the collector's name
/// and value templates once every source has delivered.
#[derive(Debug, Clone, Default)]
pub struct Combine {
    sources: SourceTracker,
    variables: HashMap<String, String>,
}

impl Combine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(_options: &Options) -> Result<Box<dyn Collect>, ConfigurationError> {
        Ok(Box::new(Self::new()))
    }
}

impl Collect for Combine {
    fn kind(&self) -> &'static str {
        "combine"
    }

    fn on_source_added(&mut self, source: NodeId) {
        self.sources.add(source);
    }

    fn receive(&mut self, source: NodeId, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
        self.sources.fired(source);
    }

    fn is_complete(&self) -> bool {
        self.sources.all_fired()
    }

    fn clear(&mut self) {
        self.sources.reset();
        self.variables.clear();
    }

    fn emit(&mut self, context: &EmitContext<'_>) -> Vec<Emission> {
        let name = format_template(context.name.unwrap_or_default(), &self.variables);
        let value = format_template(context.value.unwrap_or_default(), &self.variables);
        vec![Emission::Value(NamedValue::new(
            name,
            value,
            context.record_count,
            context.entity_count,
        ))]
    }

    fn boxed_clone(&self) -> Box<dyn Collect> {
        Box::new(self.clone())
    }
}
