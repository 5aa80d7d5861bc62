// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Collect, EmitContext, SourceTracker};
use crate::config::Options;
use crate::dataflow::{Emission, NamedValue, NodeId};
use crate::errors::ConfigurationError;

/// Keeps the value from the source connected first among those that
/// delivered, and emits it when its scope closes.
#[derive(Debug, Clone, Default)]
pub struct Choose {
    sources: SourceTracker,
    chosen: Option<(usize, String, String)>,
}

impl Choose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(_options: &Options) -> Result<Box<dyn Collect>, ConfigurationError> {
        Ok(Box::new(Self::new()))
    }
}

impl Collect for Choose {
    fn kind(&self) -> &'static str {
        "choose"
    }

    fn on_source_added(&mut self, source: NodeId) {
        self.sources.add(source);
    }

    fn receive(&mut self, source: NodeId, name: &str, value: &str) {
        let priority = self.sources.position(source).unwrap_or(usize::MAX);
        let better = match &self.chosen {
            Some((current, _, _)) => priority < *current,
            None => true,
        };
        if better {
            self.chosen = Some((priority, name.to_string(), value.to_string()));
        }
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn emits_at_scope_end(&self) -> bool {
        true
    }

    fn clear(&mut self) {
        self.chosen = None;
    }

    fn emit(&mut self, context: &EmitContext<'_>) -> Vec<Emission> {
        let Some((_, name, value)) = self.chosen.take() else {
            return Vec::new();
        };
        vec![Emission::Value(NamedValue::new(
            context.name.map(str::to_string).unwrap_or(name),
            context.value.map(str::to_string).unwrap_or(value),
            context.record_count,
            context.entity_count,
        ))]
    }

    fn boxed_clone(&self) -> Box<dyn Collect> {
        Box::new(self.clone())
    }
}
