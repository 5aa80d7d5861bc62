// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Collect, EmitContext};
use crate::config::Options;
use crate::dataflow::{Emission, NamedValue, NodeId};
use crate::errors::ConfigurationError;

/// Passes every value straight through, renamed to the collector's name if
/// one is set. Useful to attach a shared condition or post-processing chain
/// to several rules.
#[derive(Debug, Clone, Default)]
pub struct Group {
    pending: Option<(String, String)>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(_options: &Options) -> Result<Box<dyn Collect>, ConfigurationError> {
        Ok(Box::new(Self::new()))
    }
}

impl Collect for Group {
    fn kind(&self) -> &'static str {
        "group"
    }

    fn receive(&mut self, _source: NodeId, name: &str, value: &str) {
        self.pending = Some((name.to_string(), value.to_string()));
    }

    fn is_complete(&self) -> bool {
        self.pending.is_some()
    }

    fn clear(&mut self) {
        self.pending = None;
    }

    fn emit(&mut self, context: &EmitContext<'_>) -> Vec<Emission> {
        let Some((name, value)) = self.pending.take() else {
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
