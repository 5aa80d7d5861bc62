// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Collect, EmitContext};
use crate::config::Options;
use crate::dataflow::{Emission, NamedValue, NodeId};
use crate::errors::ConfigurationError;

const DEFAULT_VALUE: &str = "true";

/// Emits once per scope as soon as any source delivers.
#[derive(Debug, Clone, Default)]
pub struct Any {
    fired: bool,
    emitted: bool,
}

impl Any {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(_options: &Options) -> Result<Box<dyn Collect>, ConfigurationError> {
        Ok(Box::new(Self::new()))
    }
}

impl Collect for Any {
    fn kind(&self) -> &'static str {
        "any"
    }

    fn receive(&mut self, _source: NodeId, _name: &str, _value: &str) {
        self.fired = true;
    }

    fn is_complete(&self) -> bool {
        self.fired && !self.emitted
    }

    fn clear(&mut self) {
        self.fired = false;
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
