// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Collect, EmitContext};
use crate::config::Options;
use crate::dataflow::{Emission, NamedValue, NodeId};
use crate::errors::ConfigurationError;

/// Joins every value received in the current scope.
///
/// Options: `delimiter`, `prefix`, `postfix` (all default to empty) and
/// `reverse` to join in reverse arrival order.
#[derive(Debug, Clone, Default)]
pub struct Concat {
    delimiter: String,
    prefix: String,
    postfix: String,
    reverse: bool,
    values: Vec<String>,
}

impl Concat {
    pub fn new(delimiter: &str) -> Self {
        Concat {
            delimiter: delimiter.to_string(),
            ..Self::default()
        }
    }

    pub fn with_affixes(mut self, prefix: &str, postfix: &str) -> Self {
        self.prefix = prefix.to_string();
        self.postfix = postfix.to_string();
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn from_options(options: &Options) -> Result<Box<dyn Collect>, ConfigurationError> {
        let mut concat = Concat::new(options.get_or("delimiter", "")).with_affixes(
            options.get_or("prefix", ""),
            options.get_or("postfix", ""),
        );
        concat.reverse = options.flag("reverse", false)?;
        Ok(Box::new(concat))
    }
}

impl Collect for Concat {
    fn kind(&self) -> &'static str {
        "concat"
    }

    fn receive(&mut self, _source: NodeId, _name: &str, value: &str) {
        self.values.push(value.to_string());
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn emits_at_scope_end(&self) -> bool {
        true
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn emit(&mut self, context: &EmitContext<'_>) -> Vec<Emission> {
        if self.values.is_empty() {
            return Vec::new();
        }
        if self.reverse {
            self.values.reverse();
        }
        let joined = format!(
            "{}{}{}",
            self.prefix,
            self.values.join(&self.delimiter),
            self.postfix
        );
        self.values.clear();

        vec![Emission::Value(NamedValue::new(
            context.name.unwrap_or_default(),
            joined,
            context.record_count,
            context.entity_count,
        ))]
    }

    fn boxed_clone(&self) -> Box<dyn Collect> {
        Box::new(self.clone())
    }
}
