// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Collectors: stateful nodes that gather values from several sources and
//! emit a combined result.
//!
//! The scope logic every collector shares (record and entity tracking, flush
//! handling, conditions, reset) lives in [`CollectorState`]. What a collector
//! does with its inputs is the [`Collect`] strategy for its kind:
//!
//! * `combine` - fills `${name}` variables from its sources into name/value templates
//! * `concat` - joins every value seen in the scope
//! * `choose` - keeps the value from the highest priority source
//! * `group` - passes each value through under the collector's name
//! * `all` - fires once every source has delivered
//! * `any` - fires once any source has delivered
//! * `entity` - builds a nested entity from its inputs

mod all;
mod any;
mod choose;
mod combine;
mod concat;
mod entity;
mod group;
mod state;

#[cfg(test)]
mod tests;

pub use all::All;
pub use any::Any;
pub use choose::Choose;
pub use combine::Combine;
pub use concat::Concat;
pub use entity::Entity;
pub use group::Group;
pub use state::{CollectorFlags, CollectorSpec, CollectorState, FlushTrigger};

use crate::config::Options;
use crate::dataflow::{Emission, EntityFragment, NodeId};
use crate::errors::ConfigurationError;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Collector-level settings handed to [`Collect::emit`].
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    /// Configured output name, possibly a `${var}` template.
    pub name: Option<&'a str>,
    /// Configured output value, possibly a `${var}` template.
    pub value: Option<&'a str>,
    pub record_count: u64,
    pub entity_count: u64,
}

/// Kind-specific behaviour of a collector.
pub trait Collect: Send + Sync + fmt::Debug {
    fn kind(&self) -> &'static str;

    /// Called once per source edge at build time, in connection order.
    fn on_source_added(&mut self, _source: NodeId) {}

    fn receive(&mut self, source: NodeId, name: &str, value: &str);

    /// A value arriving on an entity-name edge.
    fn receive_name(&mut self, _source: NodeId, _value: &str) {}

    /// A complete child entity. Returns `false` if this kind cannot hold one.
    fn receive_fragment(&mut self, _source: NodeId, _fragment: &EntityFragment) -> bool {
        false
    }

    fn accepts_fragments(&self) -> bool {
        false
    }

    /// Whether `emit` yields entity fragments rather than plain values.
    fn produces_fragments(&self) -> bool {
        false
    }

    fn is_complete(&self) -> bool;

    /// Whether a flush emits even though the collector was not configured to
    /// wait for one (concat and choose only make sense at a scope's end).
    fn emits_at_scope_end(&self) -> bool {
        false
    }

    fn clear(&mut self);

    fn emit(&mut self, context: &EmitContext<'_>) -> Vec<Emission>;

    fn boxed_clone(&self) -> Box<dyn Collect>;
}

/// Tracks which sources have delivered since the last clear.
#[derive(Debug, Clone, Default)]
pub(crate) struct SourceTracker {
    sources: Vec<NodeId>,
    pending: HashSet<NodeId>,
}

impl SourceTracker {
    pub fn add(&mut self, source: NodeId) {
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
        self.pending.insert(source);
    }

    pub fn fired(&mut self, source: NodeId) {
        self.pending.remove(&source);
    }

    pub fn all_fired(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn position(&self, source: NodeId) -> Option<usize> {
        self.sources.iter().position(|s| *s == source)
    }

    pub fn reset(&mut self) {
        self.pending = self.sources.iter().copied().collect();
    }
}

pub type CollectorConstructor =
    Arc<dyn Fn(&Options) -> Result<Box<dyn Collect>, ConfigurationError> + Send + Sync>;

type BuiltinConstructor = fn(&Options) -> Result<Box<dyn Collect>, ConfigurationError>;

const BUILTIN_COLLECTORS: &[(&str, BuiltinConstructor)] = &[
    ("all", All::from_options),
    ("any", Any::from_options),
    ("choose", Choose::from_options),
    ("combine", Combine::from_options),
    ("concat", Concat::from_options),
    ("entity", Entity::from_options),
    ("group", Group::from_options),
];

/// Name to constructor table for collector kinds.
#[derive(Clone)]
pub struct CollectorRegistry {
    constructors: BTreeMap<String, CollectorConstructor>,
}

impl Default for CollectorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl CollectorRegistry {
    pub fn empty() -> Self {
        CollectorRegistry {
            constructors: BTreeMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for (name, constructor) in BUILTIN_COLLECTORS {
            registry.register(name, *constructor);
        }
        registry
    }

    /// Adds or replaces the constructor for `name`.
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Collect>, ConfigurationError> + Send + Sync + 'static,
    {
        self.constructors
            .insert(name.to_string(), Arc::new(constructor));
    }

    pub fn create(&self, name: &str, options: &Options) -> Result<Box<dyn Collect>, ConfigurationError> {
        let constructor =
            self.constructors
                .get(name)
                .ok_or_else(|| ConfigurationError::UnknownCollector {
                    collector: name.to_string(),
                })?;
        constructor(options)
    }

    pub fn list_available(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}

impl fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("collectors", &self.list_available())
            .finish()
    }
}
