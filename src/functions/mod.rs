// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Value transformations applied along data rules.
//!
//! A function turns one value into zero or one values. Returning `None` stops
//! the value from travelling further. Functions are created by name from a
//! [`FunctionRegistry`]; each running morph holds its own clone of every
//! function so stateful ones never share counters across streams.

mod lookup;
mod regexp;
mod stateful;
mod text;

#[cfg(test)]
mod tests;

pub use lookup::{Blacklist, Lookup, Whitelist};
pub use regexp::{Regexp, Replace};
pub use stateful::{Count, Occurrence, Unique};
pub use text::{Case, Compose, Constant, Equals, NotEquals, Substring, Trim};

use crate::config::Options;
use crate::dataflow::NamedValue;
use crate::errors::{ConfigurationError, ExecutionError, ExecutionResult, FunctionFailure};
use crate::maps::Maps;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// What a function can see besides the value itself.
pub struct FunctionContext<'a> {
    /// Name the value currently travels under.
    pub name: &'a str,
    pub record_count: u64,
    pub entity_count: u64,
    pub maps: &'a dyn Maps,
}

pub trait Function: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn process(
        &mut self,
        value: &str,
        context: &FunctionContext<'_>,
    ) -> Result<Option<String>, FunctionFailure>;

    /// Whether the function keeps state between values.
    fn is_stateful(&self) -> bool {
        false
    }

    /// Stateful functions that also forget their state when the entity changes.
    fn resets_on_entity_change(&self) -> bool {
        false
    }

    /// Forgets any state. Called when a value from a newer record arrives and
    /// when the stream is reset.
    fn reset(&mut self) {}

    /// The named map this function reads, if any.
    fn map_reference(&self) -> Option<&str> {
        None
    }

    fn boxed_clone(&self) -> Box<dyn Function>;
}

/// A function instance plus the record and entity its state belongs to.
#[derive(Debug)]
pub struct FunctionState {
    function: Box<dyn Function>,
    record_count: u64,
    entity_count: u64,
}

impl FunctionState {
    pub fn new(function: Box<dyn Function>) -> Self {
        FunctionState {
            function,
            record_count: 0,
            entity_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn apply(&mut self, input: &NamedValue, maps: &dyn Maps) -> ExecutionResult<Option<NamedValue>> {
        if self.function.is_stateful() {
            let stale = input.record_count != self.record_count
                || (self.function.resets_on_entity_change() && input.entity_count != self.entity_count);
            if stale {
                self.function.reset();
            }
            self.record_count = input.record_count;
            self.entity_count = input.entity_count;
        }

        let context = FunctionContext {
            name: &input.name,
            record_count: input.record_count,
            entity_count: input.entity_count,
            maps,
        };
        match self.function.process(&input.value, &context) {
            Ok(output) => Ok(output.map(|value| input.with_value(value))),
            Err(source) => Err(ExecutionError::Function {
                function: self.function.name().to_string(),
                source,
            }),
        }
    }

    pub fn reset(&mut self) {
        self.function.reset();
        self.record_count = 0;
        self.entity_count = 0;
    }
}

pub type FunctionConstructor =
    Arc<dyn Fn(&Options) -> Result<Box<dyn Function>, ConfigurationError> + Send + Sync>;

type BuiltinConstructor = fn(&Options) -> Result<Box<dyn Function>, ConfigurationError>;

const BUILTIN_FUNCTIONS: &[(&str, BuiltinConstructor)] = &[
    ("blacklist", Blacklist::from_options),
    ("case", Case::from_options),
    ("compose", Compose::from_options),
    ("constant", Constant::from_options),
    ("count", Count::from_options),
    ("equals", Equals::from_options),
    ("lookup", Lookup::from_options),
    ("not_equals", NotEquals::from_options),
    ("occurrence", Occurrence::from_options),
    ("regexp", Regexp::from_options),
    ("replace", Replace::from_options),
    ("substring", Substring::from_options),
    ("trim", Trim::from_options),
    ("unique", Unique::from_options),
    ("whitelist", Whitelist::from_options),
];

/// Name to constructor table for functions.
///
/// Starts with the built-in library; applications add their own functions
/// with [`FunctionRegistry::register`] before building a morph.
#[derive(Clone)]
pub struct FunctionRegistry {
    constructors: BTreeMap<String, FunctionConstructor>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl FunctionRegistry {
    pub fn empty() -> Self {
        FunctionRegistry {
            constructors: BTreeMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for (name, constructor) in BUILTIN_FUNCTIONS {
            registry.register(name, *constructor);
        }
        registry
    }

    /// Adds or replaces the constructor for `name`.
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Function>, ConfigurationError> + Send + Sync + 'static,
    {
        self.constructors
            .insert(name.to_string(), Arc::new(constructor));
    }

    pub fn create(&self, name: &str, options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        let constructor =
            self.constructors
                .get(name)
                .ok_or_else(|| ConfigurationError::UnknownFunction {
                    function: name.to_string(),
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

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.list_available())
            .finish()
    }
}
