// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Functions backed by a key/value table: either a named map (option `in`)
//! or entries given inline with the rule.

use super::{Function, FunctionContext};
use crate::config::Options;
use crate::errors::{ConfigurationError, FunctionFailure};
use crate::maps::DEFAULT_MAP_KEY;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Table {
    Named(String),
    Inline(HashMap<String, String>),
}

impl Table {
    fn from_options(options: &Options) -> Result<Self, ConfigurationError> {
        match options.get("in") {
            Some(map) => Ok(Table::Named(map.to_string())),
            None if !options.entries().is_empty() => Ok(Table::Inline(
                options
                    .entries()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )),
            None => Err(ConfigurationError::MissingOption {
                owner: options.owner().to_string(),
                option: "in".to_string(),
            }),
        }
    }

    fn get<'a>(&'a self, key: &str, context: &'a FunctionContext<'_>) -> Option<&'a str> {
        match self {
            Table::Named(map) => context.maps.get_value(map, key),
            Table::Inline(entries) => entries
                .get(key)
                .or_else(|| entries.get(DEFAULT_MAP_KEY))
                .map(String::as_str),
        }
    }

    fn contains(&self, key: &str, context: &FunctionContext<'_>) -> bool {
        match self {
            Table::Named(map) => context
                .maps
                .get_map(map)
                .is_some_and(|entries| entries.contains_key(key)),
            Table::Inline(entries) => entries.contains_key(key),
        }
    }

    fn map_name(&self) -> Option<&str> {
        match self {
            Table::Named(map) => Some(map),
            Table::Inline(_) => None,
        }
    }

    fn label(&self) -> String {
        self.map_name().unwrap_or("inline entries").to_string()
    }
}

/// Replaces a value by its mapping.
///
/// Misses fall back to the table's `__default` entry, then to option
/// `default`. Without either the value is dropped, or rejected as an error
/// when `strict` is set.
#[derive(Debug, Clone)]
pub struct Lookup {
    table: Table,
    default: Option<String>,
    strict: bool,
}

impl Lookup {
    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Lookup {
            table: Table::from_options(options)?,
            default: options.get("default").map(str::to_string),
            strict: options.flag("strict", false)?,
        }))
    }
}

impl Function for Lookup {
    fn name(&self) -> &str {
        "lookup"
    }

    fn process(&mut self, value: &str, context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        if let Some(mapped) = self.table.get(value, context) {
            return Ok(Some(mapped.to_string()));
        }
        match (&self.default, self.strict) {
            (Some(default), _) => Ok(Some(default.clone())),
            (None, true) => Err(FunctionFailure::NoMapping {
                map: self.table.label(),
                key: value.to_string(),
            }),
            (None, false) => Ok(None),
        }
    }

    fn map_reference(&self) -> Option<&str> {
        self.table.map_name()
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

/// Passes only values that are keys of the table.
#[derive(Debug, Clone)]
pub struct Whitelist {
    table: Table,
}

impl Whitelist {
    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Whitelist {
            table: Table::from_options(options)?,
        }))
    }
}

impl Function for Whitelist {
    fn name(&self) -> &str {
        "whitelist"
    }

    fn process(&mut self, value: &str, context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        Ok(self.table.contains(value, context).then(|| value.to_string()))
    }

    fn map_reference(&self) -> Option<&str> {
        self.table.map_name()
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

/// Drops values that are keys of the table.
#[derive(Debug, Clone)]
pub struct Blacklist {
    table: Table,
}

impl Blacklist {
    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Blacklist {
            table: Table::from_options(options)?,
        }))
    }
}

impl Function for Blacklist {
    fn name(&self) -> &str {
        "blacklist"
    }

    fn process(&mut self, value: &str, context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        Ok((!self.table.contains(value, context)).then(|| value.to_string()))
    }

    fn map_reference(&self) -> Option<&str> {
        self.table.map_name()
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}
