// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Functions that remember values within a record (or entity).

use super::{Function, FunctionContext};
use crate::config::Options;
use crate::errors::{ConfigurationError, FunctionFailure};
use crate::utils::format_template;
use std::collections::{HashMap, HashSet};

const LESS_THAN: &str = "lessThan ";
const MORE_THAN: &str = "moreThan ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OccurrenceFilter {
    Any,
    Exactly(usize),
    LessThan(usize),
    MoreThan(usize),
}

impl OccurrenceFilter {
    fn parse(only: &str) -> Result<Self, std::num::ParseIntError> {
        if let Some(bound) = only.strip_prefix(LESS_THAN) {
            Ok(OccurrenceFilter::LessThan(bound.trim().parse()?))
        } else if let Some(bound) = only.strip_prefix(MORE_THAN) {
            Ok(OccurrenceFilter::MoreThan(bound.trim().parse()?))
        } else {
            Ok(OccurrenceFilter::Exactly(only.trim().parse()?))
        }
    }

    fn accepts(&self, count: usize) -> bool {
        match *self {
            OccurrenceFilter::Any => true,
            OccurrenceFilter::Exactly(n) => count == n,
            OccurrenceFilter::LessThan(n) => count < n,
            OccurrenceFilter::MoreThan(n) => count > n,
        }
    }
}

/// Passes values by their position among the values seen so far.
///
/// Option `only`: `N`, `lessThan N` or `moreThan N` (1-based). Option
/// `format` may use `${value}` and `${count}`. With `same_entity` the count
/// restarts in every entity.
#[derive(Debug, Clone)]
pub struct Occurrence {
    filter: OccurrenceFilter,
    format: Option<String>,
    same_entity: bool,
    count: usize,
}

impl Occurrence {
    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        let filter = match options.get("only") {
            Some(only) => OccurrenceFilter::parse(only).map_err(|e| options.invalid("only", e.to_string()))?,
            None => OccurrenceFilter::Any,
        };
        Ok(Box::new(Occurrence {
            filter,
            format: options.get("format").map(str::to_string),
            same_entity: options.flag("same_entity", false)?,
            count: 0,
        }))
    }
}

impl Function for Occurrence {
    fn name(&self) -> &str {
        "occurrence"
    }

    fn process(&mut self, value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        self.count += 1;
        if !self.filter.accepts(self.count) {
            return Ok(None);
        }
        let Some(format) = &self.format else {
            return Ok(Some(value.to_string()));
        };
        let variables = HashMap::from([
            ("value".to_string(), value.to_string()),
            ("count".to_string(), self.count.to_string()),
        ]);
        Ok(Some(format_template(format, &variables)))
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn resets_on_entity_change(&self) -> bool {
        self.same_entity
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UniquePart {
    Value,
    Name,
    All,
}

/// Drops values already seen in the current record, or in the current
/// entity when option `in` is `entity`. Option `part` chooses what makes a
/// value a duplicate: `value` (default), `name`, or `all`.
#[derive(Debug, Clone)]
pub struct Unique {
    part: UniquePart,
    per_entity: bool,
    seen: HashSet<String>,
}

impl Unique {
    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        let per_entity = match options.get_or("in", "record") {
            "record" => false,
            "entity" => true,
            other => {
                return Err(options.invalid("in", format!("expected 'record' or 'entity', got '{}'", other)))
            }
        };
        let part = match options.get_or("part", "value") {
            "value" => UniquePart::Value,
            "name" => UniquePart::Name,
            "all" => UniquePart::All,
            other => {
                return Err(options.invalid(
                    "part",
                    format!("expected 'value', 'name' or 'all', got '{}'", other),
                ))
            }
        };
        Ok(Box::new(Unique {
            part,
            per_entity,
            seen: HashSet::new(),
        }))
    }
}

impl Function for Unique {
    fn name(&self) -> &str {
        "unique"
    }

    fn process(&mut self, value: &str, context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        let key = match self.part {
            UniquePart::Value => value.to_string(),
            UniquePart::Name => context.name.to_string(),
            UniquePart::All => format!("{}\u{1f}{}", context.name, value),
        };
        Ok(self.seen.insert(key).then(|| value.to_string()))
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn resets_on_entity_change(&self) -> bool {
        self.per_entity
    }

    fn reset(&mut self) {
        self.seen.clear();
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

/// Replaces each value by the number of values seen so far in the record.
#[derive(Debug, Clone, Default)]
pub struct Count {
    count: usize,
}

impl Count {
    pub fn from_options(_options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Count::default()))
    }
}

impl Function for Count {
    fn name(&self) -> &str {
        "count"
    }

    fn process(&mut self, _value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        self.count += 1;
        Ok(Some(self.count.to_string()))
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}
