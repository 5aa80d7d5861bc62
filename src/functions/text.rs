// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stateless string functions.

use super::{Function, FunctionContext};
use crate::config::Options;
use crate::errors::{ConfigurationError, FunctionFailure};

/// Replaces every value with a fixed one.
#[derive(Debug, Clone)]
pub struct Constant {
    value: String,
}

impl Constant {
    pub fn new(value: &str) -> Self {
        Constant {
            value: value.to_string(),
        }
    }

    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Self::new(options.require("value")?)))
    }
}

impl Function for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    fn process(&mut self, _value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        Ok(Some(self.value.clone()))
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Trim;

impl Trim {
    pub fn from_options(_options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Trim))
    }
}

impl Function for Trim {
    fn name(&self) -> &str {
        "trim"
    }

    fn process(&mut self, value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        Ok(Some(value.trim().to_string()))
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

/// Upper- or lower-cases a value. Option `to`: `upper` (default) or `lower`.
#[derive(Debug, Clone)]
pub struct Case {
    upper: bool,
}

impl Case {
    pub fn upper() -> Self {
        Case { upper: true }
    }

    pub fn lower() -> Self {
        Case { upper: false }
    }

    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        match options.get_or("to", "upper") {
            "upper" => Ok(Box::new(Self::upper())),
            "lower" => Ok(Box::new(Self::lower())),
            other => Err(options.invalid("to", format!("expected 'upper' or 'lower', got '{}'", other))),
        }
    }
}

impl Function for Case {
    fn name(&self) -> &str {
        "case"
    }

    fn process(&mut self, value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        Ok(Some(if self.upper {
            value.to_uppercase()
        } else {
            value.to_lowercase()
        }))
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

/// Wraps a value in a `prefix` and `postfix`.
#[derive(Debug, Clone, Default)]
pub struct Compose {
    prefix: String,
    postfix: String,
}

impl Compose {
    pub fn new(prefix: &str, postfix: &str) -> Self {
        Compose {
            prefix: prefix.to_string(),
            postfix: postfix.to_string(),
        }
    }

    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Self::new(
            options.get_or("prefix", ""),
            options.get_or("postfix", ""),
        )))
    }
}

impl Function for Compose {
    fn name(&self) -> &str {
        "compose"
    }

    fn process(&mut self, value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        Ok(Some(format!("{}{}{}", self.prefix, value, self.postfix)))
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

/// Character range `start..end` of a value. A start past the end of the
/// value drops it; an end past the end is clamped.
#[derive(Debug, Clone)]
pub struct Substring {
    start: usize,
    end: Option<usize>,
}

impl Substring {
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Substring { start, end }
    }

    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        let start = options.parse::<usize>("start")?.unwrap_or(0);
        let end = options.parse::<usize>("end")?;
        if matches!(end, Some(end) if end < start) {
            return Err(options.invalid("end", "must not be smaller than 'start'"));
        }
        Ok(Box::new(Self::new(start, end)))
    }
}

impl Function for Substring {
    fn name(&self) -> &str {
        "substring"
    }

    fn process(&mut self, value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        let length = value.chars().count();
        if self.start > length {
            return Ok(None);
        }
        let end = self.end.map_or(length, |end| end.min(length));
        Ok(Some(
            value.chars().skip(self.start).take(end - self.start).collect(),
        ))
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

/// Passes a value only if it equals option `string`.
#[derive(Debug, Clone)]
pub struct Equals {
    expected: String,
}

impl Equals {
    pub fn new(expected: &str) -> Self {
        Equals {
            expected: expected.to_string(),
        }
    }

    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Self::new(options.require("string")?)))
    }
}

impl Function for Equals {
    fn name(&self) -> &str {
        "equals"
    }

    fn process(&mut self, value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        Ok((value == self.expected).then(|| value.to_string()))
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

/// Passes a value only if it differs from option `string`.
#[derive(Debug, Clone)]
pub struct NotEquals {
    rejected: String,
}

impl NotEquals {
    pub fn new(rejected: &str) -> Self {
        NotEquals {
            rejected: rejected.to_string(),
        }
    }

    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Self::new(options.require("string")?)))
    }
}

impl Function for NotEquals {
    fn name(&self) -> &str {
        "not_equals"
    }

    fn process(&mut self, value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        Ok((value != self.rejected).then(|| value.to_string()))
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}
