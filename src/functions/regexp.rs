// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Function, FunctionContext};
use crate::config::Options;
use crate::errors::{ConfigurationError, FunctionFailure};
use regex::Regex;

fn compile(options: &Options, key: &str) -> Result<Regex, ConfigurationError> {
    let pattern = options.require(key)?;
    Regex::new(pattern).map_err(|e| options.invalid(key, e.to_string()))
}

/// Extracts the first match of option `match`.
///
/// With option `format` the match's groups are substituted into it (`${1}`,
/// `${name}`); otherwise the whole match is emitted. Values that do not
/// match are dropped.
#[derive(Debug, Clone)]
pub struct Regexp {
    regex: Regex,
    format: Option<String>,
}

impl Regexp {
    pub fn new(regex: Regex, format: Option<&str>) -> Self {
        Regexp {
            regex,
            format: format.map(str::to_string),
        }
    }

    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Self::new(compile(options, "match")?, options.get("format"))))
    }
}

impl Function for Regexp {
    fn name(&self) -> &str {
        "regexp"
    }

    fn process(&mut self, value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        let Some(captures) = self.regex.captures(value) else {
            return Ok(None);
        };
        match &self.format {
            Some(format) => {
                let mut out = String::new();
                captures.expand(format, &mut out);
                Ok(Some(out))
            }
            None => Ok(captures.get(0).map(|m| m.as_str().to_string())),
        }
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}

/// Replaces every match of option `pattern` with option `with`, which may
/// refer to groups as `${1}`.
#[derive(Debug, Clone)]
pub struct Replace {
    regex: Regex,
    replacement: String,
}

impl Replace {
    pub fn from_options(options: &Options) -> Result<Box<dyn Function>, ConfigurationError> {
        Ok(Box::new(Replace {
            regex: compile(options, "pattern")?,
            replacement: options.get_or("with", "").to_string(),
        }))
    }
}

impl Function for Replace {
    fn name(&self) -> &str {
        "replace"
    }

    fn process(&mut self, value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
        Ok(Some(
            self.regex
                .replace_all(value, self.replacement.as_str())
                .into_owned(),
        ))
    }

    fn boxed_clone(&self) -> Box<dyn Function> {
        Box::new(self.clone())
    }
}
