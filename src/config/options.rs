// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConfigurationError;
use std::collections::BTreeMap;
use std::str::FromStr;

/// String options for one function or collector, after variable substitution.
///
/// `owner` is the function or collector name and only appears in error
/// messages. `entries` holds inline key/value tables such as a lookup's
/// mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    owner: String,
    values: BTreeMap<String, String>,
    entries: BTreeMap<String, String>,
}

impl Options {
    pub fn new(owner: &str) -> Self {
        Options {
            owner: owner.to_string(),
            ..Self::default()
        }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.values.insert(key, value);
    }

    pub fn insert_entry(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigurationError> {
        self.get(key).ok_or_else(|| ConfigurationError::MissingOption {
            owner: self.owner.clone(),
            option: key.to_string(),
        })
    }

    /// Parses `key` if present.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigurationError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| self.invalid(key, e.to_string()))
            })
            .transpose()
    }

    pub fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigurationError> {
        Ok(self.parse::<bool>(key)?.unwrap_or(default))
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn invalid(&self, key: &str, reason: impl Into<String>) -> ConfigurationError {
        ConfigurationError::InvalidOption {
            owner: self.owner.clone(),
            option: key.to_string(),
            reason: reason.into(),
        }
    }
}
