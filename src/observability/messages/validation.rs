// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for rule loading, validation and compilation.
//!
//! This module contains message types for logging events related to:
//! * Rule files being loaded
//! * Rule specifications rejected by validation
//! * Successful compilation into a morph

use crate::errors::ConfigurationErrors;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A rule file was read and parsed.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use morphwood::observability::messages::validation::RulesLoaded;
///
/// let msg = RulesLoaded {
///     path: "rules/marc.yaml",
///     format: "yaml",
///     rule_count: 12,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RulesLoaded<'a> {
    pub path: &'a str,
    pub format: &'a str,
    pub rule_count: usize,
}

impl Display for RulesLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} top-level rules from '{}' ({})",
            self.rule_count, self.path, self.format
        )
    }
}

impl StructuredLog for RulesLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            format = self.format,
            rule_count = self.rule_count,
            "{}", self
        );
    }
}

/// A rule specification failed validation.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ConfigurationRejected<'a> {
    pub errors: &'a ConfigurationErrors,
}

impl Display for ConfigurationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rule specification rejected with {} errors",
            self.errors.len()
        )
    }
}

impl StructuredLog for ConfigurationRejected<'_> {
    fn log(&self) {
        for error in self.errors.iter() {
            tracing::error!(error = %error, "Configuration error");
        }
        tracing::error!(error_count = self.errors.len(), "{}", self);
    }
}

/// A rule specification was compiled into a shareable morph.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use morphwood::observability::messages::validation::MorphCompiled;
///
/// let msg = MorphCompiled {
///     node_count: 9,
///     pattern_count: 4,
///     collector_count: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct MorphCompiled {
    pub node_count: usize,
    pub pattern_count: usize,
    pub collector_count: usize,
}

impl Display for MorphCompiled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled morph: {} nodes, {} patterns, {} collectors",
            self.node_count, self.pattern_count, self.collector_count
        )
    }
}

impl StructuredLog for MorphCompiled {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            pattern_count = self.pattern_count,
            collector_count = self.collector_count,
            "{}", self
        );
    }
}
