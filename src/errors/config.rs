// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors detected while turning a rule specification into a compiled morph.
///
/// Validation collects every problem it can find before failing, so these are
/// usually reported together as [`ConfigurationErrors`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A rule names a function that is not in the function table
    UnknownFunction {
        /// Name as written in the rule
        function: String,
    },
    /// A rule names a collector kind that is not in the collector table
    UnknownCollector {
        /// Name as written in the rule
        collector: String,
    },
    /// A function references a lookup map that was never declared
    UnknownMap {
        /// The function doing the lookup
        function: String,
        /// The missing map name
        map: String,
    },
    /// A source or flush pattern could not be parsed
    InvalidPattern {
        /// The pattern as written
        pattern: String,
        /// Parser diagnostic
        reason: String,
    },
    /// An option is present but its value is unusable
    InvalidOption {
        /// Function or collector owning the option
        owner: String,
        /// Option key
        option: String,
        /// What is wrong with it
        reason: String,
    },
    /// A required option is absent
    MissingOption {
        /// Function or collector owning the option
        owner: String,
        /// Option key
        option: String,
    },
    /// A `$[name]` reference has no definition in `vars`
    UndefinedVariable {
        /// Variable name without delimiters
        variable: String,
    },
    /// A rule is nested somewhere it cannot deliver to
    InvalidNesting {
        /// Kind of the misplaced rule
        rule: String,
        /// Kind of the enclosing rule or output
        parent: String,
    },
    /// A data rule has an empty source pattern
    EmptySource,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::UnknownFunction { function } => {
                write!(f, "Unknown function '{}'", function)
            }
            ConfigurationError::UnknownCollector { collector } => {
                write!(f, "Unknown collector '{}'", collector)
            }
            ConfigurationError::UnknownMap { function, map } => {
                write!(
                    f,
                    "Function '{}' references map '{}' which is not declared",
                    function, map
                )
            }
            ConfigurationError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid pattern '{}': {}", pattern, reason)
            }
            ConfigurationError::InvalidOption {
                owner,
                option,
                reason,
            } => {
                write!(
                    f,
                    "Invalid option '{}' for '{}': {}",
                    option, owner, reason
                )
            }
            ConfigurationError::MissingOption { owner, option } => {
                write!(f, "'{}' requires option '{}'", owner, option)
            }
            ConfigurationError::UndefinedVariable { variable } => {
                write!(f, "Variable '$[{}]' is not defined", variable)
            }
            ConfigurationError::InvalidNesting { rule, parent } => {
                write!(f, "A '{}' rule cannot be nested inside '{}'", rule, parent)
            }
            ConfigurationError::EmptySource => {
                write!(f, "Data rule has an empty source pattern")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Every configuration problem found in one build attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationErrors(pub Vec<ConfigurationError>);

impl ConfigurationErrors {
    pub fn iter(&self) -> std::slice::Iter<'_, ConfigurationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ConfigurationError>> for ConfigurationErrors {
    fn from(errors: Vec<ConfigurationError>) -> Self {
        ConfigurationErrors(errors)
    }
}

impl fmt::Display for ConfigurationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration validation failed:")?;
        for error in &self.0 {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigurationErrors {}
