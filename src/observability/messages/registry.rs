// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for path registry events.

use crate::matcher::Specificity;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A pattern was compiled into the registry.
///
/// # Log Level
/// `debug!` - Build-time detail
pub struct PatternRegistered<'a> {
    pub pattern: &'a str,
    pub receiver: usize,
    pub specificity: Specificity,
}

impl Display for PatternRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered pattern '{}' ({}) for receiver {}",
            self.pattern, self.specificity, self.receiver
        )
    }
}

impl StructuredLog for PatternRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            pattern = self.pattern,
            receiver = self.receiver,
            specificity = %self.specificity,
            "{}", self
        );
    }
}

/// A second else keyword was registered after another kind was already active.
///
/// # Log Level
/// `warn!` - The later registration is ignored
///
/// # Example
/// ```
/// use morphwood::observability::messages::registry::ElseReceiverIgnored;
///
/// let msg = ElseReceiverIgnored {
///     keyword: "_elseNested",
///     active: "_else",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct ElseReceiverIgnored<'a> {
    pub keyword: &'a str,
    pub active: &'a str,
}

impl Display for ElseReceiverIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring '{}' receiver: '{}' is already registered and only one else kind is supported",
            self.keyword, self.active
        )
    }
}

impl StructuredLog for ElseReceiverIgnored<'_> {
    fn log(&self) {
        tracing::warn!(keyword = self.keyword, active = self.active, "{}", self);
    }
}
