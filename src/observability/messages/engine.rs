// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the record lifecycle of a running morph.
//!
//! This module contains message types for logging events related to:
//! * Record completion and abort
//! * Feedback dispatch
//! * Stream reset and close

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A record finished and its buffered output was forwarded downstream.
///
/// # Log Level
/// `debug!` - Per-record detail
///
/// # Example
/// ```
/// use morphwood::observability::messages::engine::RecordCompleted;
///
/// let msg = RecordCompleted {
///     record_id: "rec-1",
///     record_count: 1,
///     event_count: 7,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct RecordCompleted<'a> {
    pub record_id: &'a str,
    pub record_count: u64,
    pub event_count: usize,
}

impl Display for RecordCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Record '{}' (#{}) completed, forwarding {} events",
            self.record_id, self.record_count, self.event_count
        )
    }
}

impl StructuredLog for RecordCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            record_id = self.record_id,
            record_count = self.record_count,
            event_count = self.event_count,
            "{}", self
        );
    }
}

/// A record was aborted; its output and in-flight node state were discarded.
///
/// # Log Level
/// `warn!` - Data was dropped
///
/// # Example
/// ```
/// use morphwood::observability::messages::engine::RecordAborted;
/// use morphwood::errors::StructuralError;
///
/// let error = StructuralError::UnbalancedEntityEnd;
/// let msg = RecordAborted {
///     record_id: "rec-9",
///     record_count: 9,
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct RecordAborted<'a> {
    pub record_id: &'a str,
    pub record_count: u64,
    pub error: &'a dyn std::error::Error,
}

impl Display for RecordAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Record '{}' (#{}) aborted: {}",
            self.record_id, self.record_count, self.error
        )
    }
}

impl StructuredLog for RecordAborted<'_> {
    fn log(&self) {
        tracing::warn!(
            record_id = self.record_id,
            record_count = self.record_count,
            error = %self.error,
            "{}", self
        );
    }
}

/// A value whose name starts with the feedback character re-entered the registry.
///
/// # Log Level
/// `trace!` - Very chatty
pub struct FeedbackDispatched<'a> {
    pub name: &'a str,
    pub depth: usize,
    pub receivers: usize,
}

impl Display for FeedbackDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Feedback '{}' at depth {} reached {} receivers",
            self.name, self.depth, self.receivers
        )
    }
}

impl StructuredLog for FeedbackDispatched<'_> {
    fn log(&self) {
        tracing::trace!(
            name = self.name,
            depth = self.depth,
            receivers = self.receivers,
            "{}", self
        );
    }
}

/// The stream was reset; all per-stream state was cleared.
///
/// # Log Level
/// `info!` - Stream control event
pub struct StreamReset {
    pub records_seen: u64,
}

impl Display for StreamReset {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stream reset after {} records", self.records_seen)
    }
}

impl StructuredLog for StreamReset {
    fn log(&self) {
        tracing::info!(records_seen = self.records_seen, "{}", self);
    }
}

/// The stream was closed and the close was forwarded downstream.
///
/// # Log Level
/// `info!` - Stream control event
pub struct StreamClosed {
    pub records_seen: u64,
}

impl Display for StreamClosed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stream closed after {} records", self.records_seen)
    }
}

impl StructuredLog for StreamClosed {
    fn log(&self) {
        tracing::info!(records_seen = self.records_seen, "{}", self);
    }
}
