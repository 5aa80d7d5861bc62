// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Violations of the event protocol's call order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("'{event}' received outside of a record")]
    NoOpenRecord { event: &'static str },

    #[error("start_record received while record '{open}' is still open")]
    RecordAlreadyOpen { open: String },

    #[error("Record identifier must not be null")]
    MissingRecordId,

    #[error("Entity name must not be null")]
    MissingEntityName,

    #[error("end_entity received without an open entity")]
    UnbalancedEntityEnd,

    #[error("end_record received with {open} entities still open")]
    UnclosedEntities { open: usize },
}

impl StructuralError {
    /// Whether the violation aborts the current record.
    ///
    /// Null identifiers and names are reported to the caller but the frame is
    /// still pushed, so the stream stays balanced and processing continues.
    pub fn aborts_record(&self) -> bool {
        !matches!(
            self,
            StructuralError::MissingRecordId | StructuralError::MissingEntityName
        )
    }
}
