// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod load;
mod structural;

pub use config::{ConfigurationError, ConfigurationErrors};
pub use execution::{ExecutionError, ExecutionResult, FunctionFailure};
pub use load::LoadError;
pub use structural::StructuralError;

use thiserror::Error;

/// Umbrella error returned by every engine operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MorphError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationErrors),
}

impl MorphError {
    /// Whether this error aborted the record that was being processed.
    pub fn aborts_record(&self) -> bool {
        match self {
            MorphError::Structural(error) => error.aborts_record(),
            MorphError::Execution(_) | MorphError::Configuration(_) => true,
        }
    }
}
