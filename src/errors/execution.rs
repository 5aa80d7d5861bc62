// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// The underlying reason a function rejected a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FunctionFailure {
    #[error("no mapping for '{key}' in '{map}'")]
    NoMapping { map: String, key: String },

    #[error("{0}")]
    Rejected(String),
}

/// Failures raised while values flow through the dataflow graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Function '{function}' failed")]
    Function {
        function: String,
        #[source]
        source: FunctionFailure,
    },

    #[error("Feedback for '{name}' exceeded the maximum depth of {depth}")]
    FeedbackDepthExceeded { name: String, depth: usize },

    #[error("An entity fragment cannot be delivered to {target}")]
    MisroutedFragment { target: String },
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;
