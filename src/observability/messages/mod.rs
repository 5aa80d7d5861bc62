// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for human-readable output and
//! [`StructuredLog`] to emit itself through `tracing` with its fields attached.
//!
//! # Organization
//!
//! * `engine` - record lifecycle, aborts, feedback and stream control
//! * `registry` - pattern registration and else-bucket handling
//! * `validation` - rule loading, validation failures and compilation
//!
//! # Usage Pattern
//!
//! ```rust
//! use morphwood::observability::messages::engine::StreamClosed;
//! use morphwood::observability::messages::StructuredLog;
//!
//! let msg = StreamClosed { records_seen: 12 };
//!
//! msg.log();
//! tracing::info!("{}", msg);
//! ```

pub mod engine;
pub mod registry;
pub mod validation;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emits the message at its level with its fields attached.
    fn log(&self);
}
