// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log messages are structs implementing `Display` rather than format strings
//! scattered through the engine, so wording lives in one place and every
//! message carries the same structured fields wherever it is emitted.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - record lifecycle and stream control
//! * `messages::registry` - pattern registration
//! * `messages::validation` - rule loading, validation and compilation

pub mod messages;
