// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The orchestrator that drives a compiled rule graph from protocol events.
//!
//! [`CompiledMorph`] is built once and shared; each stream gets its own
//! [`Morph`], which keeps the record grammar, resolves every literal's path
//! against the registry and pushes the resulting values through the graph.

mod compiled;
mod delivery;
mod morph;


pub use compiled::CompiledMorph;
pub use morph::{Morph, RecordPhase};
