// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod collectors; // stateful multi-source nodes
pub mod config;     // rule specs, loading, validation, compilation
pub mod dataflow;   // named values and the node graph
pub mod engine;     // the record-driven orchestrator
pub mod errors;     // error handling
pub mod events;     // the hierarchical event protocol
pub mod functions;  // value transformations
pub mod maps;       // lookup tables
pub mod matcher;    // wildcard patterns and the trie
pub mod observability;
pub mod registry;   // pattern -> receiver resolution
pub mod utils;
