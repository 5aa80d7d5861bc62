// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wildcard path matching: pattern parsing and the matching trie.

pub mod pattern;
pub mod trie;

pub use pattern::{CharClass, Pattern, PatternError, Specificity, Symbol};
pub use trie::WildcardTrie;
