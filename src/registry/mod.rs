// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Maps path patterns to receivers.
//!
//! Receivers are returned most specific first (exact before class before `?`
//! before `*`), and in registration order within the same specificity.
//! Paths no pattern matches go to the else bucket, if one is registered.

use crate::matcher::{Pattern, PatternError, Specificity, WildcardTrie};
use crate::observability::messages::registry::{ElseReceiverIgnored, PatternRegistered};
use crate::observability::messages::StructuredLog;

pub const ELSE_KEYWORD: &str = "_else";
pub const ELSE_FLATTENED_KEYWORD: &str = "_elseFlattened";
pub const ELSE_NESTED_KEYWORD: &str = "_elseNested";

/// How unmatched literals are handed to the else receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElseMode {
    /// Delivered under their full path, e.g. `author.name`.
    Flattened,
    /// Delivered under their bare name inside re-created entities.
    Nested,
}

impl ElseMode {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            ELSE_KEYWORD | ELSE_FLATTENED_KEYWORD => Some(ElseMode::Flattened),
            ELSE_NESTED_KEYWORD => Some(ElseMode::Nested),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<R> {
    pattern: String,
    specificity: Specificity,
    receiver: R,
}

#[derive(Debug, Clone)]
pub struct PathRegistry<R> {
    trie: WildcardTrie<usize>,
    entries: Vec<Entry<R>>,
    else_keyword: Option<&'static str>,
    else_receivers: Vec<R>,
}

impl<R> Default for PathRegistry<R> {
    fn default() -> Self {
        PathRegistry {
            trie: WildcardTrie::new(),
            entries: Vec::new(),
            else_keyword: None,
            else_receivers: Vec::new(),
        }
    }
}

impl<R: Clone> PathRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `receiver` under `pattern`, or in the else bucket for the
    /// reserved else keywords.
    pub fn register(&mut self, pattern: &str, receiver: R) -> Result<(), PatternError> {
        if let Some(mode) = ElseMode::from_keyword(pattern) {
            self.register_else(pattern, mode, receiver);
            return Ok(());
        }

        let parsed = Pattern::parse(pattern)?;
        let index = self.entries.len();
        self.trie.insert(&parsed, index);
        self.entries.push(Entry {
            pattern: pattern.to_string(),
            specificity: parsed.specificity(),
            receiver,
        });

        PatternRegistered {
            pattern,
            receiver: index,
            specificity: parsed.specificity(),
        }
        .log();
        Ok(())
    }

    fn register_else(&mut self, keyword: &str, mode: ElseMode, receiver: R) {
        match self.else_keyword {
            Some(active) if ElseMode::from_keyword(active) != Some(mode) => {
                ElseReceiverIgnored { keyword, active }.log();
            }
            _ => {
                self.else_keyword = Some(match mode {
                    ElseMode::Nested => ELSE_NESTED_KEYWORD,
                    ElseMode::Flattened => ELSE_KEYWORD,
                });
                self.else_receivers.push(receiver);
            }
        }
    }

    /// Receivers whose pattern matches `path`, most specific first.
    pub fn resolve(&self, path: &str) -> Vec<R> {
        let mut hits = self.trie.matches(path);
        hits.sort_by_key(|&index| (self.entries[index].specificity, index));
        hits.into_iter()
            .map(|index| self.entries[index].receiver.clone())
            .collect()
    }

    pub fn has_match(&self, path: &str) -> bool {
        !self.trie.matches(path).is_empty()
    }

    pub fn else_mode(&self) -> Option<ElseMode> {
        self.else_keyword.and_then(ElseMode::from_keyword)
    }

    pub fn else_receivers(&self) -> &[R] {
        &self.else_receivers
    }

    /// Number of registered patterns, not counting else receivers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.pattern.as_str())
    }
}
