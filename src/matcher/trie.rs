// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::pattern::{CharClass, Pattern, Symbol};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct TrieNode<P> {
    literals: HashMap<char, usize>,
    any_one: Option<usize>,
    any_run: Option<usize>,
    classes: Vec<(CharClass, usize)>,
    /// Set on the node reached through `*`; it consumes any character and stays put.
    self_loop: bool,
    payloads: Vec<P>,
}

impl<P> TrieNode<P> {
    fn new(self_loop: bool) -> Self {
        TrieNode {
            literals: HashMap::new(),
            any_one: None,
            any_run: None,
            classes: Vec::new(),
            self_loop,
            payloads: Vec::new(),
        }
    }

    fn has_wildcard_edges(&self) -> bool {
        self.self_loop || self.any_one.is_some() || !self.classes.is_empty()
    }
}

/// A character trie whose edges may be wildcards.
///
/// Nodes live in an arena indexed by position; index 0 is the root. Matching
/// walks the set of all nodes reachable by the characters read so far, so the
/// cost of a lookup grows with the path length times the number of wildcard
/// branches alive at once rather than with the number of stored patterns.
#[derive(Debug, Clone)]
pub struct WildcardTrie<P> {
    nodes: Vec<TrieNode<P>>,
    wildcards: bool,
}

impl<P: Clone + Ord> Default for WildcardTrie<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone + Ord> WildcardTrie<P> {
    pub fn new() -> Self {
        WildcardTrie {
            nodes: vec![TrieNode::new(false)],
            wildcards: false,
        }
    }

    /// Stores `payload` at the end of every branch of `pattern`.
    pub fn insert(&mut self, pattern: &Pattern, payload: P) {
        for branch in pattern.branches() {
            let end = self.insert_branch(branch);
            let payloads = &mut self.nodes[end].payloads;
            if !payloads.contains(&payload) {
                payloads.push(payload.clone());
            }
        }
    }

    fn insert_branch(&mut self, branch: &[Symbol]) -> usize {
        let mut node = 0;
        for symbol in branch {
            node = match symbol {
                Symbol::Literal(c) => match self.nodes[node].literals.get(c) {
                    Some(&next) => next,
                    None => {
                        let next = self.push_node(false);
                        self.nodes[node].literals.insert(*c, next);
                        next
                    }
                },
                Symbol::AnyOne => match self.nodes[node].any_one {
                    Some(next) => next,
                    None => {
                        let next = self.push_node(false);
                        self.nodes[node].any_one = Some(next);
                        next
                    }
                },
                Symbol::Class(class) => {
                    let existing = self.nodes[node]
                        .classes
                        .iter()
                        .find(|(c, _)| c == class)
                        .map(|(_, next)| *next);
                    match existing {
                        Some(next) => next,
                        None => {
                            let next = self.push_node(false);
                            self.nodes[node].classes.push((class.clone(), next));
                            next
                        }
                    }
                }
                Symbol::AnyRun => match self.nodes[node].any_run {
                    Some(next) => next,
                    None => {
                        let next = self.push_node(true);
                        self.nodes[node].any_run = Some(next);
                        next
                    }
                },
            };
            if !matches!(symbol, Symbol::Literal(_)) {
                self.wildcards = true;
            }
        }
        node
    }

    fn push_node(&mut self, self_loop: bool) -> usize {
        self.nodes.push(TrieNode::new(self_loop));
        self.nodes.len() - 1
    }

    /// Every payload whose pattern matches `path`, each once, in ascending order.
    pub fn matches(&self, path: &str) -> Vec<P> {
        let mut result = if self.wildcards {
            self.walk(path)
        } else {
            self.walk_literal(path)
        };
        result.sort();
        result.dedup();
        result
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|node| node.payloads.is_empty())
    }

    fn walk_literal(&self, path: &str) -> Vec<P> {
        let mut node = 0;
        for c in path.chars() {
            match self.nodes[node].literals.get(&c) {
                Some(&next) => node = next,
                None => return Vec::new(),
            }
        }
        self.nodes[node].payloads.clone()
    }

    fn walk(&self, path: &str) -> Vec<P> {
        let mut active = Vec::new();
        let mut seen = HashSet::new();
        self.activate(0, &mut active, &mut seen);

        for c in path.chars() {
            if active.is_empty() {
                return Vec::new();
            }
            let mut next = Vec::new();
            let mut next_seen = HashSet::new();
            for &index in &active {
                let node = &self.nodes[index];
                if let Some(&target) = node.literals.get(&c) {
                    self.activate(target, &mut next, &mut next_seen);
                }
                if !node.has_wildcard_edges() {
                    continue;
                }
                if node.self_loop {
                    self.activate(index, &mut next, &mut next_seen);
                }
                if let Some(target) = node.any_one {
                    self.activate(target, &mut next, &mut next_seen);
                }
                for (class, target) in &node.classes {
                    if class.matches(c) {
                        self.activate(*target, &mut next, &mut next_seen);
                    }
                }
            }
            active = next;
        }

        active
            .iter()
            .flat_map(|&index| self.nodes[index].payloads.iter().cloned())
            .collect()
    }

    /// Adds `index` and, since `*` may match nothing, every run node hanging off it.
    fn activate(&self, index: usize, active: &mut Vec<usize>, seen: &mut HashSet<usize>) {
        let mut current = Some(index);
        while let Some(i) = current {
            if !seen.insert(i) {
                return;
            }
            active.push(i);
            current = self.nodes[i].any_run;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie_with(patterns: &[&'static str]) -> WildcardTrie<&'static str> {
        let mut trie = WildcardTrie::new();
        for pattern in patterns {
            trie.insert(&Pattern::parse(pattern).unwrap(), *pattern);
        }
        trie
    }

    #[test]
    fn test_wildcard_semantics() {
        struct TestCase {
            name: &'static str,
            pattern: &'static str,
            matching: Vec<&'static str>,
            not_matching: Vec<&'static str>,
        }

        let test_cases = vec![
            TestCase {
                name: "literal",
                pattern: "abc",
                matching: vec!["abc"],
                not_matching: vec!["ab", "abcd", ""],
            },
            TestCase {
                name: "empty pattern only matches empty path",
                pattern: "",
                matching: vec![""],
                not_matching: vec!["a"],
            },
            TestCase {
                name: "trailing star includes empty suffix",
                pattern: "a*",
                matching: vec!["a", "ab", "abc"],
                not_matching: vec!["", "ba"],
            },
            TestCase {
                name: "leading star",
                pattern: "*c",
                matching: vec!["c", "abc", "cc"],
                not_matching: vec!["ca", ""],
            },
            TestCase {
                name: "inner star",
                pattern: "a*c",
                matching: vec!["ac", "abc", "abbbc", "acc"],
                not_matching: vec!["ab", "ca"],
            },
            TestCase {
                name: "double star",
                pattern: "a*b*c",
                matching: vec!["abc", "aXbYc", "abbc", "abcbc"],
                not_matching: vec!["acb", "ab"],
            },
            TestCase {
                name: "question mark",
                pattern: "a?c",
                matching: vec!["abc", "azc"],
                not_matching: vec!["ac", "abbc"],
            },
            TestCase {
                name: "class",
                pattern: "00[1-3]",
                matching: vec!["001", "003"],
                not_matching: vec!["004", "00"],
            },
            TestCase {
                name: "alternation",
                pattern: "ab|cd",
                matching: vec!["ab", "cd"],
                not_matching: vec!["abcd", "a"],
            },
            TestCase {
                name: "catch all",
                pattern: "*",
                matching: vec!["", "x", "entity.literal"],
                not_matching: vec![],
            },
        ];

        for tc in test_cases {
            let trie = trie_with(&[tc.pattern]);
            for path in &tc.matching {
                assert_eq!(
                    trie.matches(path),
                    vec![tc.pattern],
                    "case '{}' should match '{}'",
                    tc.name,
                    path
                );
            }
            for path in &tc.not_matching {
                assert!(
                    trie.matches(path).is_empty(),
                    "case '{}' should not match '{}'",
                    tc.name,
                    path
                );
            }
        }
    }

    #[test]
    fn test_overlapping_patterns_all_returned_in_order() {
        let trie = trie_with(&["a*", "ab", "a?", "*b", "b"]);

        assert_eq!(trie.matches("ab"), vec!["*b", "a*", "a?", "ab"]);
        assert_eq!(trie.matches("b"), vec!["*b", "b"]);
        assert_eq!(trie.matches("a"), vec!["a*"]);
        assert!(trie.matches("c").is_empty());
    }

    #[test]
    fn test_alternation_branches_share_payload_once() {
        let mut trie = WildcardTrie::new();
        trie.insert(&Pattern::parse("a*|ab|*b").unwrap(), 7usize);

        assert_eq!(trie.matches("ab"), vec![7]);
        assert_eq!(trie.matches("xb"), vec![7]);
    }

    #[test]
    fn test_same_pattern_twice_keeps_both_payloads() {
        let mut trie = WildcardTrie::new();
        trie.insert(&Pattern::parse("x").unwrap(), 2usize);
        trie.insert(&Pattern::parse("x").unwrap(), 1usize);
        trie.insert(&Pattern::parse("x").unwrap(), 2usize);

        assert_eq!(trie.matches("x"), vec![1, 2]);
    }

    #[test]
    fn test_literal_fast_path() {
        let trie = trie_with(&["title", "title.sub"]);
        assert!(!trie.wildcards);
        assert_eq!(trie.matches("title"), vec!["title"]);
        assert_eq!(trie.matches("title.sub"), vec!["title.sub"]);
        assert!(trie.matches("titl").is_empty());
        assert!(!trie.is_empty());
    }
}
