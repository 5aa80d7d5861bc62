// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Path pattern syntax.
//!
//! Supported symbols:
//! * `?` matches exactly one character
//! * `*` matches any run of characters, including none
//! * `[abc]`, `[a-z]` match one character from a class; `[!x]` or `[^x]` negate it
//! * `|` separates alternatives that share one receiver
//! * `\` makes the next character literal

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("character class starting at offset {offset} is never closed")]
    UnterminatedClass { offset: usize },

    #[error("character class starting at offset {offset} is empty")]
    EmptyClass { offset: usize },

    #[error("pattern ends with a dangling escape character")]
    TrailingEscape,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ClassItem {
    Single(char),
    Range(char, char),
}

/// A bracketed set of characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharClass {
    negated: bool,
    items: Vec<ClassItem>,
}

impl CharClass {
    pub fn matches(&self, c: char) -> bool {
        let hit = self.items.iter().any(|item| match *item {
            ClassItem::Single(x) => x == c,
            ClassItem::Range(lo, hi) => lo <= c && c <= hi,
        });
        hit != self.negated
    }
}

/// One matching unit of a pattern branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Literal(char),
    AnyOne,
    AnyRun,
    Class(CharClass),
}

/// How narrowly a pattern selects paths. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    Exact,
    Class,
    AnyOne,
    AnyRun,
    CatchAll,
}

impl Specificity {
    fn of(symbol: &Symbol) -> Self {
        match symbol {
            Symbol::Literal(_) => Specificity::Exact,
            Symbol::Class(_) => Specificity::Class,
            Symbol::AnyOne => Specificity::AnyOne,
            Symbol::AnyRun => Specificity::AnyRun,
        }
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Specificity::Exact => "exact",
            Specificity::Class => "class",
            Specificity::AnyOne => "any-one",
            Specificity::AnyRun => "any-run",
            Specificity::CatchAll => "catch-all",
        };
        f.write_str(label)
    }
}

/// A parsed path pattern: one or more alternative symbol sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    branches: Vec<Vec<Symbol>>,
    specificity: Specificity,
}

impl Pattern {
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let chars: Vec<char> = source.chars().collect();
        let mut branches = Vec::new();
        let mut current = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '\\' => {
                    let escaped = chars.get(i + 1).ok_or(PatternError::TrailingEscape)?;
                    current.push(Symbol::Literal(*escaped));
                    i += 2;
                }
                '|' => {
                    branches.push(std::mem::take(&mut current));
                    i += 1;
                }
                '?' => {
                    current.push(Symbol::AnyOne);
                    i += 1;
                }
                '*' => {
                    // Consecutive stars are one run.
                    if current.last() != Some(&Symbol::AnyRun) {
                        current.push(Symbol::AnyRun);
                    }
                    i += 1;
                }
                '[' => {
                    let (class, next) = parse_class(&chars, i)?;
                    current.push(Symbol::Class(class));
                    i = next;
                }
                c => {
                    current.push(Symbol::Literal(c));
                    i += 1;
                }
            }
        }
        branches.push(current);

        let specificity = branches
            .iter()
            .map(|branch| branch_specificity(branch))
            .max()
            .unwrap_or(Specificity::Exact);

        Ok(Pattern {
            source: source.to_string(),
            branches,
            specificity,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn branches(&self) -> &[Vec<Symbol>] {
        &self.branches
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    pub fn is_literal(&self) -> bool {
        self.specificity == Specificity::Exact
    }
}

fn branch_specificity(branch: &[Symbol]) -> Specificity {
    if !branch.is_empty() && branch.iter().all(|s| *s == Symbol::AnyRun) {
        return Specificity::CatchAll;
    }
    branch
        .iter()
        .map(Specificity::of)
        .max()
        .unwrap_or(Specificity::Exact)
}

fn parse_class(chars: &[char], start: usize) -> Result<(CharClass, usize), PatternError> {
    let mut i = start + 1;
    let negated = matches!(chars.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut items = Vec::new();
    loop {
        let c = match chars.get(i) {
            None => return Err(PatternError::UnterminatedClass { offset: start }),
            Some(']') => break,
            Some('\\') => {
                i += 1;
                *chars.get(i).ok_or(PatternError::TrailingEscape)?
            }
            Some(c) => *c,
        };
        i += 1;

        let is_range = chars.get(i) == Some(&'-') && !matches!(chars.get(i + 1), None | Some(']'));
        if is_range {
            let hi = chars[i + 1];
            items.push(ClassItem::Range(c.min(hi), c.max(hi)));
            i += 2;
        } else {
            items.push(ClassItem::Single(c));
        }
    }

    if items.is_empty() {
        return Err(PatternError::EmptyClass { offset: start });
    }
    Ok((CharClass { negated, items }, i + 1))
}
