// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::collectors::CollectorRegistry;
use crate::config::consts::RECORD_FLUSH_KEYWORD;
use crate::config::{FunctionConfig, RuleConfig, RuleSpec};
use crate::errors::ConfigurationError;
use crate::functions::FunctionRegistry;
use crate::matcher::Pattern;
use crate::utils::{referenced_variables, substitute_variables};
use std::collections::HashSet;

/// Validates a rule specification before anything is built from it.
///
/// Runs every check and returns all problems found rather than stopping at
/// the first one, so a broken rule file can be fixed in one pass:
///
/// 1. **Variables**: every `$[name]` reference has a definition in `vars`
/// 2. **Names**: every function and collector is in the registration tables
/// 3. **Patterns**: every source and `flush_with` pattern parses and no data
///    rule has an empty source
///
/// Option values and map references are checked when the functions and
/// collectors are constructed, which needs a successful validation first.
///
/// # Returns
///
/// * `Ok(())` - The specification can be handed to the builder
/// * `Err(Vec<ConfigurationError>)` - Every problem found
pub fn validate_rule_spec(
    spec: &RuleSpec,
    functions: &FunctionRegistry,
    collectors: &CollectorRegistry,
) -> Result<(), Vec<ConfigurationError>> {
    let mut errors = Vec::new();

    if let Err(variable_errors) = validate_variables(spec) {
        errors.extend(variable_errors);
    }

    if let Err(name_errors) = validate_names(spec, functions, collectors) {
        errors.extend(name_errors);
    }

    if let Err(pattern_errors) = validate_patterns(spec) {
        errors.extend(pattern_errors);
    }

    if spec.entity_marker.is_empty() {
        errors.push(ConfigurationError::InvalidOption {
            owner: "rules".to_string(),
            option: "entity_marker".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Calls `visit` for every rule, depth first, including `if` and
/// `entity_name` rules.
pub(crate) fn walk_rules<'a, F>(rules: &'a [RuleConfig], visit: &mut F)
where
    F: FnMut(&'a RuleConfig),
{
    for rule in rules {
        visit(rule);
        if let RuleConfig::Collect(collect) = rule {
            walk_rules(&collect.rules, visit);
            if let Some(condition) = &collect.condition {
                walk_rules(std::slice::from_ref(condition.as_ref()), visit);
            }
            if let Some(entity_name) = &collect.entity_name {
                walk_rules(std::slice::from_ref(entity_name.as_ref()), visit);
            }
        }
    }
}

fn function_texts(function: &FunctionConfig) -> Vec<&str> {
    let options = function.options.values().filter_map(|v| v.as_str());
    let entries = function.entries.values().map(String::as_str);
    options.chain(entries).collect()
}

fn rule_texts(rule: &RuleConfig) -> Vec<&str> {
    match rule {
        RuleConfig::Data(data) => {
            let mut texts = vec![data.source.as_str()];
            texts.extend(data.name.as_deref());
            texts.extend(data.functions.iter().flat_map(function_texts));
            texts
        }
        RuleConfig::Collect(collect) => {
            let mut texts = Vec::new();
            texts.extend(collect.name.as_deref());
            texts.extend(collect.value.as_deref());
            texts.extend(collect.flush_with.as_deref());
            texts.extend(collect.options.values().filter_map(|v| v.as_str()));
            texts.extend(collect.postprocess.iter().flat_map(function_texts));
            texts
        }
    }
}

/// Every `$[name]` used in the rules must be defined in `vars`. Each missing
/// variable is reported once.
fn validate_variables(spec: &RuleSpec) -> Result<(), Vec<ConfigurationError>> {
    let mut reported = HashSet::new();
    let mut errors = Vec::new();

    walk_rules(&spec.rules, &mut |rule| {
        for text in rule_texts(rule) {
            for variable in referenced_variables(text) {
                if !spec.vars.contains_key(&variable) && reported.insert(variable.clone()) {
                    errors.push(ConfigurationError::UndefinedVariable { variable });
                }
            }
        }
    });

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_names(
    spec: &RuleSpec,
    functions: &FunctionRegistry,
    collectors: &CollectorRegistry,
) -> Result<(), Vec<ConfigurationError>> {
    let mut errors = Vec::new();

    let check_functions = |configs: &[FunctionConfig], errors: &mut Vec<ConfigurationError>| {
        for config in configs {
            if !functions.is_available(&config.function) {
                errors.push(ConfigurationError::UnknownFunction {
                    function: config.function.clone(),
                });
            }
        }
    };

    walk_rules(&spec.rules, &mut |rule| match rule {
        RuleConfig::Data(data) => check_functions(&data.functions, &mut errors),
        RuleConfig::Collect(collect) => {
            if !collectors.is_available(&collect.collector) {
                errors.push(ConfigurationError::UnknownCollector {
                    collector: collect.collector.clone(),
                });
            }
            check_functions(&collect.postprocess, &mut errors);
        }
    });

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Patterns are checked after variable substitution. Patterns that still
/// reference undefined variables are skipped; those are reported separately.
fn validate_patterns(spec: &RuleSpec) -> Result<(), Vec<ConfigurationError>> {
    let mut errors = Vec::new();
    let lookup = |name: &str| spec.vars.get(name).cloned();

    let check = |pattern: &str, errors: &mut Vec<ConfigurationError>| {
        let Ok(pattern) = substitute_variables(pattern, lookup) else {
            return;
        };
        if let Err(e) = Pattern::parse(&pattern) {
            errors.push(ConfigurationError::InvalidPattern {
                pattern,
                reason: e.to_string(),
            });
        }
    };

    walk_rules(&spec.rules, &mut |rule| match rule {
        RuleConfig::Data(data) => {
            if data.source.is_empty() {
                errors.push(ConfigurationError::EmptySource);
            } else {
                check(&data.source, &mut errors);
            }
        }
        RuleConfig::Collect(collect) => {
            let flush_patterns = collect
                .flush_with
                .iter()
                .flat_map(|flush_with| flush_with.split('|'))
                .filter(|p| *p != RECORD_FLUSH_KEYWORD);
            for pattern in flush_patterns {
                check(pattern, &mut errors);
            }
        }
    });

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
