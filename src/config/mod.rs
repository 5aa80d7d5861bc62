// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod builder;
mod loader;
mod options;
mod validation;

pub mod consts;

pub use builder::MorphBuilder;
pub use loader::{
    load_and_validate_rules, load_rules, parse_rules, CollectRule, DataRule, FunctionConfig,
    RuleConfig, RuleFormat, RuleSpec,
};
pub use options::Options;
pub use validation::validate_rule_spec;
