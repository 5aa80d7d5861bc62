// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::collectors::CollectorRegistry;
use crate::config::consts::{DEFAULT_ENTITY_MARKER, DEFAULT_MAX_FEEDBACK_DEPTH};
use crate::errors::LoadError;
use crate::functions::FunctionRegistry;
use crate::observability::messages::validation::{ConfigurationRejected, RulesLoaded};
use crate::observability::messages::StructuredLog;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A complete set of transformation rules.
///
/// This is the declarative form a morph is built from. It is usually loaded
/// from a YAML or TOML file, but can just as well be produced by another
/// front end and handed to [`MorphBuilder`](crate::config::MorphBuilder).
///
/// # Fields
/// * `entity_marker` - Separator used when joining entity names into paths (default `.`)
/// * `max_feedback_depth` - Bound on nested feedback hops (default 16)
/// * `vars` - Values for `$[name]` references anywhere in the rules
/// * `maps` - Named lookup tables
/// * `rules` - Top-level rules, in registration order
///
/// # Example
/// ```yaml
/// vars:
///   lang: ger
/// maps:
///   languages:
///     ger: German
///     __default: unknown
/// rules:
///   - type: data
///     source: "041.$[lang]"
///     name: language
///     functions:
///       - function: lookup
///         options: { in: languages }
///   - type: collect
///     collector: combine
///     name: author
///     value: "${last}, ${first}"
///     rules:
///       - { type: data, source: "100.a", name: last }
///       - { type: data, source: "100.b", name: first }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    #[serde(default = "default_entity_marker")]
    pub entity_marker: String,
    #[serde(default)]
    pub max_feedback_depth: Option<usize>,
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    #[serde(default)]
    pub maps: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

fn default_entity_marker() -> String {
    DEFAULT_ENTITY_MARKER.to_string()
}

impl RuleSpec {
    pub fn feedback_depth(&self) -> usize {
        self.max_feedback_depth.unwrap_or(DEFAULT_MAX_FEEDBACK_DEPTH)
    }
}

impl Default for RuleSpec {
    fn default() -> Self {
        RuleSpec {
            entity_marker: default_entity_marker(),
            max_feedback_depth: None,
            vars: BTreeMap::new(),
            maps: BTreeMap::new(),
            rules: Vec::new(),
        }
    }
}

/// One rule: either a data rule reading from the stream or a collector
/// gathering values from nested rules.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleConfig {
    Data(DataRule),
    Collect(CollectRule),
}

impl RuleConfig {
    pub fn kind(&self) -> &str {
        match self {
            RuleConfig::Data(_) => "data",
            RuleConfig::Collect(collect) => &collect.collector,
        }
    }
}

/// Reads values whose path matches `source`, optionally renames them and
/// passes them through `functions` in order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DataRule {
    pub source: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub functions: Vec<FunctionConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CollectRule {
    /// Collector kind, e.g. `combine` or `entity`
    pub collector: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    /// `|`-separated paths that flush the collector; `record` is the record end
    #[serde(default)]
    pub flush_with: Option<String>,
    #[serde(default)]
    pub same_entity: bool,
    #[serde(default)]
    pub reset: bool,
    #[serde(rename = "if", default)]
    pub condition: Option<Box<RuleConfig>>,
    #[serde(default)]
    pub entity_name: Option<Box<RuleConfig>>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    /// Functions applied to the collector's own output
    #[serde(default)]
    pub postprocess: Vec<FunctionConfig>,
    #[serde(default)]
    pub options: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FunctionConfig {
    pub function: String,
    #[serde(default)]
    pub options: BTreeMap<String, serde_yaml::Value>,
    /// Inline key/value table for lookup-style functions
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl FunctionConfig {
    pub fn named(function: &str) -> Self {
        FunctionConfig {
            function: function.to_string(),
            options: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }
}

/// Rule file formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Yaml,
    Toml,
}

impl RuleFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Ok(RuleFormat::Yaml),
            "toml" => Ok(RuleFormat::Toml),
            _ => Err(LoadError::UnsupportedFormat { extension }),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RuleFormat::Yaml => "yaml",
            RuleFormat::Toml => "toml",
        }
    }
}

pub fn parse_rules(content: &str, format: RuleFormat) -> Result<RuleSpec, LoadError> {
    let spec = match format {
        RuleFormat::Yaml => serde_yaml::from_str(content)?,
        RuleFormat::Toml => toml::from_str(content)?,
    };
    Ok(spec)
}

pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<RuleSpec, LoadError> {
    let path = path.as_ref();
    let format = RuleFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let spec = parse_rules(&content, format)?;

    RulesLoaded {
        path: &path.display().to_string(),
        format: format.label(),
        rule_count: spec.rules.len(),
    }
    .log();
    Ok(spec)
}

/// Loads a rule file and checks it against the built-in function and
/// collector tables.
pub fn load_and_validate_rules<P: AsRef<Path>>(path: P) -> Result<RuleSpec, LoadError> {
    let spec = load_rules(path)?;

    if let Err(errors) = crate::config::validate_rule_spec(
        &spec,
        &FunctionRegistry::with_builtins(),
        &CollectorRegistry::with_builtins(),
    ) {
        let errors = errors.into();
        ConfigurationRejected { errors: &errors }.log();
        return Err(LoadError::Configuration(errors));
    }

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_rules() {
        let yaml = r#"
rules:
  - type: data
    source: "title"
  - type: collect
    collector: combine
    name: author
    value: "${a} ${b}"
    flush_with: "record"
    if: { type: data, source: "flag" }
    rules:
      - { type: data, source: "a", name: a }
      - type: data
        source: "b"
        name: b
        functions:
          - function: trim
          - function: compose
            options: { prefix: "<", postfix: 1 }
"#;

        let spec: RuleSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.entity_marker, ".");
        assert_eq!(spec.feedback_depth(), DEFAULT_MAX_FEEDBACK_DEPTH);
        assert_eq!(spec.rules.len(), 2);

        let RuleConfig::Collect(collect) = &spec.rules[1] else {
            panic!("expected a collect rule");
        };
        assert_eq!(collect.collector, "combine");
        assert_eq!(collect.flush_with.as_deref(), Some("record"));
        assert!(collect.condition.is_some());
        assert_eq!(collect.rules.len(), 2);

        let RuleConfig::Data(data) = &collect.rules[1] else {
            panic!("expected a data rule");
        };
        assert_eq!(data.functions.len(), 2);
        assert_eq!(data.functions[1].options.len(), 2);
    }

    #[test]
    fn parse_toml_rules() {
        let toml = r#"
entity_marker = "/"
max_feedback_depth = 4

[vars]
lang = "ger"

[maps.languages]
ger = "German"

[[rules]]
type = "data"
source = "041/$[lang]"
name = "language"

[[rules.functions]]
function = "lookup"
options = { in = "languages" }
"#;

        let spec = parse_rules(toml, RuleFormat::Toml).unwrap();
        assert_eq!(spec.entity_marker, "/");
        assert_eq!(spec.feedback_depth(), 4);
        assert_eq!(spec.vars.get("lang").map(String::as_str), Some("ger"));
        assert_eq!(spec.maps["languages"]["ger"], "German");
        assert_eq!(spec.rules[0].kind(), "data");
    }

    #[test]
    fn test_format_from_extension() {
        struct TestCase {
            name: &'static str,
            path: &'static str,
            expected: Option<RuleFormat>,
        }

        let test_cases = vec![
            TestCase {
                name: "yaml",
                path: "rules.yaml",
                expected: Some(RuleFormat::Yaml),
            },
            TestCase {
                name: "short yaml",
                path: "dir/rules.YML",
                expected: Some(RuleFormat::Yaml),
            },
            TestCase {
                name: "toml",
                path: "rules.toml",
                expected: Some(RuleFormat::Toml),
            },
            TestCase {
                name: "json is not supported",
                path: "rules.json",
                expected: None,
            },
            TestCase {
                name: "no extension",
                path: "rules",
                expected: None,
            },
        ];

        for tc in test_cases {
            let format = RuleFormat::from_path(Path::new(tc.path)).ok();
            assert_eq!(format, tc.expected, "case: {}", tc.name);
        }
    }

    #[test]
    fn test_load_and_validate_reports_all_errors() {
        let yaml = r#"
rules:
  - type: data
    source: "a[b"
    functions:
      - function: frobnicate
  - type: collect
    collector: median
    rules:
      - { type: data, source: "$[missing]" }
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, yaml).unwrap();

        let Err(LoadError::Configuration(errors)) = load_and_validate_rules(&path) else {
            panic!("expected configuration errors");
        };
        assert_eq!(errors.len(), 4, "{}", errors);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_rules(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
