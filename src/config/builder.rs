// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::collectors::{Collect, CollectorFlags, CollectorRegistry, CollectorSpec};
use crate::config::consts::{FEEDBACK_CHAR, RECORD_FLUSH_KEYWORD};
use crate::config::{
    load_rules, validate_rule_spec, CollectRule, DataRule, FunctionConfig, Options, RuleConfig,
    RuleSpec,
};
use crate::dataflow::{EdgeRole, Graph, NodeId, NodeKind, Target};
use crate::engine::CompiledMorph;
use crate::errors::{ConfigurationError, ConfigurationErrors, LoadError};
use crate::functions::{Function, FunctionRegistry};
use crate::maps::{MapStore, Maps};
use crate::observability::messages::validation::{ConfigurationRejected, MorphCompiled};
use crate::observability::messages::StructuredLog;
use crate::registry::PathRegistry;
use crate::utils::substitute_variables;
use std::collections::BTreeMap;
use std::path::Path;

/// Compiles a [`RuleSpec`] into an immutable [`CompiledMorph`].
///
/// The builder owns the function and collector registration tables and any
/// maps supplied by the application. Maps declared in the rule file are
/// added on top of these at build time.
///
/// # Example
/// ```
/// use morphwood::config::{parse_rules, MorphBuilder, RuleFormat};
///
/// let spec = parse_rules(
///     "rules:\n  - { type: data, source: title, name: dc_title }\n",
///     RuleFormat::Yaml,
/// )
/// .unwrap();
/// let compiled = MorphBuilder::new().build(&spec).unwrap();
/// assert_eq!(compiled.pattern_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MorphBuilder {
    functions: FunctionRegistry,
    collectors: CollectorRegistry,
    maps: MapStore,
}

impl MorphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_collectors(mut self, collectors: CollectorRegistry) -> Self {
        self.collectors = collectors;
        self
    }

    /// Adds a map that rules can reference by name.
    pub fn with_map<I, K, V>(mut self, name: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.maps.put_map(name, entries);
        self
    }

    pub fn register_function<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Function>, ConfigurationError> + Send + Sync + 'static,
    {
        self.functions.register(name, constructor);
    }

    pub fn register_collector<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Collect>, ConfigurationError> + Send + Sync + 'static,
    {
        self.collectors.register(name, constructor);
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn collectors(&self) -> &CollectorRegistry {
        &self.collectors
    }

    /// Loads a rule file and builds it with this builder's tables.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<CompiledMorph, LoadError> {
        let spec = load_rules(path)?;
        Ok(self.build(&spec)?)
    }

    /// Validates and compiles `spec`. Every problem found is reported; no
    /// partially built morph is ever returned.
    pub fn build(&self, spec: &RuleSpec) -> Result<CompiledMorph, ConfigurationErrors> {
        if let Err(errors) = validate_rule_spec(spec, &self.functions, &self.collectors) {
            return Err(self.reject(errors));
        }

        let mut build = Build::new(self, spec);
        let top = Parent::output();
        for rule in &spec.rules {
            build.rule(rule, &top);
        }

        if !build.errors.is_empty() {
            return Err(self.reject(build.errors));
        }

        let compiled = CompiledMorph::new(
            build.registry,
            build.graph,
            build.flush_order,
            build.entity_flushes,
            build.maps,
            spec.entity_marker.clone(),
            spec.feedback_depth(),
        );
        MorphCompiled {
            node_count: compiled.node_count(),
            pattern_count: compiled.pattern_count(),
            collector_count: compiled.collector_count(),
        }
        .log();
        Ok(compiled)
    }

    fn reject(&self, errors: Vec<ConfigurationError>) -> ConfigurationErrors {
        let errors = ConfigurationErrors::from(errors);
        ConfigurationRejected { errors: &errors }.log();
        errors
    }
}

/// Where a rule's output goes and what it may send there.
#[derive(Debug, Clone)]
struct Parent {
    target: Target,
    role: EdgeRole,
    accepts_fragments: bool,
    label: String,
}

impl Parent {
    fn output() -> Self {
        Parent {
            target: Target::Output,
            role: EdgeRole::Value,
            accepts_fragments: true,
            label: "output".to_string(),
        }
    }

    fn collector(node: NodeId, role: EdgeRole, accepts_fragments: bool, kind: &str) -> Self {
        Parent {
            target: Target::Node(node),
            role,
            accepts_fragments: accepts_fragments && role == EdgeRole::Value,
            label: format!("collector '{}'", kind),
        }
    }

    /// Top-level outputs with a fixed `@name` go straight back into the registry.
    fn target_for(&self, name: Option<&str>) -> Target {
        match (self.target, name) {
            (Target::Output, Some(name)) if name.starts_with(FEEDBACK_CHAR) => Target::Feedback,
            (target, _) => target,
        }
    }
}

struct Build<'a> {
    builder: &'a MorphBuilder,
    vars: &'a BTreeMap<String, String>,
    entity_marker: &'a str,
    graph: Graph,
    registry: PathRegistry<NodeId>,
    flush_order: Vec<NodeId>,
    /// Same-entity collectors and the entity depth that flushes them.
    entity_flushes: Vec<(usize, NodeId)>,
    maps: MapStore,
    errors: Vec<ConfigurationError>,
}

impl<'a> Build<'a> {
    fn new(builder: &'a MorphBuilder, spec: &'a RuleSpec) -> Self {
        let mut maps = builder.maps.clone();
        for (map, entries) in &spec.maps {
            for (key, value) in entries {
                maps.put_value(map, key, value);
            }
        }

        Build {
            builder,
            vars: &spec.vars,
            entity_marker: &spec.entity_marker,
            graph: Graph::new(),
            registry: PathRegistry::new(),
            flush_order: Vec::new(),
            entity_flushes: Vec::new(),
            maps,
            errors: Vec::new(),
        }
    }

    fn rule(&mut self, rule: &RuleConfig, parent: &Parent) {
        match rule {
            RuleConfig::Data(data) => self.data(data, parent),
            RuleConfig::Collect(collect) => self.collect(collect, parent),
        }
    }

    fn data(&mut self, rule: &DataRule, parent: &Parent) {
        let name = rule.name.as_deref().map(|name| self.substitute(name));
        let node = self.graph.add_node(NodeKind::Data { name: name.clone() });

        let source = self.substitute(&rule.source);
        self.register(&source, node);

        let last = self.functions(node, &rule.functions);
        self.graph
            .connect(last, parent.target_for(name.as_deref()), parent.role);
    }

    fn collect(&mut self, rule: &CollectRule, parent: &Parent) {
        let options = self.options(&rule.collector, &rule.options, &BTreeMap::new());
        let collect = match self.builder.collectors.create(&rule.collector, &options) {
            Ok(collect) => collect,
            Err(e) => {
                self.errors.push(e);
                return;
            }
        };
        let produces_fragments = collect.produces_fragments();
        let accepts_fragments = collect.accepts_fragments();

        let flush_with = rule.flush_with.as_deref().map(|f| self.substitute(f));
        let entity_depth = if rule.same_entity {
            self.nesting_depth(&rule.rules)
        } else {
            0
        };
        let flags = CollectorFlags {
            wait_for_flush: flush_with.is_some(),
            same_entity: rule.same_entity,
            flush_on_entity_end: entity_depth > 0,
            reset: rule.reset,
            flush_on_record_end: flush_with
                .as_deref()
                .map_or(true, |f| f.split('|').any(|p| p == RECORD_FLUSH_KEYWORD)),
        };

        let mut spec = CollectorSpec::new(collect).with_flags(flags);
        if let Some(name) = &rule.name {
            spec = spec.with_name(self.substitute(name));
        }
        if let Some(value) = &rule.value {
            spec = spec.with_value(self.substitute(value));
        }
        let name = spec.name.clone();
        let node = self.graph.add_node(NodeKind::Collector(spec));

        let children = Parent::collector(node, EdgeRole::Value, accepts_fragments, &rule.collector);
        for child in &rule.rules {
            self.rule(child, &children);
        }
        if let Some(condition) = &rule.condition {
            let parent = Parent::collector(node, EdgeRole::Condition, false, &rule.collector);
            self.rule(condition, &parent);
        }
        if let Some(entity_name) = &rule.entity_name {
            let parent = Parent::collector(node, EdgeRole::EntityName, false, &rule.collector);
            self.rule(entity_name, &parent);
        }

        // Registered after the children so a path that both feeds and
        // flushes the collector delivers its value first.
        if let Some(flush_with) = &flush_with {
            let patterns: Vec<&str> = flush_with
                .split('|')
                .filter(|p| *p != RECORD_FLUSH_KEYWORD)
                .collect();
            if !patterns.is_empty() {
                let flush = self.graph.add_node(NodeKind::Flush { collector: node });
                self.register(&patterns.join("|"), flush);
            }
        }

        let target = parent.target_for(name.as_deref());
        if produces_fragments {
            if !parent.accepts_fragments || target == Target::Feedback {
                self.errors.push(ConfigurationError::InvalidNesting {
                    rule: rule.collector.clone(),
                    parent: parent.label.clone(),
                });
            }
            if !rule.postprocess.is_empty() {
                self.errors.push(ConfigurationError::InvalidNesting {
                    rule: rule.collector.clone(),
                    parent: "postprocess".to_string(),
                });
            }
        }

        let last = self.functions(node, &rule.postprocess);
        self.graph.connect(last, target, parent.role);
        self.flush_order.push(node);
        if entity_depth > 0 {
            self.entity_flushes.push((entity_depth, node));
        }
    }

    /// How many entities deep the values feeding `rules` sit: the most entity
    /// markers in any alternative of their source patterns.
    fn nesting_depth(&self, rules: &[RuleConfig]) -> usize {
        rules
            .iter()
            .map(|rule| match rule {
                RuleConfig::Data(data) => {
                    let vars = self.vars;
                    let source = substitute_variables(&data.source, |name| vars.get(name).cloned())
                        .unwrap_or_else(|_| data.source.clone());
                    source
                        .split('|')
                        .map(|alternative| alternative.matches(self.entity_marker).count())
                        .max()
                        .unwrap_or(0)
                }
                RuleConfig::Collect(collect) => self.nesting_depth(&collect.rules),
            })
            .max()
            .unwrap_or(0)
    }

    /// Chains `configs` behind `first`, returning the last node of the chain.
    fn functions(&mut self, first: NodeId, configs: &[FunctionConfig]) -> NodeId {
        let mut last = first;
        for config in configs {
            let options = self.options(&config.function, &config.options, &config.entries);
            let function = match self.builder.functions.create(&config.function, &options) {
                Ok(function) => function,
                Err(e) => {
                    self.errors.push(e);
                    continue;
                }
            };
            if let Some(map) = function.map_reference() {
                if !self.maps.contains_map(map) {
                    self.errors.push(ConfigurationError::UnknownMap {
                        function: config.function.clone(),
                        map: map.to_string(),
                    });
                }
            }
            let node = self.graph.add_node(NodeKind::Function(function));
            self.graph.connect(last, Target::Node(node), EdgeRole::Value);
            last = node;
        }
        last
    }

    fn options(
        &mut self,
        owner: &str,
        raw: &BTreeMap<String, serde_yaml::Value>,
        entries: &BTreeMap<String, String>,
    ) -> Options {
        let mut options = Options::new(owner);
        for (key, value) in raw {
            let text = match value {
                serde_yaml::Value::String(s) => self.substitute(s),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Null => String::new(),
                _ => {
                    self.errors.push(options.invalid(key, "expected a scalar value"));
                    continue;
                }
            };
            options.insert(key.clone(), text);
        }
        for (key, value) in entries {
            let value = self.substitute(value);
            options.insert_entry(key.clone(), value);
        }
        options
    }

    fn register(&mut self, pattern: &str, node: NodeId) {
        if let Err(e) = self.registry.register(pattern, node) {
            self.errors.push(ConfigurationError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            });
        }
    }

    fn substitute(&mut self, text: &str) -> String {
        let vars = self.vars;
        match substitute_variables(text, |name| vars.get(name).cloned()) {
            Ok(text) => text,
            Err(variable) => {
                self.errors.push(ConfigurationError::UndefinedVariable { variable });
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_rules, RuleFormat};
    use crate::dataflow::Edge;

    fn build(yaml: &str) -> Result<CompiledMorph, ConfigurationErrors> {
        let spec = parse_rules(yaml, RuleFormat::Yaml).unwrap();
        MorphBuilder::new().build(&spec)
    }

    #[test]
    fn test_builds_data_chain() {
        let compiled = build(
            r#"
vars: { tag: "245" }
rules:
  - type: data
    source: "$[tag].a"
    name: title
    functions:
      - function: trim
      - function: case
        options: { to: upper }
"#,
        )
        .unwrap();

        assert_eq!(compiled.node_count(), 3);
        assert_eq!(compiled.registry().resolve("245.a"), vec![0]);
        assert_eq!(
            compiled.graph().edges(0),
            &[Edge {
                target: Target::Node(1),
                role: EdgeRole::Value
            }]
        );
        assert_eq!(
            compiled.graph().edges(2),
            &[Edge {
                target: Target::Output,
                role: EdgeRole::Value
            }]
        );
    }

    #[test]
    fn test_collector_flush_registered_after_children() {
        let compiled = build(
            r#"
rules:
  - type: collect
    collector: concat
    name: subjects
    flush_with: "subject|record"
    rules:
      - { type: data, source: "subject.a" }
      - { type: data, source: "subject.x" }
"#,
        )
        .unwrap();

        // collector, two data nodes, flush node
        assert_eq!(compiled.node_count(), 4);
        assert_eq!(compiled.registry().resolve("subject"), vec![3]);
        assert!(matches!(
            compiled.graph().node(3).kind,
            NodeKind::Flush { collector: 0 }
        ));
        assert_eq!(compiled.flush_order(), &[0]);
    }

    #[test]
    fn test_nested_collectors_flush_children_first() {
        let compiled = build(
            r#"
rules:
  - type: collect
    collector: entity
    name: outer
    rules:
      - type: collect
        collector: entity
        name: inner
        rules:
          - { type: data, source: "a" }
      - type: collect
        collector: combine
        name: c
        value: "${b}"
        rules:
          - { type: data, source: "b", name: b }
"#,
        )
        .unwrap();

        assert_eq!(compiled.collector_count(), 3);
        assert_eq!(compiled.flush_order(), &[1, 3, 0]);
    }

    #[test]
    fn test_same_entity_collectors_flush_at_source_depth() {
        let compiled = build(
            r#"
vars: { field: "subject" }
rules:
  - type: collect
    collector: concat
    same_entity: true
    rules:
      - { type: data, source: "$[field].a|note" }
  - type: collect
    collector: concat
    same_entity: true
    rules:
      - type: collect
        collector: combine
        value: "${x}"
        rules:
          - { type: data, source: "a.b.x", name: x }
  - type: collect
    collector: concat
    same_entity: true
    rules:
      - { type: data, source: "top" }
  - type: collect
    collector: concat
    rules:
      - { type: data, source: "c.d" }
"#,
        )
        .unwrap();

        assert_eq!(compiled.entity_flushes(1).collect::<Vec<_>>(), vec![0]);
        assert_eq!(compiled.entity_flushes(2).collect::<Vec<_>>(), vec![2]);
        assert_eq!(compiled.entity_flushes(0).count(), 0);
        let NodeKind::Collector(top) = &compiled.graph().node(5).kind else {
            panic!("expected the depth zero collector at node 5");
        };
        assert!(top.flags.same_entity);
        assert!(!top.flags.flush_on_entity_end);
    }

    #[test]
    fn test_feedback_target_for_at_names() {
        let compiled = build(
            r#"
rules:
  - { type: data, source: "a", name: "@a" }
  - { type: data, source: "@a", name: b }
"#,
        )
        .unwrap();

        assert_eq!(compiled.graph().edges(0)[0].target, Target::Feedback);
        assert_eq!(compiled.graph().edges(1)[0].target, Target::Output);
    }

    #[test]
    fn test_build_errors() {
        struct TestCase {
            name: &'static str,
            yaml: &'static str,
            expected: ConfigurationError,
        }

        let test_cases = vec![
            TestCase {
                name: "unknown map",
                yaml: r#"
rules:
  - type: data
    source: a
    functions:
      - function: lookup
        options: { in: nowhere }
"#,
                expected: ConfigurationError::UnknownMap {
                    function: "lookup".to_string(),
                    map: "nowhere".to_string(),
                },
            },
            TestCase {
                name: "missing required option",
                yaml: r#"
rules:
  - type: data
    source: a
    functions:
      - function: constant
"#,
                expected: ConfigurationError::MissingOption {
                    owner: "constant".to_string(),
                    option: "value".to_string(),
                },
            },
            TestCase {
                name: "entity inside combine",
                yaml: r#"
rules:
  - type: collect
    collector: combine
    rules:
      - type: collect
        collector: entity
        rules:
          - { type: data, source: a }
"#,
                expected: ConfigurationError::InvalidNesting {
                    rule: "entity".to_string(),
                    parent: "collector 'combine'".to_string(),
                },
            },
            TestCase {
                name: "non scalar option",
                yaml: r#"
rules:
  - type: data
    source: a
    functions:
      - function: compose
        options: { prefix: [1, 2] }
"#,
                expected: ConfigurationError::InvalidOption {
                    owner: "compose".to_string(),
                    option: "prefix".to_string(),
                    reason: "expected a scalar value".to_string(),
                },
            },
        ];

        for tc in test_cases {
            let errors = build(tc.yaml).unwrap_err();
            assert_eq!(errors.0, vec![tc.expected], "case: {}", tc.name);
        }
    }

    #[test]
    fn test_builder_maps_and_rule_maps_are_merged() {
        let spec = parse_rules(
            r#"
maps:
  langs: { ger: German }
rules:
  - type: data
    source: a
    functions:
      - function: lookup
        options: { in: langs }
  - type: data
    source: b
    functions:
      - function: lookup
        options: { in: countries }
"#,
            RuleFormat::Yaml,
        )
        .unwrap();

        let compiled = MorphBuilder::new()
            .with_map("countries", [("de", "Germany")])
            .build(&spec)
            .unwrap();

        assert_eq!(compiled.maps().map_names(), vec!["countries", "langs"]);
    }
}
