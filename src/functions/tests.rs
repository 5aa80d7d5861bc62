// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::*;
use crate::maps::{MapStore, DEFAULT_MAP_KEY};

fn create(name: &str, options: Options) -> FunctionState {
    let registry = FunctionRegistry::with_builtins();
    FunctionState::new(registry.create(name, &options).unwrap())
}

fn apply(state: &mut FunctionState, value: &str, maps: &MapStore) -> Option<String> {
    let input = NamedValue::new("field", value, 1, 0);
    state.apply(&input, maps).unwrap().map(|output| output.value)
}

fn colour_maps() -> MapStore {
    let mut maps = MapStore::new();
    maps.put_value("colours", "r", "red");
    maps.put_value("colours", "g", "green");
    maps
}

#[test]
fn test_stateless_functions() {
    struct TestCase {
        name: &'static str,
        function: &'static str,
        options: Options,
        input: &'static str,
        expected: Option<&'static str>,
    }

    let test_cases = vec![
        TestCase {
            name: "constant replaces value",
            function: "constant",
            options: Options::new("constant").with("value", "M"),
            input: "anything",
            expected: Some("M"),
        },
        TestCase {
            name: "trim",
            function: "trim",
            options: Options::new("trim"),
            input: "  c ",
            expected: Some("c"),
        },
        TestCase {
            name: "case defaults to upper",
            function: "case",
            options: Options::new("case"),
            input: "abc",
            expected: Some("ABC"),
        },
        TestCase {
            name: "case lower",
            function: "case",
            options: Options::new("case").with("to", "lower"),
            input: "AbC",
            expected: Some("abc"),
        },
        TestCase {
            name: "compose",
            function: "compose",
            options: Options::new("compose").with("prefix", "<").with("postfix", ">"),
            input: "x",
            expected: Some("<x>"),
        },
        TestCase {
            name: "substring within range",
            function: "substring",
            options: Options::new("substring").with("start", "1").with("end", "3"),
            input: "abcdef",
            expected: Some("bc"),
        },
        TestCase {
            name: "substring end clamped",
            function: "substring",
            options: Options::new("substring").with("start", "4").with("end", "10"),
            input: "abcdef",
            expected: Some("ef"),
        },
        TestCase {
            name: "substring start past end drops",
            function: "substring",
            options: Options::new("substring").with("start", "7"),
            input: "abc",
            expected: None,
        },
        TestCase {
            name: "equals passes match",
            function: "equals",
            options: Options::new("equals").with("string", "yes"),
            input: "yes",
            expected: Some("yes"),
        },
        TestCase {
            name: "equals drops other",
            function: "equals",
            options: Options::new("equals").with("string", "yes"),
            input: "no",
            expected: None,
        },
        TestCase {
            name: "not_equals drops match",
            function: "not_equals",
            options: Options::new("not_equals").with("string", "yes"),
            input: "yes",
            expected: None,
        },
        TestCase {
            name: "regexp whole match",
            function: "regexp",
            options: Options::new("regexp").with("match", "[0-9]+"),
            input: "ISBN 12345 x",
            expected: Some("12345"),
        },
        TestCase {
            name: "regexp with format",
            function: "regexp",
            options: Options::new("regexp")
                .with("match", r"(?P<last>\w+), (?P<first>\w+)")
                .with("format", "${first} ${last}"),
            input: "Melville, Herman",
            expected: Some("Herman Melville"),
        },
        TestCase {
            name: "regexp no match drops",
            function: "regexp",
            options: Options::new("regexp").with("match", "^x"),
            input: "abc",
            expected: None,
        },
        TestCase {
            name: "replace all",
            function: "replace",
            options: Options::new("replace").with("pattern", "-").with("with", ""),
            input: "978-3-16",
            expected: Some("978316"),
        },
        TestCase {
            name: "lookup named map",
            function: "lookup",
            options: Options::new("lookup").with("in", "colours"),
            input: "g",
            expected: Some("green"),
        },
        TestCase {
            name: "lookup miss drops",
            function: "lookup",
            options: Options::new("lookup").with("in", "colours"),
            input: "b",
            expected: None,
        },
        TestCase {
            name: "lookup miss uses default option",
            function: "lookup",
            options: Options::new("lookup").with("in", "colours").with("default", "?"),
            input: "b",
            expected: Some("?"),
        },
        TestCase {
            name: "lookup inline with default key",
            function: "lookup",
            options: Options::new("lookup")
                .with_entry("de", "German")
                .with_entry(DEFAULT_MAP_KEY, "other"),
            input: "fr",
            expected: Some("other"),
        },
        TestCase {
            name: "whitelist passes key",
            function: "whitelist",
            options: Options::new("whitelist").with("in", "colours"),
            input: "r",
            expected: Some("r"),
        },
        TestCase {
            name: "whitelist drops unknown",
            function: "whitelist",
            options: Options::new("whitelist").with("in", "colours"),
            input: "x",
            expected: None,
        },
        TestCase {
            name: "blacklist drops key",
            function: "blacklist",
            options: Options::new("blacklist").with_entry("spam", ""),
            input: "spam",
            expected: None,
        },
    ];

    let maps = colour_maps();
    for tc in test_cases {
        let mut state = create(tc.function, tc.options);
        assert_eq!(
            apply(&mut state, tc.input, &maps).as_deref(),
            tc.expected,
            "case: {}",
            tc.name
        );
    }
}

#[test]
fn test_constructor_errors() {
    let registry = FunctionRegistry::with_builtins();

    struct TestCase {
        name: &'static str,
        function: &'static str,
        options: Options,
    }

    let test_cases = vec![
        TestCase {
            name: "constant without value",
            function: "constant",
            options: Options::new("constant"),
        },
        TestCase {
            name: "bad regex",
            function: "regexp",
            options: Options::new("regexp").with("match", "(unclosed"),
        },
        TestCase {
            name: "bad case",
            function: "case",
            options: Options::new("case").with("to", "sideways"),
        },
        TestCase {
            name: "lookup without table",
            function: "lookup",
            options: Options::new("lookup"),
        },
        TestCase {
            name: "occurrence with garbage",
            function: "occurrence",
            options: Options::new("occurrence").with("only", "often"),
        },
        TestCase {
            name: "substring end before start",
            function: "substring",
            options: Options::new("substring").with("start", "3").with("end", "1"),
        },
    ];

    for tc in test_cases {
        assert!(
            registry.create(tc.function, &tc.options).is_err(),
            "case: {}",
            tc.name
        );
    }

    assert_eq!(
        registry.create("nope", &Options::new("nope")).unwrap_err(),
        ConfigurationError::UnknownFunction {
            function: "nope".to_string()
        }
    );
}

#[test]
fn test_strict_lookup_fails_with_cause() {
    let mut state = create("lookup", Options::new("lookup").with("in", "colours").with("strict", "true"));
    let maps = colour_maps();

    let error = state
        .apply(&NamedValue::new("field", "b", 1, 0), &maps)
        .unwrap_err();

    assert_eq!(
        error,
        ExecutionError::Function {
            function: "lookup".to_string(),
            source: FunctionFailure::NoMapping {
                map: "colours".to_string(),
                key: "b".to_string(),
            },
        }
    );
}

#[test]
fn test_stateful_functions_reset_on_new_record() {
    let maps = MapStore::new();
    let mut count = create("count", Options::new("count"));

    let outputs: Vec<String> = [(1, "a"), (1, "b"), (2, "c"), (2, "d"), (2, "e")]
        .iter()
        .filter_map(|(record, value)| {
            count
                .apply(&NamedValue::new("n", *value, *record, 0), &maps)
                .unwrap()
                .map(|output| output.value)
        })
        .collect();

    assert_eq!(outputs, vec!["1", "2", "1", "2", "3"]);
}

#[test]
fn test_occurrence_and_unique() {
    let maps = MapStore::new();

    let mut second = create("occurrence", Options::new("occurrence").with("only", "2"));
    let picked: Vec<Option<String>> = ["a", "b", "c"]
        .iter()
        .map(|v| apply(&mut second, v, &maps))
        .collect();
    assert_eq!(picked, vec![None, Some("b".to_string()), None]);

    let mut per_entity = create(
        "occurrence",
        Options::new("occurrence")
            .with("only", "lessThan 2")
            .with("same_entity", "true")
            .with("format", "${count}:${value}"),
    );
    let picked: Vec<Option<String>> = [(1, "a"), (1, "b"), (2, "c")]
        .iter()
        .map(|(entity, v)| {
            per_entity
                .apply(&NamedValue::new("n", *v, 1, *entity), &maps)
                .unwrap()
                .map(|output| output.value)
        })
        .collect();
    assert_eq!(picked, vec![Some("1:a".to_string()), None, Some("1:c".to_string())]);

    let mut unique = create("unique", Options::new("unique"));
    let kept: Vec<Option<String>> = ["x", "y", "x"]
        .iter()
        .map(|v| apply(&mut unique, v, &maps))
        .collect();
    assert_eq!(kept, vec![Some("x".to_string()), Some("y".to_string()), None]);
}

#[test]
fn test_custom_function_registration() {
    #[derive(Debug, Clone)]
    struct Reverse;

    impl Function for Reverse {
        fn name(&self) -> &str {
            "reverse"
        }

        fn process(&mut self, value: &str, _context: &FunctionContext<'_>) -> Result<Option<String>, FunctionFailure> {
            Ok(Some(value.chars().rev().collect()))
        }

        fn boxed_clone(&self) -> Box<dyn Function> {
            Box::new(self.clone())
        }
    }

    let mut registry = FunctionRegistry::with_builtins();
    assert!(!registry.is_available("reverse"));
    registry.register("reverse", |_options: &Options| Ok(Box::new(Reverse) as Box<dyn Function>));
    assert!(registry.is_available("reverse"));
    assert!(registry.list_available().contains(&"reverse"));

    let mut state = FunctionState::new(registry.create("reverse", &Options::new("reverse")).unwrap());
    assert_eq!(apply(&mut state, "abc", &MapStore::new()), Some("cba".to_string()));
}
