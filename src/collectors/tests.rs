// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::*;
use crate::dataflow::{EdgeRole, NamedValue};
use crate::events::Event;

const A: NodeId = 10;
const B: NodeId = 11;
const CONDITION: NodeId = 12;

fn state_for(collect: Box<dyn Collect>, flags: CollectorFlags, name: Option<&str>, value: Option<&str>) -> CollectorState {
    let mut spec = CollectorSpec::new(collect).with_flags(flags);
    spec.collect.on_source_added(A);
    spec.collect.on_source_added(B);
    if let Some(name) = name {
        spec = spec.with_name(name);
    }
    if let Some(value) = value {
        spec = spec.with_value(value);
    }
    spec.instantiate()
}

fn value(name: &str, value: &str, record: u64, entity: u64) -> Emission {
    Emission::Value(NamedValue::new(name, value, record, entity))
}

fn values(emissions: Vec<Emission>) -> Vec<(String, String)> {
    emissions
        .into_iter()
        .filter_map(|emission| match emission {
            Emission::Value(v) => Some((v.name, v.value)),
            Emission::Fragment(_) => None,
        })
        .collect()
}

fn pair(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

#[test]
fn test_combine_emits_when_complete() {
    let mut state = state_for(Box::new(Combine::new()), CollectorFlags::default(), Some("out"), Some("${a}-${b}"));

    assert!(state.receive(A, EdgeRole::Value, &value("a", "1", 1, 0)).unwrap().is_empty());
    let emitted = state.receive(B, EdgeRole::Value, &value("b", "2", 1, 0)).unwrap();

    assert_eq!(values(emitted), vec![pair("out", "1-2")]);
}

#[test]
fn test_staleness_discards_previous_record() {
    let mut state = state_for(Box::new(Combine::new()), CollectorFlags::default(), Some("out"), Some("${a}${b}"));

    state.receive(A, EdgeRole::Value, &value("a", "old", 1, 0)).unwrap();
    assert!(state.receive(B, EdgeRole::Value, &value("b", "new", 2, 0)).unwrap().is_empty());

    let emitted = state.receive(A, EdgeRole::Value, &value("a", "fresh", 2, 0)).unwrap();
    assert_eq!(values(emitted), vec![pair("out", "freshnew")]);
}

#[test]
fn test_same_entity_clears_on_entity_change() {
    let flags = CollectorFlags {
        same_entity: true,
        ..CollectorFlags::default()
    };
    let mut state = state_for(Box::new(Combine::new()), flags, Some("out"), Some("${a}${b}"));

    state.receive(A, EdgeRole::Value, &value("a", "x", 1, 1)).unwrap();
    assert!(state.receive(B, EdgeRole::Value, &value("b", "y", 1, 2)).unwrap().is_empty());
    let emitted = state.receive(A, EdgeRole::Value, &value("a", "z", 1, 2)).unwrap();

    assert_eq!(values(emitted), vec![pair("out", "zy")]);
}

#[test]
fn test_entity_end_flushes_each_occurrence_once() {
    let flags = CollectorFlags {
        same_entity: true,
        flush_on_entity_end: true,
        ..CollectorFlags::default()
    };
    let mut state = state_for(Box::new(Combine::new()), flags, Some("out"), Some("${a}${b}"));

    state.receive(A, EdgeRole::Value, &value("a", "1", 1, 1)).unwrap();
    // Complete, but held until the entity closes.
    assert!(state.receive(B, EdgeRole::Value, &value("b", "2", 1, 1)).unwrap().is_empty());

    // The end of some other entity leaves the buffer alone.
    assert!(state.flush(1, 7, FlushTrigger::EntityEnd).is_empty());

    assert_eq!(values(state.flush(1, 1, FlushTrigger::EntityEnd)), vec![pair("out", "12")]);
    assert!(state.flush(1, 1, FlushTrigger::EntityEnd).is_empty());

    // An incomplete occurrence is dropped at its end and does not leak into the next.
    state.receive(A, EdgeRole::Value, &value("a", "3", 1, 2)).unwrap();
    assert!(state.flush(1, 2, FlushTrigger::EntityEnd).is_empty());
    state.receive(B, EdgeRole::Value, &value("b", "4", 1, 3)).unwrap();
    assert!(state.flush(1, 3, FlushTrigger::EntityEnd).is_empty());
}

#[test]
fn test_wait_for_flush_holds_until_flush() {
    let flags = CollectorFlags {
        wait_for_flush: true,
        reset: true,
        ..CollectorFlags::default()
    };
    let mut state = state_for(Box::new(Combine::new()), flags, Some("out"), Some("${a}|${b}"));

    assert!(state.receive(A, EdgeRole::Value, &value("a", "1", 1, 0)).unwrap().is_empty());
    assert!(state.receive(B, EdgeRole::Value, &value("b", "2", 1, 0)).unwrap().is_empty());

    // A flush for another record is ignored.
    assert!(state.flush(2, 0, FlushTrigger::Pattern).is_empty());

    assert_eq!(values(state.flush(1, 0, FlushTrigger::Pattern)), vec![pair("out", "1|2")]);
    // Reset cleared the buffer, so an immediate second flush has nothing to say.
    assert!(state.flush(1, 0, FlushTrigger::Pattern).is_empty());

    // Incomplete combines still emit on flush.
    state.receive(A, EdgeRole::Value, &value("a", "3", 1, 0)).unwrap();
    assert_eq!(values(state.flush(1, 0, FlushTrigger::Pattern)), vec![pair("out", "3|")]);
}

#[test]
fn test_condition_gates_emission() {
    let mut spec = CollectorSpec::new(Box::new(Group::new())).with_name("kept");
    spec.collect.on_source_added(A);
    spec.has_condition = true;
    let mut state = spec.instantiate();

    assert!(state.receive(A, EdgeRole::Value, &value("a", "1", 1, 0)).unwrap().is_empty());
    let emitted = state
        .receive(CONDITION, EdgeRole::Condition, &value("c", "yes", 1, 0))
        .unwrap();
    assert_eq!(values(emitted), vec![pair("kept", "1")]);

    let emitted = state.receive(A, EdgeRole::Value, &value("a", "2", 1, 0)).unwrap();
    assert_eq!(values(emitted), vec![pair("kept", "2")]);

    // A new record needs its own condition value.
    assert!(state.receive(A, EdgeRole::Value, &value("a", "3", 2, 0)).unwrap().is_empty());
}

#[test]
fn test_concat_and_choose_emit_at_scope_end() {
    struct TestCase {
        name: &'static str,
        collect: Box<dyn Collect>,
        inputs: Vec<(NodeId, &'static str, &'static str)>,
        expected: Vec<(String, String)>,
    }

    let test_cases = vec![
        TestCase {
            name: "concat joins with affixes",
            collect: Box::new(Concat::new(", ").with_affixes("{", "}")),
            inputs: vec![(A, "a", "x"), (B, "b", "y"), (A, "a", "z")],
            expected: vec![pair("", "{x, y, z}")],
        },
        TestCase {
            name: "concat reversed",
            collect: Box::new(Concat::new("").reversed()),
            inputs: vec![(A, "a", "1"), (A, "a", "2")],
            expected: vec![pair("", "21")],
        },
        TestCase {
            name: "choose prefers first connected source",
            collect: Box::new(Choose::new()),
            inputs: vec![(B, "b", "low"), (A, "a", "high"), (B, "b", "later")],
            expected: vec![pair("a", "high")],
        },
        TestCase {
            name: "concat with nothing emits nothing",
            collect: Box::new(Concat::new(",")),
            inputs: vec![],
            expected: vec![],
        },
    ];

    for tc in test_cases {
        let mut state = state_for(tc.collect, CollectorFlags::default(), None, None);
        for (source, name, v) in tc.inputs {
            assert!(
                state.receive(source, EdgeRole::Value, &value(name, v, 1, 0)).unwrap().is_empty(),
                "case {} emitted early",
                tc.name
            );
        }
        assert_eq!(
            values(state.flush(1, 0, FlushTrigger::RecordEnd)),
            tc.expected,
            "case: {}",
            tc.name
        );
    }
}

#[test]
fn test_record_end_respects_explicit_flush_triggers() {
    let flags = CollectorFlags {
        flush_on_record_end: false,
        ..CollectorFlags::default()
    };
    let mut state = state_for(Box::new(Concat::new("")), flags, Some("c"), None);

    state.receive(A, EdgeRole::Value, &value("a", "1", 1, 0)).unwrap();
    assert!(state.flush(1, 0, FlushTrigger::RecordEnd).is_empty());

    // The record end still closed the scope.
    state.receive(A, EdgeRole::Value, &value("a", "2", 1, 0)).unwrap();
    assert_eq!(values(state.flush(1, 0, FlushTrigger::Pattern)), vec![pair("c", "2")]);
}

#[test]
fn test_all_and_any() {
    let mut all = state_for(Box::new(All::new()), CollectorFlags::default(), Some("both"), None);
    assert!(all.receive(A, EdgeRole::Value, &value("a", "1", 1, 0)).unwrap().is_empty());
    assert!(all.receive(A, EdgeRole::Value, &value("a", "1", 1, 0)).unwrap().is_empty());
    assert_eq!(
        values(all.receive(B, EdgeRole::Value, &value("b", "1", 1, 0)).unwrap()),
        vec![pair("both", "true")]
    );
    assert!(all.receive(B, EdgeRole::Value, &value("b", "1", 1, 0)).unwrap().is_empty());

    let mut any = state_for(Box::new(Any::new()), CollectorFlags::default(), Some("either"), Some("yes"));
    assert_eq!(
        values(any.receive(B, EdgeRole::Value, &value("b", "1", 1, 0)).unwrap()),
        vec![pair("either", "yes")]
    );
    assert!(any.receive(A, EdgeRole::Value, &value("a", "1", 1, 0)).unwrap().is_empty());
    assert_eq!(
        values(any.receive(A, EdgeRole::Value, &value("a", "1", 2, 0)).unwrap()),
        vec![pair("either", "yes")]
    );
}

#[test]
fn test_entity_nests_child_fragments() {
    let flags = CollectorFlags {
        wait_for_flush: true,
        ..CollectorFlags::default()
    };
    let mut parent = state_for(Box::new(Entity::new()), flags, Some("outer"), None);

    parent.receive(A, EdgeRole::Value, &value("title", "T", 1, 0)).unwrap();
    let child = EntityFragment {
        name: "inner".to_string(),
        events: vec![Event::literal("x", "1")],
        record_count: 1,
        entity_count: 0,
    };
    parent
        .receive(B, EdgeRole::Value, &Emission::Fragment(child))
        .unwrap();

    let emitted = parent.flush(1, 0, FlushTrigger::RecordEnd);
    assert_eq!(
        emitted,
        vec![Emission::Fragment(EntityFragment {
            name: "outer".to_string(),
            events: vec![
                Event::literal("title", "T"),
                Event::start_entity("inner"),
                Event::literal("x", "1"),
                Event::EndEntity,
            ],
            record_count: 1,
            entity_count: 0,
        })]
    );
}

#[test]
fn test_fragment_into_non_entity_is_an_error() {
    let mut state = state_for(Box::new(Combine::new()), CollectorFlags::default(), None, None);
    let fragment = Emission::Fragment(EntityFragment {
        name: "e".to_string(),
        events: vec![],
        record_count: 1,
        entity_count: 0,
    });

    assert!(state.receive(A, EdgeRole::Value, &fragment).is_err());
}

#[test]
fn test_registry_table() {
    let registry = CollectorRegistry::with_builtins();
    assert_eq!(
        registry.list_available(),
        vec!["all", "any", "choose", "combine", "concat", "entity", "group"]
    );

    let concat = registry
        .create("concat", &Options::new("concat").with("delimiter", "/"))
        .unwrap();
    assert_eq!(concat.kind(), "concat");

    assert_eq!(
        registry.create("median", &Options::new("median")).unwrap_err(),
        ConfigurationError::UnknownCollector {
            collector: "median".to_string()
        }
    );
}
