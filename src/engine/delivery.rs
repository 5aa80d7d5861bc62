// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::collectors::FlushTrigger;
use crate::config::consts::{ESCAPE_CHAR, FEEDBACK_CHAR};
use crate::dataflow::{EdgeRole, Emission, NamedValue, NodeId, NodeState, Target};
use crate::engine::CompiledMorph;
use crate::errors::{ExecutionError, ExecutionResult};
use crate::events::{Event, EventBuffer};
use crate::maps::MapStore;
use crate::observability::messages::engine::FeedbackDispatched;
use crate::observability::messages::StructuredLog;

/// One synchronous pass of values through the graph.
///
/// Borrows the shared topology and the per-stream state of a single morph
/// for the duration of one protocol event. Everything it emits lands in the
/// record's output buffer; nothing reaches the downstream receiver until
/// the record completes.
pub(crate) struct Delivery<'a> {
    pub compiled: &'a CompiledMorph,
    pub states: &'a mut [NodeState],
    pub maps: &'a MapStore,
    pub output: &'a mut EventBuffer,
}

impl Delivery<'_> {
    /// Hands `input` to every receiver registered for `path`. Returns whether
    /// any pattern matched.
    pub fn dispatch(&mut self, path: &str, input: &NamedValue, depth: usize) -> ExecutionResult<bool> {
        let receivers = self.compiled.registry().resolve(path);
        for &node in &receivers {
            self.enter(node, input, depth)?;
        }
        Ok(!receivers.is_empty())
    }

    /// Delivers `input` to an entry node: a data rule or a flush trigger.
    pub fn enter(&mut self, node: NodeId, input: &NamedValue, depth: usize) -> ExecutionResult<()> {
        match &self.states[node] {
            NodeState::Data { name } => {
                let value = match name {
                    Some(name) => input.renamed(name.as_str()),
                    None => input.clone(),
                };
                self.forward(node, Emission::Value(value), depth)
            }
            NodeState::Flush { collector } => {
                let collector = *collector;
                self.flush_collector(
                    collector,
                    input.record_count,
                    input.entity_count,
                    FlushTrigger::Pattern,
                    depth,
                )
            }
            NodeState::Function(_) | NodeState::Collector(_) => Ok(()),
        }
    }

    /// Flushes one collector and sends whatever it emits downstream.
    pub fn flush_collector(
        &mut self,
        collector: NodeId,
        record_count: u64,
        entity_count: u64,
        trigger: FlushTrigger,
        depth: usize,
    ) -> ExecutionResult<()> {
        let emissions = match &mut self.states[collector] {
            NodeState::Collector(state) => state.flush(record_count, entity_count, trigger),
            _ => return Ok(()),
        };
        for emission in emissions {
            self.forward(collector, emission, depth)?;
        }
        Ok(())
    }

    /// Sends `emission` along every outgoing edge of `source`, in connection order.
    fn forward(&mut self, source: NodeId, emission: Emission, depth: usize) -> ExecutionResult<()> {
        let compiled = self.compiled;
        for edge in compiled.graph().edges(source) {
            match edge.target {
                Target::Node(target) => self.receive(target, source, edge.role, &emission, depth)?,
                Target::Output => self.emit_output(&emission, depth)?,
                Target::Feedback => self.feedback(&emission, depth)?,
            }
        }
        Ok(())
    }

    fn receive(
        &mut self,
        target: NodeId,
        source: NodeId,
        role: EdgeRole,
        emission: &Emission,
        depth: usize,
    ) -> ExecutionResult<()> {
        let emissions = match &mut self.states[target] {
            NodeState::Function(state) => {
                let Emission::Value(input) = emission else {
                    return Err(ExecutionError::MisroutedFragment {
                        target: format!("function '{}'", state.name()),
                    });
                };
                state
                    .apply(input, self.maps)?
                    .map(Emission::Value)
                    .into_iter()
                    .collect()
            }
            NodeState::Collector(state) => state.receive(source, role, emission)?,
            NodeState::Data { .. } | NodeState::Flush { .. } => Vec::new(),
        };

        for emission in emissions {
            self.forward(target, emission, depth)?;
        }
        Ok(())
    }

    fn emit_output(&mut self, emission: &Emission, depth: usize) -> ExecutionResult<()> {
        match emission {
            Emission::Value(value) if value.name.starts_with(FEEDBACK_CHAR) => {
                self.feedback(emission, depth)
            }
            Emission::Value(value) => {
                self.output
                    .push(Event::literal(unescape(&value.name), &value.value));
                Ok(())
            }
            Emission::Fragment(fragment) => {
                if !fragment.events.is_empty() {
                    self.output.push(Event::start_entity(&fragment.name));
                    for event in &fragment.events {
                        self.output.push(event.clone());
                    }
                    self.output.push(Event::EndEntity);
                }
                Ok(())
            }
        }
    }

    /// Re-dispatches a value through the registry under its own name.
    fn feedback(&mut self, emission: &Emission, depth: usize) -> ExecutionResult<()> {
        let Emission::Value(value) = emission else {
            return Err(ExecutionError::MisroutedFragment {
                target: "feedback".to_string(),
            });
        };
        let max_depth = self.compiled.max_feedback_depth();
        if depth >= max_depth {
            return Err(ExecutionError::FeedbackDepthExceeded {
                name: value.name.clone(),
                depth: max_depth,
            });
        }

        FeedbackDispatched {
            name: &value.name,
            depth: depth + 1,
            receivers: self.compiled.registry().resolve(&value.name).len(),
        }
        .log();
        self.dispatch(&value.name, value, depth + 1)?;
        Ok(())
    }
}

/// Prefixes names that would otherwise read as feedback.
pub(crate) fn escape(name: &str) -> String {
    if name.starts_with(FEEDBACK_CHAR) {
        format!("{}{}", ESCAPE_CHAR, name)
    } else {
        name.to_string()
    }
}

/// Drops the escape character in front of a leading feedback or escape character.
pub(crate) fn unescape(name: &str) -> &str {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(ESCAPE_CHAR), Some(FEEDBACK_CHAR | ESCAPE_CHAR)) => &name[ESCAPE_CHAR.len_utf8()..],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_and_unescape() {
        struct TestCase {
            name: &'static str,
            input: &'static str,
            escaped: &'static str,
            unescaped: &'static str,
        }

        let test_cases = vec![
            TestCase {
                name: "plain",
                input: "title",
                escaped: "title",
                unescaped: "title",
            },
            TestCase {
                name: "feedback char",
                input: "@tmp",
                escaped: "\\@tmp",
                unescaped: "@tmp",
            },
            TestCase {
                name: "escaped escape",
                input: "\\\\x",
                escaped: "\\\\x",
                unescaped: "\\x",
            },
            TestCase {
                name: "lone escape",
                input: "\\",
                escaped: "\\",
                unescaped: "\\",
            },
        ];

        for tc in test_cases {
            let escaped = escape(tc.input);
            assert_eq!(escaped, tc.escaped, "case: {}", tc.name);
            assert_eq!(unescape(&escaped), tc.unescaped, "case: {}", tc.name);
        }
    }
}
