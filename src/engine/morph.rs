// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::collectors::FlushTrigger;
use crate::config::consts::RECORD_ID_PATH;
use crate::dataflow::{NamedValue, NodeState};
use crate::engine::delivery::{escape, Delivery};
use crate::engine::CompiledMorph;
use crate::errors::{ExecutionResult, MorphError, StructuralError};
use crate::events::{CloseOnce, Event, EventBuffer, StreamReceiver};
use crate::maps::{MapStore, Maps};
use crate::observability::messages::engine::{
    RecordAborted, RecordCompleted, StreamClosed, StreamReset,
};
use crate::observability::messages::StructuredLog;
use crate::registry::ElseMode;
use std::collections::HashMap;
use std::sync::Arc;

/// Where a morph is within the record grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPhase {
    /// Between records.
    Idle,
    InRecord,
    /// The current record failed; its remaining events are skipped until the
    /// next `start_record` or `end_record`.
    Aborted,
}

/// One open entity.
#[derive(Debug)]
struct Frame {
    name: String,
    path: String,
    entity_count: u64,
    /// `start_entity` was written to the output for nested else values.
    else_started: bool,
}

/// Runs a [`CompiledMorph`] over one event stream.
///
/// A `Morph` owns all per-stream state: node state, the entity stack, the
/// record and entity counters and the output buffer of the current record.
/// Output is buffered per record and handed to the downstream receiver only
/// when the record completes, so a record that fails never reaches it.
///
/// Every operation returns a [`MorphError`] on failure. Errors that abort the
/// record discard its output and all in-flight collector and function state;
/// the rest of that record's events are then skipped and the next record
/// starts clean.
///
/// # Example
/// ```
/// use morphwood::config::{parse_rules, MorphBuilder, RuleFormat};
/// use morphwood::engine::Morph;
/// use morphwood::events::{Event, EventBuffer};
/// use std::sync::Arc;
///
/// let spec = parse_rules(
///     "rules:\n  - { type: data, source: author.name, name: creator }\n",
///     RuleFormat::Yaml,
/// )
/// .unwrap();
/// let compiled = Arc::new(MorphBuilder::new().build(&spec).unwrap());
///
/// let mut morph = Morph::new(compiled, EventBuffer::new());
/// morph.start_record(Some("1")).unwrap();
/// morph.start_entity(Some("author")).unwrap();
/// morph.literal("name", "Melville").unwrap();
/// morph.end_entity().unwrap();
/// morph.end_record().unwrap();
///
/// assert_eq!(
///     morph.receiver().events(),
///     &[
///         Event::start_record("1"),
///         Event::literal("creator", "Melville"),
///         Event::EndRecord,
///     ]
/// );
/// ```
#[derive(Debug)]
pub struct Morph<R: StreamReceiver> {
    compiled: Arc<CompiledMorph>,
    states: Vec<NodeState>,
    maps: MapStore,
    output: EventBuffer,
    receiver: R,
    phase: RecordPhase,
    record_id: String,
    record_count: u64,
    entity_count: u64,
    frames: Vec<Frame>,
    close: CloseOnce,
}

impl<R: StreamReceiver> Morph<R> {
    pub fn new(compiled: Arc<CompiledMorph>, receiver: R) -> Self {
        Morph {
            states: compiled.instantiate(),
            maps: compiled.maps().clone(),
            compiled,
            output: EventBuffer::new(),
            receiver,
            phase: RecordPhase::Idle,
            record_id: String::new(),
            record_count: 0,
            entity_count: 0,
            frames: Vec::new(),
            close: CloseOnce::new(),
        }
    }

    pub fn compiled(&self) -> &Arc<CompiledMorph> {
        &self.compiled
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut R {
        &mut self.receiver
    }

    pub fn into_receiver(self) -> R {
        self.receiver
    }

    pub fn phase(&self) -> RecordPhase {
        self.phase
    }

    /// Number of records started on this stream.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Depth of the entity stack.
    pub fn open_entities(&self) -> usize {
        self.frames.len()
    }

    /// Opens a record. A record that is still open is aborted first and
    /// reported, but the new record is opened either way. A missing id is
    /// reported and the record opened with an empty id.
    pub fn start_record(&mut self, id: Option<&str>) -> Result<(), MorphError> {
        let mut reported = None;
        if self.phase == RecordPhase::InRecord {
            let open = StructuralError::RecordAlreadyOpen {
                open: self.record_id.clone(),
            };
            reported = Some(self.abort(open.into()));
        }
        if id.is_none() && reported.is_none() {
            reported = Some(StructuralError::MissingRecordId.into());
        }

        let id = id.unwrap_or_default();
        self.phase = RecordPhase::InRecord;
        self.record_count += 1;
        self.entity_count = 0;
        self.frames.clear();
        self.output.clear();
        self.record_id = id.to_string();
        self.output.push(Event::start_record(id));

        let input = NamedValue::new(RECORD_ID_PATH, id, self.record_count, 0);
        let result = self.delivery().dispatch(RECORD_ID_PATH, &input, 0);
        self.check(result.map(|_| ()))?;

        match reported {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Opens an entity. A missing name is reported but an entity with an
    /// empty name is still opened so the stream stays balanced.
    pub fn start_entity(&mut self, name: Option<&str>) -> Result<(), MorphError> {
        if !self.accepting("start_entity")? {
            return Ok(());
        }

        self.entity_count += 1;
        let entity_name = name.unwrap_or_default();
        let path = self.path_for(entity_name);
        self.frames.push(Frame {
            name: entity_name.to_string(),
            path,
            entity_count: self.entity_count,
            else_started: false,
        });

        match name {
            Some(_) => Ok(()),
            None => Err(StructuralError::MissingEntityName.into()),
        }
    }

    pub fn literal(&mut self, name: &str, value: &str) -> Result<(), MorphError> {
        if !self.accepting("literal")? {
            return Ok(());
        }

        let path = self.path_for(name);
        let input = NamedValue::new(name, value, self.record_count, self.current_entity_count());
        let matched = self.delivery().dispatch(&path, &input, 0);
        let result = match matched {
            Ok(true) => Ok(()),
            Ok(false) => self.dispatch_else(&path, &input),
            Err(e) => Err(e),
        };
        self.check(result)
    }

    /// Closes the innermost entity. Its path is dispatched with an empty
    /// value first, which fires flush triggers and rules on entity paths.
    /// Same-entity collectors registered at the closing depth are flushed
    /// after that, before the frame is popped.
    pub fn end_entity(&mut self) -> Result<(), MorphError> {
        if !self.accepting("end_entity")? {
            return Ok(());
        }
        let Some(frame) = self.frames.last() else {
            return Err(self.abort(StructuralError::UnbalancedEntityEnd.into()));
        };

        let path = frame.path.clone();
        let else_started = frame.else_started;
        let entity_count = frame.entity_count;
        let depth = self.frames.len();
        let input = NamedValue::new(frame.name.as_str(), "", self.record_count, entity_count);
        let result = self.delivery().dispatch(&path, &input, 0);
        self.check(result.map(|_| ()))?;

        let result = self.flush_entity_scope(depth, entity_count);
        self.check(result)?;

        if else_started {
            self.output.push(Event::EndEntity);
        }
        self.frames.pop();
        Ok(())
    }

    /// Closes the record: flushes every collector, children first, and
    /// forwards the record's output downstream.
    pub fn end_record(&mut self) -> Result<(), MorphError> {
        match self.phase {
            RecordPhase::Idle => {
                return Err(StructuralError::NoOpenRecord {
                    event: "end_record",
                }
                .into())
            }
            RecordPhase::Aborted => {
                self.phase = RecordPhase::Idle;
                return Ok(());
            }
            RecordPhase::InRecord => {}
        }

        if !self.frames.is_empty() {
            let open = self.frames.len();
            let error = self.abort(StructuralError::UnclosedEntities { open }.into());
            self.phase = RecordPhase::Idle;
            return Err(error);
        }

        let compiled = Arc::clone(&self.compiled);
        let record_count = self.record_count;
        let mut delivery = self.delivery();
        let flushed = compiled.flush_order().iter().try_for_each(|&collector| {
            delivery.flush_collector(collector, record_count, 0, FlushTrigger::RecordEnd, 0)
        });
        if let Err(e) = flushed {
            let error = self.abort(e.into());
            self.phase = RecordPhase::Idle;
            return Err(error);
        }

        self.output.push(Event::EndRecord);
        RecordCompleted {
            record_id: &self.record_id,
            record_count,
            event_count: self.output.len(),
        }
        .log();
        self.output.drain_into(&mut self.receiver);
        self.phase = RecordPhase::Idle;
        Ok(())
    }

    /// Drops all per-stream state and forwards the reset downstream.
    pub fn reset_stream(&mut self) {
        StreamReset {
            records_seen: self.record_count,
        }
        .log();
        self.states = self.compiled.instantiate();
        self.output.clear();
        self.frames.clear();
        self.record_id.clear();
        self.entity_count = 0;
        self.phase = RecordPhase::Idle;
        self.receiver.reset_stream();
    }

    /// Forwards `close_stream` downstream the first time it is called. Output
    /// of a record that is still open is dropped.
    pub fn close_stream(&mut self) {
        if !self.close.first_close() {
            return;
        }
        self.output.clear();
        self.frames.clear();
        self.phase = RecordPhase::Idle;
        StreamClosed {
            records_seen: self.record_count,
        }
        .log();
        self.receiver.close_stream();
    }

    /// Applies one protocol event.
    pub fn process(&mut self, event: &Event) -> Result<(), MorphError> {
        match event {
            Event::StartRecord { id } => self.start_record(id.as_deref()),
            Event::EndRecord => self.end_record(),
            Event::StartEntity { name } => self.start_entity(name.as_deref()),
            Event::EndEntity => self.end_entity(),
            Event::Literal { name, value } => self.literal(name, value),
            Event::ResetStream => {
                self.reset_stream();
                Ok(())
            }
            Event::CloseStream => {
                self.close_stream();
                Ok(())
            }
        }
    }

    fn flush_entity_scope(&mut self, depth: usize, entity_count: u64) -> ExecutionResult<()> {
        let compiled = Arc::clone(&self.compiled);
        let record_count = self.record_count;
        let mut delivery = self.delivery();
        let result = compiled.entity_flushes(depth).try_for_each(|collector| {
            delivery.flush_collector(collector, record_count, entity_count, FlushTrigger::EntityEnd, 0)
        });
        result
    }

    fn delivery(&mut self) -> Delivery<'_> {
        Delivery {
            compiled: &self.compiled,
            states: &mut self.states,
            maps: &self.maps,
            output: &mut self.output,
        }
    }

    fn accepting(&self, event: &'static str) -> Result<bool, MorphError> {
        match self.phase {
            RecordPhase::InRecord => Ok(true),
            RecordPhase::Aborted => Ok(false),
            RecordPhase::Idle => Err(StructuralError::NoOpenRecord { event }.into()),
        }
    }

    fn check(&mut self, result: ExecutionResult<()>) -> Result<(), MorphError> {
        result.map_err(|e| self.abort(e.into()))
    }

    fn abort(&mut self, error: MorphError) -> MorphError {
        RecordAborted {
            record_id: &self.record_id,
            record_count: self.record_count,
            error: &error,
        }
        .log();
        self.output.clear();
        self.states = self.compiled.instantiate();
        self.frames.clear();
        self.phase = RecordPhase::Aborted;
        error
    }

    fn current_entity_count(&self) -> u64 {
        self.frames.last().map_or(0, |frame| frame.entity_count)
    }

    fn path_for(&self, name: &str) -> String {
        match self.frames.last() {
            Some(frame) => format!("{}{}{}", frame.path, self.compiled.entity_marker(), name),
            None => name.to_string(),
        }
    }

    /// Hands a literal no pattern matched to the else receivers.
    fn dispatch_else(&mut self, path: &str, input: &NamedValue) -> ExecutionResult<()> {
        let compiled = Arc::clone(&self.compiled);
        let registry = compiled.registry();
        if registry.else_receivers().is_empty() {
            return Ok(());
        }

        let name = match registry.else_mode() {
            Some(ElseMode::Nested) if !self.frames.is_empty() => {
                if !self.open_else_entities() {
                    return Ok(());
                }
                escape(&input.name)
            }
            _ => escape(path),
        };

        let value = input.renamed(name);
        let mut delivery = self.delivery();
        for &node in registry.else_receivers() {
            delivery.enter(node, &value, 0)?;
        }
        Ok(())
    }

    /// Writes `start_entity` for every enclosing entity not yet opened for
    /// nested else values. Returns `false` if the innermost entity has rules
    /// of its own, in which case its unmatched literals are dropped.
    fn open_else_entities(&mut self) -> bool {
        let Some(top) = self.frames.last() else {
            return true;
        };
        if self.compiled.registry().has_match(&top.path) {
            return false;
        }

        let first_unopened = self
            .frames
            .iter()
            .rposition(|frame| frame.else_started)
            .map_or(0, |index| index + 1);
        for frame in &mut self.frames[first_unopened..] {
            frame.else_started = true;
            self.output.push(Event::start_entity(&frame.name));
        }
        true
    }
}

impl<R: StreamReceiver> Maps for Morph<R> {
    fn map_names(&self) -> Vec<&str> {
        self.maps.map_names()
    }

    fn get_map(&self, map: &str) -> Option<&HashMap<String, String>> {
        self.maps.get_map(map)
    }

    fn put_map(&mut self, map: &str, entries: HashMap<String, String>) -> Option<HashMap<String, String>> {
        self.maps.put_map(map, entries)
    }

    fn put_value(&mut self, map: &str, key: &str, value: &str) -> Option<String> {
        self.maps.put_value(map, key, value)
    }
}
