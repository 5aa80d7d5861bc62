// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Collect, EmitContext};
use crate::dataflow::{EdgeRole, Emission, NodeId};
use crate::errors::{ExecutionError, ExecutionResult};

/// Scope and emission switches shared by every collector kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorFlags {
    /// Only emit when flushed, never as soon as the collector is complete.
    pub wait_for_flush: bool,
    /// Discard buffered values when a value from a different entity arrives.
    pub same_entity: bool,
    /// Hold emissions until the entity the values came from closes, then
    /// flush once per entity occurrence. Set for `same_entity` collectors
    /// whose sources sit inside an entity.
    pub flush_on_entity_end: bool,
    /// Clear buffered values after every emission.
    pub reset: bool,
    /// Emit at the end of a record. Off when explicit flush triggers are
    /// configured that do not include the record scope.
    pub flush_on_record_end: bool,
}

impl Default for CollectorFlags {
    fn default() -> Self {
        CollectorFlags {
            wait_for_flush: false,
            same_entity: false,
            flush_on_entity_end: false,
            reset: false,
            flush_on_record_end: true,
        }
    }
}

/// What caused a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// A path matching one of the collector's `flush_with` patterns.
    Pattern,
    /// The entity at the collector's nesting depth closed.
    EntityEnd,
    /// The record closed.
    RecordEnd,
}

/// The compiled description of one collector node. Each running morph gets
/// its own [`CollectorState`] from it.
#[derive(Debug)]
pub struct CollectorSpec {
    pub collect: Box<dyn Collect>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub flags: CollectorFlags,
    pub has_condition: bool,
}

impl CollectorSpec {
    pub fn new(collect: Box<dyn Collect>) -> Self {
        CollectorSpec {
            collect,
            name: None,
            value: None,
            flags: CollectorFlags::default(),
            has_condition: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_flags(mut self, flags: CollectorFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn instantiate(&self) -> CollectorState {
        CollectorState {
            collect: self.collect.boxed_clone(),
            name: self.name.clone(),
            value: self.value.clone(),
            flags: self.flags,
            has_condition: self.has_condition,
            condition_met: !self.has_condition,
            record_count: 0,
            entity_count: 0,
            dirty: false,
        }
    }
}

/// Per-stream state of a collector: the kind-specific buffer plus the
/// record/entity bookkeeping that decides when it emits and clears.
#[derive(Debug)]
pub struct CollectorState {
    collect: Box<dyn Collect>,
    name: Option<String>,
    value: Option<String>,
    flags: CollectorFlags,
    has_condition: bool,
    condition_met: bool,
    record_count: u64,
    entity_count: u64,
    /// Input arrived since the last emission.
    dirty: bool,
}

impl CollectorState {
    pub fn kind(&self) -> &'static str {
        self.collect.kind()
    }

    pub fn flags(&self) -> CollectorFlags {
        self.flags
    }

    pub fn receive(
        &mut self,
        source: NodeId,
        role: EdgeRole,
        input: &Emission,
    ) -> ExecutionResult<Vec<Emission>> {
        self.update_counts(input.record_count(), input.entity_count());

        match (role, input) {
            (EdgeRole::Condition, _) => self.condition_met = true,
            (EdgeRole::EntityName, Emission::Value(named)) => {
                self.collect.receive_name(source, &named.value);
                self.dirty = true;
            }
            (EdgeRole::Value, Emission::Value(named)) => {
                self.collect.receive(source, &named.name, &named.value);
                self.dirty = true;
            }
            (EdgeRole::Value, Emission::Fragment(fragment)) => {
                if !self.collect.receive_fragment(source, fragment) {
                    return Err(self.misrouted());
                }
                self.dirty = true;
            }
            (EdgeRole::EntityName, Emission::Fragment(_)) => return Err(self.misrouted()),
        }

        let deferred = self.flags.wait_for_flush || self.flags.flush_on_entity_end;
        if deferred || !self.condition_met || !self.collect.is_complete() {
            return Ok(Vec::new());
        }
        let emissions = self.emit();
        if self.flags.reset {
            self.clear_scope();
        }
        Ok(emissions)
    }

    /// Closes the current scope. Ignored unless it belongs to the record (and,
    /// for same-entity collectors flushed by a pattern or an entity end, the
    /// entity) the buffered values came from.
    ///
    /// Entity and record ends always clear the scope; a pattern flush only
    /// clears it for `reset` collectors.
    pub fn flush(&mut self, record_count: u64, entity_count: u64, trigger: FlushTrigger) -> Vec<Emission> {
        let other_entity = self.flags.same_entity
            && trigger != FlushTrigger::RecordEnd
            && entity_count != self.entity_count;
        if record_count != self.record_count || other_entity {
            return Vec::new();
        }

        let triggered = trigger != FlushTrigger::RecordEnd || self.flags.flush_on_record_end;
        let scoped = self.flags.wait_for_flush
            || self.collect.emits_at_scope_end()
            || (self.flags.flush_on_entity_end && self.collect.is_complete());
        let emissions = if triggered && scoped && self.dirty && self.condition_met {
            self.emit()
        } else {
            Vec::new()
        };

        if self.flags.reset || trigger != FlushTrigger::Pattern {
            self.clear_scope();
        }
        emissions
    }

    /// Drops everything, including the record and entity the state belonged to.
    pub fn reset_stream(&mut self) {
        self.clear_scope();
        self.record_count = 0;
        self.entity_count = 0;
    }

    fn emit(&mut self) -> Vec<Emission> {
        let context = EmitContext {
            name: self.name.as_deref(),
            value: self.value.as_deref(),
            record_count: self.record_count,
            entity_count: self.entity_count,
        };
        self.dirty = false;
        self.collect.emit(&context)
    }

    fn update_counts(&mut self, record_count: u64, entity_count: u64) {
        if record_count != self.record_count {
            self.clear_scope();
            self.record_count = record_count;
        } else if self.flags.same_entity && entity_count != self.entity_count {
            self.clear_scope();
        }
        self.entity_count = entity_count;
    }

    fn clear_scope(&mut self) {
        self.collect.clear();
        self.dirty = false;
        self.condition_met = !self.has_condition;
    }

    fn misrouted(&self) -> ExecutionError {
        ExecutionError::MisroutedFragment {
            target: format!("collector '{}'", self.collect.kind()),
        }
    }
}
