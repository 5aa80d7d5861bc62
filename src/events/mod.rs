// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The hierarchical event protocol shared by decoders, the engine and sinks.
//!
//! A record is framed by `start_record`/`end_record`; entities nest inside it
//! and `literal` carries a single `(name, value)` pair. Downstream consumers
//! implement [`StreamReceiver`]; [`EventBuffer`] records a stream so it can be
//! replayed later or inspected in tests.

mod buffer;

pub use buffer::EventBuffer;

use serde::{Deserialize, Serialize};

/// A consumer of hierarchical record events.
pub trait StreamReceiver {
    fn start_record(&mut self, id: &str);
    fn end_record(&mut self);
    fn start_entity(&mut self, name: &str);
    fn end_entity(&mut self);
    fn literal(&mut self, name: &str, value: &str);

    fn reset_stream(&mut self) {}

    fn close_stream(&mut self) {}
}

impl<R: StreamReceiver + ?Sized> StreamReceiver for &mut R {
    fn start_record(&mut self, id: &str) {
        (**self).start_record(id)
    }

    fn end_record(&mut self) {
        (**self).end_record()
    }

    fn start_entity(&mut self, name: &str) {
        (**self).start_entity(name)
    }

    fn end_entity(&mut self) {
        (**self).end_entity()
    }

    fn literal(&mut self, name: &str, value: &str) {
        (**self).literal(name, value)
    }

    fn reset_stream(&mut self) {
        (**self).reset_stream()
    }

    fn close_stream(&mut self) {
        (**self).close_stream()
    }
}

impl<R: StreamReceiver + ?Sized> StreamReceiver for Box<R> {
    fn start_record(&mut self, id: &str) {
        (**self).start_record(id)
    }

    fn end_record(&mut self) {
        (**self).end_record()
    }

    fn start_entity(&mut self, name: &str) {
        (**self).start_entity(name)
    }

    fn end_entity(&mut self) {
        (**self).end_entity()
    }

    fn literal(&mut self, name: &str, value: &str) {
        (**self).literal(name, value)
    }

    fn reset_stream(&mut self) {
        (**self).reset_stream()
    }

    fn close_stream(&mut self) {
        (**self).close_stream()
    }
}

/// One protocol event, owned.
///
/// Serialized with an `event` tag so event scripts read naturally:
/// `{"event": "literal", "name": "title", "value": "Moby Dick"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    StartRecord { id: Option<String> },
    EndRecord,
    StartEntity { name: Option<String> },
    EndEntity,
    Literal { name: String, value: String },
    ResetStream,
    CloseStream,
}

impl Event {
    pub fn start_record(id: &str) -> Self {
        Event::StartRecord {
            id: Some(id.to_string()),
        }
    }

    pub fn start_entity(name: &str) -> Self {
        Event::StartEntity {
            name: Some(name.to_string()),
        }
    }

    pub fn literal(name: &str, value: &str) -> Self {
        Event::Literal {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Sends this event to `receiver`. Missing ids and names are sent as empty
    /// strings since the receiver protocol has no null.
    pub fn replay_to<R: StreamReceiver + ?Sized>(&self, receiver: &mut R) {
        match self {
            Event::StartRecord { id } => receiver.start_record(id.as_deref().unwrap_or_default()),
            Event::EndRecord => receiver.end_record(),
            Event::StartEntity { name } => {
                receiver.start_entity(name.as_deref().unwrap_or_default())
            }
            Event::EndEntity => receiver.end_entity(),
            Event::Literal { name, value } => receiver.literal(name, value),
            Event::ResetStream => receiver.reset_stream(),
            Event::CloseStream => receiver.close_stream(),
        }
    }
}

/// Guards an operation that must reach downstream at most once.
#[derive(Debug, Default, Clone, Copy)]
pub struct CloseOnce {
    closed: bool,
}

impl CloseOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time it is called and `false` afterwards.
    pub fn first_close(&mut self) -> bool {
        !std::mem::replace(&mut self.closed, true)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
