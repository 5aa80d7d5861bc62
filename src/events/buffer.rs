// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Event, StreamReceiver};

/// Records protocol events in arrival order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventBuffer {
    events: Vec<Event>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn replay<R: StreamReceiver + ?Sized>(&self, receiver: &mut R) {
        for event in &self.events {
            event.replay_to(receiver);
        }
    }

    /// Sends everything recorded to `receiver` and empties the buffer.
    pub fn drain_into<R: StreamReceiver + ?Sized>(&mut self, receiver: &mut R) {
        for event in self.events.drain(..) {
            event.replay_to(receiver);
        }
    }
}

impl StreamReceiver for EventBuffer {
    fn start_record(&mut self, id: &str) {
        self.push(Event::start_record(id));
    }

    fn end_record(&mut self) {
        self.push(Event::EndRecord);
    }

    fn start_entity(&mut self, name: &str) {
        self.push(Event::start_entity(name));
    }

    fn end_entity(&mut self) {
        self.push(Event::EndEntity);
    }

    fn literal(&mut self, name: &str, value: &str) {
        self.push(Event::literal(name, value));
    }

    fn reset_stream(&mut self) {
        self.push(Event::ResetStream);
    }

    fn close_stream(&mut self) {
        self.push(Event::CloseStream);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_into_forwards_and_empties() {
        let mut source = EventBuffer::new();
        source.start_record("1");
        source.start_entity("e");
        source.literal("n", "v");
        source.end_entity();
        source.end_record();

        let mut sink = EventBuffer::new();
        source.drain_into(&mut sink);

        assert!(source.is_empty());
        assert_eq!(
            sink.events(),
            &[
                Event::start_record("1"),
                Event::start_entity("e"),
                Event::literal("n", "v"),
                Event::EndEntity,
                Event::EndRecord,
            ]
        );
    }
}
