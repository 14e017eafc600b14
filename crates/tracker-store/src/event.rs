//! Event payloads.

use std::fmt;

/// An opaque, immutable event payload.
///
/// The store never looks inside an event: serializing it yields its bytes
/// and deserializing wraps them back up.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Event {
    bytes: Vec<u8>,
}

impl Event {
    /// Creates an event from its payload bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Serialized form of the event, as written to the payload log.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Deserializes an event read back from the payload log.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for an empty payload.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.bytes) {
            Ok(text) => f.debug_tuple("Event").field(&text).finish(),
            Err(_) => f.debug_tuple("Event").field(&self.bytes).finish(),
        }
    }
}

impl From<&str> for Event {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for Event {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<&[u8]> for Event {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for Event {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_events_debug_as_text() {
        assert_eq!(format!("{:?}", Event::from("a")), "Event(\"a\")");
        assert_eq!(format!("{:?}", Event::new(vec![0xff])), "Event([255])");
    }

    #[test]
    fn bytes_pass_through_unchanged() {
        let event = Event::from("payload");
        assert_eq!(Event::from_bytes(event.as_bytes()), event);
        assert_eq!(event.len(), 7);
        assert!(Event::default().is_empty());
    }
}
