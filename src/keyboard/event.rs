//! Keyboard event types validated at the event-source boundary

use super::KeyCode;

/// evdev event type number for key events (`EV_KEY`)
pub const EV_KEY: u16 = 0x01;

/// Kind of a raw input event as reported by the event source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A keyboard key event
    Key,
    /// Any other input event type (sync, relative motion, LEDs, ...)
    Other(u16),
}

impl EventKind {
    /// Map an evdev event type number to a kind
    pub fn from_type(event_type: u16) -> Self {
        if event_type == EV_KEY {
            EventKind::Key
        } else {
            EventKind::Other(event_type)
        }
    }
}

/// State carried by a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Key went down
    Down,
    /// Key came up
    Up,
    /// Auto-repeat while the key is held
    Hold,
    /// A value the kernel is not documented to send
    Unknown(i32),
}

impl KeyState {
    /// Map an evdev key value (1 = down, 0 = up, 2 = repeat) to a state
    pub fn from_value(value: i32) -> Self {
        match value {
            1 => KeyState::Down,
            0 => KeyState::Up,
            2 => KeyState::Hold,
            other => KeyState::Unknown(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeyState::Down => "down",
            KeyState::Up => "up",
            KeyState::Hold => "hold",
            KeyState::Unknown(_) => "unknown",
        }
    }
}

/// An input event as produced by an event source, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
    /// Monotonic per device, in microseconds
    pub timestamp_us: u64,
}

impl RawEvent {
    pub fn new(kind: EventKind, code: u16, value: i32, timestamp_us: u64) -> Self {
        Self {
            kind,
            code,
            value,
            timestamp_us,
        }
    }

    /// Shorthand for a key event
    pub fn key(code: u16, value: i32, timestamp_us: u64) -> Self {
        Self::new(EventKind::Key, code, value, timestamp_us)
    }

    /// Validate this event as a keyboard key event.
    ///
    /// Returns `None` for every event kind other than [`EventKind::Key`].
    pub fn as_key_event(&self) -> Option<KeyEvent> {
        match self.kind {
            EventKind::Key => Some(KeyEvent::new(
                KeyCode(self.code),
                KeyState::from_value(self.value),
                self.timestamp_us,
            )),
            EventKind::Other(_) => None,
        }
    }
}

/// A validated keyboard key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code
    pub key: KeyCode,
    /// Down, up or anything else the device reported
    pub state: KeyState,
    /// When the event occurred, in microseconds
    pub timestamp_us: u64,
}

impl KeyEvent {
    pub fn new(key: KeyCode, state: KeyState, timestamp_us: u64) -> Self {
        Self {
            key,
            state,
            timestamp_us,
        }
    }
}
