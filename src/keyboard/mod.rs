//! Keyboard events, key names and event sources

mod event;
pub mod keymap;
mod source;

#[cfg(target_os = "linux")]
mod evdev_listener;

pub use event::{EventKind, KeyEvent, KeyState, RawEvent, EV_KEY};
pub use keymap::{KeyCode, KeyNames};
pub use source::{EventSource, ReplaySource, SourceError, StopFlag};

#[cfg(target_os = "linux")]
pub use evdev_listener::{find_keyboard, EvdevSource};
