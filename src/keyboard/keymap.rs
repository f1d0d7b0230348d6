//! Key codes and the human-readable key-name table

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Represents a physical key code (Linux input event code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Linux input key codes for a standard US layout
const STANDARD_NAMES: &[(u16, &str)] = &[
    // Function row
    (1, "Escape"),
    (59, "F1"),
    (60, "F2"),
    (61, "F3"),
    (62, "F4"),
    (63, "F5"),
    (64, "F6"),
    (65, "F7"),
    (66, "F8"),
    (67, "F9"),
    (68, "F10"),
    (87, "F11"),
    (88, "F12"),
    // Number row
    (41, "Grave"),
    (2, "1"),
    (3, "2"),
    (4, "3"),
    (5, "4"),
    (6, "5"),
    (7, "6"),
    (8, "7"),
    (9, "8"),
    (10, "9"),
    (11, "0"),
    (12, "Minus"),
    (13, "Equals"),
    (14, "Backspace"),
    // Top letter row
    (15, "Tab"),
    (16, "Q"),
    (17, "W"),
    (18, "E"),
    (19, "R"),
    (20, "T"),
    (21, "Y"),
    (22, "U"),
    (23, "I"),
    (24, "O"),
    (25, "P"),
    (26, "LeftBracket"),
    (27, "RightBracket"),
    (43, "Backslash"),
    // Home row
    (58, "CapsLock"),
    (30, "A"),
    (31, "S"),
    (32, "D"),
    (33, "F"),
    (34, "G"),
    (35, "H"),
    (36, "J"),
    (37, "K"),
    (38, "L"),
    (39, "Semicolon"),
    (40, "Apostrophe"),
    (28, "Enter"),
    // Bottom letter row
    (42, "LeftShift"),
    (44, "Z"),
    (45, "X"),
    (46, "C"),
    (47, "V"),
    (48, "B"),
    (49, "N"),
    (50, "M"),
    (51, "Comma"),
    (52, "Period"),
    (53, "Slash"),
    (54, "RightShift"),
    // Modifiers and space
    (29, "LeftCtrl"),
    (125, "LeftMeta"),
    (56, "LeftAlt"),
    (57, "Space"),
    (100, "RightAlt"),
    (126, "RightMeta"),
    (127, "Menu"),
    (97, "RightCtrl"),
    // Arrows
    (103, "Up"),
    (105, "Left"),
    (108, "Down"),
    (106, "Right"),
    // Navigation cluster
    (110, "Insert"),
    (102, "Home"),
    (104, "PageUp"),
    (111, "Delete"),
    (107, "End"),
    (109, "PageDown"),
    // Numpad
    (69, "NumLock"),
    (98, "KPSlash"),
    (55, "KPAsterisk"),
    (74, "KPMinus"),
    (78, "KPPlus"),
    (96, "KPEnter"),
    (83, "KPDot"),
    (82, "KP0"),
    (79, "KP1"),
    (80, "KP2"),
    (81, "KP3"),
    (75, "KP4"),
    (76, "KP5"),
    (77, "KP6"),
    (71, "KP7"),
    (72, "KP8"),
    (73, "KP9"),
];

/// Highest key code the kernel defines (`KEY_MAX`)
#[cfg(target_os = "linux")]
const KERNEL_KEY_MAX: u16 = 0x2ff;

/// Kernel name for a key code, without the `KEY_` prefix
#[cfg(target_os = "linux")]
fn kernel_name(code: u16) -> Option<String> {
    let name = format!("{:?}", evdev::Key::new(code));
    if name.starts_with("unknown") {
        return None;
    }
    Some(name.strip_prefix("KEY_").unwrap_or(&name).to_string())
}

/// Read-only lookup from key code to display name.
///
/// Built once per run and handed to the timing engine.
#[derive(Debug, Clone, Default)]
pub struct KeyNames {
    names: HashMap<KeyCode, String>,
}

impl KeyNames {
    /// An empty table; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in US layout table
    pub fn standard() -> Self {
        Self::from_pairs(STANDARD_NAMES.iter().map(|&(code, name)| (code, name)))
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u16, S)>,
        S: Into<String>,
    {
        let names = pairs
            .into_iter()
            .map(|(code, name)| (KeyCode(code), name.into()))
            .collect();
        Self { names }
    }

    /// Name every code the table lacks after the kernel's key constants
    /// (`KEY_MUTE` becomes `MUTE`)
    #[cfg(target_os = "linux")]
    pub fn with_kernel_names(mut self) -> Self {
        use std::collections::hash_map::Entry;

        for code in 1..=KERNEL_KEY_MAX {
            if let Entry::Vacant(slot) = self.names.entry(KeyCode(code)) {
                if let Some(name) = kernel_name(code) {
                    slot.insert(name);
                }
            }
        }
        self
    }

    /// Replace or add names, e.g. from the config file
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (u16, String)>,
    {
        for (code, name) in overrides {
            self.names.insert(KeyCode(code), name);
        }
        self
    }

    pub fn name(&self, code: KeyCode) -> Option<&str> {
        self.names.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
