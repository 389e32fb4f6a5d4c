//! Canonical key + modifier representation
//!
//! A [`ShortcutKey`] is what both sides of the dispatcher agree on: shortcut
//! definitions are parsed from binding strings such as `"ctrl+k"`, and terminal
//! input is folded into the same shape by [`ShortcutKey::from_key_event`].

use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

/// The eight possible combinations of ctrl / alt / shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Modifier {
    #[default]
    None,
    Ctrl,
    Alt,
    Shift,
    CtrlShift,
    CtrlAlt,
    AltShift,
    CtrlAltShift,
}

impl Modifier {
    pub fn from_flags(ctrl: bool, alt: bool, shift: bool) -> Self {
        match (ctrl, alt, shift) {
            (false, false, false) => Modifier::None,
            (true, false, false) => Modifier::Ctrl,
            (false, true, false) => Modifier::Alt,
            (false, false, true) => Modifier::Shift,
            (true, false, true) => Modifier::CtrlShift,
            (true, true, false) => Modifier::CtrlAlt,
            (false, true, true) => Modifier::AltShift,
            (true, true, true) => Modifier::CtrlAltShift,
        }
    }

    /// Returns `(ctrl, alt, shift)`.
    pub fn flags(self) -> (bool, bool, bool) {
        match self {
            Modifier::None => (false, false, false),
            Modifier::Ctrl => (true, false, false),
            Modifier::Alt => (false, true, false),
            Modifier::Shift => (false, false, true),
            Modifier::CtrlShift => (true, false, true),
            Modifier::CtrlAlt => (true, true, false),
            Modifier::AltShift => (false, true, true),
            Modifier::CtrlAltShift => (true, true, true),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Modifier::None => "",
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::CtrlShift => "Ctrl+Shift",
            Modifier::CtrlAlt => "Ctrl+Alt",
            Modifier::AltShift => "Alt+Shift",
            Modifier::CtrlAltShift => "Ctrl+Alt+Shift",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A base key plus modifier. Base keys are compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortcutKey {
    base: String,
    modifier: Modifier,
}

impl ShortcutKey {
    pub fn new(base: impl Into<String>, modifier: Modifier) -> Self {
        Self {
            base: base.into(),
            modifier,
        }
    }

    /// Parse a binding string such as `"ctrl+shift+k"` or `"alt+ctrl+k"`.
    ///
    /// The last `+`-separated token is the base key and every earlier token is a
    /// modifier name. Unknown modifier tokens are ignored. A trailing `"++"`
    /// binds the `+` key itself.
    pub fn parse(binding: &str) -> Self {
        let binding = binding.trim();
        let (modifiers, base) = if binding == "+" {
            ("", "+")
        } else if let Some(prefix) = binding.strip_suffix("++") {
            (prefix, "+")
        } else {
            match binding.rfind('+') {
                Some(idx) => (&binding[..idx], &binding[idx + 1..]),
                None => ("", binding),
            }
        };

        let (mut ctrl, mut alt, mut shift) = (false, false, false);
        for token in modifiers.split('+').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "alt" | "option" | "meta" => alt = true,
                "shift" => shift = true,
                other => tracing::debug!(token = other, binding, "ignoring unknown modifier"),
            }
        }

        Self::new(base.trim(), Modifier::from_flags(ctrl, alt, shift))
    }

    /// Fold a terminal key event into a shortcut key.
    ///
    /// Letters typed with shift (or arriving as uppercase) become the lowercase
    /// letter plus `Shift`; other printable characters already carry shift in
    /// the character itself, so the flag is dropped for them.
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = event.modifiers.contains(KeyModifiers::ALT);
        let mut shift = event.modifiers.contains(KeyModifiers::SHIFT);

        let base = match event.code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) if c.is_alphabetic() => {
                if c.is_uppercase() {
                    shift = true;
                }
                c.to_lowercase().collect()
            }
            KeyCode::Char(c) => {
                shift = false;
                c.to_string()
            }
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::BackTab => {
                shift = true;
                "tab".to_string()
            }
            KeyCode::Backspace => "backspace".to_string(),
            KeyCode::Delete => "delete".to_string(),
            KeyCode::Insert => "insert".to_string(),
            KeyCode::Up => "up".to_string(),
            KeyCode::Down => "down".to_string(),
            KeyCode::Left => "left".to_string(),
            KeyCode::Right => "right".to_string(),
            KeyCode::Home => "home".to_string(),
            KeyCode::End => "end".to_string(),
            KeyCode::PageUp => "pgup".to_string(),
            KeyCode::PageDown => "pgdown".to_string(),
            KeyCode::F(n) => format!("f{n}"),
            _ => return None,
        };

        Some(Self::new(base, Modifier::from_flags(ctrl, alt, shift)))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn modifier(&self) -> Modifier {
        self.modifier
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}

impl fmt::Display for ShortcutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            Modifier::None => f.write_str(&self.base),
            modifier => write!(f, "{}+{}", modifier, self.base),
        }
    }
}

impl FromStr for ShortcutKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for ShortcutKey {
    fn from(binding: &str) -> Self {
        Self::parse(binding)
    }
}

/// Serialized as its canonical binding string.
impl Serialize for ShortcutKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShortcutKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let binding = String::deserialize(deserializer)?;
        Ok(Self::parse(&binding))
    }
}
