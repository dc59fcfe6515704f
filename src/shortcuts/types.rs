//! Key combo codec.
//!
//! This module provides:
//! - `KeyCombo` - a canonical chord (modifiers + base key)
//! - `Modifiers` - modifier flags (ctrl, shift, meta, alt)
//! - `KeyFlags` - the flags a terminal input driver reports with each raw key
//! - `encode`, `normalize`, `format_for_display` - pure conversions between them
//!
//! Canonical modifier order is `ctrl`, `shift`, `meta`, `alt`, then the key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ComboParseError;

/// Modifier keys held for a combo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    fn names(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.ctrl, "ctrl"),
            (self.shift, "shift"),
            (self.meta, "meta"),
            (self.alt, "alt"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
    }
}

/// Flags accompanying one raw key event from the terminal.
///
/// Special-key flags take precedence over the raw character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub escape: bool,
    pub tab: bool,
    pub enter: bool,
    pub backspace: bool,
    pub delete: bool,
    pub page_up: bool,
    pub page_down: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyFlags {
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    /// Name of the special key reported by these flags, if any.
    pub fn special_key(&self) -> Option<&'static str> {
        [
            (self.up, "up"),
            (self.down, "down"),
            (self.left, "left"),
            (self.right, "right"),
            (self.escape, "escape"),
            (self.tab, "tab"),
            (self.enter, "enter"),
            (self.backspace, "backspace"),
            (self.delete, "delete"),
            (self.page_up, "pageup"),
            (self.page_down, "pagedown"),
        ]
        .into_iter()
        .find_map(|(set, name)| set.then_some(name))
    }
}

/// A canonical key chord such as `ctrl+shift+up` or `ctrl+c`.
///
/// The base key is stored lowercased, so equality matches the
/// case-insensitive comparison of canonical strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    key: String,
    modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: &str, modifiers: Modifiers) -> Self {
        Self {
            key: canonicalize_key(key),
            modifiers,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Parse a `+`-separated combo string. Tokens may come in any order and
    /// any case; modifier and key aliases are accepted.
    pub fn parse(s: &str) -> Result<Self, ComboParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ComboParseError::Empty);
        }

        // A literal plus key: "+" or "ctrl++".
        let (body, plus_key) = if s == "+" {
            ("", true)
        } else if let Some(stripped) = s.strip_suffix("++") {
            (stripped, true)
        } else {
            (s, false)
        };

        let mut modifiers = Modifiers::default();
        // (token as written, canonical key)
        let mut key: Option<(String, String)> = None;
        if plus_key {
            key = Some(("+".to_string(), "plus".to_string()));
        }

        for token in body.split('+').map(str::trim).filter(|t| !t.is_empty()) {
            let lower = token.to_lowercase();
            match lower.as_str() {
                "ctrl" | "control" | "ctl" => modifiers.ctrl = true,
                "shift" | "shft" => modifiers.shift = true,
                "meta" | "cmd" | "command" | "super" | "win" => modifiers.meta = true,
                "alt" | "opt" | "option" => modifiers.alt = true,
                _ => {
                    let canonical = canonicalize_key(&lower);
                    if let Some((earlier, earlier_key)) = &key {
                        return Err(if !is_key_name(earlier_key) {
                            ComboParseError::UnknownModifier(earlier.clone())
                        } else if !is_key_name(&canonical) {
                            ComboParseError::UnknownModifier(token.to_string())
                        } else {
                            ComboParseError::UnknownToken(token.to_string())
                        });
                    }
                    key = Some((token.to_string(), canonical));
                }
            }
        }

        let (_, key) = key.ok_or(ComboParseError::MissingKey)?;
        Ok(Self { key, modifiers })
    }

    /// The canonical `ctrl+shift+meta+alt+key` form.
    pub fn to_canonical_string(&self) -> String {
        let mut parts: Vec<&str> = self.modifiers.names().collect();
        parts.push(&self.key);
        parts.join("+")
    }

    /// Title-cased form for help text, e.g. `Ctrl+Shift+Up`.
    pub fn display(&self) -> String {
        let mut parts: Vec<String> = self.modifiers.names().map(title_case).collect();
        parts.push(key_display_text(&self.key));
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl FromStr for KeyCombo {
    type Err = ComboParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for KeyCombo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for KeyCombo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Encode one raw terminal key event into a combo.
///
/// Special keys keep ctrl, shift and meta. Printable characters keep only
/// ctrl and meta: shift is already reflected in the character itself.
/// Returns `None` when there is neither a special key nor exactly one
/// printable character.
pub fn encode(input: &str, flags: &KeyFlags) -> Option<KeyCombo> {
    if let Some(key) = flags.special_key() {
        return Some(KeyCombo {
            key: key.to_string(),
            modifiers: Modifiers {
                ctrl: flags.ctrl,
                shift: flags.shift,
                meta: flags.meta,
                alt: false,
            },
        });
    }

    let mut chars = input.chars();
    let ch = chars.next()?;
    if chars.next().is_some() || ch.is_control() {
        return None;
    }

    Some(KeyCombo {
        key: canonicalize_key(&ch.to_string()),
        modifiers: Modifiers {
            ctrl: flags.ctrl,
            meta: flags.meta,
            ..Default::default()
        },
    })
}

/// Re-serialize a combo string in canonical order.
///
/// Strings that cannot be parsed come back trimmed and lowercased, so the
/// function is total and idempotent.
pub fn normalize(combo: &str) -> String {
    match KeyCombo::parse(combo) {
        Ok(parsed) => parsed.to_canonical_string(),
        Err(_) => combo.trim().to_lowercase(),
    }
}

/// Title-case every segment of a combo for UI help text.
pub fn format_for_display(combo: &str) -> String {
    match KeyCombo::parse(combo) {
        Ok(parsed) => parsed.display(),
        Err(_) => combo
            .split('+')
            .map(|segment| title_case(segment.trim()))
            .collect::<Vec<_>>()
            .join("+"),
    }
}

/// Canonicalize a key name to the internal standard form.
pub fn canonicalize_key(key: &str) -> String {
    let key_lower = key.to_lowercase();
    match key_lower.as_str() {
        "arrowup" | "uparrow" => "up",
        "arrowdown" | "downarrow" => "down",
        "arrowleft" | "leftarrow" => "left",
        "arrowright" | "rightarrow" => "right",
        "return" => "enter",
        "esc" => "escape",
        "back" => "backspace",
        "del" => "delete",
        "pgup" | "page_up" | "page-up" => "pageup",
        "pgdn" | "pgdown" | "page_down" | "page-down" => "pagedown",
        " " => "space",
        "+" => "plus",
        _ => return key_lower,
    }
    .to_string()
}

/// Named keys a combo may end in, besides single characters.
const NAMED_KEYS: &[&str] = &[
    "up", "down", "left", "right", "escape", "tab", "enter", "backspace", "delete", "pageup",
    "pagedown", "home", "end", "insert", "space", "plus", "f1", "f2", "f3", "f4", "f5", "f6",
    "f7", "f8", "f9", "f10", "f11", "f12",
];

fn is_key_name(key: &str) -> bool {
    key.chars().count() == 1 || NAMED_KEYS.contains(&key)
}

fn key_display_text(key: &str) -> String {
    match key {
        "pageup" => "PageUp".to_string(),
        "pagedown" => "PageDown".to_string(),
        "plus" => "+".to_string(),
        k => title_case(k),
    }
}

fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
