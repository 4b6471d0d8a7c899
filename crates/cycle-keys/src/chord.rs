use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{Key, Modifier, ModifierSet};

/// A key chord: a set of modifiers plus a single key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Chord {
    /// Set of modifier keys held down for this chord.
    pub modifiers: ModifierSet,
    /// The non-modifier key for this chord.
    pub key: Key,
}

impl Chord {
    /// Build a chord from parts.
    pub fn new(modifiers: ModifierSet, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// Parses a chord specification of the form "shift+opt+k".
    ///
    /// - Case-insensitive for both modifiers and the key.
    /// - Components are separated by "+"; the last component is always the key spec.
    /// - Modifiers may use aliases handled by `Modifier::from_spec`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').collect();
        let key_raw = parts.pop()?;
        let key = if key_raw == " " {
            Key::from_spec(" ")
        } else {
            Key::from_spec(key_raw.trim())
        }?;
        let mut modifiers = ModifierSet::new();
        for m in parts {
            let mt = m.trim();
            if mt.is_empty() {
                return None;
            }
            modifiers.insert(Modifier::from_spec(mt)?);
        }
        Some(Self { modifiers, key })
    }

    /// Returns the canonical string form, modifiers first in canonical order.
    pub fn to_string_canonical(&self) -> String {
        let mut out: Vec<String> = self.modifiers.iter().map(Modifier::to_spec).collect();
        out.push(self.key.to_spec());
        out.join("+")
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_canonical())
    }
}

impl Serialize for Chord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_canonical())
    }
}

impl<'de> Deserialize<'de> for Chord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| de::Error::custom(format!("invalid chord: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_chord() {
        let c = Chord::parse("shift+opt+k").expect("parse");
        assert!(c.modifiers.contains(Modifier::Shift));
        assert!(c.modifiers.contains(Modifier::Option));
        assert_eq!(c.key, Key::K);
        assert_eq!(c.to_string(), "opt+shift+k");
    }

    #[test]
    fn digit_and_punct() {
        let c1 = Chord::parse("cmd+1").expect("parse");
        assert!(c1.modifiers.contains(Modifier::Command));
        assert_eq!(c1.key, Key::Digit1);
        assert_eq!(c1.to_string(), "cmd+1");

        let c2 = Chord::parse("opt+`").expect("parse");
        assert_eq!(c2.key, Key::Grave);
        assert_eq!(c2.to_string(), "opt+`");
    }

    #[test]
    fn idempotence_roundtrip() {
        let inputs = ["shift+opt+k", "CTRL+ALT+Space", "Command+Digit1", "fn+f5", "opt+tab"];
        for s in inputs {
            let c = Chord::parse(s).expect("parse");
            let spec = c.to_string();
            let c2 = Chord::parse(&spec).expect("reparse");
            assert_eq!(c, c2, "idempotent for {} => {}", s, spec);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Chord::parse(""), None);
        assert_eq!(Chord::parse("cmd++a"), None);
        assert_eq!(Chord::parse("a+b"), None);
    }

    #[test]
    fn parse_no_modifiers() {
        let c = Chord::parse("f13").map(|c| c.key);
        assert_eq!(c, None);
        let c = Chord::parse("f5").expect("parse");
        assert!(c.modifiers.is_empty());
        assert_eq!(c.key, Key::F5);
    }
}
