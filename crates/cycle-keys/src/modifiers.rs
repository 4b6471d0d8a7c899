use std::{convert::TryFrom, fmt};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Key;

/// Modifier keys that can form part of a shortcut chord.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Modifier {
    /// Command (⌘).
    Command,
    /// Option (⌥), also spelled alt.
    Option,
    /// Control (⌃).
    Control,
    /// Shift (⇧).
    Shift,
    /// The fn / globe key.
    Function,
}

impl Modifier {
    /// All modifiers in canonical display order.
    pub const ALL: [Self; 5] = [
        Self::Command,
        Self::Option,
        Self::Control,
        Self::Shift,
        Self::Function,
    ];

    /// Bit used for this modifier inside a `ModifierSet`.
    const fn bit(self) -> u8 {
        match self {
            Self::Command => 1 << 0,
            Self::Option => 1 << 1,
            Self::Control => 1 << 2,
            Self::Shift => 1 << 3,
            Self::Function => 1 << 4,
        }
    }

    /// Parses a modifier specification string via key specs, then converts.
    ///
    /// Accepts case-insensitive variant names and alias words (cmd, ctrl, opt,
    /// alt, fn). Fails if the parsed key is not a modifier.
    pub fn from_spec(s: &str) -> Option<Self> {
        Key::from_spec(s).and_then(|k| Self::try_from(k).ok())
    }

    /// Returns the canonical lowercase spec string for this modifier.
    pub fn to_spec(self) -> String {
        Key::from(self).to_spec()
    }
}

impl From<Modifier> for Key {
    fn from(m: Modifier) -> Self {
        match m {
            Modifier::Command => Self::Command,
            Modifier::Option => Self::Option,
            Modifier::Control => Self::Control,
            Modifier::Shift => Self::Shift,
            Modifier::Function => Self::Function,
        }
    }
}

impl TryFrom<Key> for Modifier {
    type Error = ();
    fn try_from(k: Key) -> Result<Self, Self::Error> {
        match k {
            Key::Command => Ok(Self::Command),
            Key::Option => Ok(Self::Option),
            Key::Control => Ok(Self::Control),
            Key::Shift => Ok(Self::Shift),
            Key::Function => Ok(Self::Function),
            _ => Err(()),
        }
    }
}

/// A compact, copyable set of modifiers.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ModifierSet(u8);

impl ModifierSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Create an empty set.
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Add a modifier to the set.
    pub fn insert(&mut self, m: Modifier) {
        self.0 |= m.bit();
    }

    /// Remove a modifier from the set.
    pub fn remove(&mut self, m: Modifier) {
        self.0 &= !m.bit();
    }

    /// Return a copy of this set with `m` added.
    #[must_use]
    pub fn with(mut self, m: Modifier) -> Self {
        self.insert(m);
        self
    }

    /// True when `m` is in the set.
    pub fn contains(self, m: Modifier) -> bool {
        self.0 & m.bit() != 0
    }

    /// True when every modifier in `other` is also in `self`.
    pub fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when the set holds no modifiers.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of modifiers in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the modifiers in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }

    /// Parse a `+`-separated list such as `"cmd+shift"`. The empty string
    /// yields the empty set.
    pub fn parse(s: &str) -> Option<Self> {
        let mut out = Self::new();
        if s.trim().is_empty() {
            return Some(out);
        }
        for part in s.split('+') {
            out.insert(Modifier::from_spec(part.trim())?);
        }
        Some(out)
    }
}

impl FromIterator<Modifier> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut out = Self::new();
        for m in iter {
            out.insert(m);
        }
        out
    }
}

impl From<Modifier> for ModifierSet {
    fn from(m: Modifier) -> Self {
        Self::new().with(m)
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(Modifier::to_spec).collect();
        f.write_str(&parts.join("+"))
    }
}

impl fmt::Debug for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModifierSet({self})")
    }
}

impl Serialize for ModifierSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ModifierSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| de::Error::custom(format!("invalid modifiers: {s}")))
    }
}
