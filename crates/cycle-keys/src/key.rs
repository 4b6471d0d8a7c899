//! The `Key` enum and its canonical names.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Declares the `Key` enum together with its canonical name table.
macro_rules! define_keys {
    ( $( $(#[$doc:meta])* $variant:ident => $name:expr, )* ) => {
        /// A physical key, independent of keyboard layout.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub enum Key {
            $( $(#[$doc])* $variant, )*
        }

        impl Key {
            /// Every key, in declaration order.
            pub const ALL: &'static [Key] = &[ $( Key::$variant, )* ];

            /// Canonical variant name of this key (e.g. `"LeftArrow"`).
            pub fn name(self) -> &'static str {
                match self {
                    $( Key::$variant => $name, )*
                }
            }

            /// Look up a key by its variant name, ignoring ASCII case.
            pub fn from_name(s: &str) -> Option<Self> {
                $(
                    if s.eq_ignore_ascii_case($name) {
                        return Some(Key::$variant);
                    }
                )*
                None
            }
        }
    };
}

define_keys! {
    A => "A",
    B => "B",
    C => "C",
    D => "D",
    E => "E",
    F => "F",
    G => "G",
    H => "H",
    I => "I",
    J => "J",
    K => "K",
    L => "L",
    M => "M",
    N => "N",
    O => "O",
    P => "P",
    Q => "Q",
    R => "R",
    S => "S",
    T => "T",
    U => "U",
    V => "V",
    W => "W",
    X => "X",
    Y => "Y",
    Z => "Z",
    Digit0 => "Digit0",
    Digit1 => "Digit1",
    Digit2 => "Digit2",
    Digit3 => "Digit3",
    Digit4 => "Digit4",
    Digit5 => "Digit5",
    Digit6 => "Digit6",
    Digit7 => "Digit7",
    Digit8 => "Digit8",
    Digit9 => "Digit9",
    F1 => "F1",
    F2 => "F2",
    F3 => "F3",
    F4 => "F4",
    F5 => "F5",
    F6 => "F6",
    F7 => "F7",
    F8 => "F8",
    F9 => "F9",
    F10 => "F10",
    F11 => "F11",
    F12 => "F12",
    Tab => "Tab",
    Return => "Return",
    Escape => "Escape",
    Space => "Space",
    Delete => "Delete",
    Grave => "Grave",
    Minus => "Minus",
    Equal => "Equal",
    Comma => "Comma",
    Period => "Period",
    Slash => "Slash",
    Semicolon => "Semicolon",
    Quote => "Quote",
    LeftBracket => "LeftBracket",
    RightBracket => "RightBracket",
    Backslash => "Backslash",
    LeftArrow => "LeftArrow",
    RightArrow => "RightArrow",
    UpArrow => "UpArrow",
    DownArrow => "DownArrow",
    /// Left or generic command key.
    Command => "Command",
    /// Left or generic option (alt) key.
    Option => "Option",
    /// Left or generic control key.
    Control => "Control",
    /// Left or generic shift key.
    Shift => "Shift",
    /// The fn / globe key.
    Function => "Function",
}

impl Key {
    /// True for the arrow keys.
    pub fn is_arrow(self) -> bool {
        matches!(
            self,
            Self::LeftArrow | Self::RightArrow | Self::UpArrow | Self::DownArrow
        )
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_spec())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_spec(&s).ok_or_else(|| de::Error::custom(format!("unknown key: {s}")))
    }
}
