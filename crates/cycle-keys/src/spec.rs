use crate::Key;

// Central mapping between enum variants and spec strings for shorthand/non-name specs.
macro_rules! key_spec_map {
    ($m:ident, $arg:tt) => {
        $m! { $arg,
            Digit0 => "0",
            Digit1 => "1",
            Digit2 => "2",
            Digit3 => "3",
            Digit4 => "4",
            Digit5 => "5",
            Digit6 => "6",
            Digit7 => "7",
            Digit8 => "8",
            Digit9 => "9",
            Space => "space",
            Minus => "-",
            Equal => "=",
            LeftBracket => "[",
            RightBracket => "]",
            Backslash => "\\",
            Semicolon => ";",
            Quote => "'",
            Comma => ",",
            Period => ".",
            Slash => "/",
            Grave => "`",
            LeftArrow => "left",
            RightArrow => "right",
            UpArrow => "up",
            DownArrow => "down",
            Escape => "esc",
            Command => "cmd",
            Control => "ctrl",
            Option => "opt",
            Function => "fn",
        }
    };
}

macro_rules! to_spec_match {
    ( $key:expr, $( $k:ident => $s:expr, )* ) => {
        match $key {
            $( Key::$k => $s, )*
            _ => $key.name(),
        }
    }
}

macro_rules! from_spec_match {
    ( $s:expr, $( $k:ident => $v:expr, )* ) => {{
        match $s {
            $( $v => Some(Key::$k), )*
            _ => None,
        }
    }}
}

// Aliases that only apply to parsing specs (not emitted by to_spec).
macro_rules! key_spec_aliases {
    ($m:ident, $arg:expr) => {
        $m! { $arg,
            Option => "alt",
            Return => "enter",
            Return => "ret",
            Delete => "backspace",
            Grave => "backtick",
            Space => " ",
        }
    };
}

/// Parses a key specification into a `Key`.
///
/// Tries the case-insensitive enum name first, then the shorthand table, then
/// the parse-only aliases.
pub fn from_spec(s: &str) -> Option<Key> {
    if let Some(k) = Key::from_name(s) {
        return Some(k);
    }
    let lowered = s.to_ascii_lowercase();
    if let some @ Some(_) = key_spec_map!(from_spec_match, (lowered.as_str())) {
        return some;
    }
    key_spec_aliases!(from_spec_match, lowered.as_str())
}

/// Returns the key specification string for a `Key`, always lowercased.
pub fn to_spec(key: Key) -> String {
    let s = key_spec_map!(to_spec_match, key);
    s.to_ascii_lowercase()
}

impl Key {
    /// Parses a key specification string into a `Key`.
    ///
    /// Accepts variant names (any case), symbol shorthands for digits and
    /// punctuation, and alias words such as esc, enter, left, cmd, alt.
    pub fn from_spec(s: &str) -> Option<Self> {
        from_spec(s)
    }

    /// Returns the key specification string for this `Key`.
    pub fn to_spec(self) -> String {
        to_spec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_roundtrips() {
        for &k in Key::ALL {
            let spec = to_spec(k);
            assert_eq!(from_spec(&spec), Some(k), "roundtrip failed for {spec}");
        }
    }

    #[test]
    fn aliases() {
        assert_eq!(from_spec("enter"), Some(Key::Return));
        assert_eq!(from_spec("esc"), Some(Key::Escape));
        assert_eq!(from_spec("Escape"), Some(Key::Escape));
        assert_eq!(from_spec("alt"), Some(Key::Option));
        assert_eq!(from_spec("opt"), Some(Key::Option));
        assert_eq!(from_spec("left"), Some(Key::LeftArrow));
        assert_eq!(from_spec("1"), Some(Key::Digit1));
        assert_eq!(from_spec("`"), Some(Key::Grave));
        assert_eq!(from_spec(" "), Some(Key::Space));
        assert_eq!(from_spec("F5"), Some(Key::F5));
        assert_eq!(from_spec("hyper"), None);
    }

    #[test]
    fn letters_emit_lowercase() {
        assert_eq!(to_spec(Key::A), "a");
        assert_eq!(to_spec(Key::Tab), "tab");
        assert_eq!(to_spec(Key::F12), "f12");
    }
}
