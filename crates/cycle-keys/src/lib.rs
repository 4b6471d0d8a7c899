//! cycle-keys: keys, modifiers and chords for the switcher.
//!
//! - `Key`: the physical keys the controller reasons about.
//! - `Modifier` and `ModifierSet`: modifier keys and a compact set of them.
//! - `Chord`: a modifier set plus a single key, parsed from specs like
//!   `"opt+tab"`.
//!
//! Keys are layout independent. Nothing here talks to the OS; the engine
//! receives already-decoded keys from whatever event source it is wired to.

mod key;
pub use key::Key;

mod spec;

mod modifiers;
pub use modifiers::{Modifier, ModifierSet};

mod chord;
pub use chord::Chord;
