//! Gesture codes and the two collaborators the menu talks to: something that
//! reports swipes, and something with text slots to draw into.
//!
//! Neither side knows whether it is backed by real hardware, a simulator
//! window, or a test script.

use std::collections::VecDeque;
use std::convert::Infallible;

use tracing::warn;

// ════════════════════════════════════════════════════════════════════════════
// GestureCode
// ════════════════════════════════════════════════════════════════════════════

/// The four-swipe vocabulary of a proximity/gesture sensor, plus "nothing".
///
/// The discriminants are the raw codes such sensors report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GestureCode {
    None  = 0,
    Down  = 1,
    Up    = 2,
    Left  = 3,
    Right = 4,
}

impl GestureCode {
    /// Decode a raw sensor code.  Anything unrecognised reads as `None`.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => GestureCode::Down,
            2 => GestureCode::Up,
            3 => GestureCode::Left,
            4 => GestureCode::Right,
            _ => GestureCode::None,
        }
    }

    pub fn raw(self) -> u8 { self as u8 }

    pub fn is_none(self) -> bool { self == GestureCode::None }
}

impl From<u8> for GestureCode {
    fn from(raw: u8) -> Self { GestureCode::from_raw(raw) }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSource
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can be asked for the most recent swipe.
///
/// `gesture()` is called once per loop tick, so it must not block.  It
/// returns the swipe seen since the previous call, or `GestureCode::None`.
pub trait GestureSource {
    type Error;

    fn gesture(&mut self) -> Result<GestureCode, Self::Error>;
}

impl<G: GestureSource + ?Sized> GestureSource for Box<G> {
    type Error = G::Error;

    fn gesture(&mut self) -> Result<GestureCode, Self::Error> {
        (**self).gesture()
    }
}

impl<G: GestureSource + ?Sized> GestureSource for &mut G {
    type Error = G::Error;

    fn gesture(&mut self) -> Result<GestureCode, Self::Error> {
        (**self).gesture()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DisplaySink
// ════════════════════════════════════════════════════════════════════════════

/// A display with a fixed number of pre-allocated text slots.
pub trait DisplaySink {
    fn slot_count(&self) -> usize;

    /// Replace the text of slot `index`.  Indices at or past `slot_count()`
    /// are ignored.
    fn set_slot_text(&mut self, index: usize, text: &str);
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedGestures — replays a fixed sequence
// ════════════════════════════════════════════════════════════════════════════

/// Gesture source that hands out a pre-recorded sequence, then `None`
/// forever.  Used by the demo and by tests.
#[derive(Clone, Debug, Default)]
pub struct ScriptedGestures {
    codes: VecDeque<GestureCode>,
}

impl ScriptedGestures {
    pub fn new<I: IntoIterator<Item = GestureCode>>(codes: I) -> Self {
        ScriptedGestures { codes: codes.into_iter().collect() }
    }

    /// Build from raw sensor codes, decoding each with [`GestureCode::from_raw`].
    pub fn from_raw(raw: &[u8]) -> Self {
        ScriptedGestures::new(raw.iter().map(|&r| GestureCode::from_raw(r)))
    }

    pub fn push(&mut self, code: GestureCode) {
        self.codes.push_back(code);
    }

    pub fn remaining(&self) -> usize { self.codes.len() }
}

impl GestureSource for ScriptedGestures {
    type Error = Infallible;

    fn gesture(&mut self) -> Result<GestureCode, Infallible> {
        Ok(self.codes.pop_front().unwrap_or(GestureCode::None))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TextSlots — in-memory display
// ════════════════════════════════════════════════════════════════════════════

/// A display that just remembers its slot texts and counts writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSlots {
    slots:  Vec<String>,
    writes: usize,
}

impl TextSlots {
    pub fn new(count: usize) -> Self {
        TextSlots { slots: vec![String::new(); count], writes: 0 }
    }

    pub fn slots(&self) -> &[String] { &self.slots }

    /// Total number of accepted `set_slot_text` calls.
    pub fn writes(&self) -> usize { self.writes }
}

impl DisplaySink for TextSlots {
    fn slot_count(&self) -> usize { self.slots.len() }

    fn set_slot_text(&mut self, index: usize, text: &str) {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.clear();
                slot.push_str(text);
                self.writes += 1;
            }
            None => warn!(index, slots = self.slots.len(), "text slot out of range"),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
