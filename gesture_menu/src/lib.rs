//! # gesture_menu
//!
//! A small settings menu driven by four swipe gestures, as found on a
//! proximity/gesture sensor.
//!
//! * [`MenuModel`] holds named items, each with an ordered option list and a
//!   current selection, and knows which item has focus.  All moves wrap.
//! * [`GestureMenu`] polls a [`GestureSource`] once per call, applies the
//!   swipe to the model, redraws a window of items into a [`DisplaySink`],
//!   and reports a [`Selection`] only when an option changed.
//!
//! ## Quick start
//!
//! ```rust
//! use gesture_menu::{GestureMenu, ItemSpec, ScriptedGestures, TextSlots, GestureCode};
//!
//! let items = [
//!     ItemSpec::new("Wave", ["Sine", "Square", "Saw"], 0),
//!     ItemSpec::new("LFO",  ["Off", "Trem", "Vib"], 0),
//! ];
//! let swipes = ScriptedGestures::new([GestureCode::Right]);
//! let mut menu = GestureMenu::from_specs(swipes, &items, 2).unwrap();
//! let mut screen = TextSlots::new(2);
//!
//! let sel = menu.poll(&mut screen).unwrap().unwrap();
//! assert_eq!(sel.item, "Wave");
//! assert_eq!(sel.value.to_string(), "Square");
//! ```

pub mod error;
pub mod model;
pub mod gesture;
pub mod dispatcher;

pub use error::MenuError;
pub use model::{ItemSpec, MenuItem, MenuModel, OptionValue};
pub use gesture::{DisplaySink, GestureCode, GestureSource, ScriptedGestures, TextSlots};
pub use dispatcher::{clamp_focus_offset, GestureMenu, Selection, DEFAULT_FOCUS_OFFSET, DEFAULT_WINDOW_SIZE};
