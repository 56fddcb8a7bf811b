//! # featheremin
//!
//! A two-sensor theremin.  One distance sensor sets pitch, the other sets the
//! LFO rate (or detunes a drone); swipes over a gesture sensor walk a small
//! settings menu shown on the front panel.
//!
//! ## Menu
//!
//! | Item      | Options                          | Effect                       |
//! |-----------|----------------------------------|------------------------------|
//! | Waveform  | Sine, Square, Saw                | synth program                |
//! | LFO       | Off, Tremolo, Vibrato, Drone     | what the second hand does    |
//! | Chromatic | false, true                      | snap pitch to whole notes    |
//! | Volume    | 25, 50, 75, 100                  | master volume in percent     |
//!
//! Swipe down/up to move between items, left/right to change the focused
//! item's value.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation**: the panel window's keyboard and mouse stand
//!   in for the sensors.
//! * `leap` — **Hand tracking**: a LeapMotion controller replaces them.
//!
//! ### Simulation controls
//!
//! | Input                      | Stands in for          |
//! |----------------------------|------------------------|
//! | Arrow keys / WASD          | swipes                 |
//! | Mouse height in play field | pitch hand (ToF A)     |
//! | Mouse across play field    | LFO hand (ToF B)       |
//! | `Q` / `Escape`             | power off              |

pub mod app;
pub mod config;
pub mod hardware;
pub mod leap;
pub mod panel;
pub mod sim;

pub use app::{run, AppState, LfoMode};
pub use config::Settings;
pub use hardware::{Hardware, RangeSensor, SensorError};
