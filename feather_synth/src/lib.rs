//! # feather_synth
//!
//! The Featheremin's sound source.
//!
//! | Piece            | Role                                                 |
//! |------------------|------------------------------------------------------|
//! | [`SynthDevice`]  | what the instrument asks of any synthesizer          |
//! | [`MidiSynth`]    | `SynthDevice` over MIDI (nearest note + pitch bend)  |
//! | [`MidiOut`]      | raw message sink: midir port, null, or recorder      |
//! | [`SynthConfig`]  | channels, volume, bend range, LFO scaling            |
//! | [`pitch`]        | Hz/note conversion and range mapping helpers         |

pub mod config;
pub mod device;
pub mod error;
pub mod midi;
pub mod pitch;
pub mod synth;

pub use config::SynthConfig;
pub use device::{SynthDevice, Waveform};
pub use error::SynthError;
pub use midi::{connect_midi_output, open_midi_output, MidiOut, MidirOut, NullOut, RecordingOut};
pub use pitch::{clamp, hz_to_midi, map_and_scale, midi_to_hz};
pub use synth::{MidiSynth, DRONE_MAX_HZ};
