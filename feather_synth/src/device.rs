//! The synthesizer capability.
//!
//! One interface covers every synth the instrument can drive, so the
//! application never cares which backend makes the sound.

use std::fmt;
use std::str::FromStr;

use crate::error::SynthError;

// ════════════════════════════════════════════════════════════════════════════
// Waveform
// ════════════════════════════════════════════════════════════════════════════

/// Oscillator shape of the played voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Saw,
}

impl Waveform {
    pub fn all() -> [Waveform; 3] {
        [Waveform::Sine, Waveform::Square, Waveform::Saw]
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine   => "Sine",
            Waveform::Square => "Square",
            Waveform::Saw    => "Saw",
        }
    }

    /// General MIDI program closest to the raw waveform.
    pub fn program(self) -> u8 {
        match self {
            Waveform::Sine   => 79, // Ocarina
            Waveform::Square => 80, // Lead 1 (Square)
            Waveform::Saw    => 81, // Lead 2 (Sawtooth)
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, SynthError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine"                        => Ok(Waveform::Sine),
            "square"                      => Ok(Waveform::Square),
            "saw" | "sawtooth"            => Ok(Waveform::Saw),
            _ => Err(SynthError::UnknownWaveform(s.to_string())),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SynthDevice
// ════════════════════════════════════════════════════════════════════════════

/// What the instrument needs from a synthesizer.
///
/// Notes are MIDI note numbers and may be fractional (continuous pitch).
/// Drone frequencies are in Hz.
pub trait SynthDevice {
    /// Master volume, 0.0–1.0.
    fn set_volume(&mut self, level: f32) -> Result<(), SynthError>;

    fn set_waveform(&mut self, wave: Waveform) -> Result<(), SynthError>;

    fn set_tremolo(&mut self, rate_hz: f32) -> Result<(), SynthError>;
    fn clear_tremolo(&mut self) -> Result<(), SynthError>;

    fn set_vibrato(&mut self, rate_hz: f32) -> Result<(), SynthError>;
    fn clear_vibrato(&mut self) -> Result<(), SynthError>;

    /// Sound `note`, replacing whatever note was playing.
    fn play(&mut self, note: f32) -> Result<(), SynthError>;

    /// Release the played note.  A running drone keeps sounding.
    fn stop(&mut self) -> Result<(), SynthError>;

    /// Start two sustained voices, releasing the played note.
    fn start_drone(&mut self, f1: f32, f2: f32) -> Result<(), SynthError>;

    /// Retune a running drone.
    ///
    /// Fails with `DroneNotStarted` if no drone is running and with
    /// `DroneOutOfRange` for frequencies outside 0–32767 Hz.
    fn drone(&mut self, f1: f32, f2: f32) -> Result<(), SynthError>;

    fn stop_drone(&mut self) -> Result<(), SynthError>;

    fn is_droning(&self) -> bool;
}

impl<S: SynthDevice + ?Sized> SynthDevice for Box<S> {
    fn set_volume(&mut self, level: f32) -> Result<(), SynthError> { (**self).set_volume(level) }
    fn set_waveform(&mut self, wave: Waveform) -> Result<(), SynthError> { (**self).set_waveform(wave) }
    fn set_tremolo(&mut self, rate_hz: f32) -> Result<(), SynthError> { (**self).set_tremolo(rate_hz) }
    fn clear_tremolo(&mut self) -> Result<(), SynthError> { (**self).clear_tremolo() }
    fn set_vibrato(&mut self, rate_hz: f32) -> Result<(), SynthError> { (**self).set_vibrato(rate_hz) }
    fn clear_vibrato(&mut self) -> Result<(), SynthError> { (**self).clear_vibrato() }
    fn play(&mut self, note: f32) -> Result<(), SynthError> { (**self).play(note) }
    fn stop(&mut self) -> Result<(), SynthError> { (**self).stop() }
    fn start_drone(&mut self, f1: f32, f2: f32) -> Result<(), SynthError> { (**self).start_drone(f1, f2) }
    fn drone(&mut self, f1: f32, f2: f32) -> Result<(), SynthError> { (**self).drone(f1, f2) }
    fn stop_drone(&mut self) -> Result<(), SynthError> { (**self).stop_drone() }
    fn is_droning(&self) -> bool { (**self).is_droning() }
}
