use serde::{Deserialize, Serialize};

use crate::error::SynthError;

/// Everything that differs between one synth setup and another.
///
/// Loaded from the `[synth]` table of the instrument's settings file; every
/// field has a default, so the table may be partial or absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Client name announced to the MIDI system.
    pub client_name:   String,
    /// Substring of the preferred output port name.  When unset, a
    /// software synth is preferred, then the first port.
    pub port:          Option<String>,
    /// MIDI channel (0–15) for the played note and the first drone voice.
    pub channel:       u8,
    /// MIDI channel for the second drone voice.
    pub drone_channel: u8,
    /// Master volume, 0.0–1.0.
    pub volume:        f32,
    /// Note-on velocity.
    pub velocity:      u8,
    /// Receiver pitch bend range in semitones.
    pub bend_range:    f32,
    /// LFO rate that maps to a full-scale controller value.
    pub lfo_max_hz:    f32,
    /// Modulation depth sent while vibrato is on.
    pub vibrato_depth: u8,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            client_name:   "featheremin".to_string(),
            port:          None,
            channel:       0,
            drone_channel: 1,
            volume:        0.75,
            velocity:      100,
            bend_range:    2.0,
            lfo_max_hz:    20.0,
            vibrato_depth: 64,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.channel > 15 || self.drone_channel > 15 {
            return Err(SynthError::Config(format!(
                "MIDI channels must be 0–15 (got {} and {})",
                self.channel, self.drone_channel
            )));
        }
        if self.channel == self.drone_channel {
            return Err(SynthError::Config(
                "drone channel must differ from the main channel".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(SynthError::Config(format!("volume {} not in 0.0–1.0", self.volume)));
        }
        if self.velocity > 127 || self.vibrato_depth > 127 {
            return Err(SynthError::Config("velocity and vibrato depth must be 0–127".to_string()));
        }
        if self.bend_range <= 0.0 || self.lfo_max_hz <= 0.0 {
            return Err(SynthError::Config(
                "bend range and LFO max rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
