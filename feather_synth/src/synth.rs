//! `MidiSynth`: the one [`SynthDevice`] implementation, playing through any
//! General MIDI synth.
//!
//! Continuous pitch is the nearest note plus pitch bend, re-struck only when
//! the nearest note changes.  The drone is two held notes on two channels so
//! each voice can be bent on its own.

use tracing::{debug, info};

use crate::config::SynthConfig;
use crate::device::{SynthDevice, Waveform};
use crate::error::SynthError;
use crate::midi::{open_midi_output, MidiOut};
use crate::pitch::{bend_for, hz_to_midi, split_note};

/// Highest drone frequency accepted, in Hz.
pub const DRONE_MAX_HZ: f32 = 32767.0;

// General MIDI controller numbers
const CC_MODULATION:    u8 = 1;
const CC_VOLUME:        u8 = 7;
const CC_VIBRATO_RATE:  u8 = 76;
const CC_TREMOLO_DEPTH: u8 = 92;

/// A held note and the bend last sent on its channel.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Voice {
    note: u8,
    bend: u16,
}

pub struct MidiSynth<O> {
    out:      O,
    config:   SynthConfig,
    waveform: Waveform,
    melody:   Option<Voice>,
    drone:    Option<[Voice; 2]>,
    tremolo:  Option<f32>,
    vibrato:  Option<f32>,
}

impl MidiSynth<Box<dyn MidiOut>> {
    /// Open the configured MIDI port (or the null output if there is none).
    pub fn open(config: SynthConfig) -> Result<Self, SynthError> {
        let out = open_midi_output(&config);
        MidiSynth::new(out, config)
    }
}

impl<O: MidiOut> MidiSynth<O> {
    /// Wrap an output.  Sends the initial program (sine) and volume on both
    /// channels.
    pub fn new(out: O, config: SynthConfig) -> Result<Self, SynthError> {
        config.validate()?;
        let mut synth = MidiSynth {
            out,
            config,
            waveform: Waveform::Sine,
            melody:   None,
            drone:    None,
            tremolo:  None,
            vibrato:  None,
        };
        synth.send_program()?;
        let volume = synth.config.volume;
        synth.set_volume(volume)?;
        info!(channel = synth.config.channel, "synth ready");
        Ok(synth)
    }

    pub fn output(&self)     -> &O           { &self.out }
    pub fn output_mut(&mut self) -> &mut O   { &mut self.out }
    pub fn config(&self)     -> &SynthConfig { &self.config }
    pub fn waveform(&self)   -> Waveform     { self.waveform }
    pub fn tremolo(&self)    -> Option<f32>  { self.tremolo }
    pub fn vibrato(&self)    -> Option<f32>  { self.vibrato }

    /// Whole note currently held by the played voice.
    pub fn sounding(&self) -> Option<u8> { self.melody.map(|v| v.note) }

    fn channels(&self) -> [u8; 2] {
        [self.config.channel, self.config.drone_channel]
    }

    fn send_program(&mut self) -> Result<(), SynthError> {
        let program = self.waveform.program();
        for ch in self.channels() {
            self.out.program_change(ch, program)?;
        }
        Ok(())
    }

    fn lfo_value(&self, rate_hz: f32) -> u8 {
        (rate_hz / self.config.lfo_max_hz * 127.0).round().clamp(1.0, 127.0) as u8
    }

    /// Move `voice` (if any) on `channel` to `note`, re-striking only when the
    /// whole note changes.
    fn retune(
        &mut self,
        channel: u8,
        voice: Option<Voice>,
        note: f32,
    ) -> Result<Voice, SynthError> {
        let (whole, offset) = split_note(note);
        let bend = bend_for(offset, self.config.bend_range);

        match voice {
            Some(v) if v.note == whole => {
                if v.bend != bend {
                    self.out.pitch_bend(channel, bend)?;
                }
            }
            Some(v) => {
                self.out.note_off(channel, v.note)?;
                if v.bend != bend {
                    self.out.pitch_bend(channel, bend)?;
                }
                self.out.note_on(channel, whole, self.config.velocity)?;
            }
            None => {
                self.out.pitch_bend(channel, bend)?;
                self.out.note_on(channel, whole, self.config.velocity)?;
            }
        }
        Ok(Voice { note: whole, bend })
    }

    fn release(&mut self, channel: u8, voice: Option<Voice>) -> Result<(), SynthError> {
        if let Some(v) = voice {
            self.out.note_off(channel, v.note)?;
        }
        Ok(())
    }
}

impl<O: MidiOut> SynthDevice for MidiSynth<O> {
    fn set_volume(&mut self, level: f32) -> Result<(), SynthError> {
        let level = level.clamp(0.0, 1.0);
        let value = (level * 127.0).round() as u8;
        for ch in self.channels() {
            self.out.control_change(ch, CC_VOLUME, value)?;
        }
        self.config.volume = level;
        Ok(())
    }

    fn set_waveform(&mut self, wave: Waveform) -> Result<(), SynthError> {
        if wave == self.waveform {
            return Ok(());
        }
        self.waveform = wave;
        debug!(%wave, "waveform");
        self.send_program()
    }

    fn set_tremolo(&mut self, rate_hz: f32) -> Result<(), SynthError> {
        let value = self.lfo_value(rate_hz);
        self.out.control_change(self.config.channel, CC_TREMOLO_DEPTH, value)?;
        self.tremolo = Some(rate_hz);
        Ok(())
    }

    fn clear_tremolo(&mut self) -> Result<(), SynthError> {
        self.out.control_change(self.config.channel, CC_TREMOLO_DEPTH, 0)?;
        self.tremolo = None;
        Ok(())
    }

    fn set_vibrato(&mut self, rate_hz: f32) -> Result<(), SynthError> {
        let ch = self.config.channel;
        let value = self.lfo_value(rate_hz);
        self.out.control_change(ch, CC_VIBRATO_RATE, value)?;
        if self.vibrato.is_none() {
            self.out.control_change(ch, CC_MODULATION, self.config.vibrato_depth)?;
        }
        self.vibrato = Some(rate_hz);
        Ok(())
    }

    fn clear_vibrato(&mut self) -> Result<(), SynthError> {
        self.out.control_change(self.config.channel, CC_MODULATION, 0)?;
        self.vibrato = None;
        Ok(())
    }

    fn play(&mut self, note: f32) -> Result<(), SynthError> {
        let voice = self.retune(self.config.channel, self.melody, note)?;
        self.melody = Some(voice);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SynthError> {
        let voice = self.melody.take();
        self.release(self.config.channel, voice)
    }

    fn start_drone(&mut self, f1: f32, f2: f32) -> Result<(), SynthError> {
        check_drone_range(f1, f2)?;
        self.stop()?;
        self.stop_drone()?;
        let [ch1, ch2] = self.channels();
        let v1 = self.retune(ch1, None, hz_to_midi(f1))?;
        let v2 = self.retune(ch2, None, hz_to_midi(f2))?;
        self.drone = Some([v1, v2]);
        info!(f1, f2, "drone started");
        Ok(())
    }

    fn drone(&mut self, f1: f32, f2: f32) -> Result<(), SynthError> {
        let Some([v1, v2]) = self.drone else {
            return Err(SynthError::DroneNotStarted);
        };
        check_drone_range(f1, f2)?;
        let [ch1, ch2] = self.channels();
        let v1 = self.retune(ch1, Some(v1), hz_to_midi(f1))?;
        let v2 = self.retune(ch2, Some(v2), hz_to_midi(f2))?;
        self.drone = Some([v1, v2]);
        Ok(())
    }

    fn stop_drone(&mut self) -> Result<(), SynthError> {
        if let Some([v1, v2]) = self.drone.take() {
            let [ch1, ch2] = self.channels();
            self.release(ch1, Some(v1))?;
            self.release(ch2, Some(v2))?;
            debug!("drone stopped");
        }
        Ok(())
    }

    fn is_droning(&self) -> bool { self.drone.is_some() }
}

fn check_drone_range(f1: f32, f2: f32) -> Result<(), SynthError> {
    let ok = |f: f32| (0.0..=DRONE_MAX_HZ).contains(&f);
    if ok(f1) && ok(f2) {
        Ok(())
    } else {
        Err(SynthError::DroneOutOfRange { f1, f2 })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
