//! MIDI output backends: a real midir port, a null sink, and a recorder.

use tracing::{info, warn};

use crate::config::SynthConfig;
use crate::error::SynthError;

const NOTE_OFF:       u8 = 0x80;
const NOTE_ON:        u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const PROGRAM_CHANGE: u8 = 0xC0;
const PITCH_BEND:     u8 = 0xE0;

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null / recorder
// ════════════════════════════════════════════════════════════════════════════

/// Somewhere to send raw MIDI messages.
///
/// Only `send` is required; the channel-voice helpers build the bytes.
pub trait MidiOut: Send {
    fn send(&mut self, message: &[u8]) -> Result<(), SynthError>;

    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<(), SynthError> {
        self.send(&[NOTE_ON | (channel & 0x0F), note & 0x7F, velocity & 0x7F])
    }

    fn note_off(&mut self, channel: u8, note: u8) -> Result<(), SynthError> {
        self.send(&[NOTE_OFF | (channel & 0x0F), note & 0x7F, 0])
    }

    fn control_change(&mut self, channel: u8, controller: u8, value: u8) -> Result<(), SynthError> {
        self.send(&[CONTROL_CHANGE | (channel & 0x0F), controller & 0x7F, value & 0x7F])
    }

    fn program_change(&mut self, channel: u8, program: u8) -> Result<(), SynthError> {
        self.send(&[PROGRAM_CHANGE | (channel & 0x0F), program & 0x7F])
    }

    /// 14-bit pitch bend, sent LSB first.
    fn pitch_bend(&mut self, channel: u8, value: u16) -> Result<(), SynthError> {
        self.send(&[
            PITCH_BEND | (channel & 0x0F),
            (value & 0x7F) as u8,
            (value >> 7 & 0x7F) as u8,
        ])
    }
}

impl<O: MidiOut + ?Sized> MidiOut for Box<O> {
    fn send(&mut self, message: &[u8]) -> Result<(), SynthError> {
        (**self).send(message)
    }
}

// ── midir backend ─────────────────────────────────────────────────────────

pub struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn send(&mut self, message: &[u8]) -> Result<(), SynthError> {
        self.conn.send(message).map_err(|e| SynthError::Send(e.to_string()))
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

#[derive(Clone, Copy, Debug, Default)]
pub struct NullOut;

impl MidiOut for NullOut {
    fn send(&mut self, _message: &[u8]) -> Result<(), SynthError> { Ok(()) }
}

// ── recorder ──────────────────────────────────────────────────────────────

/// Keeps every message it is given.  Handy for inspecting what a synth sent.
#[derive(Clone, Debug, Default)]
pub struct RecordingOut {
    pub sent: Vec<Vec<u8>>,
}

impl RecordingOut {
    pub fn clear(&mut self) { self.sent.clear(); }
}

impl MidiOut for RecordingOut {
    fn send(&mut self, message: &[u8]) -> Result<(), SynthError> {
        self.sent.push(message.to_vec());
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Port selection
// ════════════════════════════════════════════════════════════════════════════

/// Connect to the configured MIDI output port.
///
/// A port whose name contains `config.port` wins; otherwise a visible
/// software synth; otherwise the first port.
pub fn connect_midi_output(config: &SynthConfig) -> Result<MidirOut, SynthError> {
    let midi_out = midir::MidiOutput::new(&config.client_name)
        .map_err(|e| SynthError::Init(e.to_string()))?;

    let ports = midi_out.ports();
    if ports.is_empty() {
        return Err(SynthError::NoPorts);
    }

    let names: Vec<String> = ports.iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect();

    let port_idx = pick_port(&names, config.port.as_deref());
    let name = names[port_idx].clone();
    info!(port = %name, "opening MIDI port");

    match midi_out.connect(&ports[port_idx], "featheremin-out") {
        Ok(conn) => Ok(MidirOut { conn }),
        Err(e)   => Err(SynthError::Connect { port: name, reason: e.to_string() }),
    }
}

/// Like [`connect_midi_output`], but falls back to [`NullOut`] with a warning
/// so the instrument still runs (silently) without a synth.
pub fn open_midi_output(config: &SynthConfig) -> Box<dyn MidiOut> {
    match connect_midi_output(config) {
        Ok(out) => Box::new(out),
        Err(SynthError::NoPorts) => {
            warn!("no MIDI output ports found; using null output");
            warn!("install a MIDI synthesiser such as `fluidsynth` or `timidity -iA`");
            Box::new(NullOut)
        }
        Err(e) => {
            warn!(error = %e, "MIDI unavailable; using null output");
            Box::new(NullOut)
        }
    }
}

/// Index of the port to use among `names`.
fn pick_port(names: &[String], wanted: Option<&str>) -> usize {
    if let Some(wanted) = wanted {
        let wanted = wanted.to_lowercase();
        if let Some(i) = names.iter().position(|n| n.to_lowercase().contains(&wanted)) {
            return i;
        }
        warn!(port = %wanted, "requested MIDI port not found");
    }

    names.iter()
        .position(|n| {
            let n = n.to_lowercase();
            n.contains("fluid") || n.contains("timidity") ||
            n.contains("microsoft") || n.contains("gm") ||
            n.contains("synth")
        })
        .unwrap_or(0)
}
