use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    #[error("invalid synth configuration: {0}")]
    Config(String),

    #[error("MIDI init failed: {0}")]
    Init(String),

    #[error("no MIDI output ports found")]
    NoPorts,

    #[error("could not connect to MIDI port \"{port}\": {reason}")]
    Connect { port: String, reason: String },

    #[error("MIDI send failed: {0}")]
    Send(String),

    #[error("drone must be started before it can be retuned")]
    DroneNotStarted,

    #[error("drone frequency out of range: {f1} Hz, {f2} Hz")]
    DroneOutOfRange { f1: f32, f2: f32 },

    #[error("unknown waveform \"{0}\"")]
    UnknownWaveform(String),
}
