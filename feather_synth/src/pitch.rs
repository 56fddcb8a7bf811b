//! Pitch and range arithmetic shared by the synth and the instrument loop.

/// Centre of the 14-bit pitch bend range: no bend.
pub const PITCH_BEND_CENTER: u16 = 1 << 13;

/// Largest 14-bit pitch bend value.
pub const PITCH_BEND_MAX: u16 = (1 << 14) - 1;

/// Highest MIDI note number.
pub const MIDI_NOTE_MAX: f32 = 127.0;

/// Frequency in Hz of a (possibly fractional) MIDI note, A4 = 69 = 440 Hz.
pub fn midi_to_hz(note: f32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69.0) / 12.0)
}

/// Fractional MIDI note of a frequency in Hz.
pub fn hz_to_midi(hz: f32) -> f32 {
    69.0 + 12.0 * (hz / 440.0).log2()
}

/// Restrict `value` to `[min, max]`.
///
/// Unlike `f32::clamp` this never panics; if `min > max`, `min` wins.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// Map `value`'s position in `[low_in, high_in]` onto `[low_out, high_out]`.
///
/// No clamping: inputs outside the source range extrapolate.
pub fn map_and_scale(value: f32, low_in: f32, high_in: f32, low_out: f32, high_out: f32) -> f32 {
    let frac = (value - low_in) / (high_in - low_in);
    low_out + frac * (high_out - low_out)
}

/// Split a fractional note into the nearest whole note and the remaining
/// offset in semitones (within ±0.5).
pub fn split_note(note: f32) -> (u8, f32) {
    let note = clamp(note, 0.0, MIDI_NOTE_MAX);
    let whole = note.round();
    (whole as u8, note - whole)
}

/// 14-bit pitch bend for an offset of `semitones`, given the receiver's
/// bend range (semitones at full deflection).
pub fn bend_for(semitones: f32, range: f32) -> u16 {
    let raw = PITCH_BEND_CENTER as f32 + semitones / range * PITCH_BEND_CENTER as f32;
    clamp(raw.round(), 0.0, PITCH_BEND_MAX as f32) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f32, b: f32) -> bool { (a - b).abs() < 1e-3 }

    #[test]
    fn a4_is_440() {
        assert!(close(midi_to_hz(69.0), 440.0));
        assert!(close(hz_to_midi(440.0), 69.0));
    }

    #[test]
    fn octave_doubles_frequency() {
        assert!(close(midi_to_hz(81.0), 880.0));
        assert!(close(hz_to_midi(220.0), 57.0));
    }

    #[test]
    fn clamp_limits_both_ends() {
        assert_eq!(clamp(500.0, 1000.0, 20000.0), 1000.0);
        assert_eq!(clamp(30000.0, 1000.0, 20000.0), 20000.0);
        assert_eq!(clamp(4200.0, 1000.0, 20000.0), 4200.0);
    }

    #[test]
    fn map_and_scale_is_linear() {
        assert!(close(map_and_scale(50.0, 50.0, 500.0, 8.0, 16.0), 8.0));
        assert!(close(map_and_scale(275.0, 50.0, 500.0, 8.0, 16.0), 12.0));
        assert!(close(map_and_scale(500.0, 50.0, 500.0, 4.0, 10.0), 10.0));
    }

    #[test]
    fn split_note_rounds_to_nearest() {
        assert_eq!(split_note(60.0), (60, 0.0));
        let (n, f) = split_note(61.6);
        assert_eq!(n, 62);
        assert!(close(f, -0.4));
        assert_eq!(split_note(300.0).0, 127);
        assert_eq!(split_note(-3.0).0, 0);
    }

    #[test]
    fn bend_center_and_quarter() {
        assert_eq!(bend_for(0.0, 2.0), PITCH_BEND_CENTER);
        // a quarter tone up with a ±2 semitone range
        assert_eq!(bend_for(0.25, 2.0), 9216);
        assert_eq!(bend_for(5.0, 2.0), PITCH_BEND_MAX);
        assert_eq!(bend_for(-5.0, 2.0), 0);
    }

    proptest! {
        #[test]
        fn split_offset_stays_within_half_semitone(note in 0.0f32..127.0) {
            let (whole, off) = split_note(note);
            prop_assert!(off.abs() <= 0.5 + 1e-4);
            prop_assert!(whole <= 127);
        }
    }
}
