//! Top-level instrument state and the main loop.
//!
//! `AppState` turns menu selections into synth settings and, every tick,
//! turns the two distance readings into sound.  `run` wires it to the
//! hardware and the gesture menu.

use std::fmt;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use feather_synth::{clamp, map_and_scale, SynthDevice, SynthError, Waveform};
use gesture_menu::{GestureMenu, MenuModel, Selection};

use crate::config::{Settings, ThereminSettings, CHROMATIC, LFO, VOLUME, WAVEFORM};
use crate::hardware::{Hardware, RangeSensor, Rig, SensorError};
use crate::panel::FrontPanel;

// ════════════════════════════════════════════════════════════════════════════
// LFO mode
// ════════════════════════════════════════════════════════════════════════════

/// What the second sensor does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LfoMode { Off, Tremolo, Vibrato, Drone }

impl LfoMode {
    pub fn name(self) -> &'static str {
        match self {
            LfoMode::Off     => "Off",
            LfoMode::Tremolo => "Tremolo",
            LfoMode::Vibrato => "Vibrato",
            LfoMode::Drone   => "Drone",
        }
    }

    pub fn from_name(name: &str) -> Option<LfoMode> {
        [LfoMode::Off, LfoMode::Tremolo, LfoMode::Vibrato, LfoMode::Drone]
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for LfoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why one tick of playing failed.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Synth(#[from] SynthError),
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState<S> {
    synth:        S,
    theremin:     ThereminSettings,
    waveform:     Waveform,
    lfo:          LfoMode,
    chromatic:    bool,
    /// Hz the second drone voice sits below the first.
    drone_offset: f32,
}

impl<S: SynthDevice> AppState<S> {
    pub fn new(synth: S, theremin: ThereminSettings) -> Self {
        let [f1, f2] = theremin.drone_start_hz;
        AppState {
            synth,
            theremin,
            waveform:     Waveform::Sine,
            lfo:          LfoMode::Off,
            chromatic:    false,
            drone_offset: f1 - f2,
        }
    }

    pub fn synth(&self)     -> &S       { &self.synth }
    pub fn waveform(&self)  -> Waveform { self.waveform }
    pub fn lfo(&self)       -> LfoMode  { self.lfo }
    pub fn chromatic(&self) -> bool     { self.chromatic }

    /// Apply every item's current value, as at power-on.
    ///
    /// A value the synth rejects does not stop the rest from being applied;
    /// the rejected items come back with their errors.
    pub fn sync<P: FrontPanel + ?Sized>(
        &mut self,
        model: &MenuModel,
        panel: &mut P,
    ) -> Vec<(String, SynthError)> {
        let mut rejected = Vec::new();
        for item in model.items() {
            let sel = Selection {
                item:  item.name().to_string(),
                value: item.selected().clone(),
            };
            if let Err(e) = self.apply_selection(&sel, panel) {
                rejected.push((sel.item, e));
            }
        }
        rejected
    }

    // ── menu selections ──────────────────────────────────────────────────

    pub fn apply_selection<P: FrontPanel + ?Sized>(
        &mut self,
        sel: &Selection,
        panel: &mut P,
    ) -> Result<(), SynthError> {
        match sel.item.as_str() {
            WAVEFORM => {
                let wave: Waveform = sel.value.to_string().parse()?;
                self.waveform = wave;
                self.show_modes(panel);
                self.synth.set_waveform(wave)
            }
            LFO => match LfoMode::from_name(&sel.value.to_string()) {
                Some(mode) => self.set_lfo(mode, panel),
                None => {
                    debug!(value = %sel.value, "unknown LFO mode");
                    Ok(())
                }
            },
            CHROMATIC => {
                match sel.value.as_flag() {
                    Some(flag) => self.chromatic = flag,
                    None => debug!(value = %sel.value, "chromatic needs true/false"),
                }
                Ok(())
            }
            VOLUME => match sel.value.as_number() {
                Some(pct) => self.synth.set_volume(pct as f32 / 100.0),
                None => {
                    debug!(value = %sel.value, "volume needs a percentage");
                    Ok(())
                }
            },
            other => {
                debug!(item = other, "no handler for menu item");
                Ok(())
            }
        }
    }

    fn set_lfo<P: FrontPanel + ?Sized>(
        &mut self,
        mode: LfoMode,
        panel: &mut P,
    ) -> Result<(), SynthError> {
        self.lfo = mode;
        self.show_modes(panel);

        let rate = self.theremin.lfo_default_hz;
        if mode != LfoMode::Drone && self.synth.is_droning() {
            self.synth.stop_drone()?;
        }

        match mode {
            LfoMode::Off => {
                self.synth.clear_tremolo()?;
                self.synth.clear_vibrato()?;
                panel.set_right_status("");
            }
            LfoMode::Tremolo => {
                self.synth.set_tremolo(rate)?;
                self.synth.clear_vibrato()?;
                panel.set_right_status(&format!("T @ {rate:.1}"));
            }
            LfoMode::Vibrato => {
                self.synth.set_vibrato(rate)?;
                self.synth.clear_tremolo()?;
                panel.set_right_status(&format!("V @ {rate:.1}"));
            }
            LfoMode::Drone => {
                self.synth.clear_vibrato()?;
                self.synth.clear_tremolo()?;
                panel.set_right_status("");
                let [f1, f2] = self.theremin.drone_start_hz;
                self.drone_offset = f1 - f2;
                self.synth.start_drone(f1, f2)?;
            }
        }
        Ok(())
    }

    fn show_modes<P: FrontPanel + ?Sized>(&self, panel: &mut P) {
        panel.set_left_status(&format!("{}\n{}", self.waveform, self.lfo));
    }

    // ── playing ──────────────────────────────────────────────────────────

    /// One tick of the theremin.
    ///
    /// `r1` is the pitch sensor reading.  The LFO sensor is read only while
    /// `r1` is in range.  Out of range, the played note stops; a drone keeps
    /// sounding.
    pub fn perform<R, P>(&mut self, r1: u16, tof_b: &mut R, panel: &mut P) -> Result<(), StepError>
    where
        R: RangeSensor + ?Sized,
        P: FrontPanel + ?Sized,
    {
        let t = &self.theremin;
        if r1 == 0 || r1 >= t.pitch_far_mm {
            self.synth.stop()?;
            return Ok(());
        }

        let r2 = tof_b.range_mm()?;
        trace!(r1, r2, "ranges");

        if r2 > t.lfo_near_mm && r2 < t.lfo_far_mm {
            let (near, far) = (t.lfo_near_mm as f32, t.lfo_far_mm as f32);
            let r2f = r2 as f32;
            match self.lfo {
                LfoMode::Tremolo => {
                    let rate = map_and_scale(r2f, near, far, t.tremolo_min_hz, t.tremolo_max_hz);
                    panel.set_right_status(&format!("T @ {rate:.1}"));
                    self.synth.set_tremolo(rate)?;
                }
                LfoMode::Vibrato => {
                    let rate = map_and_scale(r2f, near, far, t.vibrato_min_hz, t.vibrato_max_hz);
                    panel.set_right_status(&format!("V @ {rate:.1}"));
                    self.synth.set_vibrato(rate)?;
                }
                LfoMode::Drone => self.drone_offset = r2f,
                LfoMode::Off   => {}
            }
        }

        let t = &self.theremin;
        if self.lfo == LfoMode::Drone {
            let f1 = clamp(r1 as f32 * t.drone_hz_per_mm, t.drone_min_hz, t.drone_max_hz);
            let f2 = f1 - self.drone_offset;
            self.synth.drone(f1, f2)?;
            return Ok(());
        }

        let mut note = (r1 as f32 / t.mm_per_semitone).min(t.max_note);
        if self.chromatic {
            note = note.trunc();
        }
        self.synth.play(note)?;
        Ok(())
    }

    /// Release everything, including a drone.
    pub fn silence(&mut self) -> Result<(), SynthError> {
        self.synth.stop()?;
        self.synth.stop_drone()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Play until the panel closes.
///
/// Refuses to start unless every capability in `hardware` is present.
/// Sensor failures end the loop with an error; synth failures are logged and
/// playing continues.
pub fn run<S: SynthDevice>(settings: &Settings, hardware: Hardware, synth: S) -> anyhow::Result<()> {
    let Rig { mut tof_a, mut tof_b, gestures, mut panel } = hardware.require()?;

    let mut menu = GestureMenu::from_specs(
        gestures,
        &settings.menu.items,
        settings.menu.window_size,
    )
    .context("building the menu")?
    .with_focus_offset(settings.menu.focus_offset);

    menu.check_display(&*panel).context("sizing the menu")?;

    let mut app = AppState::new(synth, settings.theremin.clone());

    menu.refresh(&mut *panel);
    for (item, e) in app.sync(menu.model(), &mut *panel) {
        warn!(error = %e, %item, "startup value not applied");
    }
    panel.present();

    let delay = Duration::from_millis(settings.theremin.loop_delay_ms);
    info!("playing");

    while panel.pump() {
        if let Some(sel) = menu.poll(&mut *panel).context("reading the gesture sensor")? {
            info!(item = %sel.item, value = %sel.value, "menu");
            if let Err(e) = app.apply_selection(&sel, &mut *panel) {
                warn!(error = %e, item = %sel.item, "selection not applied");
            }
        }

        let r1 = tof_a.range_mm().context("reading ToF A")?;
        match app.perform(r1, &mut *tof_b, &mut *panel) {
            Ok(())                    => {}
            Err(StepError::Synth(e))  => warn!(error = %e, "synth"),
            Err(StepError::Sensor(e)) => return Err(e).context("reading ToF B"),
        }

        panel.present();
        thread::sleep(delay);
    }

    info!("panel closed");
    if let Err(e) = app.silence() {
        warn!(error = %e, "could not silence synth");
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_items;
    use crate::panel::TextPanel;
    use crate::sim::{sim_gestures, SimRangeSensor, OUT_OF_RANGE_MM};
    use gesture_menu::{GestureCode, ItemSpec, OptionValue};
    use proptest::prelude::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Volume(f32),
        Wave(Waveform),
        Tremolo(f32),
        ClearTremolo,
        Vibrato(f32),
        ClearVibrato,
        Play(f32),
        Stop,
        StartDrone(f32, f32),
        Drone(f32, f32),
        StopDrone,
    }

    #[derive(Default)]
    struct Recorder {
        calls:  Vec<Call>,
        drone:  bool,
    }

    impl SynthDevice for Recorder {
        fn set_volume(&mut self, l: f32) -> Result<(), SynthError> { self.calls.push(Call::Volume(l)); Ok(()) }
        fn set_waveform(&mut self, w: Waveform) -> Result<(), SynthError> { self.calls.push(Call::Wave(w)); Ok(()) }
        fn set_tremolo(&mut self, r: f32) -> Result<(), SynthError> { self.calls.push(Call::Tremolo(r)); Ok(()) }
        fn clear_tremolo(&mut self) -> Result<(), SynthError> { self.calls.push(Call::ClearTremolo); Ok(()) }
        fn set_vibrato(&mut self, r: f32) -> Result<(), SynthError> { self.calls.push(Call::Vibrato(r)); Ok(()) }
        fn clear_vibrato(&mut self) -> Result<(), SynthError> { self.calls.push(Call::ClearVibrato); Ok(()) }
        fn play(&mut self, n: f32) -> Result<(), SynthError> { self.calls.push(Call::Play(n)); Ok(()) }
        fn stop(&mut self) -> Result<(), SynthError> { self.calls.push(Call::Stop); Ok(()) }
        fn start_drone(&mut self, a: f32, b: f32) -> Result<(), SynthError> {
            self.drone = true;
            self.calls.push(Call::StartDrone(a, b));
            Ok(())
        }
        fn drone(&mut self, a: f32, b: f32) -> Result<(), SynthError> {
            if !self.drone { return Err(SynthError::DroneNotStarted); }
            self.calls.push(Call::Drone(a, b));
            Ok(())
        }
        fn stop_drone(&mut self) -> Result<(), SynthError> {
            self.drone = false;
            self.calls.push(Call::StopDrone);
            Ok(())
        }
        fn is_droning(&self) -> bool { self.drone }
    }

    fn app() -> AppState<Recorder> {
        AppState::new(Recorder::default(), ThereminSettings::default())
    }

    fn sel(item: &str, value: impl Into<OptionValue>) -> Selection {
        Selection { item: item.to_string(), value: value.into() }
    }

    fn calls(app: &mut AppState<Recorder>) -> Vec<Call> {
        std::mem::take(&mut app.synth.calls)
    }

    fn sensor(mm: u16) -> SimRangeSensor {
        let s = SimRangeSensor::new();
        s.set(mm);
        s
    }

    // ── selections ──────────────────────────────────────────────────────

    #[test]
    fn waveform_selection_sets_wave_and_status() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel(WAVEFORM, "Saw"), &mut panel).unwrap();
        assert_eq!(calls(&mut app), vec![Call::Wave(Waveform::Saw)]);
        assert_eq!(panel.left, "Saw\nOff");
    }

    #[test]
    fn unknown_waveform_is_an_error() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        let err = app.apply_selection(&sel(WAVEFORM, "Triangle"), &mut panel).unwrap_err();
        assert_eq!(err, SynthError::UnknownWaveform("Triangle".to_string()));
        assert_eq!(app.waveform(), Waveform::Sine);
    }

    #[test]
    fn lfo_off_clears_everything() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        panel.right = "T @ 9.0".into();
        app.apply_selection(&sel(LFO, "Off"), &mut panel).unwrap();
        assert_eq!(calls(&mut app), vec![Call::ClearTremolo, Call::ClearVibrato]);
        assert_eq!(panel.right, "");
        assert_eq!(panel.left, "Sine\nOff");
    }

    #[test]
    fn lfo_tremolo_and_vibrato_use_default_rate() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel(LFO, "Tremolo"), &mut panel).unwrap();
        assert_eq!(calls(&mut app), vec![Call::Tremolo(20.0), Call::ClearVibrato]);
        assert_eq!(panel.left, "Sine\nTremolo");
        app.apply_selection(&sel(LFO, "Vibrato"), &mut panel).unwrap();
        assert_eq!(calls(&mut app), vec![Call::Vibrato(20.0), Call::ClearTremolo]);
        assert_eq!(app.lfo(), LfoMode::Vibrato);
    }

    #[test]
    fn lfo_drone_starts_the_pair_and_off_stops_it() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel(LFO, "Drone"), &mut panel).unwrap();
        assert_eq!(
            calls(&mut app),
            vec![Call::ClearVibrato, Call::ClearTremolo, Call::StartDrone(1000.0, 1100.0)]
        );
        app.apply_selection(&sel(LFO, "Off"), &mut panel).unwrap();
        assert_eq!(
            calls(&mut app),
            vec![Call::StopDrone, Call::ClearTremolo, Call::ClearVibrato]
        );
    }

    #[test]
    fn chromatic_and_volume() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel(CHROMATIC, true), &mut panel).unwrap();
        assert!(app.chromatic());
        app.apply_selection(&sel(VOLUME, 50_i64), &mut panel).unwrap();
        assert_eq!(calls(&mut app), vec![Call::Volume(0.5)]);
    }

    #[test]
    fn unknown_item_is_ignored() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel("Reverb", "Hall"), &mut panel).unwrap();
        app.apply_selection(&sel(LFO, "Chorus"), &mut panel).unwrap();
        assert!(calls(&mut app).is_empty());
    }

    #[test]
    fn sync_applies_stock_defaults() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        let model = MenuModel::from_specs(&default_items()).unwrap();
        assert!(app.sync(&model, &mut panel).is_empty());
        assert_eq!(
            calls(&mut app),
            vec![
                Call::Wave(Waveform::Sine),
                Call::ClearTremolo,
                Call::ClearVibrato,
                Call::Volume(0.75),
            ]
        );
        assert_eq!(panel.left, "Sine\nOff");
    }

    #[test]
    fn sync_applies_items_after_a_rejected_one() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        let specs = [
            ItemSpec::new(WAVEFORM,  ["Triangle"], 0),
            ItemSpec::new(CHROMATIC, [false, true], 1),
            ItemSpec::new(VOLUME,    [25_i64, 50], 1),
        ];
        let model = MenuModel::from_specs(&specs).unwrap();

        let rejected = app.sync(&model, &mut panel);
        assert_eq!(
            rejected,
            vec![(WAVEFORM.to_string(), SynthError::UnknownWaveform("Triangle".to_string()))]
        );
        assert!(app.chromatic());
        assert_eq!(calls(&mut app), vec![Call::Volume(0.5)]);
    }

    // ── playing ─────────────────────────────────────────────────────────

    #[test]
    fn pitch_is_distance_over_four() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.perform(250, &mut sensor(OUT_OF_RANGE_MM), &mut panel).unwrap();
        assert_eq!(calls(&mut app), vec![Call::Play(62.5)]);
    }

    #[test]
    fn chromatic_truncates_and_far_notes_cap() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel(CHROMATIC, true), &mut panel).unwrap();
        app.perform(250, &mut sensor(0), &mut panel).unwrap();
        app.perform(999, &mut sensor(0), &mut panel).unwrap();
        assert_eq!(calls(&mut app), vec![Call::Play(62.0), Call::Play(120.0)]);
    }

    #[test]
    fn out_of_range_stops_without_reading_lfo_sensor() {
        struct Broken;
        impl RangeSensor for Broken {
            fn range_mm(&mut self) -> Result<u16, SensorError> {
                Err(SensorError::NoReading("ToF B".into()))
            }
        }
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.perform(0, &mut Broken, &mut panel).unwrap();
        app.perform(1000, &mut Broken, &mut panel).unwrap();
        assert_eq!(calls(&mut app), vec![Call::Stop, Call::Stop]);
        assert!(matches!(
            app.perform(500, &mut Broken, &mut panel),
            Err(StepError::Sensor(_))
        ));
    }

    #[test]
    fn tremolo_rate_follows_second_hand() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel(LFO, "Tremolo"), &mut panel).unwrap();
        calls(&mut app);
        app.perform(200, &mut sensor(275), &mut panel).unwrap();
        assert_eq!(calls(&mut app), vec![Call::Tremolo(12.0), Call::Play(50.0)]);
        assert_eq!(panel.right, "T @ 12.0");
    }

    #[test]
    fn vibrato_rate_follows_second_hand() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel(LFO, "Vibrato"), &mut panel).unwrap();
        calls(&mut app);
        app.perform(200, &mut sensor(50), &mut panel).unwrap(); // not inside 50..500
        app.perform(200, &mut sensor(275), &mut panel).unwrap();
        assert_eq!(
            calls(&mut app),
            vec![Call::Play(50.0), Call::Vibrato(7.0), Call::Play(50.0)]
        );
        assert_eq!(panel.right, "V @ 7.0");
    }

    #[test]
    fn drone_follows_both_hands_and_no_melody_plays() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel(LFO, "Drone"), &mut panel).unwrap();
        calls(&mut app);
        app.perform(42, &mut sensor(100), &mut panel).unwrap();
        app.perform(5, &mut sensor(100), &mut panel).unwrap();
        app.perform(400, &mut sensor(100), &mut panel).unwrap();
        assert_eq!(
            calls(&mut app),
            vec![
                Call::Drone(4200.0, 4100.0),
                Call::Drone(1000.0, 900.0),
                Call::Drone(20000.0, 19900.0),
            ]
        );
    }

    #[test]
    fn drone_holds_its_spacing_when_second_hand_leaves() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel(LFO, "Drone"), &mut panel).unwrap();
        calls(&mut app);
        app.perform(30, &mut sensor(OUT_OF_RANGE_MM), &mut panel).unwrap();
        assert_eq!(calls(&mut app), vec![Call::Drone(3000.0, 3100.0)]);
    }

    #[test]
    fn leaving_pitch_range_keeps_drone() {
        let mut app = app();
        let mut panel = TextPanel::new(4);
        app.apply_selection(&sel(LFO, "Drone"), &mut panel).unwrap();
        app.perform(2000, &mut sensor(100), &mut panel).unwrap();
        assert!(app.synth().is_droning());
    }

    proptest! {
        #[test]
        fn played_note_stays_in_range(r1 in 1u16..1000, chromatic in any::<bool>()) {
            let mut app = app();
            app.chromatic = chromatic;
            let mut panel = TextPanel::new(4);
            app.perform(r1, &mut sensor(OUT_OF_RANGE_MM), &mut panel).unwrap();
            match calls(&mut app).as_slice() {
                [Call::Play(n)] => {
                    prop_assert!((0.0..=120.0).contains(n));
                    if chromatic {
                        prop_assert_eq!(n.fract(), 0.0);
                    }
                }
                other => prop_assert!(false, "unexpected calls {:?}", other),
            }
        }
    }

    // ── main loop ───────────────────────────────────────────────────────

    #[test]
    fn run_refuses_missing_hardware() {
        let err = run(&Settings::default(), Hardware::default(), Recorder::default()).unwrap_err();
        assert!(err.to_string().contains("ToF A"));
    }

    #[test]
    fn run_refuses_a_panel_narrower_than_the_window() {
        let (_tx, gestures) = sim_gestures();
        let hw = Hardware {
            tof_a:    Some(Box::new(sensor(200))),
            tof_b:    Some(Box::new(sensor(OUT_OF_RANGE_MM))),
            gestures: Some(Box::new(gestures)),
            panel:    Some(Box::new(TextPanel::new(2))),
        };
        let err = run(&Settings::default(), hw, Recorder::default()).unwrap_err();
        assert!(format!("{err:#}").contains("display slots"));
    }

    #[test]
    fn run_fails_when_gesture_sensor_goes_away() {
        let (tx, gestures) = sim_gestures();
        tx.send(GestureCode::Right).unwrap();
        drop(tx);
        let hw = Hardware {
            tof_a:    Some(Box::new(sensor(200))),
            tof_b:    Some(Box::new(sensor(OUT_OF_RANGE_MM))),
            gestures: Some(Box::new(gestures)),
            panel:    Some(Box::new(TextPanel::new(4))),
        };
        let mut settings = Settings::default();
        settings.theremin.loop_delay_ms = 0;
        let err = run(&settings, hw, Recorder::default()).unwrap_err();
        assert!(format!("{err:#}").contains("gesture sensor"));
    }
}
