//! Instrument settings: menu layout, synth setup, and the theremin's range
//! mapping.  Loaded from TOML; every table and field is optional.
//!
//! ```toml
//! [menu]
//! window_size  = 4
//! focus_offset = 1
//!
//! [synth]
//! port = "fluid"
//!
//! [theremin]
//! pitch_far_mm = 800
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use feather_synth::SynthConfig;
use gesture_menu::{ItemSpec, MenuModel, OptionValue};

// ════════════════════════════════════════════════════════════════════════════
// Menu item names
// ════════════════════════════════════════════════════════════════════════════

pub const WAVEFORM:  &str = "Waveform";
pub const LFO:       &str = "LFO";
pub const CHROMATIC: &str = "Chromatic";
pub const VOLUME:    &str = "Volume";

// ════════════════════════════════════════════════════════════════════════════
// Settings
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub menu:     MenuSettings,
    pub synth:    SynthConfig,
    pub theremin: ThereminSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// Number of menu lines on the panel.
    pub window_size:  usize,
    /// Line on which the focused item is drawn.
    pub focus_offset: usize,
    pub items:        Vec<ItemSpec>,
}

impl Default for MenuSettings {
    fn default() -> Self {
        MenuSettings {
            window_size:  4,
            focus_offset: 1,
            items:        default_items(),
        }
    }
}

/// The four stock items.
pub fn default_items() -> Vec<ItemSpec> {
    vec![
        ItemSpec::new(WAVEFORM,  ["Sine", "Square", "Saw"], 0),
        ItemSpec::new(LFO,       ["Off", "Tremolo", "Vibrato", "Drone"], 0),
        ItemSpec::new(CHROMATIC, [false, true], 0),
        ItemSpec::new(VOLUME,    [25_i64, 50, 75, 100], 2),
    ]
}

/// How sensor distances become sound.  Distances in mm, rates in Hz.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThereminSettings {
    /// Pitch sensor readings must be in `(0, pitch_far_mm)` to sound.
    pub pitch_far_mm:    u16,
    /// LFO sensor readings must be in `(lfo_near_mm, lfo_far_mm)` to count.
    pub lfo_near_mm:     u16,
    pub lfo_far_mm:      u16,
    pub tremolo_min_hz:  f32,
    pub tremolo_max_hz:  f32,
    pub vibrato_min_hz:  f32,
    pub vibrato_max_hz:  f32,
    /// Rate set when tremolo or vibrato is first selected.
    pub lfo_default_hz:  f32,
    /// Drone pair started when the Drone mode is selected.
    pub drone_start_hz:  [f32; 2],
    pub drone_min_hz:    f32,
    pub drone_max_hz:    f32,
    /// Hz of drone per mm of pitch-sensor distance.
    pub drone_hz_per_mm: f32,
    /// Pitch-sensor mm per semitone.
    pub mm_per_semitone: f32,
    pub max_note:        f32,
    /// Pause between loop iterations.
    pub loop_delay_ms:   u64,
}

impl Default for ThereminSettings {
    fn default() -> Self {
        ThereminSettings {
            pitch_far_mm:    1000,
            lfo_near_mm:     50,
            lfo_far_mm:      500,
            tremolo_min_hz:  8.0,
            tremolo_max_hz:  16.0,
            vibrato_min_hz:  4.0,
            vibrato_max_hz:  10.0,
            lfo_default_hz:  20.0,
            drone_start_hz:  [1000.0, 1100.0],
            drone_min_hz:    1000.0,
            drone_max_hz:    20000.0,
            drone_hz_per_mm: 100.0,
            mm_per_semitone: 4.0,
            max_note:        120.0,
            loop_delay_ms:   10,
        }
    }
}

impl Settings {
    /// Read and check a settings file.
    pub fn load(path: &Path) -> Result<Settings> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Settings::from_toml(&text)
            .with_context(|| format!("in settings file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Settings> {
        let settings: Settings = toml::from_str(text).context("parsing TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let model = MenuModel::from_specs(&self.menu.items).context("menu items")?;
        if self.menu.window_size == 0 || self.menu.window_size > model.len() {
            bail!(
                "menu window size {} must be between 1 and the item count {}",
                self.menu.window_size,
                model.len()
            );
        }
        self.synth.validate().context("synth settings")?;

        let t = &self.theremin;
        if t.lfo_near_mm >= t.lfo_far_mm {
            bail!("LFO range {}–{} mm is empty", t.lfo_near_mm, t.lfo_far_mm);
        }
        if t.mm_per_semitone <= 0.0 {
            bail!("mm_per_semitone must be positive");
        }
        if t.drone_min_hz > t.drone_max_hz {
            bail!("drone range {}–{} Hz is empty", t.drone_min_hz, t.drone_max_hz);
        }
        Ok(())
    }

    /// Start the Chromatic item on `true`.
    pub fn start_chromatic(&mut self) {
        let wanted = OptionValue::Flag(true);
        for item in self.menu.items.iter_mut().filter(|i| i.name == CHROMATIC) {
            if let Some(idx) = item.options.iter().position(|v| *v == wanted) {
                item.default = idx;
            }
        }
    }
}
