//! What the instrument is plugged into.
//!
//! Each capability is found once at startup and may be absent.  The main loop
//! only runs once [`Hardware::require`] has confirmed all four are present.

use thiserror::Error;
use tracing::{info, warn};

use gesture_menu::GestureSource;

use crate::panel::{FrontPanel, WindowPanel};
use crate::sim::{sim_gestures, SimRangeSensor};

// ════════════════════════════════════════════════════════════════════════════
// Sensors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("{0} disconnected")]
    Disconnected(String),

    #[error("{0} gave no reading")]
    NoReading(String),
}

/// A time-of-flight distance sensor.
pub trait RangeSensor {
    fn range_mm(&mut self) -> Result<u16, SensorError>;
}

impl<R: RangeSensor + ?Sized> RangeSensor for Box<R> {
    fn range_mm(&mut self) -> Result<u16, SensorError> { (**self).range_mm() }
}

pub type BoxedGestures = Box<dyn GestureSource<Error = SensorError>>;

// ════════════════════════════════════════════════════════════════════════════
// Hardware
// ════════════════════════════════════════════════════════════════════════════

/// Capabilities found at startup.
#[derive(Default)]
pub struct Hardware {
    pub tof_a:    Option<Box<dyn RangeSensor>>,
    pub tof_b:    Option<Box<dyn RangeSensor>>,
    pub gestures: Option<BoxedGestures>,
    pub panel:    Option<Box<dyn FrontPanel>>,
}

/// Everything the main loop needs, all present.
pub struct Rig {
    pub tof_a:    Box<dyn RangeSensor>,
    pub tof_b:    Box<dyn RangeSensor>,
    pub gestures: BoxedGestures,
    pub panel:    Box<dyn FrontPanel>,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("missing hardware: {}", .0.join(", "))]
pub struct MissingHardware(pub Vec<&'static str>);

impl Hardware {
    /// Names of the absent capabilities.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.tof_a.is_none()    { names.push("ToF A"); }
        if self.tof_b.is_none()    { names.push("ToF B"); }
        if self.gestures.is_none() { names.push("gesture sensor"); }
        if self.panel.is_none()    { names.push("display"); }
        names
    }

    pub fn require(self) -> Result<Rig, MissingHardware> {
        match self {
            Hardware {
                tof_a:    Some(tof_a),
                tof_b:    Some(tof_b),
                gestures: Some(gestures),
                panel:    Some(panel),
            } => Ok(Rig { tof_a, tof_b, gestures, panel }),
            hw => Err(MissingHardware(hw.missing())),
        }
    }

    /// Open the panel window and wire up its simulated sensors, then (with the
    /// `leap` feature) let a hand tracker take over the sensors.
    pub fn discover(slots: usize, focus_offset: usize) -> Hardware {
        let mut hw = Hardware::default();

        let (swipes, gestures) = sim_gestures();
        let tof_a = SimRangeSensor::new();
        let tof_b = SimRangeSensor::new();

        match WindowPanel::open(slots, focus_offset, swipes, tof_a.clone(), tof_b.clone()) {
            Ok(panel) => {
                info!("display: panel window");
                hw.panel    = Some(Box::new(panel));
                hw.gestures = Some(Box::new(gestures));
                hw.tof_a    = Some(Box::new(tof_a));
                hw.tof_b    = Some(Box::new(tof_b));
                info!("ToF A, ToF B, gestures: simulated from the panel");
            }
            Err(e) => warn!(error = %e, "no display"),
        }

        #[cfg(feature = "leap")]
        match crate::leap::probe() {
            Ok(tracker) => {
                info!("hand tracker found; it replaces the simulated sensors");
                hw.tof_a    = Some(Box::new(tracker.tof_a));
                hw.tof_b    = Some(Box::new(tracker.tof_b));
                hw.gestures = Some(Box::new(tracker.gestures));
            }
            Err(e) => warn!(error = %e, "no hand tracker"),
        }

        for name in hw.missing() {
            warn!(capability = name, "not found");
        }
        hw
    }
}
