//! Simulated sensors, fed from the panel window (or the hand tracker).
//!
//! Both are plain shared endpoints: swipes arrive over an `mpsc` channel, and
//! each range sensor is one atomic the producer overwrites.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

use gesture_menu::{GestureCode, GestureSource};

use crate::hardware::{RangeSensor, SensorError};

/// What a VL53L0X reports with nothing in range.
pub const OUT_OF_RANGE_MM: u16 = 8190;

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource
// ════════════════════════════════════════════════════════════════════════════

/// Swipes queued by another part of the program.  Returns `None` when the
/// queue is empty; fails once every sender is gone.
pub struct SimGestureSource {
    rx: Receiver<GestureCode>,
}

/// A connected sender/source pair.
pub fn sim_gestures() -> (Sender<GestureCode>, SimGestureSource) {
    let (tx, rx) = mpsc::channel();
    (tx, SimGestureSource { rx })
}

impl GestureSource for SimGestureSource {
    type Error = SensorError;

    fn gesture(&mut self) -> Result<GestureCode, SensorError> {
        match self.rx.try_recv() {
            Ok(code)                        => Ok(code),
            Err(TryRecvError::Empty)        => Ok(GestureCode::None),
            Err(TryRecvError::Disconnected) => {
                Err(SensorError::Disconnected("gesture sensor".to_string()))
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimRangeSensor
// ════════════════════════════════════════════════════════════════════════════

/// A range reading anyone holding a clone can update.
#[derive(Clone, Debug)]
pub struct SimRangeSensor {
    mm: Arc<AtomicU16>,
}

impl SimRangeSensor {
    /// Starts with nothing in range.
    pub fn new() -> Self {
        SimRangeSensor { mm: Arc::new(AtomicU16::new(OUT_OF_RANGE_MM)) }
    }

    pub fn set(&self, mm: u16) { self.mm.store(mm, Ordering::Relaxed); }

    pub fn clear(&self) { self.set(OUT_OF_RANGE_MM); }

    pub fn get(&self) -> u16 { self.mm.load(Ordering::Relaxed) }
}

impl Default for SimRangeSensor {
    fn default() -> Self { SimRangeSensor::new() }
}

impl RangeSensor for SimRangeSensor {
    fn range_mm(&mut self) -> Result<u16, SensorError> { Ok(self.get()) }
}
