//! LeapMotion hand tracker standing in for the sensors.
//!
//! | Hand motion                | Replaces              |
//! |----------------------------|-----------------------|
//! | Right palm height          | ToF A (pitch)         |
//! | Left palm height           | ToF B (LFO)           |
//! | Fast palm swipe, any hand  | gesture sensor        |
//!
//! The tracker polls on its own thread and writes into the same endpoints the
//! panel simulation uses.  Swipe recognition is plain arithmetic and is built
//! with or without the `leap` feature.

#![cfg_attr(not(feature = "leap"), allow(dead_code))]

use std::time::{Duration, Instant};

use gesture_menu::GestureCode;

/// Palm speed (mm/s) that counts as a swipe.
pub const SWIPE_SPEED:    f32      = 800.0;
/// Quiet time after a swipe before the next one is taken.
pub const SWIPE_COOLDOWN: Duration = Duration::from_millis(400);

/// Direction of a swipe from palm velocity, dominant axis wins.
/// Leap coordinates: +x is right, +y is up.
pub fn swipe_direction(vx: f32, vy: f32) -> Option<GestureCode> {
    if vx.abs().max(vy.abs()) < SWIPE_SPEED {
        return None;
    }
    let code = if vx.abs() >= vy.abs() {
        if vx > 0.0 { GestureCode::Right } else { GestureCode::Left }
    } else if vy > 0.0 {
        GestureCode::Up
    } else {
        GestureCode::Down
    };
    Some(code)
}

/// Turns a stream of palm velocities into discrete swipes.
#[derive(Debug, Default)]
pub struct SwipeDetector {
    last: Option<Instant>,
}

impl SwipeDetector {
    pub fn update(&mut self, vx: f32, vy: f32, now: Instant) -> Option<GestureCode> {
        if let Some(last) = self.last {
            if now.duration_since(last) < SWIPE_COOLDOWN {
                return None;
            }
        }
        let code = swipe_direction(vx, vy)?;
        self.last = Some(now);
        Some(code)
    }
}

/// Palm height as a sensor reading.
pub fn palm_mm(height: f32) -> u16 {
    height.round().clamp(1.0, crate::sim::OUT_OF_RANGE_MM as f32) as u16
}

// ════════════════════════════════════════════════════════════════════════════
// LeapC — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "leap")]
pub use hw::{probe, HandTracker};

#[cfg(feature = "leap")]
mod hw {
    use std::sync::mpsc::{self, Sender};
    use std::thread;
    use std::time::{Duration, Instant};

    use gesture_menu::GestureCode;
    use tracing::{debug, info};

    use super::{palm_mm, SwipeDetector};
    use crate::hardware::SensorError;
    use crate::sim::{sim_gestures, SimGestureSource, SimRangeSensor};

    const OPEN_TIMEOUT: Duration = Duration::from_secs(2);

    /// The three sensor endpoints fed by the tracker thread.
    pub struct HandTracker {
        pub tof_a:    SimRangeSensor,
        pub tof_b:    SimRangeSensor,
        pub gestures: SimGestureSource,
    }

    /// Start the tracker thread and wait for LeapC to open.
    pub fn probe() -> Result<HandTracker, SensorError> {
        let (swipes, gestures) = sim_gestures();
        let tof_a = SimRangeSensor::new();
        let tof_b = SimRangeSensor::new();
        let (ready_tx, ready_rx) = mpsc::channel();

        let (a, b) = (tof_a.clone(), tof_b.clone());
        thread::spawn(move || track(ready_tx, swipes, a, b));

        match ready_rx.recv_timeout(OPEN_TIMEOUT) {
            Ok(Ok(())) => {
                info!("LeapMotion connection open");
                Ok(HandTracker { tof_a, tof_b, gestures })
            }
            Ok(Err(reason)) => Err(SensorError::Disconnected(reason)),
            Err(_) => Err(SensorError::NoReading("LeapMotion".to_string())),
        }
    }

    fn track(
        ready: Sender<Result<(), String>>,
        swipes: Sender<GestureCode>,
        tof_a: SimRangeSensor,
        tof_b: SimRangeSensor,
    ) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                let _ = ready.send(Err(format!("LeapC connection: {e:?}")));
                return;
            }
        };
        if let Err(e) = connection.open() {
            let _ = ready.send(Err(format!("LeapMotion device: {e:?}")));
            return;
        }
        let _ = ready.send(Ok(()));

        let mut detector = SwipeDetector::default();

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<_> = frame.hands().collect();

                // ── palm heights → ranges ─────────────────────────────────
                let left  = hands.iter().find(|h| h.hand_type() == HandType::Left);
                let right = hands.iter().find(|h| h.hand_type() == HandType::Right);

                match right {
                    Some(h) => tof_a.set(palm_mm(h.palm().position().y)),
                    None    => tof_a.clear(),
                }
                match left {
                    Some(h) => tof_b.set(palm_mm(h.palm().position().y)),
                    None    => tof_b.clear(),
                }

                // ── swipes ────────────────────────────────────────────────
                for h in &hands {
                    let v = h.palm().velocity();
                    if let Some(code) = detector.update(v.x, v.y, Instant::now()) {
                        debug!(?code, "swipe");
                        if swipes.send(code).is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_motion_is_not_a_swipe() {
        assert_eq!(swipe_direction(300.0, -500.0), None);
    }

    #[test]
    fn dominant_axis_picks_the_code() {
        assert_eq!(swipe_direction(1200.0, 300.0),  Some(GestureCode::Right));
        assert_eq!(swipe_direction(-1200.0, 300.0), Some(GestureCode::Left));
        assert_eq!(swipe_direction(100.0, 900.0),   Some(GestureCode::Up));
        assert_eq!(swipe_direction(100.0, -900.0),  Some(GestureCode::Down));
    }

    #[test]
    fn cooldown_swallows_the_follow_through() {
        let mut d = SwipeDetector::default();
        let t0 = Instant::now();
        assert_eq!(d.update(1000.0, 0.0, t0), Some(GestureCode::Right));
        assert_eq!(d.update(-1000.0, 0.0, t0 + Duration::from_millis(100)), None);
        assert_eq!(
            d.update(-1000.0, 0.0, t0 + SWIPE_COOLDOWN + Duration::from_millis(1)),
            Some(GestureCode::Left)
        );
    }

    #[test]
    fn palm_height_is_clamped_to_a_reading() {
        assert_eq!(palm_mm(212.4), 212);
        assert_eq!(palm_mm(-5.0), 1);
        assert_eq!(palm_mm(1e6), crate::sim::OUT_OF_RANGE_MM);
    }
}
