// Line position estimator over two photoreflectors
//
// Reflectance is measured differentially: both channels are sampled with the
// illumination LEDs on, then again with them off, and the per-phase means are
// subtracted to cancel ambient light. The offset combines both normalized
// channels into a signed steering error, with hysteresis when the line is
// lost entirely.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AnalogInput, LedPair};
use crate::config::{LINE_AVERAGING, LINE_PHASE_PAUSE, LINE_SAMPLE_GAP};

/// Normalized reading above which a channel is considered "on white"
const EDGE_THRESHOLD: i16 = 450;

/// Offset reported while the line is lost, signed by the last known direction
const OFFSET_SATURATED: i16 = 1000;

/// Session-scoped black/white reflectance references, supplied by the caller.
/// The white reference must exceed the black one per side for the
/// normalization to behave monotonically; this is not enforced here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Calibration {
    pub white_left: i16,
    pub white_right: i16,
    pub black_left: i16,
    pub black_right: i16,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            white_left: 1023,
            white_right: 1023,
            black_left: 0,
            black_right: 0,
        }
    }
}

/// One differential (or ambient) measurement of both channels, clamped to
/// 1..=1023. Produced fresh per call, never cached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Reflectance {
    pub left: i16,
    pub right: i16,
}

impl Reflectance {
    pub fn diff(self) -> i16 {
        self.left - self.right
    }

    pub fn sum(self) -> i16 {
        self.left + self.right
    }
}

/// Line position estimator: two photoreflector channels plus one LED pair
pub struct LineSensor<A: AnalogInput, L: LedPair> {
    left: A,
    right: A,
    leds: L,
    averaging: u32,
    sample_gap: Duration,
    phase_pause: Duration,
    cal: Calibration,
    last_offset: i16,
}

impl<A: AnalogInput, L: LedPair> LineSensor<A, L> {
    pub fn new(left: A, right: A, mut leds: L) -> Self {
        leds.set(false);
        Self {
            left,
            right,
            leds,
            averaging: LINE_AVERAGING,
            sample_gap: LINE_SAMPLE_GAP,
            phase_pause: LINE_PHASE_PAUSE,
            cal: Calibration::default(),
            last_offset: 0,
        }
    }

    /// Override sampling parameters (tests run with a single sample and zero
    /// delays)
    pub fn with_sampling(
        mut self,
        averaging: u32,
        sample_gap: Duration,
        phase_pause: Duration,
    ) -> Self {
        assert!(averaging > 0);
        self.averaging = averaging;
        self.sample_gap = sample_gap;
        self.phase_pause = phase_pause;
        self
    }

    /// Install the session's black/white references
    pub fn calibrate(&mut self, cal: Calibration) {
        debug!("Line sensor calibration: {:?}", cal);
        self.cal = cal;
    }

    pub fn calibration(&self) -> Calibration {
        self.cal
    }

    fn pause(d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }

    /// Sum `averaging` samples of both channels in the current LED state
    fn accumulate(&mut self) -> (i64, i64) {
        let mut left = 0i64;
        let mut right = 0i64;
        for _ in 0..self.averaging {
            left += self.left.sample() as i64;
            right += self.right.sample() as i64;
            Self::pause(self.sample_gap);
        }
        (left, right)
    }

    fn clamp_mean(&self, sum: i64) -> i16 {
        (sum / self.averaging as i64).clamp(1, 1023) as i16
    }

    /// Raw ambient light level per channel: LED-off samples only
    pub fn ambient(&mut self) -> Reflectance {
        self.leds.set(false);
        let (left, right) = self.accumulate();
        Reflectance {
            left: self.clamp_mean(left),
            right: self.clamp_mean(right),
        }
    }

    /// Reflected light attributable to the LEDs: mean of the LED-on phase
    /// minus mean of the LED-off phase, per channel
    pub fn reflections(&mut self) -> Reflectance {
        self.leds.set(true);
        let (on_left, on_right) = self.accumulate();
        self.leds.set(false);
        Self::pause(self.phase_pause);
        let (off_left, off_right) = self.accumulate();
        Reflectance {
            left: self.clamp_mean(on_left - off_left),
            right: self.clamp_mean(on_right - off_right),
        }
    }

    /// Fresh reflectance measurement, left minus right
    pub fn diff(&mut self) -> i16 {
        self.reflections().diff()
    }

    /// Fresh reflectance measurement, left plus right
    pub fn sum(&mut self) -> i16 {
        self.reflections().sum()
    }

    /// Fresh ambient measurement, left minus right
    pub fn ambient_diff(&mut self) -> i16 {
        self.ambient().diff()
    }

    /// Fresh ambient measurement, left plus right
    pub fn ambient_sum(&mut self) -> i16 {
        self.ambient().sum()
    }

    /// Signed offset from the calibrated black line, negative when the line
    /// is to the left.
    ///
    /// Each channel normalizes linearly from its [black, white] range onto
    /// 0..=500 (saturating, never extrapolating). A channel above 450 sees
    /// white; when one channel has drifted past the line the combined reading
    /// signals harder in the overshoot direction, and when both see white the
    /// offset saturates to +-1000 in the direction of the previous offset so
    /// steering keeps correcting the way it already was.
    pub fn offset(&mut self) -> i16 {
        let refl = self.reflections();
        let left = normalize(refl.left, self.cal.black_left, self.cal.white_left);
        let right = normalize(refl.right, self.cal.black_right, self.cal.white_right);

        let offset = if left > EDGE_THRESHOLD && right <= EDGE_THRESHOLD {
            // Right sensor has crossed onto the line's left edge
            -(left + right)
        } else if left <= EDGE_THRESHOLD && right > EDGE_THRESHOLD {
            // Left sensor has crossed onto the line's right edge
            left + right
        } else if left > EDGE_THRESHOLD && right > EDGE_THRESHOLD {
            // Line lost: keep turning the way we were
            if self.last_offset >= 0 {
                OFFSET_SATURATED
            } else {
                -OFFSET_SATURATED
            }
        } else {
            right - left
        };

        self.last_offset = offset;
        offset
    }
}

/// Map a raw reflectance onto 0..=500 within the calibrated range
fn normalize(raw: i16, black: i16, white: i16) -> i16 {
    let span = (white - black).max(1) as i32;
    ((raw - black) as i32 * 500 / span).clamp(0, 500) as i16
}
