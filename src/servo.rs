// Servo positioning over a timed pulse-width output
//
// The PWM generation is an external collaborator; this module owns the
// angle-to-pulse interpolation and the slow-sweep stepping.

use std::thread;
use std::time::Duration;

use tracing::debug;

/// Timed pulse-width collaborator: one pulse-width write per call, plus a way
/// to cut the signal so the servo coasts
pub trait PwmOutput {
    fn write_pulse_us(&mut self, us: u16);
    fn disable(&mut self);
}

impl<T: PwmOutput + ?Sized> PwmOutput for &mut T {
    fn write_pulse_us(&mut self, us: u16) {
        (**self).write_pulse_us(us)
    }

    fn disable(&mut self) {
        (**self).disable()
    }
}

/// Supported servo models and their pulse calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoKind {
    /// 180-degree mini servo
    Mini,
    /// 360-degree geared servo
    Geek,
}

impl ServoKind {
    fn max_angle(self) -> i16 {
        match self {
            ServoKind::Mini => 180,
            ServoKind::Geek => 360,
        }
    }

    fn pulse_range_us(self) -> (u16, u16) {
        match self {
            ServoKind::Mini => (560, 2490),
            ServoKind::Geek => (510, 2512),
        }
    }
}

/// One servo on one PWM channel
pub struct Servo<P: PwmOutput> {
    out: P,
    kind: ServoKind,
    last_angle: i16,
}

impl<P: PwmOutput> Servo<P> {
    pub fn new(out: P, kind: ServoKind) -> Self {
        Self {
            out,
            kind,
            last_angle: 0,
        }
    }

    pub fn last_angle(&self) -> i16 {
        self.last_angle
    }

    /// Pulse width for an angle; out-of-range angles clamp to the travel
    pub fn pulse_for(&self, angle: i16) -> u16 {
        let max = self.kind.max_angle();
        let angle = angle.clamp(0, max) as u32;
        let (min_us, max_us) = self.kind.pulse_range_us();
        let span = (max_us - min_us) as u32;
        min_us + (angle * span / max as u32) as u16
    }

    /// Move to an absolute angle at full speed
    pub fn turn_to(&mut self, angle: i16) {
        let angle = angle.clamp(0, self.kind.max_angle());
        debug!("Servo to {} deg", angle);
        self.out.write_pulse_us(self.pulse_for(angle));
        self.last_angle = angle;
    }

    /// Sweep to an absolute angle one degree at a time at `speed` deg/s.
    /// Speed must be nonzero.
    pub fn slow_to(&mut self, angle: i16, speed: u16) {
        let target = angle.clamp(0, self.kind.max_angle());
        let step_pause = Duration::from_millis(1000 / speed as u64);
        let step: i16 = if target >= self.last_angle { 1 } else { -1 };

        let mut a = self.last_angle;
        while a != target {
            a += step;
            self.out.write_pulse_us(self.pulse_for(a));
            if !step_pause.is_zero() {
                thread::sleep(step_pause);
            }
        }
        self.last_angle = target;
    }

    /// Let the servo settle, then cut the signal so it coasts
    pub fn coast(&mut self) {
        thread::sleep(Duration::from_millis(100));
        self.out.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        pulses: Vec<u16>,
        disabled: bool,
    }

    impl PwmOutput for Recorder {
        fn write_pulse_us(&mut self, us: u16) {
            self.pulses.push(us);
        }

        fn disable(&mut self) {
            self.disabled = true;
        }
    }

    #[test]
    fn test_pulse_endpoints() {
        let servo = Servo::new(Recorder::default(), ServoKind::Mini);
        assert_eq!(servo.pulse_for(0), 560);
        assert_eq!(servo.pulse_for(180), 2490);
        assert_eq!(servo.pulse_for(90), 1525);
    }

    #[test]
    fn test_angle_clamped_to_travel() {
        let servo = Servo::new(Recorder::default(), ServoKind::Geek);
        assert_eq!(servo.pulse_for(-45), 510);
        assert_eq!(servo.pulse_for(9999), 2512);
    }

    #[test]
    fn test_turn_to_records_angle() {
        let mut servo = Servo::new(Recorder::default(), ServoKind::Mini);
        servo.turn_to(200); // clamps to 180
        assert_eq!(servo.last_angle(), 180);
        assert_eq!(servo.out.pulses, vec![2490]);
    }

    #[test]
    fn test_slow_to_steps_by_degree() {
        let mut servo = Servo::new(Recorder::default(), ServoKind::Mini);
        servo.slow_to(3, 1000);
        assert_eq!(servo.out.pulses.len(), 3);
        assert_eq!(servo.last_angle(), 3);

        servo.out.pulses.clear();
        servo.slow_to(1, 1000); // downwards sweep
        assert_eq!(servo.out.pulses.len(), 2);
        assert_eq!(servo.last_angle(), 1);
    }

    #[test]
    fn test_coast_cuts_signal() {
        let mut servo = Servo::new(Recorder::default(), ServoKind::Mini);
        servo.coast();
        assert!(servo.out.disabled);
    }
}
