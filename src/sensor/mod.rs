// Sensor-side collaborator contracts and estimators
//
// Hardware access goes through narrow traits (a raw ADC sample, an LED pair
// toggle) so the estimation logic composes over any driver and runs against
// scripted inputs in tests.

pub mod color;
pub mod line;
pub mod range;

/// One analog channel: each call returns a fresh raw sample in 0..=1023
pub trait AnalogInput {
    fn sample(&mut self) -> u16;
}

impl<T: AnalogInput + ?Sized> AnalogInput for &mut T {
    fn sample(&mut self) -> u16 {
        (**self).sample()
    }
}

/// Illumination LED pair, switched as a unit
pub trait LedPair {
    fn set(&mut self, on: bool);
}

impl<T: LedPair + ?Sized> LedPair for &mut T {
    fn set(&mut self, on: bool) {
        (**self).set(on)
    }
}

pub use color::{Color, ColorClassifier, Rgb};
pub use line::{Calibration, LineSensor, Reflectance};
pub use range::echo_to_distance_mm;
