// Color classification from raw RGB readings (HSL-style, integer results)
//
// The chip driver is an external collaborator; this module only does the
// math: white balance, dark-reference subtraction and bucketing into the
// course's color codes.

use serde::{Deserialize, Serialize};

/// Raw or balanced RGB triple
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Rgb {
    pub fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }
}

/// Color codes. Wire/order contract with course material, do not reorder.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black = 0,
    Red = 1,
    Yellow = 2,
    Green = 3,
    Blue = 4,
    White = 5,
}

/// Hue in -179..=180 degrees
pub fn hue(rgb: Rgb) -> i16 {
    let (r, g, b) = (rgb.r as f32, rgb.g as f32, rgb.b as f32);
    (57.3 * (1.732 * (g - b)).atan2(2.0 * r - g - b)).round() as i16
}

/// Saturation in 0..=100
pub fn saturation(rgb: Rgb) -> i16 {
    let min = rgb.r.min(rgb.g).min(rgb.b) as f32;
    let max = rgb.r.max(rgb.g).max(rgb.b).max(1) as f32;
    (100.0 * (1.0 - min / max)).round() as i16
}

/// Mean channel intensity
pub fn intensity(rgb: Rgb) -> i16 {
    ((rgb.r as u32 + rgb.g as u32 + rgb.b as u32) / 3).min(i16::MAX as u32) as i16
}

/// Bucket a balanced RGB triple into a color code
pub fn color_of(rgb: Rgb) -> Color {
    let h = hue(rgb);
    if intensity(rgb) < 8 {
        Color::Black
    } else if saturation(rgb) < 35 && intensity(rgb) > 30 {
        Color::White
    } else if h > -20 && h <= 15 {
        Color::Red
    } else if h > 15 && h <= 60 {
        Color::Yellow
    } else if h > 60 && h <= 175 {
        Color::Green
    } else {
        Color::Blue
    }
}

/// White-balance gains and session dark reference for one sensor
pub struct ColorClassifier {
    gains: [u16; 3],
    dark: Rgb,
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorClassifier {
    pub fn new() -> Self {
        Self {
            gains: [5, 4, 3],
            dark: Rgb::default(),
        }
    }

    pub fn with_gains(mut self, gains: [u16; 3]) -> Self {
        self.gains = gains;
        self
    }

    /// Apply white balance and subtract the dark reference, flooring at 1
    pub fn balance(&self, raw: Rgb) -> Rgb {
        let channel = |value: u16, gain: u16, dark: u16| -> u16 {
            let amplified = (value as u32 * gain as u32).min(u16::MAX as u32) as u16;
            amplified.saturating_sub(dark).max(1)
        };
        Rgb {
            r: channel(raw.r, self.gains[0], self.dark.r),
            g: channel(raw.g, self.gains[1], self.dark.g),
            b: channel(raw.b, self.gains[2], self.dark.b),
        }
    }

    /// Store a dark reference measured on the session's background
    pub fn calibrate(&mut self, raw: Rgb) {
        self.dark = Rgb::default();
        self.dark = self.balance(raw);
    }

    /// Drop the dark reference
    pub fn reset(&mut self) {
        self.dark = Rgb::default();
    }

    /// Balance a raw reading and bucket it
    pub fn classify(&self, raw: Rgb) -> Color {
        color_of(self.balance(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_axes() {
        assert_eq!(hue(Rgb::new(100, 1, 1)), 0); // red axis
        assert!((118..=122).contains(&hue(Rgb::new(10, 100, 10)))); // green
        assert!((-122..=-118).contains(&hue(Rgb::new(10, 10, 100)))); // blue
    }

    #[test]
    fn test_saturation_bounds() {
        assert_eq!(saturation(Rgb::new(100, 100, 100)), 0);
        assert_eq!(saturation(Rgb::new(100, 0, 0)), 100);
        assert_eq!(saturation(Rgb::new(0, 0, 0)), 0); // guarded divisor
    }

    #[test]
    fn test_color_buckets() {
        assert_eq!(color_of(Rgb::new(2, 2, 2)), Color::Black);
        assert_eq!(color_of(Rgb::new(100, 100, 100)), Color::White);
        assert_eq!(color_of(Rgb::new(100, 1, 1)), Color::Red);
        assert_eq!(color_of(Rgb::new(100, 80, 1)), Color::Yellow);
        assert_eq!(color_of(Rgb::new(10, 100, 10)), Color::Green);
        assert_eq!(color_of(Rgb::new(10, 10, 100)), Color::Blue);
    }

    #[test]
    fn test_dim_saturated_reading_is_not_white() {
        // Low saturation but also low intensity: falls through to hue buckets
        assert_eq!(color_of(Rgb::new(12, 11, 11)), Color::Red);
    }

    #[test]
    fn test_classifier_balance_and_dark_reference() {
        let mut c = ColorClassifier::new();
        // Gains 5/4/3 amplify before bucketing
        assert_eq!(c.classify(Rgb::new(40, 2, 2)), Color::Red);

        c.calibrate(Rgb::new(10, 10, 10)); // dark = (50, 40, 30)
        let balanced = c.balance(Rgb::new(10, 10, 10));
        assert_eq!((balanced.r, balanced.g, balanced.b), (1, 1, 1));

        c.reset();
        let balanced = c.balance(Rgb::new(10, 10, 10));
        assert_eq!((balanced.r, balanced.g, balanced.b), (50, 40, 30));
    }
}
