// Battery voltage scaling
//
// The ADC read itself is an external collaborator; these are the conversion
// constants for the board's divider against the 2.23 V internal reference.

/// Pack voltage in volts from a raw 10-bit ADC sample
pub fn battery_voltage(adc: u16) -> f32 {
    0.0158 * adc as f32
}

/// Remaining capacity in percent; 12.4 V reads as 100%, 10.5 V as empty
pub fn battery_percent(volts: f32) -> u16 {
    (((volts - 10.5) * 54.0) as i16).clamp(0, 100) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voltage_scaling() {
        assert!((battery_voltage(0) - 0.0).abs() < f32::EPSILON);
        let v = battery_voltage(785); // ~12.4 V
        assert!((12.3..12.5).contains(&v));
    }

    #[test]
    fn test_percent_clamped() {
        assert_eq!(battery_percent(13.0), 100);
        assert_eq!(battery_percent(9.0), 0);
        let mid = battery_percent(11.5);
        assert!((50..=60).contains(&mid));
    }
}
