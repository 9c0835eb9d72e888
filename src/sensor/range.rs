// Ultrasonic echo-time conversion (pure; the trigger/echo sequencing lives in
// the collaborator driving the transducer)

use std::time::Duration;

/// Speed of sound in air at room temperature, m/s
pub const SPEED_OF_SOUND_M_S: u16 = 343;

/// Convert a round-trip echo time into a distance in millimeters.
/// Returns 0 for an empty echo (no valid measurement).
pub fn echo_to_distance_mm(round_trip: Duration, speed_m_s: u16) -> i16 {
    let us = round_trip.as_micros() as u64;
    // mm = us * (m/s) / 2000: halve for the round trip, scale units
    (us * speed_m_s as u64 / 2000).min(i16::MAX as u64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_meter_round_trip() {
        // 2 m of travel at 343 m/s is ~5831 us
        let d = echo_to_distance_mm(Duration::from_micros(5831), SPEED_OF_SOUND_M_S);
        assert_eq!(d, 1000);
    }

    #[test]
    fn test_no_echo_is_invalid() {
        assert_eq!(echo_to_distance_mm(Duration::ZERO, SPEED_OF_SOUND_M_S), 0);
    }

    #[test]
    fn test_long_echo_saturates() {
        let d = echo_to_distance_mm(Duration::from_secs(1), SPEED_OF_SOUND_M_S);
        assert_eq!(d, i16::MAX);
    }
}
