// Traversal-time estimation for a symmetric trapezoidal velocity profile
// Pure math, no bus interaction; callers use it to schedule waits around go().

/// Fixed command/startup overhead folded into every estimate
pub const OVERHEAD_MS: u32 = 10;

/// Estimate the total running time in milliseconds for a move of
/// `distance_mm` at cruise speed `speed` (cm/s) with `accel`/`decel` (cm/s2).
///
/// The requested speed is clamped to the peak velocity reachable on the given
/// distance, `v_max = sqrt(0.2 * |d| * a * dec / (a + dec))`, so short moves
/// are estimated with the triangular profile they actually get. Negative
/// distance is treated as its magnitude. Callers must supply positive speed,
/// accel and decel; zero distance yields the fixed overhead alone.
pub fn estimate_travel_ms(distance_mm: i32, speed: i16, accel: i16, decel: i16) -> u32 {
    let distance = (distance_mm as i64).abs();
    let accel = accel as i64;
    let decel = decel as i64;

    let v_max = (0.2 * distance as f64 * (accel * decel) as f64 / (accel + decel) as f64).sqrt()
        as i64;
    let speed = (speed as i64).min(v_max);
    if speed <= 0 {
        return OVERHEAD_MS;
    }

    let cruise = (100 * distance / speed).unsigned_abs();
    let ramp_up = (1000 * speed / accel / 2).unsigned_abs();
    let ramp_down = (1000 * speed / decel / 2).unsigned_abs();

    OVERHEAD_MS + (cruise + ramp_up + ramp_down) as u32
}
