//! Grid rounding for note positions and velocities.

/// Round `value` to the nearest multiple of `1/denom`.
///
/// Positions are in quarter notes, so `denom = 32` snaps to 32nd notes.
/// Ties go to the even multiple. `denom = 0` leaves the value untouched.
pub fn quantize_time(value: f64, denom: u32) -> f64 {
    if denom == 0 {
        return value;
    }
    let denom = denom as f64;
    (value * denom).round_ties_even() / denom
}

/// Move a velocity to the center of its `step`-wide bucket.
///
/// With `step = 4` the buckets are 0-3, 4-7, 8-11... and the centers are
/// 2, 6, 10... `step = 0` leaves the velocity untouched. The result is not
/// clamped to the MIDI range.
pub fn quantize_velocity(value: i32, step: u32) -> i32 {
    if step == 0 {
        return value;
    }
    let shift = (step / 2) as i32;
    let width = step as f64;
    // Half-up so a value sitting on a bucket edge starts the next bucket.
    let bucket = ((value - shift) as f64 / width + 0.5).floor();
    (bucket * width) as i32 + shift
}
