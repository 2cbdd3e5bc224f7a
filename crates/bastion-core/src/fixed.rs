use fixed::types::I32F32;

/// Q32.32 fixed-point seconds. All queue time arithmetic uses this type so
/// that replays of the same `advance` sequence are bit-identical.
pub type Seconds = I32F32;

/// Convert an f64 to Seconds. Use only for initialization, never in the tick loop.
#[inline]
pub fn f64_to_seconds(v: f64) -> Seconds {
    Seconds::from_num(v)
}

/// Convert an f64 to Seconds, or `None` if it is not finite or out of range.
/// For values read from data files.
pub fn checked_f64_to_seconds(v: f64) -> Option<Seconds> {
    if !v.is_finite() {
        return None;
    }
    Seconds::checked_from_num(v)
}

/// Convert Seconds to f64. Use only for display.
#[inline]
pub fn seconds_to_f64(v: Seconds) -> f64 {
    v.to_num::<f64>()
}

/// Whole seconds as a fixed-point value.
#[inline]
pub fn secs(v: u32) -> Seconds {
    Seconds::from_num(v)
}

/// Number of `unit`-second blocks needed to cover `remaining`, rounding any
/// fraction up. Non-positive `remaining` costs nothing.
pub fn ceil_units(remaining: Seconds, unit: u32) -> u64 {
    if remaining <= Seconds::ZERO || unit == 0 {
        return 0;
    }
    // Exact integer division on the raw Q32.32 bits; a fixed-point quotient
    // would truncate sub-ulp remainders.
    let bits = i128::from(remaining.to_bits());
    let unit_bits = i128::from(unit) << Seconds::FRAC_NBITS;
    let floor = bits / unit_bits;
    let units = if bits % unit_bits == 0 { floor } else { floor + 1 };
    units as u64
}
