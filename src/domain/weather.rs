//! Weather multiplier.
//!
//! Warmer air and stronger wind favour offence. Temperature is centred on
//! 20 °C over a 50 °C span and wind is scaled by 20 km/h; the combined
//! nudge is 5% per unit and bounded to ±10%.

/// Lower bound of the weather multiplier.
pub const WEATHER_MIN: f64 = 0.9;
/// Upper bound of the weather multiplier.
pub const WEATHER_MAX: f64 = 1.1;

const REFERENCE_TEMP_C: f64 = 20.0;
const TEMP_SPAN_C: f64 = 50.0;
const WIND_SCALE_KMH: f64 = 20.0;
const SENSITIVITY: f64 = 0.05;

/// `clamp(1 + 0.05 * ((temp_c - 20) / 50 + wind_kmh / 20), 0.9, 1.1)`.
///
/// Returns `None` for non-finite inputs so callers can record the factor
/// as invalid instead of neutral-by-coincidence.
pub fn weather_multiplier(temp_c: f64, wind_kmh: f64) -> Option<f64> {
    if !temp_c.is_finite() || !wind_kmh.is_finite() {
        return None;
    }
    // Readings below 0.1 km/h are sensor noise.
    let wind = if wind_kmh < 0.1 { 0.0 } else { wind_kmh };

    let temp_component = (temp_c - REFERENCE_TEMP_C) / TEMP_SPAN_C;
    let wind_component = wind / WIND_SCALE_KMH;
    let raw = 1.0 + SENSITIVITY * (temp_component + wind_component);
    Some(raw.clamp(WEATHER_MIN, WEATHER_MAX))
}
