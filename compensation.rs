//! Floating-point compensation formulas from section 8.1 of the BME280
//! datasheet.
//!
//! These are pure functions of the raw ADC count and the calibration set.
//! Pressure and humidity also take the fine temperature produced by
//! [`compute_fine_temperature`] for the same acquisition.

use log::warn;

use crate::structs::CalibrationSet;

/// Fine temperature, truncated toward zero like the reference formula.
pub fn compute_fine_temperature(calib: &CalibrationSet, raw_value: u32) -> i32 {
    let adc = raw_value as f64;
    let t1 = calib.dig_t1 as f64;
    let v1 = (adc / 16384.0 - t1 / 1024.0) * calib.dig_t2 as f64;
    let v2 = (adc / 131072.0 - t1 / 8192.0) * (adc / 131072.0 - t1 / 8192.0) * calib.dig_t3 as f64;
    (v1 + v2) as i32
}

/// Degrees Celsius from a fine temperature.
pub fn temperature_from_fine(t_fine: i32) -> f64 {
    t_fine as f64 / 5120.0
}

/// Temperature in degrees Celsius.
pub fn compute_temperature(calib: &CalibrationSet, raw_value: u32) -> f64 {
    temperature_from_fine(compute_fine_temperature(calib, raw_value))
}

/// Pressure in hPa.
///
/// Returns `0.0` when the intermediate denominator is exactly zero, which
/// happens only with a zero `dig_P1` or corrupt calibration data.
pub fn compute_pressure(calib: &CalibrationSet, raw_value: u32, t_fine: i32) -> f64 {
    let mut v1 = t_fine as f64 / 2.0 - 64000.0;
    let mut v2 = v1 * v1 * calib.dig_p6 as f64 / 32768.0;
    v2 = v2 + v1 * calib.dig_p5 as f64 * 2.0;
    v2 = v2 / 4.0 + calib.dig_p4 as f64 * 65536.0;
    v1 = (calib.dig_p3 as f64 * v1 * v1 / 524288.0 + calib.dig_p2 as f64 * v1) / 524288.0;
    v1 = (1.0 + v1 / 32768.0) * calib.dig_p1 as f64;
    if v1 == 0.0 {
        warn!("pressure denominator is zero, check dig_P1 = {}", calib.dig_p1);
        return 0.0;
    }
    let mut p = 1048576.0 - raw_value as f64;
    p = ((p - v2 / 4096.0) * 6250.0) / v1;
    v1 = calib.dig_p9 as f64 * p * p / 2147483648.0;
    v2 = p * calib.dig_p8 as f64 / 32768.0;
    p = p + (v1 + v2 + calib.dig_p7 as f64) / 16.0;
    p / 100.0
}

/// Relative humidity in percent, clamped to `0.0..=100.0`.
pub fn compute_humidity(calib: &CalibrationSet, raw_value: u32, t_fine: i32) -> f64 {
    let mut h = t_fine as f64 - 76800.0;
    h = (raw_value as f64 - (calib.dig_h4 as f64 * 64.0 + calib.dig_h5 as f64 / 16384.0 * h))
        * (calib.dig_h2 as f64 / 65536.0
            * (1.0
                + calib.dig_h6 as f64 / 67108864.0
                    * h
                    * (1.0 + calib.dig_h3 as f64 / 67108864.0 * h)));
    h = h * (1.0 - calib.dig_h1 as f64 * h / 524288.0);
    if h > 100.0 {
        100.0
    } else if h < 0.0 {
        0.0
    } else {
        h
    }
}
