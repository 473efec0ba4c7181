use log::{debug, info, trace};

use crate::compensation::{
    compute_fine_temperature, compute_humidity, compute_pressure, temperature_from_fine,
};
use crate::config::SensorConfig;
use crate::error::Result;
use crate::structs::{
    adc16, adc20, CalibrationSet, Measurements, RawSample, CALIB_00_LEN, CALIB_26_LEN,
};
use crate::transport::Transport;

// BME280 register addresses.
pub const REG_CALIB_00: u8 = 0x88;
pub const REG_CALIB_26: u8 = 0xE1;
pub const REG_CTRL_HUM: u8 = 0xF2;
pub const REG_CTRL_MEAS: u8 = 0xF4;
pub const REG_CONFIG: u8 = 0xF5;
pub const REG_PRESS: u8 = 0xF7;
pub const REG_TEMP: u8 = 0xFA;
pub const REG_HUM: u8 = 0xFD;
const REG_ADC_VALUE_LEN: usize = 8;

/// A configured BME280 with its calibration loaded.
///
/// [`pressure`](Self::pressure) and [`humidity`](Self::humidity) each
/// acquire a fresh temperature first, since both formulas depend on the
/// fine temperature of the same acquisition. [`sample`](Self::sample) reads
/// all three channels in one burst instead.
pub struct Bme280<T: Transport> {
    transport: T,
    calib: CalibrationSet,
    config: SensorConfig,
    t_fine: i32,
}

impl<T: Transport> Bme280<T> {
    /// Load the calibration blocks, then write `config` to the sensor.
    ///
    /// Fails without writing anything if either calibration read fails.
    pub fn new(mut transport: T, config: SensorConfig) -> Result<Self> {
        let calib = read_calib(&mut transport)?;
        debug!("calibration: {:?}", calib);

        write_config(&mut transport, &config)?;
        info!(
            "configured: mode={:?} osrs_t={:?} osrs_p={:?} osrs_h={:?} standby={:?} filter={:?}",
            config.mode,
            config.oversample_t,
            config.oversample_p,
            config.oversample_h,
            config.standby,
            config.filter
        );

        Ok(Bme280 {
            transport,
            calib,
            config,
            t_fine: 0,
        })
    }

    /// Temperature in degrees Celsius. Refreshes the fine temperature.
    pub fn temperature(&mut self) -> Result<f64> {
        let mut raw = [0u8; 3];
        self.transport.read(REG_TEMP, &mut raw)?;
        let adc_t = adc20(&raw);
        trace!("adc_T = {}", adc_t);
        self.t_fine = compute_fine_temperature(&self.calib, adc_t);
        Ok(temperature_from_fine(self.t_fine))
    }

    /// Pressure in hPa, or `0.0` if the calibration makes it undefined.
    pub fn pressure(&mut self) -> Result<f64> {
        self.temperature()?;
        let mut raw = [0u8; 3];
        self.transport.read(REG_PRESS, &mut raw)?;
        let adc_p = adc20(&raw);
        trace!("adc_P = {}", adc_p);
        Ok(compute_pressure(&self.calib, adc_p, self.t_fine))
    }

    /// Relative humidity in percent, clamped to `0.0..=100.0`.
    pub fn humidity(&mut self) -> Result<f64> {
        self.temperature()?;
        let mut raw = [0u8; 2];
        self.transport.read(REG_HUM, &mut raw)?;
        let adc_h = adc16(&raw);
        trace!("adc_H = {}", adc_h);
        Ok(compute_humidity(&self.calib, adc_h, self.t_fine))
    }

    /// `(temperature, pressure, humidity)`, each read through its own
    /// accessor.
    pub fn values(&mut self) -> Result<(f64, f64, f64)> {
        Ok((self.temperature()?, self.pressure()?, self.humidity()?))
    }

    /// All three readings from a single burst read of the data registers,
    /// compensated against one fine temperature.
    pub fn sample(&mut self) -> Result<Measurements> {
        let mut data = [0u8; REG_ADC_VALUE_LEN];
        self.transport.read(REG_PRESS, &mut data)?;
        let raw = RawSample::from_bytes(&data);
        trace!("raw sample: {:?}", raw);

        self.t_fine = compute_fine_temperature(&self.calib, raw.temperature);
        Ok(Measurements {
            temperature: temperature_from_fine(self.t_fine),
            pressure: compute_pressure(&self.calib, raw.pressure, self.t_fine),
            humidity: compute_humidity(&self.calib, raw.humidity, self.t_fine),
        })
    }

    pub fn calibration(&self) -> &CalibrationSet {
        &self.calib
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Give the transport back.
    pub fn release(self) -> T {
        self.transport
    }
}

fn read_calib<T: Transport>(transport: &mut T) -> Result<CalibrationSet> {
    // 0x88 - 0xA1
    let mut calib00 = [0u8; CALIB_00_LEN];
    transport.read(REG_CALIB_00, &mut calib00)?;
    // 0xE1 - 0xE7
    let mut calib26 = [0u8; CALIB_26_LEN];
    transport.read(REG_CALIB_26, &mut calib26)?;
    Ok(CalibrationSet::from_bytes(&calib00, &calib26))
}

// ctrl_hum only takes effect after the following ctrl_meas write.
fn write_config<T: Transport>(transport: &mut T, config: &SensorConfig) -> Result<()> {
    transport.write(REG_CTRL_HUM, config.ctrl_hum())?;
    transport.write(REG_CTRL_MEAS, config.ctrl_meas())?;
    transport.write(REG_CONFIG, config.config())?;
    Ok(())
}
