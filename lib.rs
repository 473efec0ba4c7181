//! Driver for the Bosch BME280 combined temperature, pressure and humidity
//! sensor on a Raspberry Pi.
//!
//! The sensor is reached over either I2C ([`I2cTransport`]) or SPI with a
//! GPIO chip-select line ([`SpiTransport`]). [`Bme280`] loads the factory
//! calibration once, writes the measurement configuration and turns raw ADC
//! counts into degrees Celsius, hectopascals and percent relative humidity.
//!
//! ```no_run
//! use rpenvnode::{Bme280, I2cTransport, SensorConfig, ADDR_BME280};
//!
//! let transport = I2cTransport::new(1, ADDR_BME280)?;
//! let mut bme280 = Bme280::new(transport, SensorConfig::default())?;
//! let (t, p, h) = bme280.values()?;
//! println!("{:.2} C {:.2} hPa {:.2} %", t, p, h);
//! # Ok::<(), rpenvnode::Error>(())
//! ```

mod bme280;
mod compensation;
mod config;
mod error;
mod structs;
mod transport;

pub use crate::bme280::*;
pub use crate::compensation::{
    compute_fine_temperature, compute_humidity, compute_pressure, compute_temperature,
    temperature_from_fine,
};
pub use crate::config::{Filter, Mode, Oversampling, ParseSettingError, SensorConfig, Standby};
pub use crate::error::{Error, Result};
pub use crate::structs::{CalibrationSet, Measurements, RawSample};
pub use crate::transport::*;
