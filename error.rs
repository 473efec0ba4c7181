use thiserror_no_std::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong between the driver and the bus.
///
/// Arithmetic edge cases in the compensation formulas are not errors: a zero
/// pressure denominator yields `0.0` and humidity is clamped to `0..=100`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I2C bus error: {0}")]
    I2c(#[from] rppal::i2c::Error),

    #[error("SPI bus error: {0}")]
    Spi(#[from] rppal::spi::Error),

    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("chip-select line could not be driven")]
    ChipSelect,
}
