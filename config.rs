use std::str::FromStr;

use thiserror_no_std::Error;

/// Operating mode, bits 1..0 of `ctrl_meas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sleep = 0b00,
    Forced = 0b01,
    Normal = 0b11,
}

/// Oversampling factor for one measurement channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oversampling {
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    X16 = 5,
}

/// Inactive duration between measurements in normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standby {
    Ms0_5 = 0,
    Ms62_5 = 1,
    Ms125 = 2,
    Ms250 = 3,
    Ms500 = 4,
    Ms1000 = 5,
    Ms10 = 6,
    Ms20 = 7,
}

/// IIR filter coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Off = 0,
    X2 = 1,
    X4 = 2,
    X8 = 3,
    X16 = 4,
}

impl Mode {
    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl Oversampling {
    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl Standby {
    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl Filter {
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Measurement configuration written to the sensor at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorConfig {
    pub mode: Mode,
    pub oversample_t: Oversampling,
    pub oversample_p: Oversampling,
    pub oversample_h: Oversampling,
    pub standby: Standby,
    pub filter: Filter,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            mode: Mode::Normal,
            oversample_t: Oversampling::X2,
            oversample_p: Oversampling::X16,
            oversample_h: Oversampling::X1,
            standby: Standby::Ms250,
            filter: Filter::Off,
        }
    }
}

impl SensorConfig {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_oversampling(
        mut self,
        temperature: Oversampling,
        pressure: Oversampling,
        humidity: Oversampling,
    ) -> Self {
        self.oversample_t = temperature;
        self.oversample_p = pressure;
        self.oversample_h = humidity;
        self
    }

    pub fn with_standby(mut self, standby: Standby) -> Self {
        self.standby = standby;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Value of the `ctrl_hum` register (0xF2).
    pub fn ctrl_hum(&self) -> u8 {
        self.oversample_h.bits()
    }

    /// Value of the `ctrl_meas` register (0xF4).
    pub fn ctrl_meas(&self) -> u8 {
        (self.oversample_t.bits() << 5) | (self.oversample_p.bits() << 2) | self.mode.bits()
    }

    /// Value of the `config` register (0xF5). 3-wire SPI stays disabled.
    pub fn config(&self) -> u8 {
        (self.standby.bits() << 5) | (self.filter.bits() << 2)
    }
}

/// Rejected value for one of the setting enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} `{value}`")]
pub struct ParseSettingError {
    kind: &'static str,
    value: String,
}

fn invalid(kind: &'static str, value: &str) -> ParseSettingError {
    ParseSettingError {
        kind,
        value: value.to_owned(),
    }
}

impl FromStr for Mode {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sleep" => Ok(Mode::Sleep),
            "forced" | "force" => Ok(Mode::Forced),
            "normal" => Ok(Mode::Normal),
            _ => Err(invalid("mode", s)),
        }
    }
}

impl FromStr for Oversampling {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x1" | "1" => Ok(Oversampling::X1),
            "x2" | "2" => Ok(Oversampling::X2),
            "x4" | "4" => Ok(Oversampling::X4),
            "x8" | "8" => Ok(Oversampling::X8),
            "x16" | "16" => Ok(Oversampling::X16),
            _ => Err(invalid("oversampling", s)),
        }
    }
}

impl FromStr for Standby {
    type Err = ParseSettingError;

    // Milliseconds, e.g. "0.5", "62.5", "250".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_suffix("ms").unwrap_or(s) {
            "0.5" => Ok(Standby::Ms0_5),
            "62.5" => Ok(Standby::Ms62_5),
            "125" => Ok(Standby::Ms125),
            "250" => Ok(Standby::Ms250),
            "500" => Ok(Standby::Ms500),
            "1000" => Ok(Standby::Ms1000),
            "10" => Ok(Standby::Ms10),
            "20" => Ok(Standby::Ms20),
            _ => Err(invalid("standby", s)),
        }
    }
}

impl FromStr for Filter {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" => Ok(Filter::Off),
            "x2" | "2" => Ok(Filter::X2),
            "x4" | "4" => Ok(Filter::X4),
            "x8" | "8" => Ok(Filter::X8),
            "x16" | "16" => Ok(Filter::X16),
            _ => Err(invalid("filter", s)),
        }
    }
}
