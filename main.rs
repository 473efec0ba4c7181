use std::fmt;
use std::process;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::{error, info};
use rppal::spi::Bus;

use rpenvnode::{
    Bme280, Filter, I2cTransport, Measurements, Mode, Oversampling, SensorConfig, SpiTransport,
    Standby, Transport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BusKind {
    I2c,
    Spi,
}

/// Read temperature, pressure and humidity from a BME280.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    #[arg(long, value_enum, default_value = "i2c")]
    bus: BusKind,

    /// I2C slave address, 0x76 or 0x77.
    #[arg(long, default_value = "0x76", value_parser = parse_address)]
    address: u16,

    /// I2C bus number (/dev/i2c-N).
    #[arg(long, default_value_t = 1)]
    i2c_bus: u8,

    /// SPI bus number (/dev/spidevN.0).
    #[arg(long, default_value = "0", value_parser = parse_spi_bus)]
    spi_bus: Bus,

    /// BCM GPIO used as chip-select.
    #[arg(long, default_value_t = 8)]
    cs_pin: u8,

    #[arg(long, default_value_t = 1_000_000)]
    spi_clock: u32,

    /// sleep, forced or normal.
    #[arg(long, default_value = "normal", value_parser = parse_setting::<Mode>)]
    mode: Mode,

    #[arg(long, default_value = "x2", value_parser = parse_setting::<Oversampling>)]
    oversample_t: Oversampling,

    #[arg(long, default_value = "x16", value_parser = parse_setting::<Oversampling>)]
    oversample_p: Oversampling,

    #[arg(long, default_value = "x1", value_parser = parse_setting::<Oversampling>)]
    oversample_h: Oversampling,

    /// Standby time in ms: 0.5, 62.5, 125, 250, 500, 1000, 10 or 20.
    #[arg(long, default_value = "250", value_parser = parse_setting::<Standby>)]
    standby: Standby,

    /// IIR filter: off, x2, x4, x8 or x16.
    #[arg(long, default_value = "off", value_parser = parse_setting::<Filter>)]
    filter: Filter,

    /// Number of readings, 0 to run until interrupted.
    #[arg(long, default_value_t = 1)]
    count: u32,

    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Take all three readings from one burst read.
    #[arg(long)]
    consistent: bool,
}

impl Args {
    fn sensor_config(&self) -> SensorConfig {
        SensorConfig::default()
            .with_mode(self.mode)
            .with_oversampling(self.oversample_t, self.oversample_p, self.oversample_h)
            .with_standby(self.standby)
            .with_filter(self.filter)
    }
}

fn parse_address(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address `{}`: {}", s, e))
}

fn parse_setting<T>(s: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    s.parse().map_err(|e: T::Err| e.to_string())
}

fn parse_spi_bus(s: &str) -> Result<Bus, String> {
    match s {
        "0" => Ok(Bus::Spi0),
        "1" => Ok(Bus::Spi1),
        "2" => Ok(Bus::Spi2),
        _ => Err(format!("unsupported SPI bus `{}`", s)),
    }
}

fn run<T: Transport>(transport: T, args: &Args) -> rpenvnode::Result<()> {
    let mut bme280 = Bme280::new(transport, args.sensor_config())?;

    let mut taken = 0;
    loop {
        let m = if args.consistent {
            bme280.sample()?
        } else {
            let (temperature, pressure, humidity) = bme280.values()?;
            Measurements {
                temperature,
                pressure,
                humidity,
            }
        };
        println!("Temperature: {:.2} C", m.temperature);
        println!("Humidity: {:.2} %", m.humidity);
        println!("Pressure: {:.2} hPa", m.pressure);

        taken += 1;
        if args.count != 0 && taken >= args.count {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(args.interval_ms));
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let result = match args.bus {
        BusKind::I2c => {
            info!("BME280 on /dev/i2c-{} at {:#04x}", args.i2c_bus, args.address);
            I2cTransport::new(args.i2c_bus, args.address).and_then(|t| run(t, &args))
        }
        BusKind::Spi => {
            info!("BME280 on {:?} with CS on GPIO {}", args.spi_bus, args.cs_pin);
            SpiTransport::new(args.spi_bus, args.spi_clock, args.cs_pin).and_then(|t| run(t, &args))
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
