use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::digital::v2::OutputPin as CsPin;
use log::trace;
use rppal::gpio::{Gpio, OutputPin};
use rppal::i2c::I2c;
use rppal::spi::{Bus, Mode as SpiMode, SlaveSelect, Spi};

use crate::error::{Error, Result};

// BME280 I2C default slave address.
pub const ADDR_BME280: u16 = 0x76;
// Alternate address with SDO pulled high.
pub const ADDR_BME280_ALT: u16 = 0x77;

/// Register-level access to the sensor, independent of the physical bus.
pub trait Transport {
    /// Fill `buffer` with consecutive registers starting at `register`.
    fn read(&mut self, register: u8, buffer: &mut [u8]) -> Result<()>;

    /// Write one byte to `register`.
    fn write(&mut self, register: u8, value: u8) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read(&mut self, register: u8, buffer: &mut [u8]) -> Result<()> {
        (**self).read(register, buffer)
    }

    fn write(&mut self, register: u8, value: u8) -> Result<()> {
        (**self).write(register, value)
    }
}

/// BME280 on an I2C bus.
pub struct I2cTransport {
    i2c: I2c,
}

impl I2cTransport {
    /// Open `/dev/i2c-<bus>` and address the sensor at `address`.
    pub fn new(bus: u8, address: u16) -> Result<Self> {
        Self::from_i2c(I2c::with_bus(bus)?, address)
    }

    pub fn from_i2c(mut i2c: I2c, address: u16) -> Result<Self> {
        i2c.set_slave_address(address)?;
        Ok(I2cTransport { i2c })
    }

    pub fn release(self) -> I2c {
        self.i2c
    }
}

impl Transport for I2cTransport {
    fn read(&mut self, register: u8, buffer: &mut [u8]) -> Result<()> {
        self.i2c.write_read(&[register], buffer)?;
        Ok(())
    }

    fn write(&mut self, register: u8, value: u8) -> Result<()> {
        self.i2c.smbus_write_byte(register, value)?;
        Ok(())
    }
}

/// Holds chip-select low until dropped.
struct Selected<'a, C: CsPin> {
    cs: &'a mut C,
}

impl<'a, C: CsPin> Selected<'a, C> {
    fn new(cs: &'a mut C) -> Result<Self> {
        cs.set_low().map_err(|_| Error::ChipSelect)?;
        Ok(Selected { cs })
    }
}

impl<'a, C: CsPin> Drop for Selected<'a, C> {
    fn drop(&mut self) {
        // nothing left to report to once the transaction has returned
        let _ = self.cs.set_high();
    }
}

/// BME280 on an SPI bus with a GPIO chip-select line.
///
/// Bit 7 of the control byte selects the direction: set for reads, clear
/// for writes. Chip-select is released after every transaction, including
/// failed ones.
pub struct SpiTransport<S = Spi, C = OutputPin> {
    spi: S,
    cs: C,
}

impl SpiTransport<Spi, OutputPin> {
    /// Open `bus` in SPI mode 0 and drive BCM GPIO `cs_pin` as chip-select.
    pub fn new(bus: Bus, clock_speed: u32, cs_pin: u8) -> Result<Self> {
        let spi = Spi::new(bus, SlaveSelect::Ss0, clock_speed, SpiMode::Mode0)?;
        let cs = Gpio::new()?.get(cs_pin)?.into_output();
        SpiTransport::from_parts(spi, cs)
    }
}

impl<S, C: CsPin> SpiTransport<S, C> {
    /// Wrap an SPI bus and a chip-select pin, leaving the device deselected.
    pub fn from_parts(spi: S, mut cs: C) -> Result<Self> {
        cs.set_high().map_err(|_| Error::ChipSelect)?;
        Ok(SpiTransport { spi, cs })
    }

    pub fn release(self) -> (S, C) {
        (self.spi, self.cs)
    }
}

impl<S, C, E> Transport for SpiTransport<S, C>
where
    S: Write<u8, Error = E> + Transfer<u8, Error = E>,
    C: CsPin,
    Error: From<E>,
{
    fn read(&mut self, register: u8, buffer: &mut [u8]) -> Result<()> {
        let _selected = Selected::new(&mut self.cs)?;
        self.spi.write(&[register | 0x80])?;
        // clock out zeros while the sensor shifts the registers in
        for b in buffer.iter_mut() {
            *b = 0;
        }
        let data = self.spi.transfer(buffer)?;
        trace!("spi read {:#04x}: {:02x?}", register, data);
        Ok(())
    }

    fn write(&mut self, register: u8, value: u8) -> Result<()> {
        let _selected = Selected::new(&mut self.cs)?;
        self.spi.write(&[register & 0x7F, value])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::pin::{Mock as PinMock, State, Transaction as PinTransaction};
    use embedded_hal_mock::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use embedded_hal_mock::MockError;
    use std::io;

    impl From<MockError> for Error {
        fn from(e: MockError) -> Self {
            let message = format!("{:?}", e);
            Error::Spi(rppal::spi::Error::Io(io::Error::new(io::ErrorKind::Other, message)))
        }
    }

    /// Bus that fails every transfer.
    struct FaultySpi;

    #[derive(Debug)]
    struct BusFault;

    impl From<BusFault> for Error {
        fn from(_: BusFault) -> Self {
            Error::Spi(rppal::spi::Error::Io(io::Error::new(io::ErrorKind::Other, "bus fault")))
        }
    }

    impl Write<u8> for FaultySpi {
        type Error = BusFault;

        fn write(&mut self, _: &[u8]) -> core::result::Result<(), BusFault> {
            Err(BusFault)
        }
    }

    impl Transfer<u8> for FaultySpi {
        type Error = BusFault;

        fn transfer<'w>(&mut self, _: &'w mut [u8]) -> core::result::Result<&'w [u8], BusFault> {
            Err(BusFault)
        }
    }

    // deselect at construction, then one select/deselect pair per transaction
    fn cs_expectations(transactions: usize) -> Vec<PinTransaction> {
        let mut expectations = vec![PinTransaction::set(State::High)];
        for _ in 0..transactions {
            expectations.push(PinTransaction::set(State::Low));
            expectations.push(PinTransaction::set(State::High));
        }
        expectations
    }

    #[test]
    pub fn read_sets_direction_bit() {
        let expectations = [
            SpiTransaction::write(vec![0xFA]),
            SpiTransaction::transfer(vec![0x00, 0x00, 0x00], vec![0x7E, 0xED, 0x00]),
            SpiTransaction::write(vec![0xD0]),
            SpiTransaction::transfer(vec![0x00], vec![0x60]),
        ];
        let spi = SpiMock::new(&expectations);
        let cs = PinMock::new(&cs_expectations(2));

        let mut transport = SpiTransport::from_parts(spi, cs).unwrap();
        let mut buf = [0u8; 3];
        transport.read(0xFA, &mut buf).unwrap();
        assert_eq!(buf, [0x7E, 0xED, 0x00]);
        // chip id register 0xD0 given in its 7-bit form
        let mut id = [0xFFu8; 1];
        transport.read(0x50, &mut id).unwrap();
        assert_eq!(id, [0x60]);

        let (mut spi, mut cs) = transport.release();
        spi.done();
        cs.done();
    }

    #[test]
    pub fn write_clears_direction_bit() {
        let expectations = [SpiTransaction::write(vec![0x74, 0x57])];
        let spi = SpiMock::new(&expectations);
        let cs = PinMock::new(&cs_expectations(1));

        let mut transport = SpiTransport::from_parts(spi, cs).unwrap();
        transport.write(0xF4, 0x57).unwrap();

        let (mut spi, mut cs) = transport.release();
        spi.done();
        cs.done();
    }

    #[test]
    pub fn chip_select_released_on_error() {
        let cs = PinMock::new(&cs_expectations(2));

        let mut transport = SpiTransport::from_parts(FaultySpi, cs).unwrap();
        let mut buf = [0u8; 3];
        assert!(matches!(transport.read(0x88, &mut buf), Err(Error::Spi(_))));
        assert!(matches!(transport.write(0xF2, 0x01), Err(Error::Spi(_))));

        let (_, mut cs) = transport.release();
        cs.done();
    }
}
