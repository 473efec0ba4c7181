/// Length of the calibration block at 0x88..=0xA1.
pub const CALIB_00_LEN: usize = 26;
/// Length of the calibration block at 0xE1..=0xE7.
pub const CALIB_26_LEN: usize = 7;

/// Factory calibration coefficients, named after the datasheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationSet {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl CalibrationSet {
    /// Decode the two raw calibration blocks.
    ///
    /// `calib00` holds 0x88..=0xA1: twelve little-endian words for T1..P9,
    /// one unused byte and dig_H1. `calib26` holds 0xE1..=0xE7, where H4 and
    /// H5 are 12-bit values sharing the nibbles of 0xE5.
    pub fn from_bytes(calib00: &[u8; CALIB_00_LEN], calib26: &[u8; CALIB_26_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([calib00[i], calib00[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([calib00[i], calib00[i + 1]]);

        // 0xE4 and 0xE6 carry the signed high parts
        let h4_msb = calib26[3] as i8 as i16;
        let h5_msb = calib26[5] as i8 as i16;

        CalibrationSet {
            dig_t1: u16_at(0),
            dig_t2: i16_at(2),
            dig_t3: i16_at(4),
            dig_p1: u16_at(6),
            dig_p2: i16_at(8),
            dig_p3: i16_at(10),
            dig_p4: i16_at(12),
            dig_p5: i16_at(14),
            dig_p6: i16_at(16),
            dig_p7: i16_at(18),
            dig_p8: i16_at(20),
            dig_p9: i16_at(22),
            dig_h1: calib00[25],
            dig_h2: i16::from_le_bytes([calib26[0], calib26[1]]),
            dig_h3: calib26[2],
            dig_h4: (h4_msb << 4) | (calib26[4] & 0x0F) as i16,
            dig_h5: (h5_msb << 4) | (calib26[4] >> 4) as i16,
            dig_h6: calib26[6] as i8,
        }
    }
}

/// Raw ADC counts of one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    pub pressure: u32,
    pub temperature: u32,
    pub humidity: u32,
}

impl RawSample {
    /// Unpack a burst read of 0xF7..=0xFE.
    pub fn from_bytes(data: &[u8; 8]) -> Self {
        RawSample {
            pressure: adc20(&[data[0], data[1], data[2]]),
            temperature: adc20(&[data[3], data[4], data[5]]),
            humidity: adc16(&[data[6], data[7]]),
        }
    }
}

/// 20-bit count from msb, lsb and the top nibble of xlsb.
pub(crate) fn adc20(raw: &[u8; 3]) -> u32 {
    ((raw[0] as u32) << 12) | ((raw[1] as u32) << 4) | ((raw[2] as u32) >> 4)
}

pub(crate) fn adc16(raw: &[u8; 2]) -> u32 {
    ((raw[0] as u32) << 8) | raw[1] as u32
}

/// Compensated readings: degrees Celsius, hectopascals and %RH.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurements {
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_u16(buf: &mut [u8], at: usize, v: u16) {
        buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
    }

    fn put_i16(buf: &mut [u8], at: usize, v: i16) {
        buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
    }

    #[test]
    fn decodes_synthetic_blocks() {
        let mut a = [0u8; CALIB_00_LEN];
        put_u16(&mut a, 0, 27504);
        put_i16(&mut a, 2, 26435);
        put_i16(&mut a, 4, -1000);
        put_u16(&mut a, 6, 36477);
        put_i16(&mut a, 8, -10685);
        put_i16(&mut a, 10, 3024);
        put_i16(&mut a, 12, 2855);
        put_i16(&mut a, 14, 140);
        put_i16(&mut a, 16, -7);
        put_i16(&mut a, 18, 15500);
        put_i16(&mut a, 20, -14600);
        put_i16(&mut a, 22, 6000);
        a[24] = 0xAA;
        a[25] = 75;

        // H4 = -300 (0xED4), H5 = 50 (0x032), nibbles shared in byte 4
        let h4: i16 = -300;
        let h5: i16 = 50;
        let mut b = [0u8; CALIB_26_LEN];
        put_i16(&mut b, 0, -362);
        b[2] = 0;
        b[3] = (h4 >> 4) as u8;
        b[4] = ((h5 as u8 & 0x0F) << 4) | (h4 as u8 & 0x0F);
        b[5] = (h5 >> 4) as u8;
        b[6] = (-30i8) as u8;

        let calib = CalibrationSet::from_bytes(&a, &b);
        assert_eq!(
            calib,
            CalibrationSet {
                dig_t1: 27504,
                dig_t2: 26435,
                dig_t3: -1000,
                dig_p1: 36477,
                dig_p2: -10685,
                dig_p3: 3024,
                dig_p4: 2855,
                dig_p5: 140,
                dig_p6: -7,
                dig_p7: 15500,
                dig_p8: -14600,
                dig_p9: 6000,
                dig_h1: 75,
                dig_h2: -362,
                dig_h3: 0,
                dig_h4: -300,
                dig_h5: 50,
                dig_h6: -30,
            }
        );
    }

    #[test]
    fn decodes_device_dump_nibbles() {
        let a = [0u8; CALIB_00_LEN];
        // 0xE4=0x14, 0xE5=0x2B, 0xE6=0x03 -> H4 = 0x14B, H5 = 0x032
        let b = [0x6B, 0x01, 0x00, 0x14, 0x2B, 0x03, 0x1E];
        let calib = CalibrationSet::from_bytes(&a, &b);
        assert_eq!(calib.dig_h2, 363);
        assert_eq!(calib.dig_h4, 0x14B);
        assert_eq!(calib.dig_h5, 0x032);
        assert_eq!(calib.dig_h6, 30);
    }

    #[test]
    fn unpacks_burst_read() {
        let raw = RawSample::from_bytes(&[0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x6B, 0x4E]);
        assert_eq!(raw.pressure, 415148);
        assert_eq!(raw.temperature, 519888);
        assert_eq!(raw.humidity, 0x6B4E);
    }
}
