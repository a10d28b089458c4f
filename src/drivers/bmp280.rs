// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bosch BMP280 pressure and temperature sensor over I2C.
//!
//! Register access uses the write-then-read pattern: the register pointer is written, followed by
//! a repeated START and a burst read. Compensation uses the 32-bit integer formulas from the
//! datasheet, so results are exact integers:
//! - temperature in 0.01 °C (`2508` = 25.08 °C)
//! - pressure in Pa
//!
//! [`Bmp280::load_calibration`] must succeed once before measurements are meaningful.

use embedded_hal::i2c::I2c;
use log::{debug, warn};

// Register addresses
pub mod reg {
    pub const CALIB: u8 = 0x88;
    pub const ID: u8 = 0xD0;
    pub const STATUS: u8 = 0xF3;
    pub const CTRL_MEAS: u8 = 0xF4;
    pub const CONFIG: u8 = 0xF5;
    pub const PRESS_MSB: u8 = 0xF7;
}

/// SDO tied low.
pub const ADDRESS_PRIMARY: u8 = 0x76;
/// SDO tied high.
pub const ADDRESS_SECONDARY: u8 = 0x77;

const CALIB_LEN: usize = 24;

/// Factory trim values read from 0x88..0x9F.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,
}

impl Calibration {
    /// Decode the little-endian register dump.
    pub fn from_bytes(raw: &[u8; CALIB_LEN]) -> Self {
        let u = |i: usize| u16::from_le_bytes([raw[i], raw[i + 1]]);
        let s = |i: usize| i16::from_le_bytes([raw[i], raw[i + 1]]);

        Self {
            t1: u(0),
            t2: s(2),
            t3: s(4),
            p1: u(6),
            p2: s(8),
            p3: s(10),
            p4: s(12),
            p5: s(14),
            p6: s(16),
            p7: s(18),
            p8: s(20),
            p9: s(22),
        }
    }

    /// Returns `(temperature_centi_c, t_fine)`.
    pub fn compensate_temperature(&self, adc_t: i32) -> (i32, i32) {
        let t1 = self.t1 as i32;
        let t2 = self.t2 as i32;
        let t3 = self.t3 as i32;

        let var1 = (((adc_t >> 3) - (t1 << 1)) * t2) >> 11;
        let d = (adc_t >> 4) - t1;
        let var2 = (((d * d) >> 12) * t3) >> 14;
        let t_fine = var1 + var2;

        ((t_fine * 5 + 128) >> 8, t_fine)
    }

    /// Pressure in Pa. `t_fine` comes from [`compensate_temperature`](Self::compensate_temperature)
    /// on the same sample.
    pub fn compensate_pressure(&self, adc_p: i32, t_fine: i32) -> u32 {
        let mut var1 = (t_fine >> 1) - 64000;
        let mut var2 = (((var1 >> 2) * (var1 >> 2)) >> 11) * self.p6 as i32;
        var2 += (var1 * self.p5 as i32) << 1;
        var2 = (var2 >> 2) + ((self.p4 as i32) << 16);
        var1 = (((self.p3 as i32 * (((var1 >> 2) * (var1 >> 2)) >> 13)) >> 3)
            + ((self.p2 as i32 * var1) >> 1))
            >> 18;
        var1 = ((32768 + var1) * self.p1 as i32) >> 15;

        // Uncalibrated or corrupt trim data
        if var1 == 0 {
            return 0;
        }

        let mut p = ((1_048_576 - adc_p) as u32)
            .wrapping_sub((var2 >> 12) as u32)
            .wrapping_mul(3125);
        if p < 0x8000_0000 {
            p = (p << 1) / var1 as u32;
        } else {
            p = (p / var1 as u32) * 2;
        }

        let var1 = (self.p9 as i32 * (((p >> 3).wrapping_mul(p >> 3)) >> 13) as i32) >> 12;
        let var2 = ((p >> 2) as i32 * self.p8 as i32) >> 13;

        (p as i32 + ((var1 + var2 + self.p7 as i32) >> 4)) as u32
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    Skipped,
    X1,
    X2,
    X4,
    X8,
    X16,
}

impl Oversampling {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Oversampling::Skipped,
            1 => Oversampling::X1,
            2 => Oversampling::X2,
            3 => Oversampling::X4,
            4 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }

    fn bits(self) -> u8 {
        match self {
            Oversampling::Skipped => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 3,
            Oversampling::X8 => 4,
            Oversampling::X16 => 5,
        }
    }
}

/// IIR filter coefficient.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Filter {
    Off,
    C2,
    C4,
    C8,
    C16,
}

impl Filter {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Filter::Off,
            1 => Filter::C2,
            2 => Filter::C4,
            3 => Filter::C8,
            _ => Filter::C16,
        }
    }

    fn bits(self) -> u8 {
        match self {
            Filter::Off => 0,
            Filter::C2 => 1,
            Filter::C4 => 2,
            Filter::C8 => 3,
            Filter::C16 => 4,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Sleep,
    Forced,
    Normal,
}

impl Mode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Mode::Sleep,
            3 => Mode::Normal,
            _ => Mode::Forced,
        }
    }

    fn bits(self) -> u8 {
        match self {
            Mode::Sleep => 0,
            Mode::Forced => 1,
            Mode::Normal => 3,
        }
    }
}

/// Inactive time between measurements in normal mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StandbyTime {
    Ms0_5,
    Ms62_5,
    Ms125,
    Ms250,
    Ms500,
    Ms1000,
    Ms2000,
    Ms4000,
}

impl StandbyTime {
    const ALL: [StandbyTime; 8] = [
        StandbyTime::Ms0_5,
        StandbyTime::Ms62_5,
        StandbyTime::Ms125,
        StandbyTime::Ms250,
        StandbyTime::Ms500,
        StandbyTime::Ms1000,
        StandbyTime::Ms2000,
        StandbyTime::Ms4000,
    ];

    fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0x07) as usize]
    }

    fn bits(self) -> u8 {
        self as u8
    }
}

/// One compensated sample plus the raw 20-bit ADC values it came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// 0.01 °C
    pub temperature: i32,
    /// Pa
    pub pressure: u32,
    pub adc_temperature: i32,
    pub adc_pressure: i32,
}

pub struct Bmp280<I2C> {
    i2c: I2C,
    address: u8,
    calibration: Calibration,
}

impl<I2C: I2c> Bmp280<I2C> {
    /// Bind the driver to a device address. No bus traffic happens until
    /// [`load_calibration`](Self::load_calibration).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            calibration: Calibration::default(),
        }
    }

    /// Read the factory trim values into the driver.
    pub fn load_calibration(&mut self) -> Result<(), I2C::Error> {
        let mut raw = [0u8; CALIB_LEN];
        self.read_registers(reg::CALIB, &mut raw)?;
        self.calibration = Calibration::from_bytes(&raw);
        debug!("bmp280 {:#04x}: calibration loaded {:?}", self.address, self.calibration);
        Ok(())
    }

    #[inline]
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Chip identifier, 0x58 for a BMP280.
    pub fn chip_id(&mut self) -> Result<u8, I2C::Error> {
        self.read_register(reg::ID)
    }

    pub fn temperature_oversampling(&mut self) -> Result<Oversampling, I2C::Error> {
        Ok(Oversampling::from_bits(self.read_register(reg::CTRL_MEAS)? >> 5))
    }

    pub fn pressure_oversampling(&mut self) -> Result<Oversampling, I2C::Error> {
        Ok(Oversampling::from_bits(self.read_register(reg::CTRL_MEAS)? >> 2))
    }

    pub fn mode(&mut self) -> Result<Mode, I2C::Error> {
        Ok(Mode::from_bits(self.read_register(reg::CTRL_MEAS)?))
    }

    pub fn filter(&mut self) -> Result<Filter, I2C::Error> {
        Ok(Filter::from_bits(self.read_register(reg::CONFIG)? >> 2))
    }

    pub fn standby_time(&mut self) -> Result<StandbyTime, I2C::Error> {
        Ok(StandbyTime::from_bits(self.read_register(reg::CONFIG)? >> 5))
    }

    /// A conversion is running.
    pub fn is_measuring(&mut self) -> Result<bool, I2C::Error> {
        Ok(self.read_register(reg::STATUS)? & (1 << 3) != 0)
    }

    /// NVM data is being copied to the image registers.
    pub fn is_updating(&mut self) -> Result<bool, I2C::Error> {
        Ok(self.read_register(reg::STATUS)? & 1 != 0)
    }

    pub fn set_temperature_oversampling(&mut self, os: Oversampling) -> Result<(), I2C::Error> {
        self.modify_register(reg::CTRL_MEAS, 0x07 << 5, os.bits() << 5)
    }

    pub fn set_pressure_oversampling(&mut self, os: Oversampling) -> Result<(), I2C::Error> {
        self.modify_register(reg::CTRL_MEAS, 0x07 << 2, os.bits() << 2)
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), I2C::Error> {
        self.modify_register(reg::CTRL_MEAS, 0x03, mode.bits())
    }

    pub fn set_filter(&mut self, filter: Filter) -> Result<(), I2C::Error> {
        self.modify_register(reg::CONFIG, 0x07 << 2, filter.bits() << 2)
    }

    pub fn set_standby_time(&mut self, standby: StandbyTime) -> Result<(), I2C::Error> {
        self.modify_register(reg::CONFIG, 0x07 << 5, standby.bits() << 5)
    }

    /// Burst-read pressure and temperature and compensate both.
    pub fn read_sensor_data(&mut self) -> Result<Measurement, I2C::Error> {
        let mut raw = [0u8; 6];
        self.read_registers(reg::PRESS_MSB, &mut raw)?;

        let adc_pressure = ((raw[0] as i32) << 12) | ((raw[1] as i32) << 4) | (raw[2] as i32 >> 4);
        let adc_temperature = ((raw[3] as i32) << 12) | ((raw[4] as i32) << 4) | (raw[5] as i32 >> 4);

        let (temperature, t_fine) = self.calibration.compensate_temperature(adc_temperature);
        let pressure = self.calibration.compensate_pressure(adc_pressure, t_fine);

        Ok(Measurement {
            temperature,
            pressure,
            adc_temperature,
            adc_pressure,
        })
    }

    /// Release the bus.
    pub fn free(self) -> I2C {
        self.i2c
    }

    // ---- Register access ----

    fn read_register(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut value = [0u8];
        self.read_registers(register, &mut value)?;
        Ok(value[0])
    }

    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c.write_read(self.address, &[register], buf).map_err(|e| {
            warn!("bmp280 {:#04x}: read of {:#04x} failed: {:?}", self.address, register, e);
            e
        })
    }

    /// Read-modify-write of the bits in `mask`.
    fn modify_register(&mut self, register: u8, mask: u8, bits: u8) -> Result<(), I2C::Error> {
        let current = self.read_register(register)?;
        let value = (current & !mask) | (bits & mask);
        self.i2c.write(self.address, &[register, value]).map_err(|e| {
            warn!("bmp280 {:#04x}: write of {:#04x} failed: {:?}", self.address, register, e);
            e
        })
    }
}
