// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! HD44780 character LCD behind a PCF8574 I2C port expander.
//!
//! Expander wiring (common backpack layout):
//! - P0: RS
//! - P2: EN
//! - P3: backlight
//! - P4..P7: D4..D7
//!
//! The controller runs in 4-bit mode. Each nibble goes out as one three-byte write with EN low,
//! high, low, so the falling edge latches it.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, warn};

/// Instruction set.
pub mod cmd {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const CURSOR_HOME: u8 = 0x02;

    pub const SET_ENTRY: u8 = 0x04;
    pub const ENTRY_INCREASE: u8 = 0x02;
    pub const ENTRY_SHIFT: u8 = 0x01;

    pub const SET_DISPLAY: u8 = 0x08;
    pub const DISPLAY_ON: u8 = 0x04;
    pub const CURSOR_ON: u8 = 0x02;
    pub const BLINKING_ON: u8 = 0x01;

    pub const SET_FUNCTION: u8 = 0x20;
    pub const FUNCTION_8BIT: u8 = 0x10;
    pub const FUNCTION_2LINE: u8 = 0x08;
    pub const FUNCTION_5X10: u8 = 0x04;

    pub const SOFT_RESET: u8 = 0x30;

    pub const SET_CGADR: u8 = 0x40;
    pub const SET_DDADR: u8 = 0x80;
}

/// DDRAM address of the first column of each row on a 4-line module.
const ROW_BASE: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

const RS: u8 = 1 << 0;
const EN: u8 = 1 << 2;
const BACKLIGHT: u8 = 1 << 3;

// Timings in ms
const BOOTUP_MS: u32 = 15;
const SOFT_RESET_MS: [u32; 3] = [5, 1, 1];
const SET_4BIT_MS: u32 = 5;
const CLEAR_MS: u32 = 2;
const HOME_MS: u32 = 2;

pub struct Hd44780<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    backlight: u8,
}

impl<I2C, D> Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Bind the driver to the expander at `address`. Backlight defaults to on.
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            backlight: BACKLIGHT,
        }
    }

    /// Power-on initialisation: soft reset into 4-bit mode, 2-line 5x7 font, display on with
    /// cursor hidden, left-to-right entry, cleared screen.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.delay.delay_ms(BOOTUP_MS);

        for wait in SOFT_RESET_MS {
            self.write_nibble(cmd::SOFT_RESET)?;
            self.delay.delay_ms(wait);
        }

        self.write_nibble(cmd::SET_FUNCTION)?;
        self.delay.delay_ms(SET_4BIT_MS);

        // 4x20 modules are addressed internally as 2x40
        self.command(cmd::SET_FUNCTION | cmd::FUNCTION_2LINE)?;
        self.command(cmd::SET_DISPLAY | cmd::DISPLAY_ON)?;
        self.command(cmd::SET_ENTRY | cmd::ENTRY_INCREASE)?;
        self.clear()?;

        debug!("hd44780 {:#04x}: initialised", self.address);
        Ok(())
    }

    /// Send an instruction byte (RS low).
    pub fn command(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.write_nibble(value & 0xF0)?;
        self.write_nibble(value << 4)
    }

    /// Send a data byte (RS high) at the cursor.
    pub fn put_data(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.write_nibble((value & 0xF0) | RS)?;
        self.write_nibble((value << 4) | RS)
    }

    pub fn clear(&mut self) -> Result<(), I2C::Error> {
        self.command(cmd::CLEAR_DISPLAY)?;
        self.delay.delay_ms(CLEAR_MS);
        Ok(())
    }

    pub fn home(&mut self) -> Result<(), I2C::Error> {
        self.command(cmd::CURSOR_HOME)?;
        self.delay.delay_ms(HOME_MS);
        Ok(())
    }

    /// Move the cursor to column `x` of row `y`. Rows past the fourth are ignored.
    pub fn set_cursor(&mut self, x: u8, y: u8) -> Result<(), I2C::Error> {
        match ROW_BASE.get(y as usize) {
            Some(&base) => self.command(cmd::SET_DDADR | base.wrapping_add(x)),
            None => Ok(()),
        }
    }

    /// Write the bytes of `text` starting at the cursor.
    pub fn print(&mut self, text: &str) -> Result<(), I2C::Error> {
        for byte in text.bytes() {
            self.put_data(byte)?;
        }
        Ok(())
    }

    /// Takes effect with the next transfer to the display.
    pub fn set_backlight(&mut self, on: bool) {
        self.backlight = if on { BACKLIGHT } else { 0 };
    }

    #[inline]
    pub fn backlight(&self) -> bool {
        self.backlight != 0
    }

    /// Release the bus and the delay provider.
    pub fn free(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Clock one nibble (upper four bits of `data`, plus RS) into the controller.
    fn write_nibble(&mut self, data: u8) -> Result<(), I2C::Error> {
        let idle = (data & !EN) | self.backlight;
        let frame = [idle, idle | EN, idle];

        self.i2c.write(self.address, &frame).map_err(|e| {
            warn!("hd44780 {:#04x}: write failed: {:?}", self.address, e);
            e
        })
    }
}

impl<I2C, D> fmt::Write for Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s).map_err(|_| fmt::Error)
    }
}
