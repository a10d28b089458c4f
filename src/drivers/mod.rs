// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! control logic.
//!
//! ## Existing drivers
//!
//! - [`h_bridge`] – PWM-enabled two-input H-bridge driving the actuator motor
//! - [`bmp280`] – Bosch BMP280 pressure and temperature sensor over I2C
//! - [`hd44780`] – HD44780 character LCD behind a PCF8574 I2C expander

pub mod h_bridge;

pub mod bmp280;
pub mod hd44780;

pub use bmp280::Bmp280;
pub use h_bridge::{Direction, HBridge};
pub use hd44780::Hd44780;
