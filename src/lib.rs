// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # RBBA Actuator Firmware
//!
//! This crate contains the hardware-independent firmware core of the RBBA resuscitator: actuator
//! position control, quadrature decoding, and a software I2C bus for the onboard sensor and
//! display. All hardware access goes through `embedded-hal` 1.0 traits, so the same code runs on
//! the target and against simulated pins on the host.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | Pin-level peripherals: quadrature decoder, bit-banged I2C |
//! | [`drivers`] | Device-level drivers (H-bridge, BMP280, HD44780) |
//! | [`control`]   | Motion control (cascaded servo, homing, calibration) |
//! | [`error`] | Crate-wide error type |
//!
//! ## Getting Started
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//!
//! © 2025–2026 Christopher Liu

#![no_std]

#[cfg(test)]
extern crate std;

pub mod control;
pub mod drivers;
pub mod error;
pub mod hw;

pub use error::Error;
