// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Pin-Level Peripherals
//!
//! Software peripherals built directly on `embedded-hal` digital pins.
//!
//! ## Modules
//!
//! - [`encoder`] - Interrupt-driven quadrature decoder and its shared position counter.
//! - [`soft_i2c`] - Bit-banged two-wire bus master with repeated-start support.

pub mod encoder;
pub mod soft_i2c;

pub use encoder::{PositionCounter, QuadratureDecoder};
pub use soft_i2c::{BusError, SoftI2c};
