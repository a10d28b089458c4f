// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! This module provides closed-loop actuator control on top of the `hw/` and `drivers/` layers.
//!
//! ## Modules
//!
//! - [`config`] - Tuning constants for the motion controller.
//! - [`homing`] - Step-wise homing and calibration sequencing.
//! - [`motion`] - Cascaded position / speed controller for the actuator.

pub mod config;
pub mod homing;
pub mod motion;

pub use config::MotionConfig;
pub use homing::{Homing, HomingKind, HomingPhase};
pub use motion::{MotionController, MotionMode};
