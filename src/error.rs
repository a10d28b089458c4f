// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Crate-wide error type for injected GPIO and PWM capabilities.
//!
//! Control logic never rejects a command; safety limits are enforced by clamping the output. The
//! only failures reported here come from the hardware abstraction itself.

use thiserror_no_std::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A digital input or output pin reported a failure.
    #[error("GPIO pin access failed")]
    Pin,

    /// The duty-cycle output reported a failure.
    #[error("PWM duty update failed")]
    Pwm,
}
