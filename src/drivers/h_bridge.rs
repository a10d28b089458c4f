// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-input H-bridge with a PWM enable line.
//!
//! Wiring:
//! - EN: PWM duty, sets drive strength
//! - IN_A / IN_B: complementary direction inputs
//!
//! The bridge is always left with one direction input high and the other low; the motor coasts only
//! when the duty is zero.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::Error;

/// Travel direction of the actuator.
///
/// `Close` moves the count toward the closed end stop, where the encoder reads its maximum.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Open,
    Close,
}

impl Direction {
    #[inline]
    pub fn reverse(self) -> Self {
        match self {
            Direction::Open => Direction::Close,
            Direction::Close => Direction::Open,
        }
    }
}

pub struct HBridge<EN, A, B> {
    enable: EN,
    in_a: A,
    in_b: B,
    direction: Direction,
    duty: u16,
    max_duty: u16,
    reversed: bool,
}

impl<EN, A, B> HBridge<EN, A, B>
where
    EN: SetDutyCycle,
    A: OutputPin,
    B: OutputPin,
{
    /// Take ownership of the bridge inputs and park the output at zero duty.
    ///
    /// `max_duty` is the logical full-scale value used by [`set_duty`](Self::set_duty). It is
    /// mapped onto the PWM channel's own resolution. `reversed` swaps which input pattern means
    /// [`Direction::Close`] to account for motor wiring.
    pub fn new(enable: EN, in_a: A, in_b: B, max_duty: u16, reversed: bool) -> Result<Self, Error> {
        let mut bridge = Self {
            enable,
            in_a,
            in_b,
            direction: Direction::Close,
            duty: 0,
            max_duty: max_duty.max(1),
            reversed,
        };

        bridge.enable.set_duty_cycle_fully_off().map_err(|_| Error::Pwm)?;
        bridge.in_a.set_low().map_err(|_| Error::Pin)?;
        bridge.in_b.set_high().map_err(|_| Error::Pin)?;

        Ok(bridge)
    }

    /// Zero the duty, then switch the direction inputs.
    ///
    /// The duty stays at zero afterwards; the caller re-applies it.
    pub fn set_direction(&mut self, direction: Direction) -> Result<(), Error> {
        self.set_duty(0)?;

        if (direction == Direction::Close) == self.reversed {
            self.in_a.set_high().map_err(|_| Error::Pin)?;
            self.in_b.set_low().map_err(|_| Error::Pin)?;
        } else {
            self.in_a.set_low().map_err(|_| Error::Pin)?;
            self.in_b.set_high().map_err(|_| Error::Pin)?;
        }
        self.direction = direction;

        Ok(())
    }

    /// Apply `duty` in the `0..=max_duty` range. Larger values saturate.
    pub fn set_duty(&mut self, duty: u16) -> Result<(), Error> {
        let duty = duty.min(self.max_duty);
        self.enable
            .set_duty_cycle_fraction(duty, self.max_duty)
            .map_err(|_| Error::Pwm)?;
        self.duty = duty;
        Ok(())
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Last duty written, in logical units.
    #[inline]
    pub fn duty(&self) -> u16 {
        self.duty
    }

    #[inline]
    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    /// Release the PWM channel and direction pins.
    pub fn free(self) -> (EN, A, B) {
        (self.enable, self.in_a, self.in_b)
    }
}
