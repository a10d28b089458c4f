// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-driven quadrature encoder decoding.
//!
//! The count lives in a [`PositionCounter`], which is shared between the pin-change interrupt and
//! the control loop. Every access outside the edge handler runs inside a critical section, so a
//! 16-bit value is never observed half-written on targets with a narrower load/store width. Edges
//! arriving during the critical section stay pending and are applied once it ends.
//!
//! Typical wiring:
//!
//! ```ignore
//! static POSITION: PositionCounter = PositionCounter::new();
//!
//! // in the pin-change interrupt for channel A
//! decoder.advance().ok();
//!
//! // in the control loop
//! let ticks = POSITION.get_value();
//! ```

use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::digital::InputPin;

use crate::Error;

/// Signed encoder count shared between interrupt and thread context.
pub struct PositionCounter {
    value: Mutex<Cell<i16>>,
}

impl PositionCounter {
    pub const fn new() -> Self {
        Self {
            value: Mutex::new(Cell::new(0)),
        }
    }

    /// Read the count atomically with respect to the edge handler.
    #[inline]
    pub fn get_value(&self) -> i16 {
        critical_section::with(|cs| self.value.borrow(cs).get())
    }

    /// Overwrite the count atomically with respect to the edge handler.
    #[inline]
    pub fn set_value(&self, value: i16) {
        critical_section::with(|cs| self.value.borrow(cs).set(value));
    }

    #[inline]
    pub fn reset(&self) {
        self.set_value(0);
    }

    fn step(&self, delta: i16) {
        critical_section::with(|cs| {
            let value = self.value.borrow(cs);
            value.set(value.get().wrapping_add(delta));
        });
    }
}

impl Default for PositionCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Quadrature decoder bound to its two channel pins and a shared counter.
///
/// Counts one step per transition of channel A. The step is `+1` when A and B read the same level
/// after the transition and `-1` when they differ.
pub struct QuadratureDecoder<'a, A, B> {
    counter: &'a PositionCounter,
    pin_a: A,
    pin_b: B,
    prev_a: bool,
}

impl<'a, A, B> QuadratureDecoder<'a, A, B>
where
    A: InputPin,
    B: InputPin,
{
    /// Bind the decoder to its pins and zero the counter.
    ///
    /// The pins should already be configured as pulled-up inputs.
    pub fn new(counter: &'a PositionCounter, mut pin_a: A, pin_b: B) -> Result<Self, Error> {
        let prev_a = pin_a.is_high().map_err(|_| Error::Pin)?;
        counter.reset();

        Ok(Self {
            counter,
            pin_a,
            pin_b,
            prev_a,
        })
    }

    /// Sample both channels and apply the resulting step. Call from the pin-change interrupt.
    pub fn advance(&mut self) -> Result<(), Error> {
        let a = self.pin_a.is_high().map_err(|_| Error::Pin)?;
        let b = self.pin_b.is_high().map_err(|_| Error::Pin)?;

        if a != self.prev_a {
            let delta = if a == b { 1 } else { -1 };
            self.counter.step(delta);
        }
        self.prev_a = a;

        Ok(())
    }

    #[inline]
    pub fn counter(&self) -> &'a PositionCounter {
        self.counter
    }

    /// Consume the decoder and return the channel pins.
    pub fn free(self) -> (A, B) {
        (self.pin_a, self.pin_b)
    }
}
