// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tuning constants for the motion controller.
//!
//! Defaults are the values the actuator was tuned with at a 255-step PWM resolution. All gains
//! are integers; the speed loop divides by `speed_gain_divisor` and keeps its accumulator scaled by
//! `1 << duty_shift`.

/// Controller configuration, fixed at construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Period between `update()` calls (µs)
    pub update_interval_us: u32,

    /// Full-scale duty
    pub max_duty: u16,
    /// Fixed-point scale of the duty accumulator, as a shift
    pub duty_shift: u8,
    /// Duties below this cannot turn the motor and are written as zero
    pub min_duty: u16,
    /// Duty used while seeking end stops
    pub home_duty: u16,

    /// Speed-loop gain, applied as `error * speed_gain / speed_gain_divisor`
    pub speed_gain: i32,
    pub speed_gain_divisor: i32,

    /// Position-loop gain (ticks/s per tick of error)
    pub position_gain: i32,
    /// Position errors smaller than this are treated as zero
    pub position_epsilon: i32,

    /// Encoder counts down when travelling toward the closed end stop
    pub encoder_reversed: bool,
    /// Motor wiring swaps the H-bridge inputs
    pub direction_reversed: bool,

    /// Time to keep driving after leaving the opened end stop (µs)
    pub settle_time_us: u32,
}

impl MotionConfig {
    pub const fn new(update_interval_us: u32) -> Self {
        Self {
            update_interval_us: if update_interval_us == 0 { 1 } else { update_interval_us },
            max_duty: 255,
            duty_shift: 5,
            min_duty: 16,
            home_duty: 100,
            speed_gain: 6,
            speed_gain_divisor: 4,
            position_gain: 4,
            position_epsilon: 5,
            encoder_reversed: false,
            direction_reversed: false,
            settle_time_us: 200_000,
        }
    }

    pub fn with_max_duty(mut self, max_duty: u16) -> Self {
        self.max_duty = max_duty;
        self
    }

    pub fn with_duty_shift(mut self, duty_shift: u8) -> Self {
        self.duty_shift = duty_shift;
        self
    }

    pub fn with_min_duty(mut self, min_duty: u16) -> Self {
        self.min_duty = min_duty;
        self
    }

    pub fn with_home_duty(mut self, home_duty: u16) -> Self {
        self.home_duty = home_duty;
        self
    }

    /// Set the speed-loop gain as the ratio `gain / divisor`. A zero divisor is treated as 1.
    pub fn with_speed_gain(mut self, gain: i32, divisor: i32) -> Self {
        self.speed_gain = gain;
        self.speed_gain_divisor = if divisor == 0 { 1 } else { divisor };
        self
    }

    pub fn with_position_gain(mut self, gain: i32) -> Self {
        self.position_gain = gain;
        self
    }

    pub fn with_position_epsilon(mut self, epsilon: i32) -> Self {
        self.position_epsilon = epsilon;
        self
    }

    pub fn with_encoder_reversed(mut self, reversed: bool) -> Self {
        self.encoder_reversed = reversed;
        self
    }

    pub fn with_direction_reversed(mut self, reversed: bool) -> Self {
        self.direction_reversed = reversed;
        self
    }

    pub fn with_settle_time_us(mut self, settle_time_us: u32) -> Self {
        self.settle_time_us = settle_time_us;
        self
    }

    /// Update rate in Hz, used to turn a per-tick count delta into ticks per second.
    #[inline]
    pub(crate) fn updates_per_second(&self) -> i32 {
        (1_000_000 / self.update_interval_us.max(1)) as i32
    }

    /// Accumulator bound, `max_duty` in fixed point.
    #[inline]
    pub(crate) fn accumulator_limit(&self) -> i32 {
        (self.max_duty as i32) << self.duty_shift.min(15)
    }
}

impl Default for MotionConfig {
    /// 10 ms loop period.
    fn default() -> Self {
        Self::new(10_000)
    }
}
