// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Cascaded position / speed controller for the actuator.
//!
//! This controller owns the [`HBridge`] and both end-stop inputs and reads the shared
//! [`PositionCounter`]. A fixed-period `update()` runs two proportional loops:
//!
//! 1. Position loop: `target_speed = position_error * position_gain`, limited to the speed cap of
//!    the current move.
//! 2. Speed loop: the speed error is integrated into a fixed-point duty accumulator, whose sign
//!    selects the direction and whose magnitude becomes the duty.
//!
//! Duty is forced to zero when the requested speed points into an asserted end stop, when it falls
//! below the motor's dead band, or when no motion is requested.
//!
//! Typical usage pattern:
//!
//! ```ignore
//! controller.calibrate(&mut delay)?;
//! controller.move_to_position_over_duration(50, 1000);
//!
//! loop {
//!     controller.update()?;
//!     delay.delay_us(config.update_interval_us);
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;
use log::debug;

use crate::control::homing::{EndStops, Homing, HomingKind, Step};
use crate::control::MotionConfig;
use crate::drivers::{Direction, HBridge};
use crate::hw::PositionCounter;
use crate::Error;

/// Operating mode of the motion controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionMode {
    /// Servo running with no active move; holds position with a zero speed cap.
    Idle,

    /// Servo running toward a commanded position.
    Tracking,

    /// Duty and direction set directly; `update()` does nothing.
    RawOverride,

    /// Homing procedure in progress.
    Homing,

    /// Calibration procedure in progress.
    Calibrating,
}

pub struct MotionController<'a, EN, A, B, EO, EC> {
    bridge: HBridge<EN, A, B>,
    open_stop: EO,
    closed_stop: EC,
    counter: &'a PositionCounter,
    config: MotionConfig,

    mode: MotionMode,
    procedure: Option<Homing>,

    /// Position sample from the previous tick (ticks)
    last_position: i16,
    /// Position setpoint (ticks)
    target_position: i32,
    /// Output of the position loop (ticks/s)
    target_speed: i32,
    /// Speed cap of the current move (ticks/s)
    speed_limit: i32,
    /// Signed duty in fixed point, `duty << duty_shift`
    duty_accumulator: i32,

    /// Travel between the end stops (ticks), zero until calibrated
    max_encoder: i16,
}

impl<'a, EN, A, B, EO, EC> MotionController<'a, EN, A, B, EO, EC>
where
    EN: SetDutyCycle,
    A: OutputPin,
    B: OutputPin,
    EO: InputPin,
    EC: InputPin,
{
    /// Bind the controller to its outputs, end-stop inputs and position counter.
    ///
    /// End-stop inputs are active-low and should be configured with pull-ups. The output starts at
    /// zero duty, and the travel range is zero until [`calibrate`](Self::calibrate) or
    /// [`set_max_encoder`](Self::set_max_encoder).
    pub fn new(
        enable: EN,
        in_a: A,
        in_b: B,
        open_stop: EO,
        closed_stop: EC,
        counter: &'a PositionCounter,
        config: MotionConfig,
    ) -> Result<Self, Error> {
        let bridge = HBridge::new(enable, in_a, in_b, config.max_duty, config.direction_reversed)?;

        let mut controller = Self {
            bridge,
            open_stop,
            closed_stop,
            counter,
            config,
            mode: MotionMode::Idle,
            procedure: None,
            last_position: 0,
            target_position: 0,
            target_speed: 0,
            speed_limit: 0,
            duty_accumulator: 0,
            max_encoder: 0,
        };
        controller.last_position = controller.position();

        Ok(controller)
    }

    // ---- Periodic step ----

    /// Run one control period. Must be called every `update_interval_us`.
    pub fn update(&mut self) -> Result<(), Error> {
        match self.mode {
            MotionMode::RawOverride => Ok(()),
            MotionMode::Homing | MotionMode::Calibrating => self.step_procedure(),
            MotionMode::Idle | MotionMode::Tracking => self.servo(),
        }
    }

    fn servo(&mut self) -> Result<(), Error> {
        let c = self.config;
        let position = self.position();

        // Position loop
        let mut error = self.target_position - position as i32;
        if error.abs() < c.position_epsilon {
            error = 0;
        }
        let limit = self.speed_limit;
        self.target_speed = error.saturating_mul(c.position_gain).clamp(-limit, limit);

        // Speed loop
        let delta = position.wrapping_sub(self.last_position) as i32;
        let measured = delta.saturating_mul(c.updates_per_second());
        let speed_error = self.target_speed.saturating_sub(measured);

        let max_acc = c.accumulator_limit();
        self.duty_accumulator = self
            .duty_accumulator
            .saturating_add(speed_error.saturating_mul(c.speed_gain) / c.speed_gain_divisor.max(1))
            .clamp(-max_acc, max_acc);

        // Direction change: switch with the output off and hold zero for this period
        let wanted = match self.duty_accumulator {
            acc if acc < 0 => Some(Direction::Open),
            acc if acc > 0 => Some(Direction::Close),
            _ => None,
        };
        let switched = match wanted {
            Some(direction) if direction != self.bridge.direction() => {
                self.bridge.set_direction(direction)?;
                true
            }
            _ => false,
        };

        let mut duty = (self.duty_accumulator.unsigned_abs() >> c.duty_shift.min(15)) as u16;

        // Safety interlock
        let stops = self.end_stops()?;
        let blocked = (self.target_speed < 0 && stops.opened) || (self.target_speed > 0 && stops.closed);
        if switched || blocked || duty < c.min_duty || self.target_speed == 0 {
            duty = 0;
        }

        self.bridge.set_duty(duty)?;
        self.last_position = position;

        Ok(())
    }

    fn step_procedure(&mut self) -> Result<(), Error> {
        let Some(mut procedure) = self.procedure else {
            self.mode = MotionMode::Idle;
            return Ok(());
        };

        let stops = self.end_stops()?;
        match procedure.poll(stops, self.config.update_interval_us) {
            Step::Continue => {}
            Step::Drive(direction) => self.drive_at_home_duty(direction)?,
            Step::OpenStopReached => {
                self.stop_output()?;
                self.counter.reset();
                self.last_position = 0;
                if let Some(direction) = procedure.phase().drive_direction() {
                    self.drive_at_home_duty(direction)?;
                }
            }
            Step::ClosedStopReached => {
                self.stop_output()?;
                self.max_encoder = self.position();
                self.last_position = self.max_encoder;
                debug!("calibrated travel: {} ticks", self.max_encoder);
            }
        }

        if procedure.is_done() {
            debug!("{:?} complete", procedure.kind());
            self.procedure = None;
            self.mode = MotionMode::Idle;
        } else {
            self.procedure = Some(procedure);
        }

        Ok(())
    }

    // ---- Commands ----

    /// Move to `target_percent` of the calibrated travel, finishing in roughly `duration_ms`
    /// whatever the distance.
    pub fn move_to_position_over_duration(&mut self, target_percent: u8, duration_ms: u16) {
        self.begin_move(target_percent);

        let distance = (self.target_position - self.position() as i32).abs();
        self.speed_limit = distance * 1000 / duration_ms.max(1) as i32;

        debug!(
            "move to {} ticks over {} ms, cap {} ticks/s",
            self.target_position, duration_ms, self.speed_limit
        );
    }

    /// Move to `target_percent` of the calibrated travel at `speed_percent` of the travel per
    /// second.
    pub fn move_to_position_at_speed(&mut self, target_percent: u8, speed_percent: u8) {
        self.begin_move(target_percent);

        self.speed_limit = (self.max_encoder as i32).abs() * speed_percent as i32 / 100;

        debug!(
            "move to {} ticks at {} ticks/s",
            self.target_position, self.speed_limit
        );
    }

    /// Drive with a fixed duty and direction, bypassing the servo until [`hard_stop`] or the
    /// next move command.
    ///
    /// [`hard_stop`]: Self::hard_stop
    pub fn raw_move(&mut self, duty: u16, direction: Direction) -> Result<(), Error> {
        if self.mode != MotionMode::RawOverride {
            debug!("raw override");
        }
        self.procedure = None;
        self.mode = MotionMode::RawOverride;

        self.bridge.set_direction(direction)?;
        self.bridge.set_duty(duty)
    }

    /// Stop immediately and hold the current position.
    ///
    /// Clears raw override, cancels homing or calibration, and drops the speed cap to zero so the
    /// servo does not resume the previous move.
    pub fn hard_stop(&mut self) -> Result<(), Error> {
        if self.mode != MotionMode::Idle {
            debug!("hard stop from {:?}", self.mode);
        }
        self.procedure = None;
        self.mode = MotionMode::Idle;
        self.speed_limit = 0;
        self.stop_output()
    }

    /// Begin homing; `update()` advances it until the opened end stop is found.
    pub fn start_homing(&mut self) -> Result<(), Error> {
        self.start_procedure(HomingKind::Home)
    }

    /// Begin calibration; `update()` advances it through both end stops.
    pub fn start_calibration(&mut self) -> Result<(), Error> {
        self.start_procedure(HomingKind::Calibrate)
    }

    /// Home, blocking until the opened end stop is reached. There is no timeout.
    pub fn home<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        self.start_homing()?;
        self.run_procedure(delay)
    }

    /// Calibrate, blocking until both end stops have been visited. There is no timeout.
    pub fn calibrate<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        self.start_calibration()?;
        self.run_procedure(delay)
    }

    fn start_procedure(&mut self, kind: HomingKind) -> Result<(), Error> {
        self.hard_stop()?;

        let stops = self.end_stops()?;
        let (procedure, direction) = Homing::start(kind, stops, self.config.settle_time_us);
        self.drive_at_home_duty(direction)?;

        self.procedure = Some(procedure);
        self.mode = match kind {
            HomingKind::Home => MotionMode::Homing,
            HomingKind::Calibrate => MotionMode::Calibrating,
        };
        Ok(())
    }

    fn run_procedure<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        while self.procedure.is_some() {
            delay.delay_us(self.config.update_interval_us);
            self.update()?;
        }
        Ok(())
    }

    fn begin_move(&mut self, target_percent: u8) {
        // Idle still integrates measured speed, so only an active move keeps its accumulator.
        if self.mode != MotionMode::Tracking {
            self.duty_accumulator = 0;
            self.last_position = self.position();
        }
        self.procedure = None;
        self.mode = MotionMode::Tracking;

        let percent = target_percent.min(100) as i32;
        self.target_position = self.max_encoder as i32 * percent / 100;
    }

    /// Zero the output and servo state without changing the mode.
    fn stop_output(&mut self) -> Result<(), Error> {
        self.duty_accumulator = 0;
        self.target_speed = 0;
        self.last_position = self.position();
        self.bridge.set_duty(0)
    }

    fn drive_at_home_duty(&mut self, direction: Direction) -> Result<(), Error> {
        self.bridge.set_direction(direction)?;
        self.bridge.set_duty(self.config.home_duty)
    }

    // ---- Position and range ----

    /// Count corrected for encoder polarity; increases toward the closed end stop.
    #[inline]
    pub fn position(&self) -> i16 {
        let raw = self.counter.get_value();
        if self.config.encoder_reversed {
            raw.wrapping_neg()
        } else {
            raw
        }
    }

    #[inline]
    pub fn max_encoder(&self) -> i16 {
        self.max_encoder
    }

    /// Restore a previously measured travel range.
    pub fn set_max_encoder(&mut self, value: i16) {
        self.max_encoder = value;
    }

    /// Take the current position as the travel range.
    pub fn capture_max_encoder(&mut self) {
        self.max_encoder = self.position();
    }

    /// Zero the count at the current position.
    pub fn zero_encoder(&mut self) {
        self.counter.reset();
        self.last_position = 0;
    }

    // ---- End stops ----

    pub fn is_open_end_stop_asserted(&mut self) -> Result<bool, Error> {
        self.open_stop.is_low().map_err(|_| Error::Pin)
    }

    pub fn is_closed_end_stop_asserted(&mut self) -> Result<bool, Error> {
        self.closed_stop.is_low().map_err(|_| Error::Pin)
    }

    fn end_stops(&mut self) -> Result<EndStops, Error> {
        Ok(EndStops {
            opened: self.is_open_end_stop_asserted()?,
            closed: self.is_closed_end_stop_asserted()?,
        })
    }

    // ---- State ----

    #[inline]
    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    /// Running homing or calibration procedure, if any.
    #[inline]
    pub fn procedure(&self) -> Option<&Homing> {
        self.procedure.as_ref()
    }

    #[inline]
    pub fn target_position(&self) -> i32 {
        self.target_position
    }

    /// Position-loop output of the last servo period (ticks/s).
    #[inline]
    pub fn target_speed(&self) -> i32 {
        self.target_speed
    }

    #[inline]
    pub fn speed_limit(&self) -> i32 {
        self.speed_limit
    }

    /// Duty currently applied to the bridge.
    #[inline]
    pub fn output_duty(&self) -> u16 {
        self.bridge.duty()
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.bridge.direction()
    }

    #[inline]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Release the hardware.
    pub fn free(self) -> (EN, A, B, EO, EC) {
        let (enable, in_a, in_b) = self.bridge.free();
        (enable, in_a, in_b, self.open_stop, self.closed_stop)
    }
}
