// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Step-wise homing and calibration sequencing.
//!
//! [`Homing`] only decides what to do next from the end-stop levels and the time elapsed since the
//! previous poll; the motion controller owns the outputs and applies each [`Step`]. There is no
//! timeout: a procedure advances only when the expected end stop is sensed.
//!
//! Sequence:
//! 1. If the opened end stop is already asserted, drive toward closed until it releases, then keep
//!    driving for the settle time.
//! 2. Drive toward opened until its end stop asserts; this is the zero reference.
//! 3. Calibration only: drive toward closed until its end stop asserts; the count there is the
//!    travel range.

use log::debug;

use crate::drivers::Direction;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingKind {
    /// Find the opened end stop and zero the count there.
    Home,
    /// Home, then measure the travel to the closed end stop.
    Calibrate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingPhase {
    LeavingOpenStop,
    Settling { remaining_us: u32 },
    SeekingOpenStop,
    SeekingClosedStop,
    Done,
}

impl HomingPhase {
    /// Direction the actuator is driven in during this phase.
    pub fn drive_direction(&self) -> Option<Direction> {
        match self {
            HomingPhase::LeavingOpenStop | HomingPhase::Settling { .. } => Some(Direction::Close),
            HomingPhase::SeekingOpenStop => Some(Direction::Open),
            HomingPhase::SeekingClosedStop => Some(Direction::Close),
            HomingPhase::Done => None,
        }
    }
}

/// Asserted state of both end stops.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndStops {
    pub opened: bool,
    pub closed: bool,
}

/// Action requested by one poll.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Keep the current drive.
    Continue,
    /// Switch to driving in this direction at the homing duty.
    Drive(Direction),
    /// Stop and zero the count. If the new phase still has a drive direction, start it.
    OpenStopReached,
    /// Stop and record the count as the travel range.
    ClosedStopReached,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Homing {
    kind: HomingKind,
    phase: HomingPhase,
    settle_time_us: u32,
}

impl Homing {
    /// Pick the first phase from the current end-stop state. The returned direction is the
    /// initial drive.
    pub fn start(kind: HomingKind, stops: EndStops, settle_time_us: u32) -> (Self, Direction) {
        let phase = if stops.opened {
            HomingPhase::LeavingOpenStop
        } else {
            HomingPhase::SeekingOpenStop
        };
        debug!("{:?}: start in {:?}", kind, phase);

        let homing = Self {
            kind,
            phase,
            settle_time_us,
        };
        let direction = phase.drive_direction().unwrap_or(Direction::Open);
        (homing, direction)
    }

    #[inline]
    pub fn kind(&self) -> HomingKind {
        self.kind
    }

    #[inline]
    pub fn phase(&self) -> HomingPhase {
        self.phase
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.phase == HomingPhase::Done
    }

    /// Advance with the current end-stop levels and the time since the previous poll.
    pub fn poll(&mut self, stops: EndStops, elapsed_us: u32) -> Step {
        let (next, step) = match self.phase {
            HomingPhase::LeavingOpenStop if !stops.opened => (
                HomingPhase::Settling {
                    remaining_us: self.settle_time_us,
                },
                Step::Continue,
            ),
            HomingPhase::Settling { remaining_us } => match remaining_us.saturating_sub(elapsed_us) {
                0 => (HomingPhase::SeekingOpenStop, Step::Drive(Direction::Open)),
                remaining_us => (HomingPhase::Settling { remaining_us }, Step::Continue),
            },
            HomingPhase::SeekingOpenStop if stops.opened => {
                let next = match self.kind {
                    HomingKind::Home => HomingPhase::Done,
                    HomingKind::Calibrate => HomingPhase::SeekingClosedStop,
                };
                (next, Step::OpenStopReached)
            }
            HomingPhase::SeekingClosedStop if stops.closed => (HomingPhase::Done, Step::ClosedStopReached),
            phase => (phase, Step::Continue),
        };

        if core::mem::discriminant(&next) != core::mem::discriminant(&self.phase) {
            debug!("{:?}: {:?} -> {:?}", self.kind, self.phase, next);
        }
        self.phase = next;
        step
    }
}
