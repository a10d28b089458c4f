// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bit-banged I2C master on two open-drain GPIO lines.
//!
//! The engine drives SCL and SDA through any pin that implements both [`OutputPin`] and
//! [`InputPin`] in open-drain fashion: `set_low` pulls the line down, `set_high` releases it to
//! the bus pull-up. Timing is built from a quarter-bit delay of `1000 / clock_khz / 4` µs, so one
//! bit period is four quarter delays.
//!
//! Every transfer blocks until it completes. Any NACK aborts the transfer immediately with a STOP
//! condition. There is no clock-stretching detection: a peer that holds SCL low stalls the caller.
//!
//! ```ignore
//! let mut bus = SoftI2c::new(scl, sda, delay, 100)?;
//! bus.write_read(0x76, &[0xD0], &mut id)?;
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation, SevenBitAddress};
use thiserror_no_std::Error;

/// Failure of an addressed transfer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// No device acknowledged the address byte.
    #[error("address byte not acknowledged")]
    AddressNack,

    /// The addressed device refused a payload byte.
    #[error("data byte not acknowledged")]
    DataNack,

    /// SCL or SDA could not be driven or sampled.
    #[error("bus line access failed")]
    Pin,
}

impl i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        match self {
            BusError::AddressNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            BusError::DataNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            BusError::Pin => ErrorKind::Bus,
        }
    }
}

/// Transfer direction encoded in bit 0 of the address byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    Write = 0,
    Read = 1,
}

/// Software I2C master.
pub struct SoftI2c<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    quarter_delay_us: u32,
}

impl<SCL, SDA, D> SoftI2c<SCL, SDA, D>
where
    SCL: OutputPin + InputPin,
    SDA: OutputPin + InputPin,
    D: DelayNs,
{
    /// Create a bus running at roughly `clock_khz`. Both lines are released to idle.
    ///
    /// Rates above 250 kHz truncate the quarter delay to zero and run as fast as the pins toggle.
    pub fn new(mut scl: SCL, mut sda: SDA, delay: D, clock_khz: u32) -> Result<Self, BusError> {
        scl.set_high().map_err(|_| BusError::Pin)?;
        sda.set_high().map_err(|_| BusError::Pin)?;

        Ok(Self {
            scl,
            sda,
            delay,
            quarter_delay_us: 1000 / clock_khz.max(1) / 4,
        })
    }

    #[inline]
    pub fn quarter_delay_us(&self) -> u32 {
        self.quarter_delay_us
    }

    /// Release the pins and the delay provider.
    pub fn free(self) -> (SCL, SDA, D) {
        (self.scl, self.sda, self.delay)
    }

    /// Write `data` to the device at `address`.
    pub fn transmit(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        self.run(address, &mut [Operation::Write(data)])
    }

    /// Fill `buffer` from the device at `address`.
    pub fn receive(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), BusError> {
        self.run(address, &mut [Operation::Read(buffer)])
    }

    /// Write `data`, then repeated START and read into `buffer` (register read pattern).
    pub fn write_read(&mut self, address: u8, data: &[u8], buffer: &mut [u8]) -> Result<(), BusError> {
        self.run(address, &mut [Operation::Write(data), Operation::Read(buffer)])
    }

    /// Read into `buffer`, then repeated START and write `data`.
    pub fn read_write(&mut self, address: u8, buffer: &mut [u8], data: &[u8]) -> Result<(), BusError> {
        self.run(address, &mut [Operation::Read(buffer), Operation::Write(data)])
    }

    /// Execute a sequence of operations as one bus transaction.
    ///
    /// Adjacent operations in the same direction share one addressing phase. A direction change
    /// issues a repeated START and re-addresses the device. The last byte of each read run is
    /// NACKed. Empty reads are skipped, so a transaction made only of them never touches the bus.
    fn run(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), BusError> {
        let mut previous: Option<Direction> = None;

        for i in 0..operations.len() {
            let direction = match &operations[i] {
                op if is_empty_read(op) => continue,
                Operation::Read(_) => Direction::Read,
                Operation::Write(_) => Direction::Write,
            };
            let read_continues = matches!(
                operations[i + 1..].iter().find(|op| !is_empty_read(op)),
                Some(Operation::Read(_))
            );

            if previous != Some(direction) {
                match previous {
                    None => self.send_start()?,
                    Some(_) => self.send_repeated_start()?,
                }
                self.send_address(address, direction)?;
            }

            match &mut operations[i] {
                Operation::Write(data) => {
                    for &byte in data.iter() {
                        self.send_data(byte)?;
                    }
                }
                Operation::Read(buffer) => {
                    let last = buffer.len();
                    for (n, byte) in buffer.iter_mut().enumerate() {
                        let nack = n + 1 == last && !read_continues;
                        *byte = self.read_byte(nack)?;
                    }
                }
            }

            previous = Some(direction);
        }

        if previous.is_some() {
            self.send_stop()?;
        }
        Ok(())
    }

    fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), BusError> {
        if self.send_byte((address << 1) | direction as u8)? {
            Ok(())
        } else {
            self.send_stop()?;
            Err(BusError::AddressNack)
        }
    }

    fn send_data(&mut self, byte: u8) -> Result<(), BusError> {
        if self.send_byte(byte)? {
            Ok(())
        } else {
            self.send_stop()?;
            Err(BusError::DataNack)
        }
    }

    // ---- Bus conditions ----

    /// SDA falls while SCL is high.
    fn send_start(&mut self) -> Result<(), BusError> {
        self.wait(1);
        self.sda_low()?;
        self.wait(1);
        Ok(())
    }

    /// Return both lines to high with SCL low in between, then START.
    fn send_repeated_start(&mut self) -> Result<(), BusError> {
        self.scl_low()?;
        self.wait(1);
        self.sda_release()?;
        self.wait(1);
        self.scl_release()?;
        self.send_start()
    }

    /// SCL low, SDA low, SCL high, SDA high.
    fn send_stop(&mut self) -> Result<(), BusError> {
        self.scl_low()?;
        self.wait(1);
        self.sda_low()?;
        self.wait(1);
        self.scl_release()?;
        self.wait(1);
        self.sda_release()?;
        self.wait(1);
        Ok(())
    }

    // ---- Bit and byte level ----

    fn write_bit(&mut self, high: bool) -> Result<(), BusError> {
        self.scl_low()?;
        self.wait(1);
        if high {
            self.sda_release()?;
        } else {
            self.sda_low()?;
        }
        self.wait(1);
        self.scl_release()?;
        // Satisfy the minimum SCL high time.
        self.wait(2);
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, BusError> {
        self.scl_low()?;
        self.wait(1);
        self.sda_release()?;
        self.wait(1);
        self.scl_release()?;
        self.wait(1);
        let level = self.sda.is_high().map_err(|_| BusError::Pin)?;
        self.wait(1);
        Ok(level)
    }

    /// Shift out `value` MSB first. Returns `true` if the receiver acknowledged.
    fn send_byte(&mut self, value: u8) -> Result<bool, BusError> {
        for bit in (0..8).rev() {
            self.write_bit((value >> bit) & 1 == 1)?;
        }
        let nack = self.read_bit()?;
        Ok(!nack)
    }

    /// Shift in one byte MSB first, then answer with ACK (`nack == false`) or NACK.
    fn read_byte(&mut self, nack: bool) -> Result<u8, BusError> {
        let mut value = 0u8;
        for _ in 0..8 {
            value = (value << 1) | self.read_bit()? as u8;
        }
        self.write_bit(nack)?;
        Ok(value)
    }

    // ---- Line control ----

    #[inline]
    fn wait(&mut self, quarters: u32) {
        self.delay.delay_us(self.quarter_delay_us * quarters);
    }

    #[inline]
    fn scl_low(&mut self) -> Result<(), BusError> {
        self.scl.set_low().map_err(|_| BusError::Pin)
    }

    #[inline]
    fn scl_release(&mut self) -> Result<(), BusError> {
        self.scl.set_high().map_err(|_| BusError::Pin)
    }

    #[inline]
    fn sda_low(&mut self) -> Result<(), BusError> {
        self.sda.set_low().map_err(|_| BusError::Pin)
    }

    #[inline]
    fn sda_release(&mut self) -> Result<(), BusError> {
        self.sda.set_high().map_err(|_| BusError::Pin)
    }
}

/// A read with nothing to receive has no byte to NACK and would leave the peer driving SDA.
fn is_empty_read(op: &Operation<'_>) -> bool {
    matches!(op, Operation::Read(buffer) if buffer.is_empty())
}

impl<SCL, SDA, D> i2c::ErrorType for SoftI2c<SCL, SDA, D> {
    type Error = BusError;
}

impl<SCL, SDA, D> i2c::I2c<SevenBitAddress> for SoftI2c<SCL, SDA, D>
where
    SCL: OutputPin + InputPin,
    SDA: OutputPin + InputPin,
    D: DelayNs,
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(address, operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::i2c::I2c;
    use std::rc::Rc;
    use std::vec;
    use std::vec::Vec;

    /// What the simulated peer observed on the wire.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Event {
        Start,
        Stop,
        Byte(u8),
        Ack,
        Nack,
    }

    use Event::*;

    #[derive(Copy, Clone, Debug)]
    enum PeerState {
        Idle,
        Receive { value: u8, bits: u8, address: bool },
        AckDrive { byte: u8, address: bool },
        AckClock { byte: u8, address: bool, acked: bool },
        AckRelease { byte: u8, address: bool, acked: bool },
        Transmit { byte: u8, bit: u8 },
        MasterAck { byte: u8 },
        TransmitNext,
    }

    /// Open-drain bus with a single simulated target device.
    struct Wire {
        master_scl_low: bool,
        master_sda_low: bool,
        peer_sda_low: bool,
        scl: bool,
        sda: bool,
        peer_address: u8,
        /// Refuse the n-th written payload byte (0-based, counted per transaction).
        nack_data_at: Option<usize>,
        tx_data: Vec<u8>,
        tx_index: usize,
        rx_count: usize,
        state: PeerState,
        events: Vec<Event>,
    }

    impl Wire {
        fn new(peer_address: u8) -> Self {
            Self {
                master_scl_low: false,
                master_sda_low: false,
                peer_sda_low: false,
                scl: true,
                sda: true,
                peer_address,
                nack_data_at: None,
                tx_data: Vec::new(),
                tx_index: 0,
                rx_count: 0,
                state: PeerState::Idle,
                events: Vec::new(),
            }
        }

        fn settle(&mut self) {
            let scl = !self.master_scl_low;
            let sda = !(self.master_sda_low || self.peer_sda_low);

            if scl && self.scl && sda != self.sda {
                if sda {
                    self.events.push(Stop);
                    self.state = PeerState::Idle;
                } else {
                    self.events.push(Start);
                    self.rx_count = 0;
                    self.state = PeerState::Receive {
                        value: 0,
                        bits: 0,
                        address: true,
                    };
                }
            }

            let rising = scl && !self.scl;
            let falling = !scl && self.scl;
            self.scl = scl;
            self.sda = sda;

            if rising {
                self.on_rising(sda);
            } else if falling {
                self.on_falling();
            }
            self.sda = !(self.master_sda_low || self.peer_sda_low);
        }

        fn on_rising(&mut self, sda: bool) {
            self.state = match self.state {
                PeerState::Receive { value, bits, address } => {
                    let value = (value << 1) | sda as u8;
                    if bits + 1 == 8 {
                        self.events.push(Byte(value));
                        PeerState::AckDrive { byte: value, address }
                    } else {
                        PeerState::Receive {
                            value,
                            bits: bits + 1,
                            address,
                        }
                    }
                }
                PeerState::AckClock { byte, address, acked } => {
                    self.events.push(if sda { Nack } else { Ack });
                    PeerState::AckRelease { byte, address, acked }
                }
                PeerState::MasterAck { byte } => {
                    self.events.push(Byte(byte));
                    if sda {
                        self.events.push(Nack);
                        PeerState::Idle
                    } else {
                        self.events.push(Ack);
                        PeerState::TransmitNext
                    }
                }
                other => other,
            };
        }

        fn on_falling(&mut self) {
            self.state = match self.state {
                PeerState::AckDrive { byte, address } => {
                    let acked = if address {
                        byte >> 1 == self.peer_address
                    } else {
                        let index = self.rx_count;
                        self.rx_count += 1;
                        self.nack_data_at != Some(index)
                    };
                    self.peer_sda_low = acked;
                    PeerState::AckClock { byte, address, acked }
                }
                PeerState::AckRelease { byte, address, acked } => {
                    self.peer_sda_low = false;
                    if !acked {
                        PeerState::Idle
                    } else if address && byte & 1 == 1 {
                        self.begin_transmit()
                    } else {
                        PeerState::Receive {
                            value: 0,
                            bits: 0,
                            address: false,
                        }
                    }
                }
                PeerState::Transmit { byte, bit } => {
                    if bit == 7 {
                        self.peer_sda_low = false;
                        PeerState::MasterAck { byte }
                    } else {
                        self.peer_sda_low = (byte >> (6 - bit)) & 1 == 0;
                        PeerState::Transmit { byte, bit: bit + 1 }
                    }
                }
                PeerState::TransmitNext => self.begin_transmit(),
                other => other,
            };
        }

        fn begin_transmit(&mut self) -> PeerState {
            let byte = self.tx_data.get(self.tx_index).copied().unwrap_or(0xFF);
            self.tx_index += 1;
            self.peer_sda_low = byte & 0x80 == 0;
            PeerState::Transmit { byte, bit: 0 }
        }
    }

    #[derive(Copy, Clone)]
    enum Line {
        Scl,
        Sda,
    }

    struct SimPin {
        wire: Rc<RefCell<Wire>>,
        line: Line,
    }

    impl embedded_hal::digital::ErrorType for SimPin {
        type Error = Infallible;
    }

    impl OutputPin for SimPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.drive(true);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.drive(false);
            Ok(())
        }
    }

    impl InputPin for SimPin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            let wire = self.wire.borrow();
            Ok(match self.line {
                Line::Scl => wire.scl,
                Line::Sda => wire.sda,
            })
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            self.is_high().map(|high| !high)
        }
    }

    impl SimPin {
        fn drive(&mut self, low: bool) {
            let mut wire = self.wire.borrow_mut();
            match self.line {
                Line::Scl => wire.master_scl_low = low,
                Line::Sda => wire.master_sda_low = low,
            }
            wire.settle();
        }
    }

    /// Counts requested delay so timing can be checked without sleeping.
    #[derive(Default)]
    struct TallyDelay {
        total_ns: u64,
    }

    impl DelayNs for TallyDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    type Bus = SoftI2c<SimPin, SimPin, TallyDelay>;

    fn bus(wire: &Rc<RefCell<Wire>>, clock_khz: u32) -> Bus {
        let scl = SimPin {
            wire: wire.clone(),
            line: Line::Scl,
        };
        let sda = SimPin {
            wire: wire.clone(),
            line: Line::Sda,
        };
        SoftI2c::new(scl, sda, TallyDelay::default(), clock_khz).unwrap()
    }

    fn setup(peer_address: u8) -> (Rc<RefCell<Wire>>, Bus) {
        let wire = Rc::new(RefCell::new(Wire::new(peer_address)));
        let bus = bus(&wire, 100);
        (wire, bus)
    }

    fn events(wire: &Rc<RefCell<Wire>>) -> Vec<Event> {
        wire.borrow().events.clone()
    }

    #[test]
    fn quarter_delay_follows_clock() {
        let wire = Rc::new(RefCell::new(Wire::new(0x10)));
        assert_eq!(bus(&wire, 100).quarter_delay_us(), 2);
        assert_eq!(bus(&wire, 50).quarter_delay_us(), 5);
        assert_eq!(bus(&wire, 400).quarter_delay_us(), 0);
        assert_eq!(bus(&wire, 0).quarter_delay_us(), 250);
    }

    /// Line whose driver always fails.
    struct BrokenPin;

    impl embedded_hal::digital::ErrorType for BrokenPin {
        type Error = embedded_hal::digital::ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }
    }

    impl InputPin for BrokenPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }
    }

    #[test]
    fn new_reports_line_failure() {
        let wire = Rc::new(RefCell::new(Wire::new(0x10)));
        let sda = SimPin { wire, line: Line::Sda };

        let result = SoftI2c::new(BrokenPin, sda, TallyDelay::default(), 100);
        assert_eq!(result.err(), Some(BusError::Pin));
    }

    #[test]
    fn transmit_frames_address_and_payload() {
        let (wire, mut bus) = setup(0x76);

        assert_eq!(bus.transmit(0x76, &[0xAA, 0x55]), Ok(()));
        assert_eq!(
            events(&wire),
            vec![Start, Byte(0xEC), Ack, Byte(0xAA), Ack, Byte(0x55), Ack, Stop]
        );

        let w = wire.borrow();
        assert!(w.scl && w.sda, "bus must be left idle");
    }

    #[test]
    fn address_nack_stops_before_payload() {
        let (wire, mut bus) = setup(0x77);

        assert_eq!(bus.transmit(0x76, &[0xAA, 0x55]), Err(BusError::AddressNack));
        assert_eq!(events(&wire), vec![Start, Byte(0xEC), Nack, Stop]);
    }

    #[test]
    fn data_nack_aborts_remaining_bytes() {
        let (wire, mut bus) = setup(0x27);
        wire.borrow_mut().nack_data_at = Some(1);

        assert_eq!(bus.transmit(0x27, &[1, 2, 3]), Err(BusError::DataNack));
        assert_eq!(
            events(&wire),
            vec![Start, Byte(0x4E), Ack, Byte(1), Ack, Byte(2), Nack, Stop]
        );
    }

    #[test]
    fn receive_acks_all_but_last_byte() {
        let (wire, mut bus) = setup(0x76);
        wire.borrow_mut().tx_data = vec![0x58, 0xA5, 0x01];

        let mut buf = [0u8; 3];
        assert_eq!(bus.receive(0x76, &mut buf), Ok(()));
        assert_eq!(buf, [0x58, 0xA5, 0x01]);
        assert_eq!(
            events(&wire),
            vec![
                Start,
                Byte(0xED),
                Ack,
                Byte(0x58),
                Ack,
                Byte(0xA5),
                Ack,
                Byte(0x01),
                Nack,
                Stop
            ]
        );
    }

    #[test]
    fn receive_address_nack_reports_failure() {
        let (wire, mut bus) = setup(0x10);

        let mut buf = [0u8; 2];
        assert_eq!(bus.receive(0x11, &mut buf), Err(BusError::AddressNack));
        assert_eq!(events(&wire), vec![Start, Byte(0x23), Nack, Stop]);
    }

    #[test]
    fn write_read_uses_repeated_start() {
        let (wire, mut bus) = setup(0x76);
        wire.borrow_mut().tx_data = vec![0x58];

        let mut id = [0u8; 1];
        assert_eq!(bus.write_read(0x76, &[0xD0], &mut id), Ok(()));
        assert_eq!(id, [0x58]);
        assert_eq!(
            events(&wire),
            vec![
                Start,
                Byte(0xEC),
                Ack,
                Byte(0xD0),
                Ack,
                Start,
                Byte(0xED),
                Ack,
                Byte(0x58),
                Nack,
                Stop
            ]
        );
    }

    #[test]
    fn read_write_reverses_the_phases() {
        let (wire, mut bus) = setup(0x20);
        wire.borrow_mut().tx_data = vec![0x0F, 0xF0];

        let mut buf = [0u8; 2];
        assert_eq!(bus.read_write(0x20, &mut buf, &[0x33]), Ok(()));
        assert_eq!(buf, [0x0F, 0xF0]);
        assert_eq!(
            events(&wire),
            vec![
                Start,
                Byte(0x41),
                Ack,
                Byte(0x0F),
                Ack,
                Byte(0xF0),
                Nack,
                Start,
                Byte(0x40),
                Ack,
                Byte(0x33),
                Ack,
                Stop
            ]
        );
    }

    #[test]
    fn write_read_aborts_on_write_phase_nack() {
        let (wire, mut bus) = setup(0x76);
        wire.borrow_mut().nack_data_at = Some(0);

        let mut buf = [0u8; 4];
        assert_eq!(bus.write_read(0x76, &[0x88], &mut buf), Err(BusError::DataNack));
        assert_eq!(
            events(&wire),
            vec![Start, Byte(0xEC), Ack, Byte(0x88), Nack, Stop]
        );
    }

    #[test]
    fn i2c_trait_merges_same_direction_operations() {
        let (wire, mut bus) = setup(0x50);
        wire.borrow_mut().tx_data = vec![0x11, 0x22];

        let mut a = [0u8; 1];
        let mut b = [0u8; 1];
        let result = bus.transaction(
            0x50,
            &mut [
                Operation::Write(&[0x00]),
                Operation::Write(&[0x10]),
                Operation::Read(&mut a),
                Operation::Read(&mut b),
            ],
        );
        assert_eq!(result, Ok(()));
        assert_eq!((a[0], b[0]), (0x11, 0x22));
        assert_eq!(
            events(&wire),
            vec![
                Start,
                Byte(0xA0),
                Ack,
                Byte(0x00),
                Ack,
                Byte(0x10),
                Ack,
                Start,
                Byte(0xA1),
                Ack,
                Byte(0x11),
                Ack,
                Byte(0x22),
                Nack,
                Stop
            ]
        );
    }

    #[test]
    fn trailing_empty_read_still_nacks_and_stops() {
        let (wire, mut bus) = setup(0x50);
        wire.borrow_mut().tx_data = vec![0x42];

        let mut a = [0u8; 1];
        let result = bus.transaction(0x50, &mut [Operation::Read(&mut a), Operation::Read(&mut [])]);
        assert_eq!(result, Ok(()));
        assert_eq!(a, [0x42]);
        assert_eq!(events(&wire), vec![Start, Byte(0xA1), Ack, Byte(0x42), Nack, Stop]);

        let w = wire.borrow();
        assert!(w.scl && w.sda, "bus must be left idle");
    }

    #[test]
    fn zero_length_receive_leaves_bus_idle() {
        let (wire, mut bus) = setup(0x50);

        assert_eq!(bus.receive(0x50, &mut []), Ok(()));
        assert_eq!(events(&wire), vec![]);

        let w = wire.borrow();
        assert!(w.scl && w.sda);
    }

    #[test]
    fn empty_read_between_writes_keeps_one_address_phase() {
        let (wire, mut bus) = setup(0x50);

        let result = bus.transaction(
            0x50,
            &mut [
                Operation::Write(&[0x01]),
                Operation::Read(&mut []),
                Operation::Write(&[0x02]),
            ],
        );
        assert_eq!(result, Ok(()));
        assert_eq!(
            events(&wire),
            vec![Start, Byte(0xA0), Ack, Byte(0x01), Ack, Byte(0x02), Ack, Stop]
        );
    }

    #[test]
    fn nack_maps_to_embedded_hal_error_kind() {
        use embedded_hal::i2c::Error as _;

        assert_eq!(
            BusError::AddressNack.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(
            BusError::DataNack.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
        );
    }

    #[test]
    fn byte_takes_nine_bit_periods() {
        let (_wire, mut bus) = setup(0x76);

        assert_eq!(bus.transmit(0x76, &[]), Ok(()));
        let (_, _, delay) = bus.free();
        // START: 2 quarters, address byte + ACK: 9 bits * 4 quarters, STOP: 4 quarters.
        assert_eq!(delay.total_ns, (2 + 36 + 4) * 2 * 1_000);
    }
}
