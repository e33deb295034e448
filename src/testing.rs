//! Test doubles shared by the unit tests

use std::vec::Vec;

use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::Mock as PinMock;
use embedded_hal_mock::eh1::digital::{State as PinState, Transaction as PinTransaction};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

use crate::host::{Clock, Job, Keymap, MotionEvent, MotionInterrupt, MotionSink, WorkQueue};
use crate::register::{MotionBurst, WRITE_BIT};
use crate::{Config, Pmw3610, Progress};

/// One completed SPI frame as seen by [`SimBus`], addresses without the write bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Read(u8, usize),
    Write(u8, u8),
}

/// Register level stand-in for the chip
///
/// Reads return the contents of `registers`, the burst register returns
/// `burst`. Writes are only recorded. A frame to the address in
/// `fail_read_from` / `fail_write_to` fails and is not recorded.
pub struct SimBus {
    pub registers: [u8; 128],
    pub burst: [u8; MotionBurst::LEN],
    pub frames: Vec<Frame>,
    pub fail_read_from: Option<u8>,
    pub fail_write_to: Option<u8>,
}

impl SimBus {
    pub fn new() -> Self {
        SimBus {
            registers: [0; 128],
            burst: [0; MotionBurst::LEN],
            frames: Vec::new(),
            fail_read_from: None,
            fail_write_to: None,
        }
    }

    /// A healthy chip: self-test passed and the right product id
    pub fn chip() -> Self {
        let mut bus = Self::new();
        bus.registers[0x00] = 0x3e;
        bus.registers[0x2d] = 0x0f;
        bus
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for SimBus {
    type Error = ErrorKind;
}

impl SpiDevice<u8> for SimBus {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        match operations {
            [Operation::Write(header), Operation::Read(buf)] if header.len() == 1 => {
                let addr = header[0] & !WRITE_BIT;
                if self.fail_read_from == Some(addr) {
                    return Err(ErrorKind::Other);
                }
                if addr == 0x12 {
                    let len = buf.len().min(MotionBurst::LEN);
                    buf[..len].copy_from_slice(&self.burst[..len]);
                } else {
                    buf.fill(self.registers[addr as usize]);
                }
                self.frames.push(Frame::Read(addr, buf.len()));
                Ok(())
            }
            [Operation::Write(data)] if data.len() == 2 && data[0] & WRITE_BIT != 0 => {
                let addr = data[0] & !WRITE_BIT;
                if self.fail_write_to == Some(addr) {
                    return Err(ErrorKind::Other);
                }
                self.frames.push(Frame::Write(addr, data[1]));
                Ok(())
            }
            _ => panic!("unexpected SPI transaction"),
        }
    }
}

/// Expected wire traffic for an [`embedded_hal_mock`] backed device
#[derive(Default)]
pub struct Script {
    spi: Vec<SpiTransaction<u8>>,
    transactions: usize,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self, addr: u8, data: &[u8]) -> &mut Self {
        self.spi.push(SpiTransaction::write_vec(vec![addr]));
        self.spi.push(SpiTransaction::read_vec(data.to_vec()));
        self.spi.push(SpiTransaction::flush());
        self.transactions += 1;
        self
    }

    pub fn write(&mut self, addr: u8, value: u8) -> &mut Self {
        self.spi
            .push(SpiTransaction::write_vec(vec![addr | WRITE_BIT, value]));
        self.spi.push(SpiTransaction::flush());
        self.transactions += 1;
        self
    }

    /// A write bracketed by the SPI clock enable and disable
    pub fn guarded_write(&mut self, addr: u8, value: u8) -> &mut Self {
        self.write(0x41, 0xba).write(addr, value).write(0x41, 0xb5)
    }

    pub fn device(&self) -> (ExclusiveDevice<SpiMock<u8>, PinMock, NoDelay>, PinMock) {
        let mut pin_expectations = vec![PinTransaction::set(PinState::High)];
        for _ in 0..self.transactions {
            pin_expectations.push(PinTransaction::set(PinState::Low));
            pin_expectations.push(PinTransaction::set(PinState::High));
        }

        let spi = SpiMock::new(&self.spi);
        let pin = PinMock::new(&pin_expectations);
        let spidev = ExclusiveDevice::new_no_delay(spi, pin.clone()).unwrap();
        (spidev, pin)
    }
}

/// A sensor that went through the whole power-up sequence on a [`SimBus`]
///
/// The power-up traffic is cleared from the recorded frames.
pub fn ready_sensor(config: Config) -> Pmw3610<SimBus, NoopDelay> {
    let mut sensor = Pmw3610::new(SimBus::chip(), NoopDelay, config);
    while sensor.advance().unwrap() != Progress::Ready {}
    sensor.ll().bus.frames.clear();
    sensor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerChange {
    Activate(u8),
    Deactivate(u8),
}

/// Host that records every call made by the driver
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub now_ms: u64,
    pub highest_layer: u8,
    pub irq: Vec<bool>,
    pub scheduled: Vec<(Job, u32)>,
    pub submitted: Vec<Job>,
    pub events: Vec<MotionEvent>,
    pub layers: Vec<LayerChange>,
}

impl MotionInterrupt for RecordingHost {
    fn set_enabled(&mut self, enabled: bool) {
        self.irq.push(enabled);
    }
}

impl WorkQueue for RecordingHost {
    fn schedule(&mut self, job: Job, delay_ms: u32) {
        self.scheduled.push((job, delay_ms));
    }

    fn submit(&mut self, job: Job) {
        self.submitted.push(job);
    }
}

impl Clock for RecordingHost {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }
}

impl MotionSink for RecordingHost {
    fn report(&mut self, event: MotionEvent) {
        self.events.push(event);
    }
}

impl Keymap for RecordingHost {
    fn highest_layer_active(&self) -> u8 {
        self.highest_layer
    }

    fn activate_layer(&mut self, layer: u8) {
        self.layers.push(LayerChange::Activate(layer));
    }

    fn deactivate_layer(&mut self, layer: u8) {
        self.layers.push(LayerChange::Deactivate(layer));
    }
}
