#![no_std]
#![cfg_attr(not(doctest), doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md")))]

#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod fmt;

pub mod attr;
pub mod automouse;
pub mod codec;
pub mod config;
pub mod host;
pub mod init;
pub mod lifecycle;
pub mod ll;
pub mod motion;
pub mod register;

#[cfg(test)]
mod testing;

pub use attr::Attribute;
pub use codec::ParamError;
pub use config::{AutomouseConfig, Config};
pub use host::{Axis, Clock, Host, Job, Keymap, MotionEvent, MotionInterrupt, MotionSink, WorkQueue};
pub use init::{Fault, InitStep, Progress};

use automouse::Automouse;
use motion::Accumulator;

/// Errors reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The underlying SPI transaction failed
    Bus(E),
    /// A parameter is outside the range the chip can represent
    OutOfRange,
    /// Unknown attribute or register target
    Unsupported,
    /// The self-test nibble of `OBSERVATION` did not read back as 0xF
    SelfTest(u8),
    /// The chip reported an unexpected product identifier
    InvalidProductId(u8),
    /// The power-up sequence has not completed
    NotReady,
}

impl<E> Error<E> {
    /// The same error with the bus error detail dropped
    pub fn erased(&self) -> Error<()> {
        match self {
            Error::Bus(_) => Error::Bus(()),
            Error::OutOfRange => Error::OutOfRange,
            Error::Unsupported => Error::Unsupported,
            Error::SelfTest(value) => Error::SelfTest(*value),
            Error::InvalidProductId(id) => Error::InvalidProductId(*id),
            Error::NotReady => Error::NotReady,
        }
    }
}

impl<E> From<ParamError> for Error<E> {
    fn from(err: ParamError) -> Self {
        match err {
            ParamError::OutOfRange => Error::OutOfRange,
            ParamError::Unsupported => Error::Unsupported,
        }
    }
}

/// Mutable per-device state
///
/// Only the init state machine, the sampling pipeline and attribute writes
/// touch it, and the host runs those one at a time on the same work queue.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) step: InitStep,
    pub(crate) fault: Option<Fault>,
    pub(crate) smart_flag: bool,
    pub(crate) motion: Accumulator,
    pub(crate) automouse: Option<Automouse>,
}

impl Session {
    fn new(config: &Config) -> Self {
        Session {
            step: InitStep::PowerUp,
            fault: None,
            smart_flag: false,
            motion: Accumulator::default(),
            automouse: config.automouse.map(Automouse::new),
        }
    }
}

/// PMW3610 top-level driver
///
/// Usage:
///
/// ```rust,ignore
/// let mut sensor = pmw3610::Pmw3610::new(spidev, delay, pmw3610::Config::default());
///
/// // Kick off the power-up sequence, the host runs `Job::Init` when due
/// sensor.start(&mut host);
///
/// // From the motion GPIO callback
/// sensor.on_motion_edge(&mut host);
///
/// // From the work queue
/// sensor.run_job(job, &mut host)?;
/// ```
pub struct Pmw3610<SPI, D> {
    ll: crate::ll::PMW3610<SPI>,
    delay: D,
    config: Config,
    session: Session,
}

impl<SPI, D> Pmw3610<SPI, D> {
    /// Create a driver instance
    ///
    /// No bus traffic happens until the power-up sequence is started.
    pub fn new(spi: SPI, delay: D, config: Config) -> Self {
        Pmw3610 {
            ll: crate::ll::PMW3610::new(spi),
            delay,
            session: Session::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current power-up step
    pub fn init_step(&self) -> InitStep {
        self.session.step
    }

    /// `true` once every power-up step has completed
    pub fn is_ready(&self) -> bool {
        self.session.step == InitStep::Ready
    }

    /// The failure that halted the power-up sequence, if any
    pub fn fault(&self) -> Option<Fault> {
        self.session.fault
    }

    /// Whether the chip's smart mode is currently switched on
    pub fn smart_mode_active(&self) -> bool {
        self.session.smart_flag
    }

    /// Whether the automouse layer is currently held by this sensor
    pub fn automouse_triggered(&self) -> bool {
        self.session
            .automouse
            .as_ref()
            .is_some_and(Automouse::is_triggered)
    }

    /// Direct low level access to the underlying peripheral
    pub fn ll(&mut self) -> &mut crate::ll::PMW3610<SPI> {
        &mut self.ll
    }

    pub fn release(self) -> (SPI, D) {
        (self.ll.release(), self.delay)
    }
}
