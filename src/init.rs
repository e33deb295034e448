//! Power-up sequence
//!
//! The chip needs several milliseconds between the power-up steps. Instead of
//! sleeping, every step reports the settle time the next one needs and the
//! host decides how to wait (a delayed work item, an async timer, ...).

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

use crate::register::{
    page0, Observation, Register, POWER_UP_RESET_CMD, PRODUCT_ID, SELF_TEST_PASSED,
};
use crate::{Error, Pmw3610};

/// Power-up steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
    /// Issue the power-up reset command
    PowerUp,
    /// Clear `OBSERVATION` so the self-test result can be observed
    ClearSelfTest,
    /// Check the self-test result and the product id
    CheckSelfTest,
    /// Drain stale motion and program resolution, downshift and rest rates
    Configure,
    /// Terminal step, the sensor is operational
    Ready,
}

impl InitStep {
    pub fn next(self) -> Self {
        match self {
            InitStep::PowerUp => InitStep::ClearSelfTest,
            InitStep::ClearSelfTest => InitStep::CheckSelfTest,
            InitStep::CheckSelfTest => InitStep::Configure,
            InitStep::Configure | InitStep::Ready => InitStep::Ready,
        }
    }

    /// Time that has to pass before this step may run, in milliseconds
    pub fn delay_before_ms(self, power_up_extra_delay_ms: u32) -> u32 {
        match self {
            // >10 ms after power is applied
            InitStep::PowerUp => 10 + power_up_extra_delay_ms,
            // The datasheet asks for 150 us, which is not enough in practice
            // once the reset from the previous step is accounted for
            InitStep::ClearSelfTest => 200,
            // 10 ms per datasheet, boards sharing the supply with a display
            // need considerably more
            InitStep::CheckSelfTest => 50,
            InitStep::Configure | InitStep::Ready => 0,
        }
    }
}

/// Outcome of a successful [`Pmw3610::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    /// Run [`Pmw3610::advance`] again once `delay_ms` have passed
    Pending { next: InitStep, delay_ms: u32 },
    /// The sensor is ready, the motion interrupt may be enabled
    Ready,
}

/// A failed power-up step
///
/// Initialization does not retry. The sensor stays not ready until it is
/// reset and a new driver instance is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fault {
    pub step: InitStep,
    pub error: Error<()>,
}

impl<SPI, D> Pmw3610<SPI, D>
where
    SPI: SpiDevice<u8>,
    D: DelayNs,
{
    /// Run the current power-up step
    ///
    /// On success the session moves to the next step. A failure is recorded
    /// in [`fault`](Pmw3610::fault) and halts the sequence: every later call
    /// returns [`Error::NotReady`].
    pub fn advance(&mut self) -> Result<Progress, Error<SPI::Error>> {
        if self.session.fault.is_some() {
            return Err(Error::NotReady);
        }

        let step = self.session.step;
        info!("PMW3610 init step {:?}", step);

        let result = match step {
            InitStep::PowerUp => self.power_up(),
            InitStep::ClearSelfTest => self.clear_self_test(),
            InitStep::CheckSelfTest => self.check_self_test(),
            InitStep::Configure => self.configure(),
            InitStep::Ready => return Ok(Progress::Ready),
        };

        if let Err(err) = result {
            error!("PMW3610 initialization failed in step {:?}", step);
            self.session.fault = Some(Fault {
                step,
                error: err.erased(),
            });
            return Err(err);
        }

        let next = step.next();
        self.session.step = next;

        if next == InitStep::Ready {
            info!("PMW3610 initialized");
            Ok(Progress::Ready)
        } else {
            Ok(Progress::Pending {
                next,
                delay_ms: next.delay_before_ms(self.config.power_up_extra_delay_ms),
            })
        }
    }

    fn power_up(&mut self) -> Result<(), Error<SPI::Error>> {
        self.ll
            .write::<page0::POWER_UP_RESET>(POWER_UP_RESET_CMD)
            .map_err(Error::Bus)
    }

    fn clear_self_test(&mut self) -> Result<(), Error<SPI::Error>> {
        self.ll
            .guarded_write::<page0::OBSERVATION>(&mut self.delay, 0x00)
            .map_err(Error::Bus)
    }

    fn check_self_test(&mut self) -> Result<(), Error<SPI::Error>> {
        let raw = self.ll.read::<page0::OBSERVATION>().map_err(Error::Bus)?;
        if Observation::from(raw).self_test().value() != SELF_TEST_PASSED {
            error!("Failed self-test ({:#x})", raw);
            return Err(Error::SelfTest(raw));
        }

        let product_id = self.ll.read::<page0::PRODUCT_ID>().map_err(Error::Bus)?;
        if product_id != PRODUCT_ID {
            error!(
                "Incorrect product id {:#x} (expecting {:#x})",
                product_id, PRODUCT_ID
            );
            return Err(Error::InvalidProductId(product_id));
        }

        Ok(())
    }

    fn configure(&mut self) -> Result<(), Error<SPI::Error>> {
        // Motion registers have to be read once before the first burst
        self.ll.read::<page0::MOTION>().map_err(Error::Bus)?;
        self.ll.read::<page0::DELTA_X_L>().map_err(Error::Bus)?;
        self.ll.read::<page0::DELTA_Y_L>().map_err(Error::Bus)?;
        self.ll.read::<page0::DELTA_XY_H>().map_err(Error::Bus)?;

        let config = self.config;
        self.apply_cpi(config.cpi)?;

        self.apply_downshift_time(page0::RUN_DOWNSHIFT::ID, config.run_downshift_time_ms)?;
        self.apply_downshift_time(page0::REST1_DOWNSHIFT::ID, config.rest1_downshift_time_ms)?;
        self.apply_downshift_time(page0::REST2_DOWNSHIFT::ID, config.rest2_downshift_time_ms)?;

        self.apply_sample_time(page0::REST1_RATE::ID, config.rest1_sample_time_ms)?;
        self.apply_sample_time(page0::REST2_RATE::ID, config.rest2_sample_time_ms)?;
        self.apply_sample_time(page0::REST3_RATE::ID, config.rest3_sample_time_ms)
    }
}
