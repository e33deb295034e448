//! Glue between the host's interrupt and work queue and the driver
//!
//! The motion edge handler only masks the interrupt and queues a sample job,
//! everything touching the bus runs from the work queue.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

use crate::host::{Host, Job, MotionInterrupt, WorkQueue};
use crate::init::{InitStep, Progress};
use crate::{Error, Pmw3610};

impl<SPI, D> Pmw3610<SPI, D>
where
    SPI: SpiDevice<u8>,
    D: DelayNs,
{
    /// Queue the first power-up step
    pub fn start<Q: WorkQueue>(&mut self, queue: &mut Q) {
        let delay_ms = InitStep::PowerUp.delay_before_ms(self.config.power_up_extra_delay_ms);
        queue.schedule(Job::Init, delay_ms);
    }

    /// Motion interrupt handler
    ///
    /// Safe to call from interrupt context, it does not touch the bus.
    pub fn on_motion_edge<H>(&self, host: &mut H)
    where
        H: MotionInterrupt + WorkQueue,
    {
        host.set_enabled(false);
        host.submit(Job::Sample);
    }

    /// Run a job previously queued by the driver
    pub fn run_job<H: Host>(&mut self, job: Job, host: &mut H) -> Result<(), Error<SPI::Error>> {
        match job {
            Job::Init => {
                if self.is_ready() {
                    return Ok(());
                }
                match self.advance()? {
                    Progress::Pending { delay_ms, .. } => host.schedule(Job::Init, delay_ms),
                    Progress::Ready => host.set_enabled(true),
                }
                Ok(())
            }
            Job::Sample => {
                let result = self.sample(host);
                host.set_enabled(true);
                result
            }
            Job::AutomouseTimeout => {
                if let Some(automouse) = self.session.automouse.as_mut() {
                    automouse.on_timeout(host);
                }
                Ok(())
            }
        }
    }

    /// Run the whole power-up sequence, waiting between steps with `delay`
    ///
    /// Enables the motion interrupt once the sensor is ready.
    #[cfg(feature = "async")]
    pub async fn initialize<I>(
        &mut self,
        mut delay: impl embedded_hal_async::delay::DelayNs,
        irq: &mut I,
    ) -> Result<(), Error<SPI::Error>>
    where
        I: MotionInterrupt,
    {
        let mut delay_ms = self
            .session
            .step
            .delay_before_ms(self.config.power_up_extra_delay_ms);
        loop {
            delay.delay_ms(delay_ms).await;
            match self.advance()? {
                Progress::Pending { delay_ms: next, .. } => delay_ms = next,
                Progress::Ready => {
                    irq.set_enabled(true);
                    return Ok(());
                }
            }
        }
    }
}
