//! Motion sampling
//!
//! One cycle per motion interrupt: burst read, 12-bit delta decoding, axis
//! transform, optional smart mode update, accumulation and report emission.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

use crate::host::{Axis, Clock, Keymap, MotionEvent, MotionSink, WorkQueue};
use crate::register::{page0, MotionBurst};
use crate::{Config, Error, Pmw3610};

/// Shutter value at which the smart mode flips
pub const SHUTTER_SMART_THRESHOLD: u16 = 45;

/// `SMART_MODE` value while the shutter is above the threshold
const SMART_MODE_HIGH_SHUTTER: u8 = 0x80;
/// `SMART_MODE` value while the shutter is below the threshold
const SMART_MODE_LOW_SHUTTER: u8 = 0x00;

/// Sign-extend a 12-bit two's complement value
pub fn sign_extend_12(raw: u16) -> i16 {
    ((raw << 4) as i16) >> 4
}

/// Decoded motion of a single burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Delta {
    pub x: i16,
    pub y: i16,
}

impl Delta {
    pub fn from_burst(burst: &MotionBurst) -> Self {
        Delta {
            x: sign_extend_12(burst.raw_x()),
            y: sign_extend_12(burst.raw_y()),
        }
    }

    /// Apply the configured axis swap, then the per-axis inversion
    pub fn oriented(self, config: &Config) -> Self {
        let Delta { mut x, mut y } = self;
        if config.swap_xy {
            core::mem::swap(&mut x, &mut y);
        }
        if config.invert_x {
            x = x.saturating_neg();
        }
        if config.invert_y {
            y = y.saturating_neg();
        }
        Delta { x, y }
    }

    /// `|x| + |y|`
    pub fn magnitude(&self) -> u32 {
        self.x.unsigned_abs() as u32 + self.y.unsigned_abs() as u32
    }
}

/// Motion due for reporting, already clamped to the event range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    pub x: i16,
    pub y: i16,
}

impl Report {
    /// One event per non-zero axis, X first
    pub fn events(&self) -> impl Iterator<Item = MotionEvent> {
        let have_y = self.y != 0;
        let x = (self.x != 0).then_some(MotionEvent {
            axis: Axis::X,
            value: self.x,
            last_in_batch: !have_y,
        });
        let y = have_y.then_some(MotionEvent {
            axis: Axis::Y,
            value: self.y,
            last_in_batch: true,
        });
        [x, y].into_iter().flatten()
    }
}

/// Motion that has been sampled but not reported yet
///
/// Two clocks are kept: pending motion older than the minimum report
/// interval (measured from the previous sample) is dropped, while emission is
/// throttled against the previous report.
#[derive(Debug, Default)]
pub struct Accumulator {
    dx: i64,
    dy: i64,
    last_sample_ms: u64,
    last_report_ms: u64,
}

impl Accumulator {
    /// Add a sample taken at `now_ms` and return the report due, if any
    ///
    /// `interval_ms == 0` disables both the purge and the throttling.
    pub fn push(&mut self, delta: Delta, now_ms: u64, interval_ms: u32) -> Option<Report> {
        let interval = interval_ms as u64;

        if interval > 0 {
            if now_ms.saturating_sub(self.last_sample_ms) >= interval {
                self.dx = 0;
                self.dy = 0;
            }
            self.last_sample_ms = now_ms;
        }

        self.dx = self.dx.saturating_add(delta.x as i64);
        self.dy = self.dy.saturating_add(delta.y as i64);

        if interval > 0 && now_ms.saturating_sub(self.last_report_ms) < interval {
            return None;
        }

        let report = Report {
            x: self.dx.clamp(i16::MIN as i64, i16::MAX as i64) as i16,
            y: self.dy.clamp(i16::MIN as i64, i16::MAX as i64) as i16,
        };
        if report.x == 0 && report.y == 0 {
            return None;
        }

        if interval > 0 {
            self.last_report_ms = now_ms;
        }
        self.dx = 0;
        self.dy = 0;
        Some(report)
    }

    /// Motion accumulated but not reported yet
    pub fn pending(&self) -> (i64, i64) {
        (self.dx, self.dy)
    }
}

impl<SPI, D> Pmw3610<SPI, D>
where
    SPI: SpiDevice<u8>,
    D: DelayNs,
{
    /// Run one sampling cycle
    ///
    /// Expects the motion interrupt to be masked by the caller for the whole
    /// cycle. A failed burst read aborts the cycle and leaves pending motion
    /// as it was. A failed smart mode write is logged and does not drop the
    /// sample.
    pub fn sample<H>(&mut self, host: &mut H) -> Result<(), Error<SPI::Error>>
    where
        H: Clock + MotionSink + Keymap + WorkQueue,
    {
        if !self.is_ready() {
            warn!("Device is not initialized yet");
            return Err(Error::NotReady);
        }

        let len = if self.config.smart_algorithm {
            MotionBurst::LEN
        } else {
            MotionBurst::LEN_DELTAS
        };
        let mut raw = [0u8; MotionBurst::LEN];
        self.ll
            .read_burst::<page0::BURST_READ>(&mut raw[..len])
            .map_err(Error::Bus)?;
        let burst = *bytemuck::from_bytes::<MotionBurst>(&raw);

        let delta = Delta::from_burst(&burst).oriented(&self.config);
        trace!("PMW3610 motion x: {}, y: {}", delta.x, delta.y);

        if let Some(automouse) = self.session.automouse.as_mut() {
            automouse.on_motion(&delta, host);
        }

        if self.config.smart_algorithm {
            self.update_smart_mode(burst.shutter());
        }

        let now_ms = host.uptime_ms();
        if let Some(report) = self
            .session
            .motion
            .push(delta, now_ms, self.config.report_interval_min_ms)
        {
            for event in report.events() {
                host.report(event);
            }
        }

        Ok(())
    }

    /// Motion accumulated but not reported yet
    pub fn pending_motion(&self) -> (i64, i64) {
        self.session.motion.pending()
    }

    /// Flip the chip's smart mode when the shutter crosses the threshold
    ///
    /// A failed write leaves the flag as it was, so the next sample past the
    /// threshold tries again. The sample itself is still reported.
    fn update_smart_mode(&mut self, shutter: u16) {
        let high_shutter = match self.session.smart_flag {
            true if shutter < SHUTTER_SMART_THRESHOLD => false,
            false if shutter > SHUTTER_SMART_THRESHOLD => true,
            _ => return,
        };
        let value = if high_shutter {
            SMART_MODE_HIGH_SHUTTER
        } else {
            SMART_MODE_LOW_SHUTTER
        };

        debug!("PMW3610 shutter {}, smart mode {:#x}", shutter, value);
        if self
            .ll
            .guarded_write::<page0::SMART_MODE>(&mut self.delay, value)
            .is_err()
        {
            warn!("Failed to set smart mode {:#x}", value);
            return;
        }
        self.session.smart_flag = high_shutter;
    }
}
