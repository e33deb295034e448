//! Runtime attributes
//!
//! Resolution and power-saving timings can be changed once the sensor is
//! ready. Values are validated before anything is written.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

use crate::codec::{self, ParamError};
use crate::register::{page0, Register};
use crate::{Error, Pmw3610};

/// Settable sensor attributes
///
/// The discriminants are the raw attribute ids accepted by
/// [`Pmw3610::set_attribute_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Attribute {
    /// Resolution in counts per inch
    Cpi = 0,
    /// Run mode downshift time in milliseconds
    RunDownshiftTime = 1,
    Rest1DownshiftTime = 2,
    Rest2DownshiftTime = 3,
    /// Rest1 sample period in milliseconds
    Rest1SampleTime = 4,
    Rest2SampleTime = 5,
    Rest3SampleTime = 6,
}

impl TryFrom<u8> for Attribute {
    type Error = ParamError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Ok(match id {
            0 => Attribute::Cpi,
            1 => Attribute::RunDownshiftTime,
            2 => Attribute::Rest1DownshiftTime,
            3 => Attribute::Rest2DownshiftTime,
            4 => Attribute::Rest1SampleTime,
            5 => Attribute::Rest2SampleTime,
            6 => Attribute::Rest3SampleTime,
            _ => {
                error!("Unknown attribute {}", id);
                return Err(ParamError::Unsupported);
            }
        })
    }
}

impl<SPI, D> Pmw3610<SPI, D>
where
    SPI: SpiDevice<u8>,
    D: DelayNs,
{
    /// Change an attribute on a ready sensor
    ///
    /// A value outside the attribute's range is rejected with
    /// [`Error::OutOfRange`] before any bus access.
    pub fn set_attribute(&mut self, attr: Attribute, value: u32) -> Result<(), Error<SPI::Error>> {
        if !self.is_ready() {
            debug!("Device is not initialized yet");
            return Err(Error::NotReady);
        }

        match attr {
            Attribute::Cpi => self.apply_cpi(value),
            Attribute::RunDownshiftTime => {
                self.apply_downshift_time(page0::RUN_DOWNSHIFT::ID, value)
            }
            Attribute::Rest1DownshiftTime => {
                self.apply_downshift_time(page0::REST1_DOWNSHIFT::ID, value)
            }
            Attribute::Rest2DownshiftTime => {
                self.apply_downshift_time(page0::REST2_DOWNSHIFT::ID, value)
            }
            Attribute::Rest1SampleTime => self.apply_sample_time(page0::REST1_RATE::ID, value),
            Attribute::Rest2SampleTime => self.apply_sample_time(page0::REST2_RATE::ID, value),
            Attribute::Rest3SampleTime => self.apply_sample_time(page0::REST3_RATE::ID, value),
        }
    }

    /// [`set_attribute`](Self::set_attribute) addressed by raw attribute id
    pub fn set_attribute_raw(&mut self, id: u8, value: u32) -> Result<(), Error<SPI::Error>> {
        if !self.is_ready() {
            debug!("Device is not initialized yet");
            return Err(Error::NotReady);
        }
        self.set_attribute(Attribute::try_from(id)?, value)
    }

    pub(crate) fn apply_cpi(&mut self, cpi: u32) -> Result<(), Error<SPI::Error>> {
        let value = codec::encode_cpi(cpi)?;
        info!("Setting CPI to {} (reg value {:#x})", cpi, value);

        self.ll
            .write_res_step(&mut self.delay, value)
            .map_err(|err| {
                error!("Failed to set CPI");
                Error::Bus(err)
            })
    }

    pub(crate) fn apply_downshift_time(
        &mut self,
        reg: u8,
        ms: u32,
    ) -> Result<(), Error<SPI::Error>> {
        let value = codec::encode_downshift_time(reg, ms, &self.config.rest_rates())?;
        info!("Set downshift time to {} ms (reg value {:#x})", ms, value);

        self.ll
            .guarded_write_raw(&mut self.delay, reg, value)
            .map_err(|err| {
                error!("Failed to change downshift time");
                Error::Bus(err)
            })
    }

    pub(crate) fn apply_sample_time(&mut self, reg: u8, ms: u32) -> Result<(), Error<SPI::Error>> {
        let value = codec::encode_sample_time(ms)?;
        info!("Set sample time to {} ms (reg value {:#x})", ms, value);

        self.ll
            .guarded_write_raw(&mut self.delay, reg, value)
            .map_err(|err| {
                error!("Failed to change sample time");
                Error::Bus(err)
            })
    }
}
