//! Parameter codec
//!
//! Conversions between engineering units and register values. None of these
//! touch the bus, so a rejected value never results in a partial write.

use crate::register::{page0, Register};

/// Smallest supported resolution, also the resolution step
pub const CPI_STEP: u32 = 200;
pub const CPI_MIN: u32 = 200;
pub const CPI_MAX: u32 = 3200;

/// Rest sample periods are programmed in 10 ms units
pub const SAMPLE_TIME_UNIT_MS: u32 = 10;
pub const SAMPLE_TIME_MIN_MS: u32 = 10;
pub const SAMPLE_TIME_MAX_MS: u32 = 2550;

/// Run downshift counts 8 position-mode periods, fixed at 4 ms each
pub const RUN_DOWNSHIFT_UNIT_MS: u32 = 8 * 4;

const REST1_DOWNSHIFT_PERIODS: u32 = 16;
const REST2_DOWNSHIFT_PERIODS: u32 = 128;

/// A parameter could not be converted into a register value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    /// The value is outside the register's numeric domain
    OutOfRange,
    /// The target register has no such parameter
    Unsupported,
}

/// Rest sample periods the rest downshift units are derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RestRates {
    pub rest1_ms: u32,
    pub rest2_ms: u32,
}

/// Encode a resolution for `RES_STEP`
///
/// `cpi` must be a multiple of [`CPI_STEP`] within
/// [`CPI_MIN`]`..=`[`CPI_MAX`].
pub fn encode_cpi(cpi: u32) -> Result<u8, ParamError> {
    if !(CPI_MIN..=CPI_MAX).contains(&cpi) || cpi % CPI_STEP != 0 {
        warn!("CPI value {} out of range", cpi);
        return Err(ParamError::OutOfRange);
    }
    Ok((cpi / CPI_STEP) as u8)
}

pub fn decode_cpi(value: u8) -> u32 {
    value as u32 * CPI_STEP
}

/// Encode a rest sample period
///
/// The chip treats a register value of 0 as 1; since the lower bound is one
/// unit this encoder never produces 0.
pub fn encode_sample_time(ms: u32) -> Result<u8, ParamError> {
    if !(SAMPLE_TIME_MIN_MS..=SAMPLE_TIME_MAX_MS).contains(&ms) {
        warn!(
            "Sample time {} out of range [{}, {}]",
            ms, SAMPLE_TIME_MIN_MS, SAMPLE_TIME_MAX_MS
        );
        return Err(ParamError::OutOfRange);
    }
    Ok((ms / SAMPLE_TIME_UNIT_MS) as u8)
}

pub fn decode_sample_time(value: u8) -> u32 {
    value.max(1) as u32 * SAMPLE_TIME_UNIT_MS
}

/// Milliseconds represented by one unit of the downshift register `reg`
pub fn downshift_unit_ms(reg: u8, rates: &RestRates) -> Result<u32, ParamError> {
    match reg {
        page0::RUN_DOWNSHIFT::ID => Ok(RUN_DOWNSHIFT_UNIT_MS),
        page0::REST1_DOWNSHIFT::ID => Ok(REST1_DOWNSHIFT_PERIODS.saturating_mul(rates.rest1_ms)),
        page0::REST2_DOWNSHIFT::ID => Ok(REST2_DOWNSHIFT_PERIODS.saturating_mul(rates.rest2_ms)),
        _ => {
            error!("Register {:#x} has no downshift time", reg);
            Err(ParamError::Unsupported)
        }
    }
}

/// Encode a downshift time for one of the three downshift registers
///
/// The valid range is one to 255 units, where the unit depends on the
/// register (see [`downshift_unit_ms`]).
pub fn encode_downshift_time(reg: u8, ms: u32, rates: &RestRates) -> Result<u8, ParamError> {
    let unit = downshift_unit_ms(reg, rates)?;
    if unit == 0 {
        return Err(ParamError::OutOfRange);
    }

    let max = unit.saturating_mul(u8::MAX as u32);
    if !(unit..=max).contains(&ms) {
        warn!("Downshift time {} out of range ({} - {})", ms, unit, max);
        return Err(ParamError::OutOfRange);
    }
    Ok((ms / unit) as u8)
}

pub fn decode_downshift_time(reg: u8, value: u8, rates: &RestRates) -> Result<u32, ParamError> {
    Ok(downshift_unit_ms(reg, rates)?.saturating_mul(value as u32))
}

#[cfg(test)]
mod test {
    use super::*;

    const RATES: RestRates = RestRates {
        rest1_ms: 40,
        rest2_ms: 100,
    };

    #[test]
    fn test_cpi_valid() {
        assert_eq!(encode_cpi(200), Ok(0x01));
        assert_eq!(encode_cpi(600), Ok(0x03));
        assert_eq!(encode_cpi(3200), Ok(0x10));
        assert_eq!(decode_cpi(0x03), 600);
    }

    #[test]
    fn test_cpi_rejects_everything_else() {
        for cpi in [0, 100, 199, 201, 250, 3100, 3400, u32::MAX] {
            assert_eq!(encode_cpi(cpi), Err(ParamError::OutOfRange), "cpi {}", cpi);
        }
        for cpi in (CPI_MIN..=CPI_MAX).filter(|c| c % CPI_STEP != 0) {
            assert_eq!(encode_cpi(cpi), Err(ParamError::OutOfRange));
        }
    }

    #[test]
    fn test_sample_time() {
        assert_eq!(encode_sample_time(10), Ok(1));
        assert_eq!(encode_sample_time(45), Ok(4));
        assert_eq!(encode_sample_time(2550), Ok(255));
        assert_eq!(encode_sample_time(9), Err(ParamError::OutOfRange));
        assert_eq!(encode_sample_time(2551), Err(ParamError::OutOfRange));
        assert_eq!(decode_sample_time(0), 10);
    }

    #[test]
    fn test_run_downshift_minimum() {
        let reg = page0::RUN_DOWNSHIFT::ID;
        assert_eq!(encode_downshift_time(reg, 32, &RATES), Ok(1));
        assert_eq!(encode_downshift_time(reg, 8160, &RATES), Ok(255));
        assert_eq!(encode_downshift_time(reg, 31, &RATES), Err(ParamError::OutOfRange));
        assert_eq!(encode_downshift_time(reg, 8161, &RATES), Err(ParamError::OutOfRange));
    }

    #[test]
    fn test_downshift_rounds_down_to_unit() {
        for (reg, ms) in [
            (page0::RUN_DOWNSHIFT::ID, 128),
            (page0::RUN_DOWNSHIFT::ID, 100),
            (page0::REST1_DOWNSHIFT::ID, 9220),
            (page0::REST2_DOWNSHIFT::ID, 150_000),
        ] {
            let unit = downshift_unit_ms(reg, &RATES).unwrap();
            let value = encode_downshift_time(reg, ms, &RATES).unwrap();
            assert_eq!(decode_downshift_time(reg, value, &RATES), Ok(ms / unit * unit));
        }
    }

    #[test]
    fn test_rest_downshift_units_follow_rates() {
        assert_eq!(downshift_unit_ms(page0::REST1_DOWNSHIFT::ID, &RATES), Ok(640));
        assert_eq!(downshift_unit_ms(page0::REST2_DOWNSHIFT::ID, &RATES), Ok(12_800));

        let slow = RestRates {
            rest1_ms: 100,
            rest2_ms: 100,
        };
        let reg = page0::REST1_DOWNSHIFT::ID;
        assert_eq!(encode_downshift_time(reg, 640, &RATES), Ok(1));
        assert_eq!(encode_downshift_time(reg, 640, &slow), Err(ParamError::OutOfRange));
    }

    #[test]
    fn test_downshift_unknown_register() {
        assert_eq!(
            encode_downshift_time(page0::REST1_RATE::ID, 1000, &RATES),
            Err(ParamError::Unsupported)
        );
    }
}
