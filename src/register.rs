//! Register map
//!
//! The PMW3610 exposes two register pages. Page 1 is reached by writing
//! [`SPI_PAGE_SELECT`](page0::SPI_PAGE_SELECT) and only holds the resolution
//! register this driver needs. Registers are zero-sized marker types so that
//! the access direction is checked at compile time.
#![allow(non_camel_case_types)]

use bilge::prelude::*;
use bytemuck::{AnyBitPattern, NoUninit};
use paste::paste;

/// Set on the address byte of every write frame
pub const WRITE_BIT: u8 = 0x80;

/// Value of [`PRODUCT_ID`](page0::PRODUCT_ID) on a genuine PMW3610
pub const PRODUCT_ID: u8 = 0x3e;

/// Command written to [`POWER_UP_RESET`](page0::POWER_UP_RESET)
pub const POWER_UP_RESET_CMD: u8 = 0x5a;

pub const SPI_CLOCK_ENABLE: u8 = 0xba;
pub const SPI_CLOCK_DISABLE: u8 = 0xb5;

/// Time the serial clock needs after an enable request, in microseconds
pub const CLOCK_ON_DELAY_US: u32 = 300;

pub const SELECT_PAGE1: u8 = 0xff;
pub const SELECT_PAGE0: u8 = 0x00;

/// Self-test nibble reported in `OBSERVATION` once the chip passed
pub const SELF_TEST_PASSED: u8 = 0x0f;

/// Implemented for all registers
///
/// This is a mostly internal trait that should not be implemented by users of
/// this crate.
pub trait Register {
    /// The register address, without the write bit
    const ID: u8;
}

/// Marker trait for registers that can be read from
pub trait Readable: Register {}

/// Marker trait for registers that can be written to
pub trait Writable: Register {}

// Helper macro, used internally by `impl_register!`
macro_rules! impl_rw {
    (RO, $name:ident) => {
        impl Readable for $name {}
    };
    (WO, $name:ident) => {
        impl Writable for $name {}
    };
    (RW, $name:ident) => {
        impl Readable for $name {}
        impl Writable for $name {}
    };
}

/// Generates register marker types for one page
macro_rules! impl_register {
    (
        $page:ident,
        $(
            #[$doc:meta]
            $id:expr, $rw:tt, $name:ident;
        )*
    ) => {
        paste! {
            pub mod [<$page:lower>] {
                use super::*;

                $(
                    #[$doc]
                    pub struct $name;

                    impl Register for $name {
                        const ID: u8 = $id;
                    }

                    impl_rw!($rw, $name);
                )*
            }
        }
    };
}

impl_register! {
    Page0,
    /// Product identifier, reads [`PRODUCT_ID`](super::PRODUCT_ID)
    0x00, RO, PRODUCT_ID;
    /// Motion status, first of the delta registers
    0x02, RO, MOTION;
    /// Delta X, bits 7:0
    0x03, RO, DELTA_X_L;
    /// Delta Y, bits 7:0
    0x04, RO, DELTA_Y_L;
    /// Delta X bits 11:8 in the upper nibble, delta Y bits 11:8 in the lower
    0x05, RO, DELTA_XY_H;
    /// Motion burst, see [`MotionBurst`](super::MotionBurst)
    0x12, RO, BURST_READ;
    /// Run mode downshift time, in units of 8 position-mode periods
    0x1b, RW, RUN_DOWNSHIFT;
    /// Rest1 sample period, in 10 ms units
    0x1c, RW, REST1_RATE;
    /// Rest1 downshift time, in units of 16 rest1 periods
    0x1d, RW, REST1_DOWNSHIFT;
    /// Rest2 sample period, in 10 ms units
    0x1e, RW, REST2_RATE;
    /// Rest2 downshift time, in units of 128 rest2 periods
    0x1f, RW, REST2_DOWNSHIFT;
    /// Rest3 sample period, in 10 ms units
    0x20, RW, REST3_RATE;
    /// Observation, carries the self-test result in the low nibble
    0x2d, RW, OBSERVATION;
    /// Adaptive sensitivity ("smart") control
    0x32, RW, SMART_MODE;
    /// Power-up reset command register
    0x3a, WO, POWER_UP_RESET;
    /// Serial clock on/off request
    0x41, WO, SPI_CLK_ON_REQ;
    /// Page selection
    0x7f, WO, SPI_PAGE_SELECT;
}

impl_register! {
    Page1,
    /// Resolution in 200 CPI steps, bits 4:0
    0x05, RW, RES_STEP;
    /// Page selection
    0x7f, WO, SPI_PAGE_SELECT;
}

/// High nibbles of both motion deltas, as packed in `DELTA_XY_H`
#[bitsize(8)]
#[derive(DebugBits, FromBits, PartialEq, Clone, Copy)]
pub struct DeltaXyHigh {
    pub y: u4,
    pub x: u4,
}

/// `OBSERVATION` register layout
#[bitsize(8)]
#[derive(DebugBits, FromBits, PartialEq, Clone, Copy)]
pub struct Observation {
    pub self_test: u4,
    pub upper: u4,
}

/// Raw motion burst, in the order the chip shifts it out
#[derive(Debug, Clone, Copy, PartialEq, NoUninit, AnyBitPattern, Default)]
#[repr(C)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionBurst {
    pub motion: u8,
    pub delta_x_l: u8,
    pub delta_y_l: u8,
    pub delta_xy_h: u8,
    pub squal: u8,
    pub shutter_h: u8,
    pub shutter_l: u8,
}

impl MotionBurst {
    /// Full burst length, including the shutter bytes
    pub const LEN: usize = 7;

    /// Burst length when the shutter value is not needed
    pub const LEN_DELTAS: usize = 4;

    pub fn delta_xy_high(&self) -> DeltaXyHigh {
        DeltaXyHigh::from(self.delta_xy_h)
    }

    /// Raw 12-bit delta X
    pub fn raw_x(&self) -> u16 {
        ((self.delta_xy_high().x().value() as u16) << 8) | self.delta_x_l as u16
    }

    /// Raw 12-bit delta Y
    pub fn raw_y(&self) -> u16 {
        ((self.delta_xy_high().y().value() as u16) << 8) | self.delta_y_l as u16
    }

    /// 9-bit shutter value
    pub fn shutter(&self) -> u16 {
        (((self.shutter_h & 0x01) as u16) << 8) | self.shutter_l as u16
    }
}

// Assert that the size of the struct matches the burst length
const _SIZE_CHECK: usize = (core::mem::size_of::<MotionBurst>() == MotionBurst::LEN) as usize - 1;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_xy_high_nibbles() {
        let burst = MotionBurst {
            delta_x_l: 0x34,
            delta_y_l: 0x78,
            delta_xy_h: 0x25,
            ..Default::default()
        };
        assert_eq!(burst.delta_xy_high().x().value(), 0x2);
        assert_eq!(burst.delta_xy_high().y().value(), 0x5);
        assert_eq!(burst.raw_x(), 0x234);
        assert_eq!(burst.raw_y(), 0x578);
    }

    #[test]
    fn test_shutter_uses_bit_zero_of_high_byte() {
        let burst = MotionBurst {
            shutter_h: 0xfe,
            shutter_l: 0x2d,
            ..Default::default()
        };
        assert_eq!(burst.shutter(), 0x2d);

        let burst = MotionBurst {
            shutter_h: 0x01,
            shutter_l: 0x00,
            ..Default::default()
        };
        assert_eq!(burst.shutter(), 0x100);
    }

    #[test]
    fn test_observation_self_test_nibble() {
        assert_eq!(Observation::from(0xaf).self_test().value(), SELF_TEST_PASSED);
        assert_eq!(Observation::from(0x07).self_test().value(), 0x07);
    }

    #[test]
    fn test_register_ids() {
        assert_eq!(page0::BURST_READ::ID, 0x12);
        assert_eq!(page1::RES_STEP::ID, 0x05);
        assert_eq!(page0::SPI_PAGE_SELECT::ID, page1::SPI_PAGE_SELECT::ID);
    }
}
