//! Register protocol
//!
//! Every access is a single `SpiDevice` transaction. Reads shift out the
//! register address and then clock in the requested number of bytes, writes
//! send the address with [`WRITE_BIT`] set followed by the value.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Operation, SpiDevice};

use crate::register::{
    page0, page1, Readable, Register, Writable, CLOCK_ON_DELAY_US, SELECT_PAGE0, SELECT_PAGE1,
    SPI_CLOCK_DISABLE, SPI_CLOCK_ENABLE, WRITE_BIT,
};

pub struct PMW3610<BUS> {
    pub(crate) bus: BUS,
}

impl<BUS> PMW3610<BUS> {
    pub fn new(bus: BUS) -> Self {
        PMW3610 { bus }
    }

    /// Release the bus from the PMW3610 instance
    pub fn release(self) -> BUS {
        self.bus
    }
}

impl<BUS> PMW3610<BUS>
where
    BUS: SpiDevice<u8>,
{
    /// Read `buffer.len()` bytes starting at `addr`
    pub fn read_raw(&mut self, addr: u8, buffer: &mut [u8]) -> Result<(), BUS::Error> {
        self.bus
            .transaction(&mut [Operation::Write(&[addr & !WRITE_BIT]), Operation::Read(buffer)])
    }

    /// Write a single register
    pub fn write_raw(&mut self, addr: u8, value: u8) -> Result<(), BUS::Error> {
        self.bus.write(&[addr | WRITE_BIT, value])
    }

    /// Read from the register
    pub fn read<R>(&mut self) -> Result<u8, BUS::Error>
    where
        R: Register + Readable,
    {
        let mut value = [0u8];
        self.read_raw(R::ID, &mut value)?;
        Ok(value[0])
    }

    /// Burst read starting at the register
    pub fn read_burst<R>(&mut self, buffer: &mut [u8]) -> Result<(), BUS::Error>
    where
        R: Register + Readable,
    {
        self.read_raw(R::ID, buffer)
    }

    /// Write to the register
    pub fn write<R>(&mut self, value: u8) -> Result<(), BUS::Error>
    where
        R: Register + Writable,
    {
        self.write_raw(R::ID, value)
    }

    /// Run `f` with the serial clock forced on
    ///
    /// Some registers only latch while the chip's serial clock is running. The
    /// clock is requested, given [`CLOCK_ON_DELAY_US`] to settle, and released
    /// again afterwards. The release is attempted even if `f` failed, in which
    /// case the first error wins.
    pub fn with_clock_on<F>(&mut self, delay: &mut impl DelayNs, f: F) -> Result<(), BUS::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), BUS::Error>,
    {
        self.write::<page0::SPI_CLK_ON_REQ>(SPI_CLOCK_ENABLE)?;
        delay.delay_us(CLOCK_ON_DELAY_US);

        let result = f(self);
        let release = self.write::<page0::SPI_CLK_ON_REQ>(SPI_CLOCK_DISABLE);

        result.and(release)
    }

    /// Write a register that needs the serial clock running
    pub fn guarded_write_raw(
        &mut self,
        delay: &mut impl DelayNs,
        addr: u8,
        value: u8,
    ) -> Result<(), BUS::Error> {
        self.with_clock_on(delay, |ll| ll.write_raw(addr, value))
    }

    /// Typed variant of [`guarded_write_raw`](Self::guarded_write_raw)
    pub fn guarded_write<R>(
        &mut self,
        delay: &mut impl DelayNs,
        value: u8,
    ) -> Result<(), BUS::Error>
    where
        R: Register + Writable,
    {
        self.guarded_write_raw(delay, R::ID, value)
    }

    /// Program the page 1 resolution register
    ///
    /// Page select, resolution and page restore all happen inside one clock
    /// window.
    pub fn write_res_step(
        &mut self,
        delay: &mut impl DelayNs,
        value: u8,
    ) -> Result<(), BUS::Error> {
        self.with_clock_on(delay, |ll| {
            ll.write::<page0::SPI_PAGE_SELECT>(SELECT_PAGE1)?;
            ll.write::<page1::RES_STEP>(value)?;
            ll.write::<page1::SPI_PAGE_SELECT>(SELECT_PAGE0)
        })
    }
}
