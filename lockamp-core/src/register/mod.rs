mod error;

pub use error::RegisterError;

/// Register banks of the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bank {
    /// Version, FIFO and ADC capture registers. Also holds the first generator scale.
    Control1,
    /// Generator, filter, DAC and debug registers.
    Control2,
    /// FIR coefficient table.
    Fir,
}

/// Register offsets of [`Bank::Control1`].
pub mod control1 {
    /// Hardware version.
    pub const VERSION: usize = 0;
    /// FIFO occupancy in 32-bit words.
    pub const FIFO_SIZE: usize = 1;
    /// Reading pops one 32-bit word from the FIFO.
    pub const FIFO_POP: usize = 2;
    /// Scale of the first generator, left-shifted by [`GENERATOR_SCALE_SHIFT`](super::GENERATOR_SCALE_SHIFT).
    pub const GEN1_SCALE: usize = 3;
    /// Writing any value restarts the ADC capture readout; reading pops one raw ADC word.
    pub const ADC_DUMP: usize = 4;
}

/// Register offsets of [`Bank::Control2`].
pub mod control2 {
    /// Phase accumulator step of the first generator.
    pub const GEN1_STEP: usize = 1;
    /// Phase accumulator step of the second generator.
    pub const GEN2_STEP: usize = 2;
    /// DAC output bit width.
    pub const DAC_DATA_BITS: usize = 3;
    /// Number of enabled half-band filters.
    pub const HB_FILTERS: usize = 4;
    /// FIR cycle count.
    pub const FIR_CYCLES: usize = 5;
    /// Debug register.
    pub const DEBUG1: usize = 6;
    /// Scale of the second generator, left-shifted by [`GENERATOR_SCALE_SHIFT`](super::GENERATOR_SCALE_SHIFT).
    pub const GEN2_SCALE: usize = 7;
}

/// Number of registers in [`Bank::Control1`].
pub const CONTROL1_SIZE: usize = 8;
/// Number of registers in [`Bank::Control2`].
pub const CONTROL2_SIZE: usize = 8;
/// Number of registers in [`Bank::Fir`].
pub const FIR_SIZE: usize = crate::defined::FIR_TAPS;

/// Bit position of the generator scale inside its register.
pub const GENERATOR_SCALE_SHIFT: u32 = 14;

/// Mask of the FIR cycle count register.
pub const FIR_CYCLES_MASK: u32 = 0x1FF;

/// Raw access to the device registers.
///
/// Reads may have side effects: reading [`control1::FIFO_POP`] consumes a
/// word from the FIFO and reading [`control1::ADC_DUMP`] advances the ADC
/// capture readout.
pub trait RegisterIo: Send {
    /// Reads a register.
    fn read(&mut self, bank: Bank, offset: usize) -> Result<u32, RegisterError>;

    /// Writes a register.
    fn write(&mut self, bank: Bank, offset: usize, value: u32) -> Result<(), RegisterError>;
}

impl RegisterIo for Box<dyn RegisterIo> {
    fn read(&mut self, bank: Bank, offset: usize) -> Result<u32, RegisterError> {
        self.as_mut().read(bank, offset)
    }

    fn write(&mut self, bank: Bank, offset: usize, value: u32) -> Result<(), RegisterError> {
        self.as_mut().write(bank, offset, value)
    }
}

/// Returns the number of registers in the bank.
#[must_use]
pub const fn bank_size(bank: Bank) -> usize {
    match bank {
        Bank::Control1 => CONTROL1_SIZE,
        Bank::Control2 => CONTROL2_SIZE,
        Bank::Fir => FIR_SIZE,
    }
}
