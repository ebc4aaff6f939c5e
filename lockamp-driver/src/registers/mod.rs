mod decimation;
mod fir;
mod generator;

use lockamp_core::{
    defined::{BASE_TIME_STEP_NS, DAC_DATA_BITS_MAX, FIR_TAPS},
    register::{
        control1, control2, Bank, RegisterIo, FIR_CYCLES_MASK, GENERATOR_SCALE_SHIFT,
    },
    sample::{Site, ENTRIES_PER_SAMPLE},
};

pub use fir::{FirCoefficients, FirFilter};
pub use generator::GeneratorStep;

use crate::error::LockAmpError;

/// Contents of the debug registers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugRegisters {
    /// Value of the first debug register.
    pub debug1: u32,
}

#[derive(Clone, Debug, Default)]
struct RegisterCache {
    hb_filters: Option<u32>,
    scale: [Option<i32>; 2],
    step: [Option<GeneratorStep>; 2],
    dac_data_bits: Option<u32>,
    debug1: Option<u32>,
    fir: Option<Box<FirCoefficients>>,
    fir_filter: Option<FirFilter>,
}

const fn scale_register(site: Site) -> (Bank, usize) {
    match site {
        Site::S0 => (Bank::Control1, control1::GEN1_SCALE),
        Site::S1 => (Bank::Control2, control2::GEN2_SCALE),
    }
}

const fn step_register(site: Site) -> usize {
    match site {
        Site::S0 => control2::GEN1_STEP,
        Site::S1 => control2::GEN2_STEP,
    }
}

/// Typed access to the device registers.
///
/// Every setter records the value it wrote so that [`LockAmpRegisters::resync`]
/// can restore the configuration after the device lost its state. Getters
/// always read the hardware.
pub struct LockAmpRegisters<B: RegisterIo> {
    io: B,
    cache: RegisterCache,
}

impl<B: RegisterIo> LockAmpRegisters<B> {
    /// Creates the register layer over a backend. Nothing is written.
    pub fn new(io: B) -> Self {
        Self {
            io,
            cache: RegisterCache::default(),
        }
    }

    /// Reads the hardware version.
    pub fn read_version(&mut self) -> Result<u32, LockAmpError> {
        Ok(self.io.read(Bank::Control1, control1::VERSION)?)
    }

    /// Number of complete samples in the FIFO. Trailing words of an
    /// incomplete sample are not counted.
    pub fn fifo_size_n(&mut self) -> Result<usize, LockAmpError> {
        let words = self.io.read(Bank::Control1, control1::FIFO_SIZE)? as usize;
        Ok(words / ENTRIES_PER_SAMPLE)
    }

    /// Pops one raw word from the FIFO.
    pub fn pop_word(&mut self) -> Result<i32, LockAmpError> {
        Ok(self.io.read(Bank::Control1, control1::FIFO_POP)? as i32)
    }

    /// Sets the decimation factor and the FIR cycle count that goes with it.
    pub fn set_decimation(&mut self, decimation: u32) -> Result<(), LockAmpError> {
        let hb = decimation::hb_filters(decimation)?;
        self.write_hb_filters(hb)?;
        self.cache.hb_filters = Some(hb);
        Ok(())
    }

    fn write_hb_filters(&mut self, hb: u32) -> Result<(), LockAmpError> {
        self.io.write(Bank::Control2, control2::HB_FILTERS, hb)?;
        self.io
            .write(Bank::Control2, control2::FIR_CYCLES, decimation::fir_cycles(hb))?;
        Ok(())
    }

    /// Reads the decimation factor.
    pub fn get_decimation(&mut self) -> Result<u32, LockAmpError> {
        let hb = self.io.read(Bank::Control2, control2::HB_FILTERS)?;
        Ok(1u32.wrapping_shl(hb))
    }

    /// Reads the FIR cycle count.
    pub fn fir_cycles(&mut self) -> Result<u32, LockAmpError> {
        Ok(self.io.read(Bank::Control2, control2::FIR_CYCLES)? & FIR_CYCLES_MASK)
    }

    /// Time between two samples at the current decimation.
    pub fn time_step_ns(&mut self) -> Result<u64, LockAmpError> {
        Ok(self.get_decimation()? as u64 * BASE_TIME_STEP_NS)
    }

    /// Acquisition time spanned by `size_n` samples.
    pub fn duration_ns(&mut self, size_n: usize) -> Result<u64, LockAmpError> {
        Ok(self.time_step_ns()? * size_n as u64)
    }

    /// Time it takes the hardware to fill half of a FIFO of `fifo_capacity_n` samples.
    pub fn read_delay_ns(&mut self, fifo_capacity_n: usize) -> Result<u64, LockAmpError> {
        self.duration_ns(fifo_capacity_n / 2)
    }

    /// Sets the scale of the generator that drives `site`.
    ///
    /// Scales within the dead zone around zero are written as zero.
    pub fn set_generator_scale(&mut self, site: Site, value: i32) -> Result<(), LockAmpError> {
        let value = generator::effective_scale(value)?;
        self.write_generator_scale(site, value)?;
        self.cache.scale[site.idx()] = Some(value);
        Ok(())
    }

    fn write_generator_scale(&mut self, site: Site, value: i32) -> Result<(), LockAmpError> {
        let (bank, offset) = scale_register(site);
        self.io
            .write(bank, offset, (value << GENERATOR_SCALE_SHIFT) as u32)?;
        Ok(())
    }

    /// Reads the scale of the generator that drives `site`.
    pub fn generator_scale(&mut self, site: Site) -> Result<i32, LockAmpError> {
        let (bank, offset) = scale_register(site);
        Ok((self.io.read(bank, offset)? as i32) >> GENERATOR_SCALE_SHIFT)
    }

    /// Sets the phase accumulator step of the generator that drives `site`.
    pub fn set_generator_step(
        &mut self,
        site: Site,
        integer: u16,
        fraction: u16,
    ) -> Result<(), LockAmpError> {
        let step = GeneratorStep::new()
            .with_integer(integer)
            .with_fraction(fraction);
        self.io
            .write(Bank::Control2, step_register(site), step.into_bits())?;
        self.cache.step[site.idx()] = Some(step);
        Ok(())
    }

    /// Reads the phase accumulator step of the generator that drives `site`.
    pub fn generator_step(&mut self, site: Site) -> Result<GeneratorStep, LockAmpError> {
        Ok(GeneratorStep::from_bits(
            self.io.read(Bank::Control2, step_register(site))?,
        ))
    }

    /// Uploads a full FIR coefficient table.
    pub fn set_fir_coefficients(&mut self, taps: &FirCoefficients) -> Result<(), LockAmpError> {
        self.write_fir(taps)?;
        self.cache.fir = Some(Box::new(*taps));
        self.cache.fir_filter = None;
        Ok(())
    }

    fn write_fir(&mut self, taps: &FirCoefficients) -> Result<(), LockAmpError> {
        taps.iter()
            .enumerate()
            .try_for_each(|(i, &tap)| self.io.write(Bank::Fir, i, tap as u32))?;
        Ok(())
    }

    /// Reads back the FIR coefficient table.
    pub fn fir_coefficients(&mut self) -> Result<FirCoefficients, LockAmpError> {
        let mut taps = [0; FIR_TAPS];
        taps.iter_mut().enumerate().try_for_each(|(i, tap)| {
            *tap = self.io.read(Bank::Fir, i)? as i32;
            Ok::<_, LockAmpError>(())
        })?;
        Ok(taps)
    }

    /// Uploads the coefficient table of a preset.
    pub fn set_fir_filter(&mut self, filter: FirFilter) -> Result<(), LockAmpError> {
        self.set_fir_coefficients(&filter.coefficients())?;
        self.cache.fir_filter = Some(filter);
        Ok(())
    }

    /// The preset that was uploaded last, or `None` if no preset was
    /// uploaded or a custom table replaced it.
    #[must_use]
    pub const fn fir_filter(&self) -> Option<FirFilter> {
        self.cache.fir_filter
    }

    /// Sets the DAC output bit width.
    pub fn set_dac_data_bits(&mut self, bits: u32) -> Result<(), LockAmpError> {
        LockAmpError::check_range("DAC data bits", bits, 0, DAC_DATA_BITS_MAX)?;
        self.io.write(Bank::Control2, control2::DAC_DATA_BITS, bits)?;
        self.cache.dac_data_bits = Some(bits);
        Ok(())
    }

    /// Reads the DAC output bit width.
    pub fn dac_data_bits(&mut self) -> Result<u32, LockAmpError> {
        Ok(self.io.read(Bank::Control2, control2::DAC_DATA_BITS)?)
    }

    /// Sets the first debug register.
    pub fn set_debug1(&mut self, value: u32) -> Result<(), LockAmpError> {
        self.io.write(Bank::Control2, control2::DEBUG1, value)?;
        self.cache.debug1 = Some(value);
        Ok(())
    }

    /// Reads the first debug register.
    pub fn debug1(&mut self) -> Result<u32, LockAmpError> {
        Ok(self.io.read(Bank::Control2, control2::DEBUG1)?)
    }

    /// Reads all debug registers.
    pub fn read_debug_registers(&mut self) -> Result<DebugRegisters, LockAmpError> {
        Ok(DebugRegisters {
            debug1: self.debug1()?,
        })
    }

    /// Restarts the raw ADC capture readout.
    pub fn reset_adc_dump(&mut self) -> Result<(), LockAmpError> {
        Ok(self.io.write(Bank::Control1, control1::ADC_DUMP, 0)?)
    }

    /// Pops one raw ADC word.
    pub fn pop_adc_word(&mut self) -> Result<i32, LockAmpError> {
        Ok(self.io.read(Bank::Control1, control1::ADC_DUMP)? as i32)
    }

    /// Writes every recorded setting back to the hardware.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resync(&mut self) -> Result<(), LockAmpError> {
        let cache = self.cache.clone();
        if let Some(hb) = cache.hb_filters {
            self.write_hb_filters(hb)?;
        }
        Site::ALL.into_iter().try_for_each(|site| {
            if let Some(scale) = cache.scale[site.idx()] {
                self.write_generator_scale(site, scale)?;
            }
            if let Some(step) = cache.step[site.idx()] {
                self.io
                    .write(Bank::Control2, step_register(site), step.into_bits())?;
            }
            Ok::<_, LockAmpError>(())
        })?;
        if let Some(bits) = cache.dac_data_bits {
            self.io.write(Bank::Control2, control2::DAC_DATA_BITS, bits)?;
        }
        if let Some(value) = cache.debug1 {
            self.io.write(Bank::Control2, control2::DEBUG1, value)?;
        }
        if let Some(fir) = cache.fir {
            self.write_fir(&fir)?;
        }
        Ok(())
    }
}
