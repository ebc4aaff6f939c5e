use lockamp_core::{
    register::RegisterIo,
    sample::{Sample, SiteSample, ENTRIES_PER_SITE, SITES_PER_SAMPLE},
};

use crate::{error::LockAmpError, registers::LockAmpRegisters};

/// Integer gain applied to every component of a site.
pub type SampleMultipliers = [i32; SITES_PER_SAMPLE];

/// Default multipliers, which leave samples unchanged.
pub const DEFAULT_SAMPLE_MULTIPLIERS: SampleMultipliers = [1; SITES_PER_SAMPLE];

/// A source of complete samples.
pub trait SampleSource {
    /// Capacity of the source in samples.
    fn capacity_n(&self) -> usize;

    /// Number of complete samples ready to be popped.
    fn size_n(&mut self) -> Result<usize, LockAmpError>;

    /// Pops one sample.
    fn pop_sample(&mut self) -> Result<Sample, LockAmpError>;
}

/// The hardware FIFO seen as a [`SampleSource`].
pub struct Fifo<'a, B: RegisterIo> {
    regs: &'a mut LockAmpRegisters<B>,
    multipliers: &'a SampleMultipliers,
    capacity_n: usize,
}

impl<'a, B: RegisterIo> Fifo<'a, B> {
    /// Creates a view of the FIFO of `capacity_n` samples.
    pub fn new(
        regs: &'a mut LockAmpRegisters<B>,
        multipliers: &'a SampleMultipliers,
        capacity_n: usize,
    ) -> Self {
        Self {
            regs,
            multipliers,
            capacity_n,
        }
    }
}

impl<B: RegisterIo> SampleSource for Fifo<'_, B> {
    fn capacity_n(&self) -> usize {
        self.capacity_n
    }

    fn size_n(&mut self) -> Result<usize, LockAmpError> {
        self.regs.fifo_size_n()
    }

    fn pop_sample(&mut self) -> Result<Sample, LockAmpError> {
        pop_sample(self.regs, self.multipliers)
    }
}

/// Reads one sample worth of words from the FIFO.
///
/// Words arrive site-major, each site in `hf_re, hf_im, lf_re, lf_im` order.
/// Every component is multiplied by the multiplier of its site. An empty
/// FIFO yields whatever the hardware returns, usually zeros.
pub fn pop_sample<B: RegisterIo>(
    regs: &mut LockAmpRegisters<B>,
    multipliers: &SampleMultipliers,
) -> Result<Sample, LockAmpError> {
    let mut sample = Sample::default();
    sample
        .sites
        .iter_mut()
        .zip(multipliers.iter())
        .try_for_each(|(site, &m)| {
            let mut entries = [0; ENTRIES_PER_SITE];
            entries.iter_mut().try_for_each(|e| {
                *e = regs.pop_word()?.wrapping_mul(m);
                Ok::<_, LockAmpError>(())
            })?;
            *site = SiteSample::from_entries(entries);
            Ok::<_, LockAmpError>(())
        })?;
    Ok(sample)
}
