mod memory;
mod stream;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lockamp_core::{
    defined::FIFO_CAPACITY_S32,
    register::{Bank, RegisterError, RegisterIo},
    sample::Sample,
};

use memory::Memory;

/// Version word reported by the emulated hardware.
pub const EMULATED_VERSION: u32 = 0x0002_0001;

/// Emulated FPGA.
///
/// Clones share the same device, so a test can keep a handle for
/// inspection and feeding while the driver owns another.
#[derive(Clone)]
pub struct FPGAEmulator {
    mem: Arc<Mutex<Memory>>,
}

impl std::fmt::Debug for FPGAEmulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mem = self.mem();
        f.debug_struct("FPGAEmulator")
            .field("powered", &mem.is_powered())
            .field("fifo_len", &mem.fifo_len())
            .finish()
    }
}

impl Default for FPGAEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl FPGAEmulator {
    /// Creates an emulator with the FIFO capacity of the real device.
    #[must_use]
    pub fn new() -> Self {
        Self::with_fifo_capacity(FIFO_CAPACITY_S32)
    }

    /// Creates an emulator whose FIFO holds `words` 32-bit words.
    #[must_use]
    pub fn with_fifo_capacity(words: usize) -> Self {
        Self {
            mem: Arc::new(Mutex::new(Memory::new(words))),
        }
    }

    fn mem(&self) -> MutexGuard<'_, Memory> {
        self.mem.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes raw words into the FIFO. Words that do not fit are dropped.
    ///
    /// Returns the number of words accepted.
    pub fn push_words(&self, words: &[i32]) -> usize {
        let mut mem = self.mem();
        words.iter().filter(|&&w| mem.push_word(w)).count()
    }

    /// Pushes a complete sample into the FIFO. The sample is dropped if it does not fit.
    pub fn push_sample(&self, sample: &Sample) -> bool {
        self.mem().push_sample(sample)
    }

    /// Pushes samples into the FIFO. Returns the number of samples accepted.
    pub fn push_samples<'a>(&self, samples: impl IntoIterator<Item = &'a Sample>) -> usize {
        let mut mem = self.mem();
        samples.into_iter().filter(|s| mem.push_sample(s)).count()
    }

    /// Number of words currently in the FIFO.
    #[must_use]
    pub fn fifo_len(&self) -> usize {
        self.mem().fifo_len()
    }

    /// Number of words dropped because the FIFO was full.
    #[must_use]
    pub fn fifo_dropped(&self) -> u64 {
        self.mem().fifo_dropped()
    }

    /// Starts producing sentinel samples in real time.
    ///
    /// The `k`-th sample since the start has all components equal to `k`.
    pub fn start_stream(&self) {
        self.mem().start_stream();
    }

    /// Stops the real-time stream.
    pub fn stop_stream(&self) {
        self.mem().stop_stream();
    }

    /// Number of samples produced by the running stream, if any.
    #[must_use]
    pub fn streamed(&self) -> Option<u64> {
        self.mem().streamed()
    }

    /// Replaces the raw ADC capture. Missing words are zero.
    pub fn set_adc_samples(&self, samples: &[i32]) {
        self.mem().set_adc(samples);
    }

    /// Returns a register value without side effects.
    #[must_use]
    pub fn register(&self, bank: Bank, offset: usize) -> u32 {
        self.mem().peek(bank, offset)
    }

    /// Returns the FIR coefficient table.
    #[must_use]
    pub fn fir(&self) -> Vec<i32> {
        self.mem().fir()
    }

    /// Cuts the clock. All registers and the FIFO return to their reset state
    /// and register access fails until [`FPGAEmulator::power_up`].
    pub fn power_down(&self) {
        self.mem().power_down();
    }

    /// Restores the clock.
    pub fn power_up(&self) {
        self.mem().power_up();
    }

    /// Whether the device is powered.
    #[must_use]
    pub fn is_powered(&self) -> bool {
        self.mem().is_powered()
    }
}

impl RegisterIo for FPGAEmulator {
    fn read(&mut self, bank: Bank, offset: usize) -> Result<u32, RegisterError> {
        self.mem().read(bank, offset)
    }

    fn write(&mut self, bank: Bank, offset: usize, value: u32) -> Result<(), RegisterError> {
        self.mem().write(bank, offset, value)
    }
}
