use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use lockamp_core::{
    defined::ADC_SAMPLES_SIZE_S32,
    power::{PowerControl, PowerState},
    register::RegisterIo,
    sample::{Sample, Site},
};
use zerocopy::IntoBytes;

use crate::{
    buffer::{CircularSampleBuffer, Consumer, Producer},
    codec::{Fifo, SampleMultipliers, DEFAULT_SAMPLE_MULTIPLIERS},
    desync::DesyncCounter,
    diagnostics::{Diagnostics, DiagnosticsSnapshot},
    drain::MovingAverage,
    error::LockAmpError,
    option::{DrainOption, LockAmpOption},
    pm::SuspendGuard,
    registers::{DebugRegisters, FirCoefficients, FirFilter, GeneratorStep, LockAmpRegisters},
    session::Session,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State touched by every hardware access that moves samples.
///
/// Holding its lock keeps the drain task and the reader away from the
/// hardware, which is what suspend relies on.
pub(crate) struct Activity {
    pub producer: Producer,
    pub multipliers: SampleMultipliers,
}

/// State shared with the drain thread.
pub(crate) struct Shared<B: RegisterIo> {
    activity: Mutex<Activity>,
    registers: Mutex<LockAmpRegisters<B>>,
    pub desyncs: DesyncCounter,
    pub diagnostics: Diagnostics,
    pub fifo_capacity_n: usize,
}

impl<B: RegisterIo> Shared<B> {
    pub fn activity(&self) -> MutexGuard<'_, Activity> {
        lock(&self.activity)
    }

    pub fn registers(&self) -> MutexGuard<'_, LockAmpRegisters<B>> {
        lock(&self.registers)
    }

    /// Moves the FIFO contents into the signal buffer.
    pub fn drain(&self, ma: &mut MovingAverage) -> Result<usize, LockAmpError> {
        let mut activity = self.activity();
        let Activity {
            producer,
            multipliers,
        } = &mut *activity;
        let mut regs = self.registers();
        let mut fifo = Fifo::new(&mut regs, multipliers, self.fifo_capacity_n);
        let size_n = producer.move_available_from_fifo(&mut fifo, &self.desyncs)?;
        let ma_time_step_ns = ma.update(size_n);
        self.diagnostics
            .ma_time_step_ns
            .store(ma_time_step_ns, std::sync::atomic::Ordering::Relaxed);
        Ok(size_n)
    }

    /// Time the hardware takes to fill half of the FIFO.
    pub fn read_delay(&self) -> Result<Duration, LockAmpError> {
        Ok(Duration::from_nanos(
            self.registers().read_delay_ns(self.fifo_capacity_n)?,
        ))
    }
}

/// The lock-in amplifier device.
///
/// Configuration methods may be called at any time, also while a
/// [`Session`] is open. At most one session is open at a time.
pub struct LockAmp<B: RegisterIo + 'static> {
    pub(crate) shared: Arc<Shared<B>>,
    consumer: Mutex<Consumer>,
    reader_open: AtomicBool,
    adc_scratch: Mutex<Vec<i32>>,
    power: Mutex<Box<dyn PowerControl>>,
    pub(crate) drain_option: DrainOption,
    resume_settle: Duration,
    signal_buf_capacity_n: usize,
}

impl<B: RegisterIo + 'static> std::fmt::Debug for LockAmp<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockAmp")
            .field("signal_buf_capacity_n", &self.signal_buf_capacity_n)
            .field("fifo_capacity_n", &self.shared.fifo_capacity_n)
            .field("is_open", &self.is_open())
            .finish()
    }
}

impl<B: RegisterIo + 'static> LockAmp<B> {
    /// Attaches to the device behind `io`.
    ///
    /// The signal buffer is allocated here and lives as long as the device.
    #[tracing::instrument(level = "debug", skip(io))]
    pub fn attach(io: B, option: LockAmpOption) -> Result<Self, LockAmpError> {
        let LockAmpOption {
            signal_buf_capacity_n,
            fifo_capacity_n,
            drain,
            resume_settle,
            mut power,
        } = option;
        let (producer, consumer) = CircularSampleBuffer::new(signal_buf_capacity_n)?.split();
        let mut registers = LockAmpRegisters::new(io);

        power.acquire()?;
        let version = registers.read_version();
        power.release();
        tracing::info!("Lock-in amplifier version {:#010x}", version?);

        Ok(Self {
            shared: Arc::new(Shared {
                activity: Mutex::new(Activity {
                    producer,
                    multipliers: DEFAULT_SAMPLE_MULTIPLIERS,
                }),
                registers: Mutex::new(registers),
                desyncs: DesyncCounter::new(),
                diagnostics: Diagnostics::default(),
                fifo_capacity_n,
            }),
            consumer: Mutex::new(consumer),
            reader_open: AtomicBool::new(false),
            adc_scratch: Mutex::new(vec![0; ADC_SAMPLES_SIZE_S32]),
            power: Mutex::new(power),
            drain_option: drain,
            resume_settle,
            signal_buf_capacity_n,
        })
    }

    pub(crate) fn claim_reader(&self) -> Result<(), LockAmpError> {
        self.reader_open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| LockAmpError::Busy)
    }

    pub(crate) fn release_reader(&self) {
        self.reader_open.store(false, Ordering::Release);
    }

    /// Only the session that claimed the reader locks this, so it is never contended.
    pub(crate) fn consumer(&self) -> MutexGuard<'_, Consumer> {
        lock(&self.consumer)
    }

    /// Acquires the power domain. On error the domain is left released.
    pub(crate) fn acquire_power(&self) -> Result<(), LockAmpError> {
        let state = lock(&self.power).acquire()?;
        if state == PowerState::Restored {
            tracing::debug!("Device was powered up, resynchronising registers");
            if let Err(e) = self.resync() {
                self.release_power();
                return Err(e);
            }
        }
        Ok(())
    }

    pub(crate) fn release_power(&self) {
        lock(&self.power).release();
    }

    pub(crate) fn activity(&self) -> MutexGuard<'_, Activity> {
        self.shared.activity()
    }

    fn registers(&self) -> MutexGuard<'_, LockAmpRegisters<B>> {
        self.shared.registers()
    }

    /// Opens the single reader session.
    ///
    /// Fails with [`LockAmpError::Busy`] if a session is already open.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn open(&self) -> Result<Session<'_, B>, LockAmpError> {
        self.claim_reader()?;
        Session::open(self)
    }

    /// Whether a reader session is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.reader_open.load(Ordering::Acquire)
    }

    /// Reads the hardware version.
    pub fn read_version(&self) -> Result<u32, LockAmpError> {
        self.registers().read_version()
    }

    /// Sets the decimation factor. Accepts 1, 2, 4, 8 and 16.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_decimation(&self, decimation: u32) -> Result<(), LockAmpError> {
        self.registers().set_decimation(decimation)
    }

    /// Reads the decimation factor.
    pub fn get_decimation(&self) -> Result<u32, LockAmpError> {
        self.registers().get_decimation()
    }

    /// Reads the FIR cycle count derived from the decimation.
    pub fn fir_cycles(&self) -> Result<u32, LockAmpError> {
        self.registers().fir_cycles()
    }

    /// Time between two samples.
    pub fn time_step_ns(&self) -> Result<u64, LockAmpError> {
        self.registers().time_step_ns()
    }

    /// Acquisition time spanned by `size_n` samples.
    pub fn duration_ns(&self, size_n: usize) -> Result<u64, LockAmpError> {
        self.registers().duration_ns(size_n)
    }

    /// Target interval between two FIFO drains.
    pub fn read_delay_ns(&self) -> Result<u64, LockAmpError> {
        self.registers().read_delay_ns(self.shared.fifo_capacity_n)
    }

    /// Sets the scale of the generator that drives `site`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_generator_scale(&self, site: Site, value: i32) -> Result<(), LockAmpError> {
        self.registers().set_generator_scale(site, value)
    }

    /// Reads the scale of the generator that drives `site`.
    pub fn get_generator_scale(&self, site: Site) -> Result<i32, LockAmpError> {
        self.registers().generator_scale(site)
    }

    /// Sets the phase accumulator step of the generator that drives `site`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_generator_step(
        &self,
        site: Site,
        integer: u16,
        fraction: u16,
    ) -> Result<(), LockAmpError> {
        self.registers().set_generator_step(site, integer, fraction)
    }

    /// Reads the phase accumulator step of the generator that drives `site`.
    pub fn get_generator_step(&self, site: Site) -> Result<GeneratorStep, LockAmpError> {
        self.registers().generator_step(site)
    }

    /// Uploads the coefficient table of a FIR preset.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_fir_filter(&self, filter: FirFilter) -> Result<(), LockAmpError> {
        self.registers().set_fir_filter(filter)
    }

    /// The active FIR preset, if the table was set from one.
    #[must_use]
    pub fn fir_filter(&self) -> Option<FirFilter> {
        self.registers().fir_filter()
    }

    /// Uploads a custom FIR coefficient table.
    pub fn set_fir_coefficients(&self, taps: &FirCoefficients) -> Result<(), LockAmpError> {
        self.registers().set_fir_coefficients(taps)
    }

    /// Reads back the FIR coefficient table.
    pub fn fir_coefficients(&self) -> Result<FirCoefficients, LockAmpError> {
        self.registers().fir_coefficients()
    }

    /// Sets the DAC output bit width (0 to 31).
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_dac_data_bits(&self, bits: u32) -> Result<(), LockAmpError> {
        self.registers().set_dac_data_bits(bits)
    }

    /// Reads the DAC output bit width.
    pub fn get_dac_data_bits(&self) -> Result<u32, LockAmpError> {
        self.registers().dac_data_bits()
    }

    /// Sets the first debug register.
    pub fn set_debug1(&self, value: u32) -> Result<(), LockAmpError> {
        self.registers().set_debug1(value)
    }

    /// Reads the first debug register.
    pub fn get_debug1(&self) -> Result<u32, LockAmpError> {
        self.registers().debug1()
    }

    /// Reads all debug registers.
    pub fn read_debug_registers(&self) -> Result<DebugRegisters, LockAmpError> {
        self.registers().read_debug_registers()
    }

    /// Sets the integer gain applied to every component of `site`.
    ///
    /// Takes effect from the next drain on.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_sample_multiplier(&self, site: Site, multiplier: i32) {
        self.activity().multipliers[site.idx()] = multiplier;
    }

    /// The integer gain applied to every component of `site`.
    #[must_use]
    pub fn get_sample_multiplier(&self, site: Site) -> i32 {
        self.activity().multipliers[site.idx()]
    }

    /// Copies raw ADC words, as native endian bytes, starting at byte `offset`.
    ///
    /// A read at offset zero captures a fresh set of words from the hardware,
    /// which waits while the device is suspended. Returns the number of bytes
    /// copied, zero past the end.
    pub fn read_adc_samples(&self, offset: usize, buf: &mut [u8]) -> Result<usize, LockAmpError> {
        let mut scratch = lock(&self.adc_scratch);
        if offset == 0 {
            let _activity = self.activity();
            let mut regs = self.registers();
            regs.reset_adc_dump()?;
            scratch.iter_mut().try_for_each(|w| {
                *w = regs.pop_adc_word()?;
                Ok::<_, LockAmpError>(())
            })?;
        }
        let bytes = scratch.as_bytes();
        let Some(src) = bytes.get(offset..) else {
            return Ok(0);
        };
        let n = src.len().min(buf.len());
        buf[..n].copy_from_slice(&src[..n]);
        Ok(n)
    }

    /// Number of detected data loss events.
    #[must_use]
    pub fn desyncs(&self) -> u32 {
        self.shared.desyncs.load()
    }

    /// Capacity of the signal buffer in bytes.
    #[must_use]
    pub const fn signal_buf_capacity_bytes(&self) -> usize {
        self.signal_buf_capacity_n * size_of::<Sample>()
    }

    /// Snapshot of the runtime diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.shared
            .diagnostics
            .snapshot(self.desyncs(), self.signal_buf_capacity_bytes())
    }

    /// Writes every recorded setting back to the hardware.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resync(&self) -> Result<(), LockAmpError> {
        self.registers().resync()
    }

    /// Called when the device resumes from runtime suspend.
    pub fn runtime_resume(&self) -> Result<(), LockAmpError> {
        self.resync()
    }

    /// Stops all hardware access until the returned guard is resumed or dropped.
    ///
    /// Waits for a drain or read in progress to finish.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn suspend(&self) -> SuspendGuard<'_, B> {
        SuspendGuard::new(self, self.activity(), self.resume_settle)
    }
}
