use crate::sample::Sample;

/// The sample period at decimation factor 1 in nanoseconds.
///
/// The time step is exact, that is, it has no fractional part.
pub const BASE_TIME_STEP_NS: u64 = 2728;

/// Size of the hardware FIFO in bytes.
pub const FIFO_CAPACITY_BYTES: usize = 131072;

/// Size of the hardware FIFO in 32-bit words.
pub const FIFO_CAPACITY_S32: usize = FIFO_CAPACITY_BYTES / core::mem::size_of::<i32>();

/// Size of the hardware FIFO in complete samples.
pub const FIFO_CAPACITY_N: usize = FIFO_CAPACITY_BYTES / core::mem::size_of::<Sample>();

/// Default size of the signal buffer in bytes (4 MiB).
pub const SIGNAL_BUF_CAPACITY_BYTES: usize = 4194304;

/// Default capacity of the signal buffer in samples.
pub const SIGNAL_BUF_CAPACITY_N: usize = SIGNAL_BUF_CAPACITY_BYTES / core::mem::size_of::<Sample>();

/// Minimum generator scale.
pub const GENERATOR_SCALE_MIN: i32 = 0;

/// Maximum generator scale (maximum of a signed 18-bit integer).
pub const GENERATOR_SCALE_MAX: i32 = 131071;

/// Generator scales whose magnitude is at or below this value are written as zero.
pub const GENERATOR_SCALE_SENSITIVITY_THRESHOLD: i32 = 42;

/// Maximum DAC output bit width.
pub const DAC_DATA_BITS_MAX: u32 = 31;

/// Number of taps in a FIR coefficient table.
pub const FIR_TAPS: usize = 512;

/// Upper bound of the FIR cycle count register.
pub const FIR_CYCLES_MAX: u32 = 511;

/// Number of 32-bit words in a raw ADC capture.
pub const ADC_SAMPLES_SIZE_S32: usize = 16384;

/// Size of a raw ADC capture in bytes.
pub const ADC_SAMPLES_SIZE: usize = ADC_SAMPLES_SIZE_S32 * core::mem::size_of::<i32>();

/// Largest amplitude of the demodulated signal scaled by ten.
pub const SIGNAL_MAX_AMPLITUDE_E1: i32 = 1784331945;
