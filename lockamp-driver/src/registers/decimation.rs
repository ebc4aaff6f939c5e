use lockamp_core::defined::FIR_CYCLES_MAX;

use crate::error::LockAmpError;

/// Returns the number of half-band filters that realise `decimation`.
pub(crate) fn hb_filters(decimation: u32) -> Result<u32, LockAmpError> {
    match decimation {
        1 | 2 | 4 | 8 | 16 => Ok(decimation.trailing_zeros()),
        _ => Err(LockAmpError::InvalidDecimation(decimation)),
    }
}

/// Returns the FIR cycle count that matches the given number of half-band filters.
pub(crate) fn fir_cycles(hb_filters: u32) -> u32 {
    (341 * (1 << hb_filters) / 8 - 6).min(FIR_CYCLES_MAX)
}
