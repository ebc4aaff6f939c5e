use bitfield_struct::bitfield;
use lockamp_core::defined::{
    GENERATOR_SCALE_MAX, GENERATOR_SCALE_MIN, GENERATOR_SCALE_SENSITIVITY_THRESHOLD,
};

use crate::error::LockAmpError;

/// Phase accumulator step of a signal generator.
///
/// The step is a 16.16 fixed-point number: the integer part is in the upper
/// half of the register, the fractional part in the lower half.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct GeneratorStep {
    /// Fractional part.
    pub fraction: u16,
    /// Integer part.
    pub integer: u16,
}

/// Validates a generator scale and applies the dead zone.
///
/// Scales close to zero are not reproduced linearly by the hardware, so
/// magnitudes at or below the sensitivity threshold are written as zero.
pub(crate) fn effective_scale(value: i32) -> Result<i32, LockAmpError> {
    LockAmpError::check_range(
        "generator scale",
        value,
        GENERATOR_SCALE_MIN,
        GENERATOR_SCALE_MAX,
    )?;
    Ok(if value.abs() <= GENERATOR_SCALE_SENSITIVITY_THRESHOLD {
        0
    } else {
        value
    })
}
