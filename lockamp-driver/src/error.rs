use lockamp_core::{power::PowerError, register::RegisterError};
use thiserror::Error;

/// A interface for error handling in lockamp-driver.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum LockAmpError {
    /// Decimation factor is not supported by the hardware.
    #[error("Decimation factor ({0}) must be one of 1, 2, 4, 8, 16")]
    InvalidDecimation(u32),
    /// A configuration value is out of range.
    #[error("{name} ({value}) is out of range ([{min}, {max}])")]
    OutOfRange {
        /// Name of the parameter.
        name: &'static str,
        /// Rejected value.
        value: i64,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },
    /// A reader session is already open.
    #[error("Another reader session is already open")]
    Busy,
    /// The read buffer cannot hold a chunk header.
    #[error("Read buffer ({0} bytes) is too small to hold a chunk header")]
    InvalidArgument(usize),
    /// The sample stream cannot be written to.
    #[error("Sample stream is read-only")]
    PermissionDenied,
    /// Signal buffer capacity is not a power of two.
    #[error("Signal buffer capacity ({0}) must be a power of two and at least 2")]
    InvalidBufferCapacity(usize),
    /// FIR filter name is unknown.
    #[error("Unknown FIR filter \"{0}\"")]
    UnknownFirFilter(String),
    /// Failed to spawn the drain thread.
    #[error("Failed to spawn drain thread: {0}")]
    ThreadSpawn(String),

    /// Error in the register backend.
    #[error("{0}")]
    Register(#[from] RegisterError),
    /// Error in the power domain.
    #[error("{0}")]
    Power(#[from] PowerError),
}

impl LockAmpError {
    pub(crate) fn check_range(
        name: &'static str,
        value: impl Into<i64>,
        min: impl Into<i64>,
        max: impl Into<i64>,
    ) -> Result<(), LockAmpError> {
        let (value, min, max) = (value.into(), min.into(), max.into());
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(LockAmpError::OutOfRange {
                name,
                value,
                min,
                max,
            })
        }
    }
}

impl From<LockAmpError> for std::io::Error {
    fn from(e: LockAmpError) -> Self {
        let kind = match e {
            LockAmpError::Busy => std::io::ErrorKind::ResourceBusy,
            LockAmpError::PermissionDenied => std::io::ErrorKind::PermissionDenied,
            LockAmpError::InvalidArgument(_)
            | LockAmpError::InvalidDecimation(_)
            | LockAmpError::OutOfRange { .. }
            | LockAmpError::InvalidBufferCapacity(_)
            | LockAmpError::UnknownFirFilter(_) => std::io::ErrorKind::InvalidInput,
            _ => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, e)
    }
}
