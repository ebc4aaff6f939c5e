use thiserror::Error;
use time::OffsetDateTime;

/// The date time cannot be represented as a [`SysTime`].
#[derive(Error, Debug, PartialEq, Clone)]
#[error("Invalid date time")]
pub struct InvalidDateTime;

/// Wall clock time in nanoseconds since the Unix epoch.
///
/// Chunk timestamps are expressed in this unit. It is expressed as a 64-bit
/// unsigned integer and can represent about 584 years of time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(C)]
pub struct SysTime {
    ns: u64,
}

impl SysTime {
    /// The Unix epoch.
    pub const ZERO: Self = Self { ns: 0 };

    /// Creates a new instance from nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn from_nanos(ns: u64) -> Self {
        Self { ns }
    }

    /// Returns the time in nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.ns
    }

    /// Creates a new instance from UTC time.
    pub fn from_utc(utc: OffsetDateTime) -> Result<Self, InvalidDateTime> {
        Ok(Self {
            ns: u64::try_from(utc.unix_timestamp_nanos()).map_err(|_| InvalidDateTime)?,
        })
    }

    /// Returns the current wall clock time.
    ///
    /// A clock set before the Unix epoch reads as [`SysTime::ZERO`].
    #[must_use]
    pub fn now() -> Self {
        Self::from_utc(OffsetDateTime::now_utc()).unwrap_or(Self::ZERO)
    }

    /// Returns the time advanced by `ns` nanoseconds, wrapping on overflow.
    #[must_use]
    pub const fn wrapping_add_nanos(self, ns: u64) -> Self {
        Self {
            ns: self.ns.wrapping_add(ns),
        }
    }
}
