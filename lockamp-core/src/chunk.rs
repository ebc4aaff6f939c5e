use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{sample::Sample, time::SysTime};

/// Header that precedes every batch of samples handed to a reader.
///
/// The fields are in native byte order. Sample `i` (zero-based) of the chunk
/// was acquired at `last_start_time_ns + i * time_step_ns`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout,
)]
#[repr(C)]
pub struct ChunkHeader {
    /// Timestamp of the first sample in the chunk.
    pub last_start_time_ns: u64,
    /// Time between consecutive samples.
    pub time_step_ns: u64,
}

impl ChunkHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = core::mem::size_of::<Self>();

    /// Creates a new header.
    #[must_use]
    pub const fn new(last_start_time: SysTime, time_step_ns: u64) -> Self {
        Self {
            last_start_time_ns: last_start_time.as_nanos(),
            time_step_ns,
        }
    }

    /// Returns the number of whole samples that fit after the header in a
    /// buffer of `buf_len` bytes, or `None` if the header itself does not fit.
    #[must_use]
    pub const fn capacity_for(buf_len: usize) -> Option<usize> {
        if buf_len < Self::SIZE {
            return None;
        }
        Some((buf_len - Self::SIZE) / core::mem::size_of::<Sample>())
    }
}
