#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Acquisition driver for the SBT Instruments lock-in amplifier.
//!
//! A [`LockAmp`] owns the register layer and a [`CircularSampleBuffer`].
//! Opening a [`Session`] starts a realtime thread that drains the hardware
//! FIFO into the buffer. Each read on the session returns one chunk: a
//! [`ChunkHeader`](lockamp_core::chunk::ChunkHeader) followed by as many
//! whole [`Sample`](lockamp_core::sample::Sample)s as fit.

/// Circular sample buffer.
pub mod buffer;
/// FIFO word to sample conversion.
pub mod codec;
/// Data loss tracking.
pub mod desync;
/// Runtime diagnostics.
pub mod diagnostics;
/// FIFO drain scheduling.
pub mod drain;
/// Error types.
pub mod error;
/// Configuration.
pub mod option;
/// Suspend and resume.
pub mod pm;
/// Typed register access.
pub mod registers;

mod device;
mod session;

pub use buffer::CircularSampleBuffer;
pub use device::LockAmp;
pub use error::LockAmpError;
pub use option::{DrainOption, LockAmpOption};
pub use registers::{FirFilter, GeneratorStep};
pub use session::Session;

pub use lockamp_core as core;
