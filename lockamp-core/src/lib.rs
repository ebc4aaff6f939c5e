#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Core traits and types for the SBT Instruments lock-in amplifier.
//!
//! This crate holds everything that both the driver and a hardware
//! backend (real or emulated) need to agree on: the layout of a
//! [`Sample`](sample::Sample) and a [`ChunkHeader`](chunk::ChunkHeader),
//! the register map, and the [`RegisterIo`](register::RegisterIo) seam.

/// Self-describing chunk header.
pub mod chunk;
/// Common constants.
pub mod defined;
/// Power domain collaborator.
pub mod power;
/// Register map and backend interface.
pub mod register;
/// Acquired sample layout.
pub mod sample;
/// Sleep strategies.
pub mod sleep;
/// Wall clock timestamps.
pub mod time;
