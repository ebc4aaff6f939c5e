#![cfg_attr(docsrs, feature(doc_cfg))]

//! Software emulation of the lock-in amplifier FPGA.

mod fpga;
mod power;

pub use fpga::{FPGAEmulator, EMULATED_VERSION};
pub use power::EmulatedPower;
