use lockamp_core::power::{PowerControl, PowerError, PowerState};

use crate::FPGAEmulator;

/// Power domain of an [`FPGAEmulator`].
///
/// Acquiring powers the emulator up if it was down. With auto power down
/// enabled, the last release cuts the power, wiping register state.
#[derive(Debug)]
pub struct EmulatedPower {
    fpga: FPGAEmulator,
    usage: usize,
    auto_power_down: bool,
}

impl EmulatedPower {
    /// Creates a power domain that keeps the device powered after release.
    #[must_use]
    pub const fn new(fpga: FPGAEmulator) -> Self {
        Self {
            fpga,
            usage: 0,
            auto_power_down: false,
        }
    }

    /// Powers the device down whenever the usage count drops to zero.
    #[must_use]
    pub const fn with_auto_power_down(mut self, auto_power_down: bool) -> Self {
        self.auto_power_down = auto_power_down;
        self
    }
}

impl PowerControl for EmulatedPower {
    fn acquire(&mut self) -> Result<PowerState, PowerError> {
        self.usage += 1;
        if self.fpga.is_powered() {
            return Ok(PowerState::Retained);
        }
        self.fpga.power_up();
        Ok(PowerState::Restored)
    }

    fn release(&mut self) {
        self.usage = self.usage.saturating_sub(1);
        if self.usage == 0 && self.auto_power_down {
            self.fpga.power_down();
        }
    }
}
