use std::{sync::MutexGuard, time::Duration};

use lockamp_core::register::RegisterIo;

use crate::{
    device::{Activity, LockAmp},
    error::LockAmpError,
};

/// Keeps the drain task and the reader off the hardware while the device
/// is suspended.
///
/// Obtained from [`LockAmp::suspend`]. The hardware loses its state while
/// the clock is off, so [`SuspendGuard::resume`] writes the configuration
/// back before access is allowed again. Dropping the guard without resuming
/// releases access without touching the hardware.
#[must_use = "hardware access is blocked until the guard is resumed or dropped"]
pub struct SuspendGuard<'a, B: RegisterIo + 'static> {
    lockamp: &'a LockAmp<B>,
    _activity: MutexGuard<'a, Activity>,
    settle: Duration,
}

impl<'a, B: RegisterIo + 'static> SuspendGuard<'a, B> {
    pub(crate) fn new(
        lockamp: &'a LockAmp<B>,
        activity: MutexGuard<'a, Activity>,
        settle: Duration,
    ) -> Self {
        tracing::debug!("Suspended");
        Self {
            lockamp,
            _activity: activity,
            settle,
        }
    }

    /// Waits for the hardware to settle, re-synchronises the registers and
    /// releases hardware access.
    pub fn resume(self) -> Result<(), LockAmpError> {
        self.lockamp.drain_option.sleeper.sleep(self.settle);
        let result = self.lockamp.resync();
        tracing::debug!("Resumed");
        result
    }
}
