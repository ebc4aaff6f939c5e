use derive_more::Display;
use derive_new::new;
use thiserror::Error;

#[derive(new, Error, Debug, Display, PartialEq, Clone)]
#[display("{}", msg)]
/// An error produced by the power domain.
pub struct PowerError {
    msg: String,
}

/// State of the device registers after the power domain has been acquired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerState {
    /// The device stayed powered and kept its register contents.
    Retained,
    /// The device was powered up from off and its registers hold reset values.
    Restored,
}

/// Runtime power management of the device.
///
/// The device is kept powered while a reader session is open. Acquisitions
/// and releases are balanced by the driver.
pub trait PowerControl: core::fmt::Debug + Send {
    /// Powers the device up, or increments its usage count.
    fn acquire(&mut self) -> Result<PowerState, PowerError>;

    /// Decrements the usage count. The device may be powered down once the
    /// count reaches zero.
    fn release(&mut self);
}

/// A power domain that is never switched off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlwaysOn;

impl PowerControl for AlwaysOn {
    fn acquire(&mut self) -> Result<PowerState, PowerError> {
        Ok(PowerState::Retained)
    }

    fn release(&mut self) {}
}

impl PowerControl for Box<dyn PowerControl> {
    fn acquire(&mut self) -> Result<PowerState, PowerError> {
        self.as_mut().acquire()
    }

    fn release(&mut self) {
        self.as_mut().release();
    }
}
