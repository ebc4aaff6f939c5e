use core::time::Duration;

pub use spin_sleep::{SpinSleeper, SpinStrategy};

/// Waits between two FIFO drains.
///
/// The drain task picks a duration inside its sleep window and hands it to
/// a `Sleep`. Oversleeping past the upper end of the window eats into the
/// FIFO headroom, so on platforms with a coarse scheduler tick a
/// [`SpinSleeper`] keeps the drain closer to its target.
pub trait Sleep: core::fmt::Debug + Send + Sync {
    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Sleeps through the operating system scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StdSleeper;

impl Sleep for StdSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl Sleep for SpinSleeper {
    fn sleep(&self, duration: Duration) {
        SpinSleeper::sleep(*self, duration);
    }
}
