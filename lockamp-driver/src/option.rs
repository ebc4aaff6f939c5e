use std::{sync::Arc, time::Duration};

use lockamp_core::{
    defined::{FIFO_CAPACITY_N, SIGNAL_BUF_CAPACITY_N},
    power::{AlwaysOn, PowerControl},
    sleep::{Sleep, StdSleeper},
};
use thread_priority::{ThreadBuilder, ThreadPriority};

/// Options of the FIFO drain task.
#[derive(Clone, Debug)]
pub struct DrainOption {
    /// The [`ThreadBuilder`] for the drain thread. This is set to use real-time scheduling with the highest possible priority by default.
    pub thread_builder: ThreadBuilder,
    /// Lower bound of the upper end of the sleep window. The default is 3ms.
    pub min_sleep_upper: Duration,
    /// Lower bound of the lower end of the sleep window. The default is 2ms.
    pub min_sleep_lower: Duration,
    /// Width of the sleep window. The default is 10ms.
    pub sleep_window: Duration,
    /// Sleep used when the read delay cannot be determined. The default is 250ms.
    pub fallback_sleep: Duration,
    /// Smoothing factor of the moving average time step. The default is 20.
    pub ma_factor: u64,
    /// Sleeper used between drains. The default is [`StdSleeper`]; a
    /// [`SpinSleeper`](lockamp_core::sleep::SpinSleeper) oversleeps less on a coarse scheduler tick.
    pub sleeper: Arc<dyn Sleep>,
}

impl Default for DrainOption {
    fn default() -> Self {
        Self {
            #[cfg(target_os = "windows")]
            thread_builder: ThreadBuilder::default().name("lockamp-drain").priority(
                ThreadPriority::Os(thread_priority::ThreadPriorityOsValue::from(
                    thread_priority::WinAPIThreadPriority::TimeCritical,
                )),
            ),
            #[cfg(not(target_os = "windows"))]
            thread_builder: ThreadBuilder::default()
                .name("lockamp-drain")
                .priority(
                    thread_priority::ThreadPriorityValue::try_from(99)
                        .map_or_else(|_| ThreadPriority::Max, ThreadPriority::Crossplatform),
                )
                .policy(thread_priority::ThreadSchedulePolicy::Realtime(
                    thread_priority::RealtimeThreadSchedulePolicy::Fifo,
                )),
            min_sleep_upper: Duration::from_micros(3000),
            min_sleep_lower: Duration::from_micros(2000),
            sleep_window: Duration::from_millis(10),
            fallback_sleep: Duration::from_millis(250),
            ma_factor: 20,
            sleeper: Arc::new(StdSleeper),
        }
    }
}

/// Options of [`LockAmp`](crate::LockAmp).
#[derive(Debug)]
pub struct LockAmpOption {
    /// Capacity of the signal buffer in samples. Must be a power of two. The default is 131072 (4 MiB).
    pub signal_buf_capacity_n: usize,
    /// Capacity of the hardware FIFO in samples. The default is 4096.
    pub fifo_capacity_n: usize,
    /// Options of the drain task.
    pub drain: DrainOption,
    /// Time to wait after resume before the hardware is accessed. The default is 10ms.
    pub resume_settle: Duration,
    /// Power domain of the device. The default is [`AlwaysOn`].
    pub power: Box<dyn PowerControl>,
}

impl Default for LockAmpOption {
    fn default() -> Self {
        Self {
            signal_buf_capacity_n: SIGNAL_BUF_CAPACITY_N,
            fifo_capacity_n: FIFO_CAPACITY_N,
            drain: DrainOption::default(),
            resume_settle: Duration::from_millis(10),
            power: Box::new(AlwaysOn),
        }
    }
}
