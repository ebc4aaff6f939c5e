use std::sync::atomic::{AtomicU64, Ordering};

/// Counters published by the drain task.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    pub ma_time_step_ns: AtomicU64,
    pub fifo_read_duration_ns: AtomicU64,
    pub fifo_read_delay_ns: AtomicU64,
    pub sleep_lower_us: AtomicU64,
    pub sleep_upper_us: AtomicU64,
}

impl Diagnostics {
    pub fn reset(&self) {
        [
            &self.ma_time_step_ns,
            &self.fifo_read_duration_ns,
            &self.fifo_read_delay_ns,
            &self.sleep_lower_us,
            &self.sleep_upper_us,
        ]
        .into_iter()
        .for_each(|v| v.store(0, Ordering::Relaxed));
    }

    pub fn snapshot(&self, desyncs: u32, signal_buf_capacity_bytes: usize) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            ma_time_step_ns: self.ma_time_step_ns.load(Ordering::Relaxed),
            fifo_read_duration_ns: self.fifo_read_duration_ns.load(Ordering::Relaxed),
            fifo_read_delay_ns: self.fifo_read_delay_ns.load(Ordering::Relaxed),
            sleep_lower_us: self.sleep_lower_us.load(Ordering::Relaxed),
            sleep_upper_us: self.sleep_upper_us.load(Ordering::Relaxed),
            desyncs,
            signal_buf_capacity_bytes,
        }
    }
}

/// Snapshot of the runtime diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    /// Moving average of the measured time between samples.
    pub ma_time_step_ns: u64,
    /// Duration of the last FIFO drain.
    pub fifo_read_duration_ns: u64,
    /// Measured time between the last two FIFO drains, excluding the drain itself.
    pub fifo_read_delay_ns: u64,
    /// Lower end of the last sleep window.
    pub sleep_lower_us: u64,
    /// Upper end of the last sleep window.
    pub sleep_upper_us: u64,
    /// Number of detected data loss events.
    pub desyncs: u32,
    /// Capacity of the signal buffer in bytes.
    pub signal_buf_capacity_bytes: usize,
}
