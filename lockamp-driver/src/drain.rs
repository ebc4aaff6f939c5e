use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use lockamp_core::register::RegisterIo;
use rand::Rng;

use crate::{device::Shared, error::LockAmpError, option::DrainOption};

/// Exponential moving average of the time between samples.
#[derive(Debug, Clone, Copy)]
pub struct MovingAverage {
    factor: u64,
    value_ns: u64,
    last: Option<Instant>,
}

impl MovingAverage {
    /// Creates an average that weights a new measurement by `1 / factor`.
    #[must_use]
    pub const fn new(factor: u64) -> Self {
        Self {
            factor: if factor == 0 { 1 } else { factor },
            value_ns: 0,
            last: None,
        }
    }

    /// Current average in nanoseconds.
    #[must_use]
    pub const fn value_ns(&self) -> u64 {
        self.value_ns
    }

    /// Accounts `size_n` samples that arrived since the last update.
    pub fn update(&mut self, size_n: usize) -> u64 {
        self.update_at(Instant::now(), size_n)
    }

    fn update_at(&mut self, now: Instant, size_n: usize) -> u64 {
        let Some(last) = self.last.replace(now) else {
            return self.value_ns;
        };
        if size_n > 0 {
            let delta_ns = now.duration_since(last).as_nanos() as u64;
            let time_step_ns = delta_ns / size_n as u64;
            self.value_ns = (time_step_ns + (self.factor - 1) * self.value_ns) / self.factor;
        }
        self.value_ns
    }
}

/// Range the drain task sleeps in before the next drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepWindow {
    /// Shortest sleep.
    pub lower: Duration,
    /// Longest sleep.
    pub upper: Duration,
}

impl SleepWindow {
    /// Computes the window that ends when the FIFO is about half full.
    ///
    /// `read_delay` is the time the hardware takes to fill half of the FIFO
    /// and `read_duration` the time the last drain took. The window is early
    /// biased: it spans `option.sleep_window` before the target.
    #[must_use]
    pub fn new(read_delay: Duration, read_duration: Duration, option: &DrainOption) -> Self {
        let target = read_delay.saturating_sub(read_duration);
        let upper = Duration::from_micros(target.as_micros() as u64).max(option.min_sleep_upper);
        let lower = upper
            .saturating_sub(option.sleep_window)
            .max(option.min_sleep_lower)
            .min(upper);
        Self { lower, upper }
    }

    /// Picks a random duration within the window.
    pub fn pick(&self, rng: &mut impl Rng) -> Duration {
        Duration::from_micros(
            rng.random_range(self.lower.as_micros() as u64..=self.upper.as_micros() as u64),
        )
    }
}

/// Handle of the running drain thread. Dropping it stops and joins the thread.
pub(crate) struct DrainTask {
    is_running: Arc<AtomicBool>,
    th: Option<JoinHandle<()>>,
}

impl DrainTask {
    pub fn spawn<B: RegisterIo + 'static>(
        shared: Arc<Shared<B>>,
        option: &DrainOption,
    ) -> Result<Self, LockAmpError> {
        let is_running = Arc::new(AtomicBool::new(true));
        let th = option
            .thread_builder
            .clone()
            .spawn({
                let is_running = is_running.clone();
                let option = option.clone();
                move |priority| {
                    if let Err(e) = priority {
                        tracing::warn!(
                            "Failed to set drain thread priority ({:?}). Data loss may occur.",
                            e
                        );
                    }
                    tracing::debug!("Drain task started");
                    drain_loop(&shared, &is_running, &option);
                    tracing::debug!("Drain task exited");
                }
            })
            .map_err(|e| LockAmpError::ThreadSpawn(e.to_string()))?;
        Ok(Self {
            is_running,
            th: Some(th),
        })
    }
}

impl Drop for DrainTask {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::Release);
        if let Some(th) = self.th.take() {
            if th.join().is_err() {
                tracing::error!("Drain thread panicked");
            }
        }
    }
}

fn drain_loop<B: RegisterIo>(shared: &Shared<B>, is_running: &AtomicBool, option: &DrainOption) {
    let mut rng = rand::rng();
    let mut ma = MovingAverage::new(option.ma_factor);
    while is_running.load(Ordering::Acquire) {
        let start = Instant::now();
        if let Err(e) = shared.drain(&mut ma) {
            tracing::error!("Failed to drain FIFO: {}", e);
        }
        let read_duration = start.elapsed();
        shared
            .diagnostics
            .fifo_read_duration_ns
            .store(read_duration.as_nanos() as u64, Ordering::Relaxed);

        let before_sleep = Instant::now();
        match shared.read_delay() {
            Ok(read_delay) => {
                let window = SleepWindow::new(read_delay, read_duration, option);
                shared
                    .diagnostics
                    .sleep_lower_us
                    .store(window.lower.as_micros() as u64, Ordering::Relaxed);
                shared
                    .diagnostics
                    .sleep_upper_us
                    .store(window.upper.as_micros() as u64, Ordering::Relaxed);
                option.sleeper.sleep(window.pick(&mut rng));
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to compute FIFO read delay ({}). Data loss may occur.",
                    e
                );
                option.sleeper.sleep(option.fallback_sleep);
            }
        }
        shared
            .diagnostics
            .fifo_read_delay_ns
            .store(before_sleep.elapsed().as_nanos() as u64, Ordering::Relaxed);
    }
}
