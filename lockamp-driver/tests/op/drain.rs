use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use lockamp_core::sleep::Sleep;
use lockamp_driver::LockAmp;
use lockamp_fpga_emulator::FPGAEmulator;

use crate::{option, TIMEOUT};

/// Records requested durations and sleeps at most a millisecond.
#[derive(Debug, Default)]
struct RecordingSleeper {
    requested: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn requested(&self) -> Vec<Duration> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn wait_for(&self, from: usize, f: impl Fn(&Duration) -> bool) -> anyhow::Result<usize> {
        let start = Instant::now();
        loop {
            let requested = self.requested();
            if let Some(i) = requested.iter().skip(from).position(&f) {
                return Ok(from + i);
            }
            anyhow::ensure!(start.elapsed() < TIMEOUT, "sleep was not requested");
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Sleep for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        std::thread::sleep(duration.min(Duration::from_millis(1)));
    }
}

#[test]
fn falls_back_when_read_delay_fails() -> anyhow::Result<()> {
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut option = option(64);
    option.drain.sleeper = sleeper.clone();
    let fallback = option.drain.fallback_sleep;
    assert_eq!(Duration::from_millis(250), fallback);

    let fpga = FPGAEmulator::new();
    let lockamp = LockAmp::attach(fpga.clone(), option)?;
    let session = lockamp.open()?;

    let first = sleeper.wait_for(0, |d| *d < fallback)?;
    fpga.power_down();
    let fell_back = sleeper.wait_for(first + 1, |d| *d == fallback)?;
    fpga.power_up();
    sleeper.wait_for(fell_back + 1, |d| *d < fallback)?;

    session.close();
    let n = sleeper.requested().len();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(n, sleeper.requested().len());
    Ok(())
}
