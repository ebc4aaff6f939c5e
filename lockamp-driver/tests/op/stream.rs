use std::sync::Arc;

use itertools::Itertools;
use lockamp_core::{sample::Sample, sleep::SpinSleeper};
use lockamp_driver::LockAmp;
use lockamp_fpga_emulator::FPGAEmulator;

use crate::{option, read_samples, sentinel};

#[test]
fn stream_is_gapless() -> anyhow::Result<()> {
    let mut option = option(1 << 14);
    option.drain.sleeper = Arc::new(SpinSleeper::default());
    let fpga = FPGAEmulator::new();
    let lockamp = LockAmp::attach(fpga.clone(), option)?;
    lockamp.set_decimation(16)?;
    let mut session = lockamp.open()?;
    fpga.start_stream();

    let chunks = read_samples(&mut session, 2000)?;
    fpga.stop_stream();

    let time_step_ns = lockamp.time_step_ns()?;
    chunks.iter().tuple_windows().for_each(|((a, sa), (b, _))| {
        assert_eq!(time_step_ns, a.time_step_ns);
        assert_eq!(
            a.last_start_time_ns + sa.len() as u64 * time_step_ns,
            b.last_start_time_ns
        );
    });

    let samples = chunks
        .into_iter()
        .flat_map(|(_, s)| s)
        .collect::<Vec<Sample>>();
    samples
        .iter()
        .enumerate()
        .for_each(|(k, s)| assert_eq!(sentinel(k as u32), *s));
    assert_eq!(0, lockamp.desyncs());

    Ok(())
}
