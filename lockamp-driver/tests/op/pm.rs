use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use lockamp_core::{
    power::{PowerControl, PowerError, PowerState},
    register::{control2, Bank},
};
use lockamp_driver::{LockAmp, LockAmpError, LockAmpOption};
use lockamp_fpga_emulator::{EmulatedPower, FPGAEmulator};

use crate::{create, option, read_chunk, sentinel, wait_drained};

#[test]
fn suspend_blocks_drain() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(64)?;
    let mut session = lockamp.open()?;

    let guard = lockamp.suspend();
    fpga.push_samples(&(0..4).map(sentinel).collect::<Vec<_>>());
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(32, fpga.fifo_len());
    guard.resume()?;

    wait_drained(&fpga)?;
    let (_, samples) = read_chunk(&mut session, 8)?;
    assert_eq!((0..4).map(sentinel).collect::<Vec<_>>(), samples);
    Ok(())
}

#[test]
fn resume_restores_configuration() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(64)?;
    lockamp.set_decimation(8)?;
    lockamp.set_dac_data_bits(12)?;

    let guard = lockamp.suspend();
    fpga.power_down();
    fpga.power_up();
    assert_eq!(0, fpga.register(Bank::Control2, control2::HB_FILTERS));
    guard.resume()?;

    assert_eq!(8, lockamp.get_decimation()?);
    assert_eq!(335, lockamp.fir_cycles()?);
    assert_eq!(12, lockamp.get_dac_data_bits()?);
    Ok(())
}

#[test]
fn runtime_resume() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(64)?;
    lockamp.set_debug1(5)?;

    fpga.power_down();
    fpga.power_up();
    assert_eq!(0, lockamp.get_debug1()?);

    lockamp.runtime_resume()?;
    assert_eq!(5, lockamp.get_debug1()?);
    Ok(())
}

#[test]
fn reopen_after_auto_power_down() -> anyhow::Result<()> {
    let fpga = FPGAEmulator::new();
    let lockamp = LockAmp::attach(
        fpga.clone(),
        LockAmpOption {
            power: Box::new(EmulatedPower::new(fpga.clone()).with_auto_power_down(true)),
            ..option(64)
        },
    )?;
    assert!(!fpga.is_powered());

    let session = lockamp.open()?;
    assert!(fpga.is_powered());
    lockamp.set_decimation(2)?;
    session.close();
    assert!(!fpga.is_powered());

    let _session = lockamp.open()?;
    assert!(fpga.is_powered());
    assert_eq!(2, lockamp.get_decimation()?);
    Ok(())
}

/// Reports every acquisition as a power-up without touching the device.
#[derive(Debug)]
struct ColdStart {
    usage: Arc<AtomicUsize>,
}

impl PowerControl for ColdStart {
    fn acquire(&mut self) -> Result<PowerState, PowerError> {
        self.usage.fetch_add(1, Ordering::SeqCst);
        Ok(PowerState::Restored)
    }

    fn release(&mut self) {
        self.usage.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
fn failed_resync_releases_power() -> anyhow::Result<()> {
    let fpga = FPGAEmulator::new();
    let usage = Arc::new(AtomicUsize::new(0));
    let lockamp = LockAmp::attach(
        fpga.clone(),
        LockAmpOption {
            power: Box::new(ColdStart {
                usage: usage.clone(),
            }),
            ..option(64)
        },
    )?;
    assert_eq!(0, usage.load(Ordering::SeqCst));
    lockamp.set_decimation(2)?;

    fpga.power_down();
    assert!(matches!(lockamp.open(), Err(LockAmpError::Register(_))));
    assert_eq!(0, usage.load(Ordering::SeqCst));
    assert!(!lockamp.is_open());

    fpga.power_up();
    let session = lockamp.open()?;
    assert_eq!(1, usage.load(Ordering::SeqCst));
    assert_eq!(2, lockamp.get_decimation()?);
    session.close();
    assert_eq!(0, usage.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn suspend_blocks_adc_dump() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(64)?;
    fpga.set_adc_samples(&[7]);
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        let guard = lockamp.suspend();
        let dump = s.spawn(|| {
            let mut buf = [0u8; 4];
            let n = lockamp.read_adc_samples(0, &mut buf);
            done.store(true, Ordering::SeqCst);
            n.map(|n| (n, buf))
        });

        std::thread::sleep(Duration::from_millis(50));
        assert!(!done.load(Ordering::SeqCst));
        guard.resume()?;

        let (n, buf) = dump
            .join()
            .map_err(|_| anyhow::anyhow!("ADC dump panicked"))??;
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(4, n);
        assert_eq!(7i32.to_ne_bytes(), buf);
        anyhow::Ok(())
    })
}
