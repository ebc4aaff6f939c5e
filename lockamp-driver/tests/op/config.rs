use lockamp_core::{
    register::{control1, control2, Bank, GENERATOR_SCALE_SHIFT},
    sample::Site,
};
use lockamp_driver::{FirFilter, LockAmpError};
use lockamp_fpga_emulator::EMULATED_VERSION;
use rstest::rstest;

use crate::create;

#[test]
fn version() -> anyhow::Result<()> {
    let (_fpga, lockamp) = create(8)?;
    assert_eq!(EMULATED_VERSION, lockamp.read_version()?);
    Ok(())
}

#[rstest]
#[case(1, 36, 2728)]
#[case(2, 79, 5456)]
#[case(4, 164, 10912)]
#[case(8, 335, 21824)]
#[case(16, 511, 43648)]
fn decimation_grid(
    #[case] decimation: u32,
    #[case] fir_cycles: u32,
    #[case] time_step_ns: u64,
) -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    lockamp.set_decimation(decimation)?;
    assert_eq!(decimation, lockamp.get_decimation()?);
    assert_eq!(fir_cycles, lockamp.fir_cycles()?);
    assert_eq!(
        decimation.trailing_zeros(),
        fpga.register(Bank::Control2, control2::HB_FILTERS)
    );
    assert_eq!(time_step_ns, lockamp.time_step_ns()?);
    assert_eq!(100 * time_step_ns, lockamp.duration_ns(100)?);
    assert_eq!(2048 * time_step_ns, lockamp.read_delay_ns()?);
    Ok(())
}

#[rstest]
#[case(0)]
#[case(3)]
#[case(32)]
fn invalid_decimation(#[case] decimation: u32) -> anyhow::Result<()> {
    let (_fpga, lockamp) = create(8)?;
    lockamp.set_decimation(4)?;
    assert_eq!(
        Err(LockAmpError::InvalidDecimation(decimation)),
        lockamp.set_decimation(decimation)
    );
    assert_eq!(4, lockamp.get_decimation()?);
    Ok(())
}

#[rstest]
#[case(0, 0)]
#[case(0, 42)]
#[case(43, 43)]
#[case(131071, 131071)]
fn generator_scale(#[case] expect: i32, #[case] value: i32) -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    Site::ALL.into_iter().try_for_each(|site| {
        lockamp.set_generator_scale(site, value)?;
        assert_eq!(expect, lockamp.get_generator_scale(site)?);
        Ok::<_, LockAmpError>(())
    })?;
    assert_eq!(
        (expect << GENERATOR_SCALE_SHIFT) as u32,
        fpga.register(Bank::Control1, control1::GEN1_SCALE)
    );
    assert_eq!(
        (expect << GENERATOR_SCALE_SHIFT) as u32,
        fpga.register(Bank::Control2, control2::GEN2_SCALE)
    );
    Ok(())
}

#[test]
fn generator_scale_out_of_range() -> anyhow::Result<()> {
    let (_fpga, lockamp) = create(8)?;
    lockamp.set_generator_scale(Site::S0, 1000)?;
    assert!(matches!(
        lockamp.set_generator_scale(Site::S0, -1),
        Err(LockAmpError::OutOfRange { value: -1, .. })
    ));
    assert!(matches!(
        lockamp.set_generator_scale(Site::S0, 131072),
        Err(LockAmpError::OutOfRange { value: 131072, .. })
    ));
    assert_eq!(1000, lockamp.get_generator_scale(Site::S0)?);
    Ok(())
}

#[test]
fn generator_step() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    lockamp.set_generator_step(Site::S0, 3, 0x8000)?;
    lockamp.set_generator_step(Site::S1, 0xFFFF, 1)?;

    let step = lockamp.get_generator_step(Site::S0)?;
    assert_eq!(3, step.integer());
    assert_eq!(0x8000, step.fraction());
    assert_eq!(0x0003_8000, fpga.register(Bank::Control2, control2::GEN1_STEP));
    assert_eq!(0xFFFF_0001, fpga.register(Bank::Control2, control2::GEN2_STEP));
    Ok(())
}

#[rstest]
#[case(FirFilter::Groenning)]
#[case(FirFilter::None)]
#[case(FirFilter::C2)]
fn fir_filter(#[case] filter: FirFilter) -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    assert_eq!(None, lockamp.fir_filter());

    lockamp.set_fir_filter(filter)?;
    assert_eq!(Some(filter), lockamp.fir_filter());
    assert_eq!(filter.coefficients().to_vec(), fpga.fir());
    assert_eq!(filter.coefficients(), lockamp.fir_coefficients()?);
    Ok(())
}

#[test]
fn custom_fir_coefficients() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    lockamp.set_fir_filter(FirFilter::A1)?;

    let mut taps = [0; 512];
    taps.iter_mut().enumerate().for_each(|(i, t)| *t = i as i32 - 256);
    lockamp.set_fir_coefficients(&taps)?;
    assert_eq!(None, lockamp.fir_filter());
    assert_eq!(taps.to_vec(), fpga.fir());
    Ok(())
}

#[test]
fn dac_data_bits() -> anyhow::Result<()> {
    let (_fpga, lockamp) = create(8)?;
    lockamp.set_dac_data_bits(31)?;
    assert_eq!(31, lockamp.get_dac_data_bits()?);
    assert!(matches!(
        lockamp.set_dac_data_bits(32),
        Err(LockAmpError::OutOfRange { value: 32, .. })
    ));
    assert_eq!(31, lockamp.get_dac_data_bits()?);
    Ok(())
}

#[test]
fn debug_registers() -> anyhow::Result<()> {
    let (_fpga, lockamp) = create(8)?;
    lockamp.set_debug1(0xDEAD_BEEF)?;
    assert_eq!(0xDEAD_BEEF, lockamp.get_debug1()?);
    assert_eq!(0xDEAD_BEEF, lockamp.read_debug_registers()?.debug1);
    Ok(())
}

#[test]
fn register_error_when_powered_down() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    fpga.power_down();
    assert!(matches!(
        lockamp.set_decimation(2),
        Err(LockAmpError::Register(_))
    ));
    assert!(lockamp.read_version().is_err());
    Ok(())
}

#[test]
fn diagnostics() -> anyhow::Result<()> {
    let (_fpga, lockamp) = create(1 << 10)?;
    assert_eq!(32 << 10, lockamp.signal_buf_capacity_bytes());

    let session = lockamp.open()?;
    std::thread::sleep(std::time::Duration::from_millis(50));
    let diagnostics = lockamp.diagnostics();
    drop(session);

    assert_eq!(32 << 10, diagnostics.signal_buf_capacity_bytes);
    assert_eq!(0, diagnostics.desyncs);
    assert!(diagnostics.fifo_read_delay_ns >= 2_000_000);
    assert!(diagnostics.sleep_upper_us >= 3000);
    assert!(diagnostics.sleep_lower_us <= diagnostics.sleep_upper_us);
    Ok(())
}

#[test]
fn invalid_buffer_capacity() {
    use lockamp_driver::LockAmp;
    use lockamp_fpga_emulator::FPGAEmulator;

    [0, 1, 3, 100].into_iter().for_each(|cap| {
        assert_eq!(
            Err(LockAmpError::InvalidBufferCapacity(cap)),
            LockAmp::attach(FPGAEmulator::new(), crate::option(cap)).map(|_| ())
        );
    });
}
