use lockamp_core::defined::ADC_SAMPLES_SIZE;

use crate::create;

#[test]
fn read_adc_samples() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    fpga.set_adc_samples(&[1, -2, 3]);

    let mut buf = [0u8; 12];
    assert_eq!(12, lockamp.read_adc_samples(0, &mut buf)?);
    assert_eq!(1i32.to_ne_bytes(), buf[0..4]);
    assert_eq!((-2i32).to_ne_bytes(), buf[4..8]);
    assert_eq!(3i32.to_ne_bytes(), buf[8..12]);

    fpga.set_adc_samples(&[9, 9, 9]);
    let mut buf = [0u8; 4];
    assert_eq!(4, lockamp.read_adc_samples(4, &mut buf)?);
    assert_eq!((-2i32).to_ne_bytes(), buf);

    let mut buf = [0u8; 8];
    assert_eq!(4, lockamp.read_adc_samples(ADC_SAMPLES_SIZE - 4, &mut buf)?);
    assert_eq!(0, lockamp.read_adc_samples(ADC_SAMPLES_SIZE, &mut buf)?);

    assert_eq!(4, lockamp.read_adc_samples(0, &mut buf[..4])?);
    assert_eq!(9i32.to_ne_bytes(), buf[..4]);

    Ok(())
}
