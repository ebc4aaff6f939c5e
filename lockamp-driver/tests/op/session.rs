use std::{
    io::{Read, Write},
    time::Duration,
};

use lockamp_core::{chunk::ChunkHeader, sample::Site};
use lockamp_driver::LockAmpError;

use crate::{create, parse_chunk, read_chunk, sentinel, wait_drained};

#[test]
fn end_to_end() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    assert_eq!(5, fpga.push_samples(&(0..5).map(sentinel).collect::<Vec<_>>()));

    let mut session = lockamp.open()?;
    wait_drained(&fpga)?;

    let mut buf = vec![0u8; 112];
    assert_eq!(112, session.read_chunk(&mut buf)?);
    let (first, samples) = parse_chunk(&buf)?;
    assert_eq!(2728, first.time_step_ns);
    assert_eq!((0..3).map(sentinel).collect::<Vec<_>>(), samples);

    let (second, samples) = read_chunk(&mut session, 4)?;
    assert_eq!((3..5).map(sentinel).collect::<Vec<_>>(), samples);
    assert_eq!(
        first.last_start_time_ns + 3 * 2728,
        second.last_start_time_ns
    );

    let (_, samples) = read_chunk(&mut session, 4)?;
    assert!(samples.is_empty());
    assert_eq!(0, lockamp.desyncs());

    Ok(())
}

#[test]
fn timestamps_are_continuous() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(64)?;
    lockamp.set_decimation(4)?;
    let mut session = lockamp.open()?;
    let start = session.last_start_time();

    fpga.push_samples(&(0..3).map(sentinel).collect::<Vec<_>>());
    wait_drained(&fpga)?;
    let (a, samples) = read_chunk(&mut session, 16)?;
    assert_eq!(3, samples.len());
    assert_eq!(start.as_nanos(), a.last_start_time_ns);
    assert_eq!(4 * 2728, a.time_step_ns);

    fpga.push_samples(&(3..5).map(sentinel).collect::<Vec<_>>());
    wait_drained(&fpga)?;
    let (b, samples) = read_chunk(&mut session, 16)?;
    assert_eq!(2, samples.len());
    assert_eq!(a.last_start_time_ns + 3 * a.time_step_ns, b.last_start_time_ns);
    assert_eq!(
        b.last_start_time_ns + 2 * b.time_step_ns,
        session.last_start_time().as_nanos()
    );

    Ok(())
}

#[test]
fn desync_resets_start_time() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    let mut session = lockamp.open()?;
    let start = session.last_start_time();

    std::thread::sleep(Duration::from_millis(100));
    fpga.push_samples(&(0..20).map(sentinel).collect::<Vec<_>>());
    std::thread::sleep(Duration::from_millis(50));
    assert!(lockamp.desyncs() > 0);

    let (header, samples) = read_chunk(&mut session, 32)?;
    assert_eq!((0..7).map(sentinel).collect::<Vec<_>>(), samples);
    assert!(
        header.last_start_time_ns - start.as_nanos()
            >= Duration::from_millis(100).as_nanos() as u64
    );

    Ok(())
}

#[test]
fn single_reader() -> anyhow::Result<()> {
    let (_fpga, lockamp) = create(8)?;
    assert!(!lockamp.is_open());

    let session = lockamp.open()?;
    assert!(lockamp.is_open());
    assert_eq!(Err(LockAmpError::Busy), lockamp.open().map(|_| ()));

    session.close();
    assert!(!lockamp.is_open());
    let _session = lockamp.open()?;

    Ok(())
}

#[test]
fn buffer_must_hold_header() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    fpga.push_sample(&sentinel(7));
    let mut session = lockamp.open()?;
    wait_drained(&fpga)?;

    let mut buf = [0u8; 15];
    assert_eq!(
        Err(LockAmpError::InvalidArgument(15)),
        session.read_chunk(&mut buf)
    );

    let mut buf = [0u8; ChunkHeader::SIZE + 31];
    assert_eq!(ChunkHeader::SIZE, session.read_chunk(&mut buf)?);

    let (_, samples) = read_chunk(&mut session, 1)?;
    assert_eq!(vec![sentinel(7)], samples);

    Ok(())
}

#[test]
fn io_traits() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    fpga.push_sample(&sentinel(1));
    let mut session = lockamp.open()?;
    wait_drained(&fpga)?;

    let mut buf = [0u8; 64];
    assert_eq!(48, session.read(&mut buf)?);

    let e = session.write(&[0]).unwrap_err();
    assert_eq!(std::io::ErrorKind::PermissionDenied, e.kind());

    let e = session.read(&mut [0u8; 8]).unwrap_err();
    assert_eq!(std::io::ErrorKind::InvalidInput, e.kind());

    Ok(())
}

#[test]
fn sample_multiplier() -> anyhow::Result<()> {
    let (fpga, lockamp) = create(8)?;
    assert_eq!(1, lockamp.get_sample_multiplier(Site::S1));
    lockamp.set_sample_multiplier(Site::S1, -2);
    assert_eq!(-2, lockamp.get_sample_multiplier(Site::S1));

    fpga.push_words(&[1, 2, 3, 4, 5, 6, 7, 8]);
    let mut session = lockamp.open()?;
    wait_drained(&fpga)?;

    let (_, samples) = read_chunk(&mut session, 1)?;
    assert_eq!([1, 2, 3, 4, -10, -12, -14, -16], samples[0].entries());

    Ok(())
}
