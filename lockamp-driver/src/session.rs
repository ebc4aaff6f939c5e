use lockamp_core::{
    chunk::ChunkHeader, register::RegisterIo, sample::Sample, time::SysTime,
};
use zerocopy::IntoBytes;

use crate::{device::LockAmp, drain::DrainTask, error::LockAmpError};

/// The single reader of a [`LockAmp`].
///
/// While the session is open a drain thread moves samples from the hardware
/// FIFO into the signal buffer. Every read returns one chunk: a
/// [`ChunkHeader`] followed by whole samples. The header holds the
/// acquisition time of the first sample in the chunk; subsequent samples are
/// `time_step_ns` apart. Timestamps continue exactly from chunk to chunk
/// until data is lost, after which the basis is reset to the current time.
///
/// Dropping the session stops the drain thread and releases the device.
pub struct Session<'a, B: RegisterIo + 'static> {
    lockamp: &'a LockAmp<B>,
    drain: Option<DrainTask>,
    powered: bool,
    last_start_time: SysTime,
    last_desyncs: u32,
}

impl<'a, B: RegisterIo + 'static> Session<'a, B> {
    /// Starts a session on a device whose reader has been claimed.
    pub(crate) fn open(lockamp: &'a LockAmp<B>) -> Result<Self, LockAmpError> {
        let mut session = Self {
            lockamp,
            drain: None,
            powered: false,
            last_start_time: SysTime::ZERO,
            last_desyncs: 0,
        };

        lockamp.acquire_power()?;
        session.powered = true;

        lockamp.shared.diagnostics.reset();
        session.drain = Some(DrainTask::spawn(
            lockamp.shared.clone(),
            &lockamp.drain_option,
        )?);

        session.last_desyncs = lockamp.desyncs();
        session.last_start_time = SysTime::now();
        tracing::debug!("Session opened");
        Ok(session)
    }

    /// Acquisition time of the next sample to be read.
    #[must_use]
    pub const fn last_start_time(&self) -> SysTime {
        self.last_start_time
    }

    fn synchronize(&mut self) {
        let desyncs = self.lockamp.desyncs();
        if desyncs != self.last_desyncs {
            tracing::warn!("Resetting start time due to desync.");
            self.last_start_time = SysTime::now();
        }
        self.last_desyncs = desyncs;
    }

    /// Reads one chunk into `buf` and returns its length in bytes.
    ///
    /// As many samples as are available and fit after the header are
    /// copied; the chunk may hold no samples at all. Fails with
    /// [`LockAmpError::InvalidArgument`] if `buf` cannot hold the header.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, LockAmpError> {
        let lockamp = self.lockamp;
        let mut consumer = lockamp.consumer();
        let (mut snapshot, header, data_size_n) = {
            let _activity = lockamp.activity();
            let snapshot = consumer.snapshot(&lockamp.shared.desyncs);
            self.synchronize();
            let data_size_n = ChunkHeader::capacity_for(buf.len())
                .ok_or(LockAmpError::InvalidArgument(buf.len()))?
                .min(snapshot.size_n);
            let time_step_ns = lockamp.shared.registers().time_step_ns()?;
            (
                snapshot,
                ChunkHeader::new(self.last_start_time, time_step_ns),
                data_size_n,
            )
        };

        let (head, data) = buf.split_at_mut(ChunkHeader::SIZE);
        head.copy_from_slice(header.as_bytes());
        let copied = consumer.pop_span_to(data, &mut snapshot, data_size_n * size_of::<Sample>());
        let copied_n = copied / size_of::<Sample>();

        self.last_start_time = self
            .last_start_time
            .wrapping_add_nanos(header.time_step_ns * copied_n as u64);
        tracing::trace!("Read chunk of {} samples", copied_n);
        Ok(ChunkHeader::SIZE + copied)
    }

    /// Stops the drain thread and releases the device.
    pub fn close(self) {}
}

impl<B: RegisterIo + 'static> Drop for Session<'_, B> {
    fn drop(&mut self) {
        drop(self.drain.take());
        if self.powered {
            self.lockamp.release_power();
        }
        self.lockamp.release_reader();
        tracing::debug!("Session closed");
    }
}

impl<B: RegisterIo + 'static> std::io::Read for Session<'_, B> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Ok(self.read_chunk(buf)?)
    }
}

impl<B: RegisterIo + 'static> std::io::Write for Session<'_, B> {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(LockAmpError::PermissionDenied.into())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
