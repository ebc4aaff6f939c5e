use std::{
    cell::UnsafeCell,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use lockamp_core::sample::Sample;
use zerocopy::IntoBytes;

use crate::{
    codec::SampleSource,
    desync::{DesyncCounter, RateLimit},
    error::LockAmpError,
};

const SAMPLE_SIZE: usize = size_of::<Sample>();

/// Free slots between `head` and `tail`. One slot always stays empty.
const fn circ_space(head: usize, tail: usize, capacity_n: usize) -> usize {
    tail.wrapping_sub(head).wrapping_sub(1) & (capacity_n - 1)
}

/// Occupied slots between `tail` and `head`.
const fn circ_cnt(head: usize, tail: usize, capacity_n: usize) -> usize {
    head.wrapping_sub(tail) & (capacity_n - 1)
}

/// Occupied slots from `tail` up to the end of the array.
const fn circ_cnt_to_end(head: usize, tail: usize, capacity_n: usize) -> usize {
    let end = capacity_n - tail;
    let n = (head + end) & (capacity_n - 1);
    if n < end {
        n
    } else {
        end
    }
}

/// Ring of samples shared by one [`Producer`] and one [`Consumer`].
///
/// Slots in `[tail, head)` belong to the consumer, all others to the
/// producer. The producer publishes slots with a release store of `head`
/// after writing them, the consumer returns slots with a release store of
/// `tail` after reading them.
pub struct CircularSampleBuffer {
    slots: Box<[UnsafeCell<Sample>]>,
    head: AtomicUsize,
    tail: AtomicUsize,
}

// SAFETY: a slot is only ever accessed by the side that currently owns it
// according to the published indices, and `Producer`/`Consumer` are unique.
unsafe impl Sync for CircularSampleBuffer {}

impl CircularSampleBuffer {
    /// Allocates a buffer of `capacity_n` samples.
    ///
    /// `capacity_n` must be a power of two and at least 2. One slot is kept
    /// empty, so at most `capacity_n - 1` samples are held at once.
    pub fn new(capacity_n: usize) -> Result<Self, LockAmpError> {
        if capacity_n < 2 || !capacity_n.is_power_of_two() {
            return Err(LockAmpError::InvalidBufferCapacity(capacity_n));
        }
        Ok(Self {
            slots: (0..capacity_n)
                .map(|_| UnsafeCell::new(Sample::default()))
                .collect(),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        })
    }

    /// Capacity in samples, including the sacrificed slot.
    #[must_use]
    pub fn capacity_n(&self) -> usize {
        self.slots.len()
    }

    /// Splits the buffer into its two endpoints.
    #[must_use]
    pub fn split(self) -> (Producer, Consumer) {
        let ring = Arc::new(self);
        (
            Producer {
                ring: ring.clone(),
                fifo_warn: RateLimit::default(),
                space_warn: RateLimit::default(),
            },
            Consumer {
                ring,
                saturated_warn: RateLimit::default(),
            },
        )
    }

    fn slot_ptr(&self, idx: usize) -> *mut Sample {
        debug_assert!(idx < self.capacity_n());
        // SAFETY: indices are always masked by `capacity_n - 1`.
        unsafe { UnsafeCell::raw_get(self.slots.as_ptr().add(idx)) }
    }
}

/// View of the buffer taken by the consumer at the start of a read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Producer index at the time of the snapshot.
    pub head: usize,
    /// Consumer index.
    pub tail: usize,
    /// Number of samples available to the consumer.
    pub size_n: usize,
}

/// Writing endpoint. Owned by the drain task.
pub struct Producer {
    ring: Arc<CircularSampleBuffer>,
    fifo_warn: RateLimit,
    space_warn: RateLimit,
}

impl Producer {
    /// Capacity of the buffer in samples.
    #[must_use]
    pub fn capacity_n(&self) -> usize {
        self.ring.capacity_n()
    }

    /// Moves as many samples as fit from `fifo` into the buffer.
    ///
    /// When the buffer has no free slot the desync counter is incremented
    /// and the samples stay in the FIFO. Returns the number of samples moved.
    pub fn move_available_from_fifo(
        &mut self,
        fifo: &mut impl SampleSource,
        desyncs: &DesyncCounter,
    ) -> Result<usize, LockAmpError> {
        let capacity_n = self.capacity_n();
        let fifo_size_n = fifo.size_n()?;
        if fifo_size_n > fifo.capacity_n() * 3 / 4 && self.fifo_warn.allow() {
            tracing::warn!(
                "FIFO is over 3/4 filled ({}/{}). Data loss may be imminent.",
                fifo_size_n,
                fifo.capacity_n()
            );
        }

        let mut head = self.ring.head.load(Ordering::Relaxed);
        let tail = self.ring.tail.load(Ordering::Acquire);
        let space_n = circ_space(head, tail, capacity_n);
        if space_n == 0 {
            desyncs.increment();
            if self.space_warn.allow() {
                tracing::warn!("Data loss. There is no more space in the signal buffer.");
            }
        }

        let bounded_n = space_n.min(fifo_size_n);
        let mut moved = 0;
        let result = (0..bounded_n).try_for_each(|_| {
            let sample = fifo.pop_sample()?;
            // SAFETY: `head` is outside `[tail, head)` and thus owned by the producer.
            unsafe { self.ring.slot_ptr(head).write(sample) };
            head = (head + 1) & (capacity_n - 1);
            moved += 1;
            Ok::<_, LockAmpError>(())
        });
        self.ring.head.store(head, Ordering::Release);
        result.map(|()| moved)
    }
}

/// Reading endpoint. Owned by the reader session.
pub struct Consumer {
    ring: Arc<CircularSampleBuffer>,
    saturated_warn: RateLimit,
}

impl Consumer {
    /// Capacity of the buffer in samples.
    #[must_use]
    pub fn capacity_n(&self) -> usize {
        self.ring.capacity_n()
    }

    /// Takes a snapshot of the samples available for reading.
    ///
    /// A saturated buffer means the producer has been dropping samples, so
    /// the desync counter is incremented.
    pub fn snapshot(&mut self, desyncs: &DesyncCounter) -> Snapshot {
        let capacity_n = self.capacity_n();
        let head = self.ring.head.load(Ordering::Acquire);
        let tail = self.ring.tail.load(Ordering::Relaxed);
        let size_n = circ_cnt(head, tail, capacity_n);
        if size_n == capacity_n - 1 {
            desyncs.increment();
            if self.saturated_warn.allow() {
                tracing::warn!(
                    "Data loss. Signal buffer was not popped in time and has reached its maximum capacity."
                );
            }
        }
        Snapshot { head, tail, size_n }
    }

    fn pop_chunk_to(&mut self, dst: &mut [u8], snapshot: &mut Snapshot) -> usize {
        let capacity_n = self.capacity_n();
        let to_end_n = circ_cnt_to_end(snapshot.head, snapshot.tail, capacity_n);
        let n = to_end_n.min(dst.len() / SAMPLE_SIZE);
        if n == 0 {
            return 0;
        }
        let len = n * SAMPLE_SIZE;
        // SAFETY: slots `[tail, tail + n)` lie within `[tail, head)` of the
        // snapshot, are contiguous, and were published by the acquire load of `head`.
        let src = unsafe {
            std::slice::from_raw_parts(self.ring.slot_ptr(snapshot.tail).cast_const(), n)
        };
        dst[..len].copy_from_slice(src.as_bytes());
        snapshot.tail = (snapshot.tail + n) & (capacity_n - 1);
        snapshot.size_n -= n;
        self.ring.tail.store(snapshot.tail, Ordering::Release);
        len
    }

    /// Copies up to `max_len` bytes of whole samples into `dst`.
    ///
    /// The copy starts at `snapshot.tail` and is split in two at the end of
    /// the array. `tail` is published after each part. Returns the number of
    /// bytes written.
    pub fn pop_span_to(&mut self, dst: &mut [u8], snapshot: &mut Snapshot, max_len: usize) -> usize {
        let len = max_len.min(dst.len());
        let first = self.pop_chunk_to(&mut dst[..len], snapshot);
        let second = self.pop_chunk_to(&mut dst[first..len], snapshot);
        first + second
    }
}
