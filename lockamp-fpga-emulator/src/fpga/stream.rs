use std::time::Instant;

use lockamp_core::{
    defined::BASE_TIME_STEP_NS,
    sample::{Sample, ENTRIES_PER_SAMPLE},
};

const MAX_HB_FILTERS: u32 = 4;

/// Real-time synthetic sample source.
///
/// The `k`-th emitted sample has every component equal to `k` (wrapping).
/// Samples are produced at the rate implied by the half-band filter count.
pub(crate) struct Stream {
    origin: Instant,
    origin_index: u64,
    step_ns: u64,
    emitted: u64,
}

fn step_ns(hb_filters: u32) -> u64 {
    BASE_TIME_STEP_NS << hb_filters.min(MAX_HB_FILTERS)
}

impl Stream {
    pub fn new(hb_filters: u32) -> Self {
        Self {
            origin: Instant::now(),
            origin_index: 0,
            step_ns: step_ns(hb_filters),
            emitted: 0,
        }
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn emit(&mut self, hb_filters: u32, mut f: impl FnMut(Sample)) {
        let now = Instant::now();
        let step = step_ns(hb_filters);
        if step != self.step_ns {
            self.origin = now;
            self.origin_index = self.emitted;
            self.step_ns = step;
        }
        let due = self.origin_index
            + (now.duration_since(self.origin).as_nanos() / self.step_ns as u128) as u64;
        while self.emitted < due {
            f(Sample::from_entries([self.emitted as i32; ENTRIES_PER_SAMPLE]));
            self.emitted += 1;
        }
    }
}
