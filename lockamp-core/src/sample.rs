use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Number of 32-bit components per site.
pub const ENTRIES_PER_SITE: usize = 4;

/// Number of sites multiplexed into one sample.
pub const SITES_PER_SAMPLE: usize = 2;

/// Number of raw FIFO words that make up one sample.
pub const ENTRIES_PER_SAMPLE: usize = ENTRIES_PER_SITE * SITES_PER_SAMPLE;

/// Identifies one of the two measurement sites.
///
/// The generator channels are indexed by the same type since each site is
/// driven by its own generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Site {
    /// The first site.
    S0 = 0,
    /// The second site.
    S1 = 1,
}

impl Site {
    /// All sites in FIFO order.
    pub const ALL: [Site; SITES_PER_SAMPLE] = [Site::S0, Site::S1];

    /// Returns the index of the site.
    #[must_use]
    pub const fn idx(self) -> usize {
        self as usize
    }
}

/// The demodulated components of a single site.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, IntoBytes, FromBytes, Immutable, KnownLayout,
)]
#[repr(C)]
pub struct SiteSample {
    /// High frequency, real part.
    pub hf_re: i32,
    /// High frequency, imaginary part.
    pub hf_im: i32,
    /// Low frequency, real part.
    pub lf_re: i32,
    /// Low frequency, imaginary part.
    pub lf_im: i32,
}

impl SiteSample {
    /// Creates a site sample from its components in FIFO order.
    #[must_use]
    pub const fn from_entries(entries: [i32; ENTRIES_PER_SITE]) -> Self {
        Self {
            hf_re: entries[0],
            hf_im: entries[1],
            lf_re: entries[2],
            lf_im: entries[3],
        }
    }

    /// Returns the components in FIFO order.
    #[must_use]
    pub const fn entries(&self) -> [i32; ENTRIES_PER_SITE] {
        [self.hf_re, self.hf_im, self.lf_re, self.lf_im]
    }
}

/// One acquisition instant: a [`SiteSample`] per site.
///
/// The in-memory layout is packed and is exactly the layout delivered to a
/// reader after a [`ChunkHeader`](crate::chunk::ChunkHeader).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, IntoBytes, FromBytes, Immutable, KnownLayout,
)]
#[repr(C)]
pub struct Sample {
    /// Per-site components.
    pub sites: [SiteSample; SITES_PER_SAMPLE],
}

impl Sample {
    /// Creates a sample from raw words in site-major FIFO order.
    #[must_use]
    pub fn from_entries(entries: [i32; ENTRIES_PER_SAMPLE]) -> Self {
        let mut sites = [SiteSample::default(); SITES_PER_SAMPLE];
        sites
            .iter_mut()
            .zip(entries.chunks_exact(ENTRIES_PER_SITE))
            .for_each(|(site, e)| *site = SiteSample::from_entries([e[0], e[1], e[2], e[3]]));
        Self { sites }
    }

    /// Returns the raw words in site-major FIFO order.
    #[must_use]
    pub fn entries(&self) -> [i32; ENTRIES_PER_SAMPLE] {
        let mut entries = [0; ENTRIES_PER_SAMPLE];
        entries
            .chunks_exact_mut(ENTRIES_PER_SITE)
            .zip(self.sites.iter())
            .for_each(|(dst, site)| dst.copy_from_slice(&site.entries()));
        entries
    }

    /// Returns the sample of the given site.
    #[must_use]
    pub const fn site(&self, site: Site) -> &SiteSample {
        &self.sites[site.idx()]
    }
}
