use std::str::FromStr;

use derive_more::Display;
use lockamp_core::defined::FIR_TAPS;

use crate::error::LockAmpError;

const FIR_TABLES: &[u8] = include_bytes!("fir.dat");

/// Coefficient table of the FIR filter.
pub type FirCoefficients = [i32; FIR_TAPS];

/// Built-in FIR filter presets.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FirFilter {
    /// Pass-through. Only the first tap is set.
    #[display("none")]
    None = 0,
    /// Preset Groenning.
    #[display("groenning")]
    Groenning = 1,
    /// Preset A1.
    #[display("a1")]
    A1 = 2,
    /// Preset A2.
    #[display("a2")]
    A2 = 3,
    /// Preset B1.
    #[display("b1")]
    B1 = 4,
    /// Preset B2.
    #[display("b2")]
    B2 = 5,
    /// Preset C1.
    #[display("c1")]
    C1 = 6,
    /// Preset C2.
    #[display("c2")]
    C2 = 7,
}

impl FirFilter {
    /// All presets.
    pub const ALL: [FirFilter; 8] = [
        FirFilter::None,
        FirFilter::Groenning,
        FirFilter::A1,
        FirFilter::A2,
        FirFilter::B1,
        FirFilter::B2,
        FirFilter::C1,
        FirFilter::C2,
    ];

    /// Returns the coefficient table of the preset.
    #[must_use]
    pub fn coefficients(&self) -> FirCoefficients {
        const TABLE_SIZE: usize = FIR_TAPS * size_of::<i32>();
        let offset = *self as usize * TABLE_SIZE;
        let mut taps = [0; FIR_TAPS];
        FIR_TABLES[offset..offset + TABLE_SIZE]
            .chunks_exact(size_of::<i32>())
            .zip(taps.iter_mut())
            .for_each(|(b, tap)| *tap = i32::from_le_bytes([b[0], b[1], b[2], b[3]]));
        taps
    }
}

impl FromStr for FirFilter {
    type Err = LockAmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix('\n').unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|f| f.to_string() == name)
            .ok_or_else(|| LockAmpError::UnknownFirFilter(name.to_owned()))
    }
}
