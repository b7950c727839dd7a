//! Vector lane layouts.
//!
//! Vectors of width 3 occupy the storage of width 4, so a flat buffer viewed
//! as 3-wide vectors has one padding slot per group.

use serde::{Deserialize, Serialize};

use crate::error::NarrowError;

/// A supported vector width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct VecWidth(usize);

impl VecWidth {
    pub const SCALAR: Self = Self(1);
    pub const ALL: [Self; 6] = [Self(1), Self(2), Self(3), Self(4), Self(8), Self(16)];

    /// # Errors
    ///
    /// Returns [`NarrowError::Parse`] for widths other than 1, 2, 3, 4, 8, 16.
    pub fn new(width: usize) -> Result<Self, NarrowError> {
        match width {
            1 | 2 | 3 | 4 | 8 | 16 => Ok(Self(width)),
            other => Err(NarrowError::Parse(format!(
                "vector width {other} (expected 1, 2, 3, 4, 8 or 16)"
            ))),
        }
    }

    /// Live lanes per vector.
    pub const fn lanes(self) -> usize {
        self.0
    }

    /// Storage slots per vector.
    pub const fn stride(self) -> usize {
        if self.0 == 3 { 4 } else { self.0 }
    }

    /// Number of whole vectors in a buffer of `n` elements.
    pub const fn groups(self, n: usize) -> usize {
        n / self.stride()
    }

    /// Flat index of `lane` in vector `group`.
    pub const fn index(self, group: usize, lane: usize) -> usize {
        group * self.stride() + lane
    }

    /// Flat indices of all live lanes of a buffer of `n` elements.
    pub fn live_indices(self, n: usize) -> impl Iterator<Item = usize> {
        (0..self.groups(n)).flat_map(move |g| (0..self.lanes()).map(move |l| self.index(g, l)))
    }

    /// Copy the live lanes of vector `group` out of `data`.
    pub fn gather<T: Copy>(self, data: &[T], group: usize, out: &mut Vec<T>) {
        out.clear();
        let start = self.index(group, 0);
        out.extend_from_slice(&data[start..start + self.lanes()]);
    }
}

impl TryFrom<usize> for VecWidth {
    type Error = NarrowError;

    fn try_from(width: usize) -> Result<Self, Self::Error> {
        Self::new(width)
    }
}

impl From<VecWidth> for usize {
    fn from(width: VecWidth) -> Self {
        width.0
    }
}

impl std::fmt::Display for VecWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
