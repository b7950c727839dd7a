//! Launch geometry validation.
//!
//! An nd-range is a global size and a work-group (local) size per dimension.
//! Index order follows the offload API: the last index is the fastest
//! varying hardware dimension `x`, the one before it `y`, then `z`. The
//! number of work-groups in each hardware dimension is capped by the device.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix every work-group limit error message starts with.
pub const WORK_GROUP_LIMIT_MSG: &str = "Number of work-groups exceed limit for dimension ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("nd-range rank must be 1, 2 or 3 with matching global/local ranks, got {global}/{local}")]
    Rank { global: usize, local: usize },

    #[error("Work-group size must be non-zero in dimension {dim}")]
    ZeroLocal { dim: usize },

    #[error("Global size {global} is not divisible by work-group size {local} in dimension {dim}")]
    NotDivisible {
        dim: usize,
        global: usize,
        local: usize,
    },

    #[error("Number of work-groups exceed limit for dimension {dim} : {groups} > {limit}")]
    WorkGroupLimit { dim: usize, groups: usize, limit: usize },
}

/// Per-dimension work-group count limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchLimits {
    pub max_x: usize,
    pub max_yz: usize,
}

impl Default for LaunchLimits {
    fn default() -> Self {
        Self {
            max_x: (1 << 31) - 1,
            max_yz: 65_535,
        }
    }
}

impl LaunchLimits {
    /// Limit for hardware dimension `dim` (0 = x).
    pub const fn for_dim(&self, dim: usize) -> usize {
        if dim == 0 { self.max_x } else { self.max_yz }
    }
}

/// A `D`-dimensional launch range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdRange<const D: usize> {
    pub global: [usize; D],
    pub local: [usize; D],
}

impl<const D: usize> NdRange<D> {
    pub const fn new(global: [usize; D], local: [usize; D]) -> Self {
        Self { global, local }
    }

    /// Work-groups per API index.
    pub fn group_counts(&self) -> [usize; D] {
        let mut out = [0; D];
        for i in 0..D {
            out[i] = self.global[i] / self.local[i].max(1);
        }
        out
    }

    /// # Errors
    ///
    /// See [`validate_dims`].
    pub fn validate(&self, limits: &LaunchLimits) -> Result<(), LaunchError> {
        validate_dims(&self.global, &self.local, limits)
    }
}

/// Validate a launch given as slices in API index order.
///
/// # Errors
///
/// - [`LaunchError::Rank`] if the ranks differ or fall outside `1..=3`
/// - [`LaunchError::ZeroLocal`] for a zero work-group size
/// - [`LaunchError::NotDivisible`] if a global size is not a multiple of
///   its work-group size
/// - [`LaunchError::WorkGroupLimit`] if a dimension has too many groups
///
/// Reported dimensions are hardware dimensions (0 = x).
pub fn validate_dims(
    global: &[usize],
    local: &[usize],
    limits: &LaunchLimits,
) -> Result<(), LaunchError> {
    let rank = global.len();
    if rank != local.len() || !(1..=3).contains(&rank) {
        return Err(LaunchError::Rank {
            global: rank,
            local: local.len(),
        });
    }

    for (i, (&g, &l)) in global.iter().zip(local).enumerate() {
        let dim = rank - 1 - i;
        if l == 0 {
            return Err(LaunchError::ZeroLocal { dim });
        }
        if g % l != 0 {
            return Err(LaunchError::NotDivisible {
                dim,
                global: g,
                local: l,
            });
        }
        let groups = g / l;
        let limit = limits.for_dim(dim);
        if groups > limit {
            tracing::debug!(dim, groups, limit, "work-group limit exceeded");
            return Err(LaunchError::WorkGroupLimit { dim, groups, limit });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSIZE: usize = 32;
    const MAX_X: usize = (1 << 31) - 1;
    const MAX_YZ: usize = 65_535;

    fn check<const D: usize>(global: [usize; D], local: [usize; D], expect_fail: bool) {
        let result = NdRange::new(global, local).validate(&LaunchLimits::default());
        match result {
            Ok(()) => assert!(!expect_fail, "{global:?}/{local:?} should fail"),
            Err(e) => {
                assert!(expect_fail, "{global:?}/{local:?} failed: {e}");
                assert!(e.to_string().starts_with(WORK_GROUP_LIMIT_MSG), "{e}");
            }
        }
    }

    #[test]
    fn one_dimensional_x_limit() {
        check([MAX_X * LSIZE], [LSIZE], false);
        check([(MAX_X + 1) * LSIZE], [LSIZE], true);
    }

    #[test]
    fn two_dimensional_limits() {
        check([1, MAX_X * LSIZE], [1, LSIZE], false);
        check([1, (MAX_X + 1) * LSIZE], [1, LSIZE], true);
        check([MAX_YZ * LSIZE, 1], [LSIZE, 1], false);
        check([(MAX_YZ + 1) * LSIZE, 1], [LSIZE, 1], true);
    }

    #[test]
    fn three_dimensional_limits() {
        check([1, 1, MAX_X * LSIZE], [1, 1, LSIZE], false);
        check([1, 1, (MAX_X + 1) * LSIZE], [1, 1, LSIZE], true);
        check([1, MAX_YZ * LSIZE, 1], [1, LSIZE, 1], false);
        check([1, (MAX_YZ + 1) * LSIZE, 1], [1, LSIZE, 1], true);
        check([MAX_YZ * LSIZE, 1, 1], [LSIZE, 1, 1], false);
        check([(MAX_YZ + 1) * LSIZE, 1, 1], [LSIZE, 1, 1], true);
    }

    #[test]
    fn reports_hardware_dimension() {
        let err = NdRange::new([(MAX_YZ + 1) * LSIZE, 1, 1], [LSIZE, 1, 1])
            .validate(&LaunchLimits::default())
            .unwrap_err();
        assert_eq!(
            err,
            LaunchError::WorkGroupLimit {
                dim: 2,
                groups: MAX_YZ + 1,
                limit: MAX_YZ
            }
        );
        assert!(err.to_string().starts_with("Number of work-groups exceed limit for dimension 2"));
    }

    #[test]
    fn zero_local_and_divisibility() {
        let limits = LaunchLimits::default();
        assert_eq!(
            validate_dims(&[64], &[0], &limits),
            Err(LaunchError::ZeroLocal { dim: 0 })
        );
        assert!(matches!(
            validate_dims(&[65, 1], &[32, 1], &limits),
            Err(LaunchError::NotDivisible { dim: 1, .. })
        ));
    }

    #[test]
    fn rank_mismatch() {
        let limits = LaunchLimits::default();
        assert!(matches!(
            validate_dims(&[1, 2], &[1], &limits),
            Err(LaunchError::Rank { .. })
        ));
        assert!(matches!(
            validate_dims(&[1, 1, 1, 1], &[1, 1, 1, 1], &limits),
            Err(LaunchError::Rank { .. })
        ));
    }

    #[test]
    fn group_counts() {
        let r = NdRange::new([64, 128], [8, 32]);
        assert_eq!(r.group_counts(), [8, 4]);
    }
}
