//! Key share limits and split parameters.

use crate::PrimitivesError;

/// Smallest threshold that still spreads trust across shares.
pub const MIN_THRESHOLD: usize = 2;
/// Smallest number of shares a split may produce.
pub const MIN_TOTAL_SHARES: usize = 2;

/// Hex digits in the integrity tag.
pub const INTEGRITY_LEN: usize = 8;
/// Longest Base58 x or y field: 58^44 exceeds the field prime.
pub const MAX_COORDINATE_LEN: usize = 44;
/// Separator between the fields of a backup share.
pub const BACKUP_FIELD_SEPARATOR: char = '.';
/// Fields per backup share: x, y, threshold, integrity.
pub const BACKUP_FIELD_COUNT: usize = 4;

/// A validated threshold and share count for splitting a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    /// At least `MIN_THRESHOLD` and at most `total_shares`.
    threshold: usize,
    /// At least `MIN_TOTAL_SHARES`.
    total_shares: usize,
}

impl SplitConfig {
    /// Validate a requested split.
    ///
    /// Counts are signed so that nonsensical requests (negative share counts)
    /// are rejected rather than unrepresentable at the call site.
    ///
    /// # Returns
    /// `InvalidThreshold` if `threshold < 2` or `threshold > total_shares`;
    /// `InvalidShareCount` if `total_shares < 2`.
    pub fn new(threshold: i32, total_shares: i32) -> Result<Self, PrimitivesError> {
        if threshold < MIN_THRESHOLD as i32 {
            return Err(PrimitivesError::InvalidThreshold(format!(
                "threshold must be at least {}, got {}",
                MIN_THRESHOLD, threshold
            )));
        }
        if total_shares < MIN_TOTAL_SHARES as i32 {
            return Err(PrimitivesError::InvalidShareCount(format!(
                "totalShares must be at least {}, got {}",
                MIN_TOTAL_SHARES, total_shares
            )));
        }
        if threshold > total_shares {
            return Err(PrimitivesError::InvalidThreshold(format!(
                "threshold {} should be less than or equal to totalShares {}",
                threshold, total_shares
            )));
        }
        Ok(SplitConfig {
            threshold: threshold as usize,
            total_shares: total_shares as usize,
        })
    }

    /// Shares needed to recover the key.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Shares the split produces.
    pub fn total_shares(&self) -> usize {
        self.total_shares
    }
}
