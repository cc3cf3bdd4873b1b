//! Limits applied while decoding length-prefixed fields.

use crate::Error;
use core::ops::{Bound, RangeBounds};

/// Configuration for limiting the decoded length of a length-prefixed field.
///
/// Lengths read from untrusted input are checked against the range before any bytes are
/// sliced or any elements are allocated.
///
/// # Examples
///
/// ```
/// use commonware_layout::RangeCfg;
///
/// let cfg = RangeCfg::new(0..=1024);
/// assert!(cfg.contains(500));
/// assert!(!cfg.contains(2000));
///
/// // Unbounded by default
/// assert!(RangeCfg::default().contains(usize::MAX));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RangeCfg {
    start: Bound<usize>,
    end: Bound<usize>,
}

impl Default for RangeCfg {
    fn default() -> Self {
        Self::new(..)
    }
}

macro_rules! impl_from_range {
    ($($range:ty),*) => {
        $(
            impl From<$range> for RangeCfg {
                fn from(r: $range) -> Self {
                    Self::new(r)
                }
            }
        )*
    };
}

impl_from_range!(
    core::ops::Range<usize>,
    core::ops::RangeInclusive<usize>,
    core::ops::RangeFrom<usize>,
    core::ops::RangeTo<usize>,
    core::ops::RangeToInclusive<usize>,
    core::ops::RangeFull
);

impl RangeCfg {
    /// Creates a new `RangeCfg` from any type implementing `RangeBounds<usize>`.
    pub fn new(r: impl RangeBounds<usize>) -> Self {
        Self {
            start: r.start_bound().cloned(),
            end: r.end_bound().cloned(),
        }
    }

    /// Creates a `RangeCfg` that only accepts exactly `len`.
    pub fn exact(len: usize) -> Self {
        Self {
            start: Bound::Included(len),
            end: Bound::Included(len),
        }
    }

    /// Returns true if `len` is within this range.
    pub fn contains(&self, len: usize) -> bool {
        match self.start {
            Bound::Included(s) if len < s => return false,
            Bound::Excluded(s) if len <= s => return false,
            _ => {}
        }
        match self.end {
            Bound::Included(e) if len > e => return false,
            Bound::Excluded(e) if len >= e => return false,
            _ => {}
        }
        true
    }

    /// Returns `len` if it is within this range, otherwise [`Error::InvalidLength`].
    pub fn check(&self, len: usize) -> Result<usize, Error> {
        if self.contains(len) {
            Ok(len)
        } else {
            Err(Error::InvalidLength(len))
        }
    }

    /// Returns true if the range has an upper limit.
    pub fn is_bounded(&self) -> bool {
        !matches!(self.end, Bound::Unbounded)
    }
}
