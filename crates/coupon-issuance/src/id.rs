use crate::{Error, Result};
use core::fmt;
use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Identifier of a campaign, unique within one [`IdGenerator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CampaignId(u64);

impl CampaignId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for CampaignId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lock-free monotonic ID source suitable for multi-threaded environments.
///
/// The counter lives in a single [`AtomicU64`]; each grant is one
/// compare-and-swap, so concurrent callers always observe distinct values and
/// grants are ordered by when their swap lands.
///
/// The first grant is `1`. Once the counter reaches `u64::MAX` every further
/// call fails with [`Error::IdSpaceExhausted`] instead of wrapping.
///
/// # Example
///
/// ```
/// use coupon_issuance::IdGenerator;
///
/// let ids = IdGenerator::new();
/// assert_eq!(ids.next_id().unwrap().get(), 1);
/// assert_eq!(ids.next_id().unwrap().get(), 2);
/// assert_eq!(ids.last(), 2);
/// ```
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator whose first grant is `1`.
    pub const fn new() -> Self {
        Self::with_last(0)
    }

    /// Creates a generator that resumes after `last`; the next grant is
    /// `last + 1`.
    pub const fn with_last(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    /// Grants the next ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdSpaceExhausted`] once `u64::MAX` has been granted.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<CampaignId> {
        self.last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                last.checked_add(1)
            })
            .map(|prev| CampaignId(prev + 1))
            .map_err(|_| Error::IdSpaceExhausted)
    }

    /// The most recently granted raw ID, or `0` if none has been granted.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::thread::scope;

    #[test]
    fn ids_start_at_one_and_increase() {
        let ids = IdGenerator::new();
        assert_eq!(ids.last(), 0);
        for expected in 1..=5 {
            assert_eq!(ids.next_id(), Ok(CampaignId::new(expected)));
        }
        assert_eq!(ids.last(), 5);
    }

    #[test]
    fn resumes_after_last() {
        let ids = IdGenerator::with_last(41);
        assert_eq!(ids.next_id().unwrap().get(), 42);
    }

    #[test]
    fn exhausted_space_fails_without_wrapping() {
        let ids = IdGenerator::with_last(u64::MAX - 1);
        assert_eq!(ids.next_id(), Ok(CampaignId::new(u64::MAX)));
        assert_eq!(ids.next_id(), Err(Error::IdSpaceExhausted));
        assert_eq!(ids.next_id(), Err(Error::IdSpaceExhausted));
        assert_eq!(ids.last(), u64::MAX);
    }

    #[test]
    fn concurrent_grants_are_distinct() {
        const THREADS: usize = 8;
        const IDS_PER_THREAD: usize = 1024;

        let ids = IdGenerator::new();
        let seen = Mutex::new(HashSet::with_capacity(THREADS * IDS_PER_THREAD));

        scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    for _ in 0..IDS_PER_THREAD {
                        let id = ids.next_id().unwrap();
                        assert!(seen.lock().unwrap().insert(id), "duplicate id {id}");
                    }
                });
            }
        });

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), THREADS * IDS_PER_THREAD);
        assert_eq!(ids.last(), (THREADS * IDS_PER_THREAD) as u64);
        assert!(seen.iter().all(|id| id.get() >= 1));
    }
}
