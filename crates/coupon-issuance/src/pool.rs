use crate::{Error, Result, Timestamp};
use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Upper bound on the up-front allocation for a pool's issued list.
const MAX_PREALLOCATED: u64 = 4096;

/// A single issued coupon.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coupon {
    pub code: String,
    pub issued_at: Timestamp,
    pub expire_at: Timestamp,
}

struct PoolState {
    remaining: u64,
    issued: Vec<Coupon>,
}

/// A capacity-bounded, append-only collection of the coupons one campaign has
/// issued.
///
/// One [`Mutex`] guards the remaining capacity and the issued list together,
/// so `issued.len() + remaining == limit` holds at every point another thread
/// can observe. Each pool owns its own lock: issuance against one campaign
/// never waits on another.
///
/// # Example
///
/// ```
/// use coupon_issuance::{Coupon, CouponPool, Error, Timestamp};
///
/// let pool = CouponPool::new(1);
/// let coupon = Coupon {
///     code: "CPN0000001".into(),
///     issued_at: Timestamp::UNIX_EPOCH,
///     expire_at: Timestamp::UNIX_EPOCH,
/// };
///
/// assert_eq!(pool.try_issue(coupon.clone()), Ok(()));
/// assert_eq!(pool.try_issue(coupon), Err(Error::CapacityExhausted));
/// assert_eq!(pool.remaining(), 0);
/// ```
pub struct CouponPool {
    limit: u64,
    state: Mutex<PoolState>,
}

impl CouponPool {
    pub fn new(limit: u64) -> Self {
        let capacity = usize::try_from(limit.min(MAX_PREALLOCATED)).unwrap_or(0);
        Self {
            limit,
            state: Mutex::new(PoolState {
                remaining: limit,
                issued: Vec::with_capacity(capacity),
            }),
        }
    }

    /// Admits `coupon` if the pool has capacity left.
    ///
    /// The capacity check, the append and the decrement happen in one
    /// critical section. On failure the pool is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExhausted`] if every slot is taken.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all, fields(code = %coupon.code)))]
    pub fn try_issue(&self, coupon: Coupon) -> Result<()> {
        let mut state = self.state.lock();
        if state.remaining == 0 {
            return Err(Error::CapacityExhausted);
        }
        state.issued.push(coupon);
        state.remaining -= 1;
        Ok(())
    }

    /// Returns a point-in-time copy of the issued coupons, in admission order.
    pub fn snapshot(&self) -> Vec<Coupon> {
        self.state.lock().issued.clone()
    }

    /// Slots still available.
    pub fn remaining(&self) -> u64 {
        self.state.lock().remaining
    }

    /// Coupons admitted so far.
    pub fn issued_count(&self) -> usize {
        self.state.lock().issued.len()
    }

    /// The capacity this pool was created with.
    pub const fn limit(&self) -> u64 {
        self.limit
    }
}

impl core::fmt::Debug for CouponPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CouponPool")
            .field("limit", &self.limit)
            .field("remaining", &state.remaining)
            .field("issued", &state.issued.len())
            .finish()
    }
}
