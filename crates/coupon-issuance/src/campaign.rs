use crate::{CampaignId, CouponPool, Error, Result, Timestamp};

/// Caller-supplied attributes of a campaign to create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCampaign {
    pub coupon_limit: u64,
    pub name: String,
    pub description: String,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
}

/// Where a campaign stands relative to its issuance window at a given instant.
///
/// Derived from the clock on every request, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Validity {
    /// `now < start_at`
    Pending,
    /// `start_at <= now <= end_at`
    Active,
    /// `now > end_at`
    Expired,
}

impl Validity {
    pub fn at(start_at: Timestamp, end_at: Timestamp, now: Timestamp) -> Self {
        if now < start_at {
            Self::Pending
        } else if now > end_at {
            Self::Expired
        } else {
            Self::Active
        }
    }

    /// Maps the state to the issuance gate: only [`Validity::Active`] passes.
    ///
    /// # Errors
    ///
    /// [`Error::PeriodNotStarted`] for `Pending`, [`Error::PeriodExpired`] for
    /// `Expired`.
    pub fn ensure_active(self) -> Result<()> {
        match self {
            Self::Active => Ok(()),
            Self::Pending => Err(Error::PeriodNotStarted),
            Self::Expired => Err(Error::PeriodExpired),
        }
    }
}

/// A named, time-bounded allocation of a fixed number of coupons.
///
/// Every attribute is fixed at construction; the only state that changes over
/// the campaign's life is the content of its [`CouponPool`].
#[derive(Debug)]
pub struct Campaign {
    id: CampaignId,
    name: String,
    description: String,
    created_at: Timestamp,
    start_at: Timestamp,
    end_at: Timestamp,
    coupons: CouponPool,
}

impl Campaign {
    /// Builds a campaign and its pool, sized to `spec.coupon_limit`.
    ///
    /// The window is taken as given; [`crate::IssuanceCoordinator`] is where
    /// inverted windows are rejected.
    pub fn new(id: CampaignId, spec: NewCampaign, created_at: Timestamp) -> Self {
        let NewCampaign {
            coupon_limit,
            name,
            description,
            start_at,
            end_at,
        } = spec;
        Self {
            id,
            name,
            description,
            created_at,
            start_at,
            end_at,
            coupons: CouponPool::new(coupon_limit),
        }
    }

    pub const fn id(&self) -> CampaignId {
        self.id
    }

    pub const fn coupon_limit(&self) -> u64 {
        self.coupons.limit()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub const fn start_at(&self) -> Timestamp {
        self.start_at
    }

    pub const fn end_at(&self) -> Timestamp {
        self.end_at
    }

    pub const fn coupons(&self) -> &CouponPool {
        &self.coupons
    }

    pub fn validity_at(&self, now: Timestamp) -> Validity {
        Validity::at(self.start_at, self.end_at, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> (Timestamp, Timestamp) {
        (Timestamp::from_unix_secs(100), Timestamp::from_unix_secs(200))
    }

    #[test]
    fn window_edges_are_inclusive() {
        let (start, end) = window();
        let one_ns = core::time::Duration::from_nanos(1);

        assert_eq!(
            Validity::at(start, end, start.saturating_sub(one_ns)),
            Validity::Pending
        );
        assert_eq!(Validity::at(start, end, start), Validity::Active);
        assert_eq!(
            Validity::at(start, end, Timestamp::from_unix_secs(150)),
            Validity::Active
        );
        assert_eq!(Validity::at(start, end, end), Validity::Active);
        assert_eq!(
            Validity::at(start, end, end.saturating_add(one_ns)),
            Validity::Expired
        );
    }

    #[test]
    fn single_instant_window_is_active_only_at_that_instant() {
        let at = Timestamp::from_unix_secs(100);
        assert_eq!(Validity::at(at, at, at), Validity::Active);
        assert_eq!(
            Validity::at(at, at, Timestamp::from_unix_secs(99)),
            Validity::Pending
        );
        assert_eq!(
            Validity::at(at, at, Timestamp::from_unix_secs(101)),
            Validity::Expired
        );
    }

    #[test]
    fn only_active_passes_the_gate() {
        assert_eq!(Validity::Active.ensure_active(), Ok(()));
        assert_eq!(
            Validity::Pending.ensure_active(),
            Err(Error::PeriodNotStarted)
        );
        assert_eq!(Validity::Expired.ensure_active(), Err(Error::PeriodExpired));
    }

    #[test]
    fn campaign_keeps_submitted_attributes() {
        let (start_at, end_at) = window();
        let campaign = Campaign::new(
            CampaignId::new(7),
            NewCampaign {
                coupon_limit: 3,
                name: "launch".into(),
                description: "first week".into(),
                start_at,
                end_at,
            },
            Timestamp::from_unix_secs(50),
        );

        assert_eq!(campaign.id(), CampaignId::new(7));
        assert_eq!(campaign.coupon_limit(), 3);
        assert_eq!(campaign.name(), "launch");
        assert_eq!(campaign.description(), "first week");
        assert_eq!(campaign.created_at(), Timestamp::from_unix_secs(50));
        assert_eq!(campaign.start_at(), start_at);
        assert_eq!(campaign.end_at(), end_at);
        assert_eq!(campaign.coupons().remaining(), 3);
        assert_eq!(
            campaign.validity_at(Timestamp::from_unix_secs(50)),
            Validity::Pending
        );
    }
}
