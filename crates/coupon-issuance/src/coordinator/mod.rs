//! The issuance coordinator.
//!
//! [`IssuanceCoordinator`] owns one instance of every moving part (ID source,
//! code renderer, registry, clock) and implements the three operations a
//! transport exposes: create a campaign, look one up, issue a coupon.
//!
//! ## Issuance path
//!
//! 1. Resolve the campaign (`NotFound`).
//! 2. Read the clock once; every later decision uses that reading.
//! 3. Gate on the campaign window (`PeriodNotStarted` / `PeriodExpired`).
//! 4. Render a unique code and build the coupon.
//! 5. Admit it into the campaign's pool (`CapacityExhausted`).
//!
//! Only step 5 mutates campaign state, so every failure leaves the campaign
//! exactly as it was.


use crate::{
    Campaign, CampaignId, CampaignRegistry, CodeGenerator, Coupon, DEFAULT_CODE_PREFIX, Error,
    IdGenerator, NewCampaign, Result, SystemClock, TimeSource, Timestamp,
};
use core::time::Duration;
use std::sync::Arc;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// How the `expire_at` of an issued coupon is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CouponExpiry {
    /// The coupon expires when its campaign's window closes.
    #[default]
    CampaignEnd,
    /// The coupon expires a fixed duration after it was issued.
    AfterIssue(Duration),
}

impl CouponExpiry {
    fn expire_at(self, campaign: &Campaign, issued_at: Timestamp) -> Timestamp {
        match self {
            Self::CampaignEnd => campaign.end_at(),
            Self::AfterIssue(ttl) => issued_at.saturating_add(ttl),
        }
    }
}

/// Construction-time settings for an [`IssuanceCoordinator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuanceConfig {
    /// Textual prefix of every coupon code stamp.
    pub code_prefix: String,
    pub coupon_expiry: CouponExpiry,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            code_prefix: DEFAULT_CODE_PREFIX.to_string(),
            coupon_expiry: CouponExpiry::default(),
        }
    }
}

/// Issues coupons for campaigns under concurrent load.
///
/// Shareable across threads (`&self` everywhere); wrap it in an [`Arc`] to
/// hand it to request handlers. Locks taken internally are per campaign pool
/// plus one short-lived registry lock, so issuance against different campaigns
/// proceeds in parallel.
///
/// Coupon codes are unique across the whole process: every coordinator draws
/// code serials from the same counter.
pub struct IssuanceCoordinator<T = SystemClock>
where
    T: TimeSource,
{
    ids: IdGenerator,
    codes: CodeGenerator,
    campaigns: CampaignRegistry,
    expiry: CouponExpiry,
    clock: T,
}

impl IssuanceCoordinator<SystemClock> {
    /// Creates a coordinator reading the system wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CodeGeneration`] if `config.code_prefix` is too long.
    pub fn new(config: IssuanceConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<T> IssuanceCoordinator<T>
where
    T: TimeSource,
{
    /// Creates a coordinator reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CodeGeneration`] if `config.code_prefix` is too long.
    pub fn with_clock(config: IssuanceConfig, clock: T) -> Result<Self> {
        Ok(Self {
            ids: IdGenerator::new(),
            codes: CodeGenerator::new(config.code_prefix)?,
            campaigns: CampaignRegistry::new(),
            expiry: config.coupon_expiry,
            clock,
        })
    }

    /// Registers a new campaign and returns it.
    ///
    /// The campaign gets the next ID, `created_at = now`, and an empty pool
    /// sized to `spec.coupon_limit`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidWindow`] if `spec.start_at > spec.end_at`; no ID is
    ///   consumed.
    /// - [`Error::IdSpaceExhausted`] if the ID counter cannot advance.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(limit = spec.coupon_limit, name = %spec.name))
    )]
    pub fn create_campaign(&self, spec: NewCampaign) -> Result<Arc<Campaign>> {
        if spec.start_at > spec.end_at {
            return Err(Error::InvalidWindow {
                start_at: spec.start_at,
                end_at: spec.end_at,
            });
        }

        let id = self.ids.next_id()?;
        let campaign = Arc::new(Campaign::new(id, spec, self.clock.now()));
        self.campaigns.add(Arc::clone(&campaign));

        #[cfg(feature = "tracing")]
        tracing::debug!(%id, "campaign created");

        Ok(campaign)
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` was never created.
    pub fn get_campaign(&self, id: CampaignId) -> Result<Arc<Campaign>> {
        self.campaigns.get(id)
    }

    /// Every registered campaign, in no particular order.
    pub fn list_campaigns(&self) -> Vec<Arc<Campaign>> {
        self.campaigns.list()
    }

    /// Issues one coupon from `campaign_id`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the campaign does not exist.
    /// - [`Error::PeriodNotStarted`] / [`Error::PeriodExpired`] outside the
    ///   campaign window.
    /// - [`Error::CapacityExhausted`] once the coupon limit is reached.
    /// - [`Error::CodeGeneration`] if the code cannot be rendered.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn issue_coupon(&self, campaign_id: CampaignId) -> Result<Coupon> {
        let campaign = self.campaigns.get(campaign_id)?;
        let now = self.clock.now();
        campaign.validity_at(now).ensure_active()?;

        // Fast path for sold-out campaigns; `try_issue` stays authoritative.
        if campaign.coupons().remaining() == 0 {
            return Err(Error::CapacityExhausted);
        }

        let coupon = Coupon {
            code: self.codes.next_code(now)?,
            issued_at: now,
            expire_at: self.expiry.expire_at(&campaign, now),
        };
        campaign.coupons().try_issue(coupon.clone())?;

        #[cfg(feature = "tracing")]
        tracing::trace!(code = %coupon.code, "coupon issued");

        Ok(coupon)
    }

    /// The registry backing this coordinator.
    pub const fn registry(&self) -> &CampaignRegistry {
        &self.campaigns
    }

    pub const fn clock(&self) -> &T {
        &self.clock
    }

    pub const fn coupon_expiry(&self) -> CouponExpiry {
        self.expiry
    }
}
