//! Error types for coupon issuance.
//!
//! Every failure the engine can produce is recoverable and surfaces as an
//! [`Error`] value. Nothing in the crate panics on a request path, and nothing
//! retries internally; retry policy belongs to the caller.
//!
//! ## Error Cases
//! - `NotFound`: no campaign is registered under the requested ID.
//! - `PeriodNotStarted` / `PeriodExpired`: the request fell outside the
//!   campaign's issuance window.
//! - `CapacityExhausted`: the campaign already issued its full coupon limit.
//! - `CodeGeneration`: a coupon code could not be rendered.
//! - `InvalidWindow`: a campaign was submitted with `start_at > end_at`.
//! - `IdSpaceExhausted`: the campaign ID counter reached `u64::MAX`.

use crate::{CampaignId, Timestamp};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants the issuance engine can emit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No campaign exists with the given ID.
    #[error("campaign {id} not found")]
    NotFound { id: CampaignId },

    /// The campaign window has not opened yet (`now < start_at`).
    #[error("campaign is not started yet")]
    PeriodNotStarted,

    /// The campaign window has closed (`now > end_at`).
    #[error("campaign is over")]
    PeriodExpired,

    /// The campaign's coupon pool has no remaining capacity.
    #[error("coupon limit exceeded")]
    CapacityExhausted,

    /// The coupon code could not be produced.
    ///
    /// Unreachable with a validated prefix and a post-1970 clock, but kept as
    /// a value instead of a panic.
    #[error("code generation failed: {reason}")]
    CodeGeneration { reason: String },

    /// The submitted issuance window ends before it starts.
    #[error("invalid campaign window: start_at {start_at} is after end_at {end_at}")]
    InvalidWindow {
        start_at: Timestamp,
        end_at: Timestamp,
    },

    /// The campaign ID counter cannot advance without wrapping.
    #[error("campaign id space exhausted")]
    IdSpaceExhausted,
}
