//! Connect service implementation for coupon issuance.
//!
//! This module defines [`CouponService`], the shared state behind every RPC
//! route, and the axum handlers for `CreateCampaign`, `GetCampaign` and
//! `IssueCoupon`.
//!
//! ## Responsibilities
//!
//! - Decode Connect unary JSON requests and encode their responses.
//! - Delegate to the [`IssuanceCoordinator`], which owns all issuance rules.
//! - Track in-flight requests so shutdown can drain them.
//! - Refuse new requests, and report `NOT_SERVING`, once shutdown begins.

use crate::server::{
    config::ServerConfig,
    service::{
        error::ApiError,
        wire::{
            CampaignMessage, CampaignResponse, CouponMessage, CreateCampaignRequest,
            CreateCampaignResponse, GetCampaignRequest, GetCampaignResponse, IssueCouponRequest,
            IssueCouponResponse,
        },
    },
    telemetry::{
        decrement_requests_inflight, increment_campaigns_created, increment_coupons_issued,
        increment_issuance_rejected, increment_requests_inflight,
    },
};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use core::time::Duration;
use coupon_issuance::IssuanceCoordinator;
use portable_atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

pub const CREATE_CAMPAIGN_PATH: &str = "/coupon.v1.CouponIssuanceService/CreateCampaign";
pub const GET_CAMPAIGN_PATH: &str = "/coupon.v1.CouponIssuanceService/GetCampaign";
pub const ISSUE_COUPON_PATH: &str = "/coupon.v1.CouponIssuanceService/IssueCoupon";
pub const HEALTH_PATH: &str = "/healthz";

/// Shared state of the coupon RPC service.
///
/// Cheap to clone: every clone points at the same coordinator, shutdown token
/// and in-flight counter.
#[derive(Clone)]
pub struct CouponService {
    coordinator: Arc<IssuanceCoordinator>,
    shutdown_token: CancellationToken,
    inflight: Arc<AtomicUsize>,
    shutdown_timeout: Duration,
}

/// Marks one request as in flight until dropped.
struct InflightGuard<'a> {
    inflight: &'a AtomicUsize,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.inflight.fetch_sub(1, Ordering::SeqCst);
        decrement_requests_inflight();
    }
}

impl CouponService {
    /// # Errors
    ///
    /// Returns [`coupon_issuance::Error::CodeGeneration`] if the configured
    /// code prefix is unusable.
    pub fn new(config: &ServerConfig) -> coupon_issuance::Result<Self> {
        let coordinator = IssuanceCoordinator::new(config.issuance.clone())?;
        Ok(Self {
            coordinator: Arc::new(coordinator),
            shutdown_token: CancellationToken::new(),
            inflight: Arc::new(AtomicUsize::new(0)),
            shutdown_timeout: config.shutdown_timeout,
        })
    }

    /// Builds the HTTP router serving every RPC plus the health probe.
    pub fn router(self) -> Router {
        Router::new()
            .route(CREATE_CAMPAIGN_PATH, post(create_campaign))
            .route(GET_CAMPAIGN_PATH, post(get_campaign))
            .route(ISSUE_COUPON_PATH, post(issue_coupon))
            .route(HEALTH_PATH, get(health))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(self)
    }

    pub fn is_serving(&self) -> bool {
        !self.shutdown_token.is_cancelled()
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    /// Admits one request, or refuses it once shutdown has begun.
    ///
    /// The counter is bumped before the token is checked so the drain loop in
    /// [`CouponService::shutdown`] cannot miss an admitted request.
    fn begin(&self) -> Result<InflightGuard<'_>, ApiError> {
        self.inflight.fetch_add(1, Ordering::SeqCst);
        increment_requests_inflight();
        let guard = InflightGuard {
            inflight: &self.inflight,
        };

        if self.shutdown_token.is_cancelled() {
            return Err(ApiError::ServiceShutdown);
        }
        Ok(guard)
    }

    /// Gracefully stops the service.
    ///
    /// - Cancels the shutdown token: new RPCs get `unavailable` and the health
    ///   probe reports `NOT_SERVING`.
    /// - Waits up to the configured timeout for in-flight RPCs to finish.
    pub async fn shutdown(&self) {
        #[cfg(feature = "tracing")]
        tracing::info!("Refusing new requests");
        self.shutdown_token.cancel();

        #[cfg(feature = "tracing")]
        tracing::info!("Draining in-flight requests ({} active)", self.inflight());
        let drain_result = timeout(self.shutdown_timeout, async {
            while self.inflight() > 0 {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await;

        match drain_result {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("All in-flight requests drained successfully");
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "Graceful drain timed out ({} requests still active)",
                    self.inflight()
                );
            }
        }
    }
}

#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
async fn create_campaign(
    State(service): State<CouponService>,
    body: Result<Json<CreateCampaignRequest>, JsonRejection>,
) -> Result<Json<CreateCampaignResponse>, ApiError> {
    let _guard = service.begin()?;
    let Json(req) = body?;

    let campaign = service.coordinator.create_campaign(req.into())?;
    increment_campaigns_created();

    #[cfg(feature = "tracing")]
    tracing::info!(
        id = %campaign.id(),
        limit = campaign.coupon_limit(),
        "campaign created"
    );

    Ok(Json(CampaignResponse {
        campaign: CampaignMessage::from(&*campaign),
    }))
}

#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
async fn get_campaign(
    State(service): State<CouponService>,
    body: Result<Json<GetCampaignRequest>, JsonRejection>,
) -> Result<Json<GetCampaignResponse>, ApiError> {
    let _guard = service.begin()?;
    let Json(req) = body?;

    let campaign = service.coordinator.get_campaign(req.campaign_id())?;
    Ok(Json(CampaignResponse {
        campaign: CampaignMessage::from(&*campaign),
    }))
}

#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
async fn issue_coupon(
    State(service): State<CouponService>,
    body: Result<Json<IssueCouponRequest>, JsonRejection>,
) -> Result<Json<IssueCouponResponse>, ApiError> {
    let _guard = service.begin()?;
    let Json(req) = body?;

    match service.coordinator.issue_coupon(req.campaign_id()) {
        Ok(coupon) => {
            increment_coupons_issued();
            Ok(Json(IssueCouponResponse {
                coupon: CouponMessage::from(coupon),
            }))
        }
        Err(e) => {
            let err = ApiError::from(e);
            increment_issuance_rejected(err.reason());

            #[cfg(feature = "tracing")]
            tracing::debug!(campaign_id = req.campaign_id, "issuance rejected: {err}");

            Err(err)
        }
    }
}

async fn health(State(service): State<CouponService>) -> (StatusCode, &'static str) {
    if service.is_serving() {
        (StatusCode::OK, "SERVING")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT_SERVING")
    }
}
