//! Server-side components of the coupon issuance service.
//!
//! ## Submodules
//!
//! - [`config`] - CLI / environment configuration.
//! - [`service`] - Connect RPC handlers, wire types and error mapping.
//! - [`telemetry`] - Log subscriber and optional OpenTelemetry metrics.

pub mod config;
pub mod service;
pub mod telemetry;
