//! Connect RPC service for coupon issuance.
//!
//! ## Structure
//!
//! - [`handler`] - service entry point (`CouponService`) and its router.
//! - [`wire`] - JSON request/response messages.
//! - [`error`] - mapping of failures onto Connect error responses.

pub mod error;
pub mod handler;
pub mod wire;
