//! # Telemetry
//!
//! Console logging is always on and filtered through `RUST_LOG` (default
//! `info`). Everything else is feature gated:
//!
//! - `tracing`: request and issuance events from the server and core crate.
//! - `metrics`: OpenTelemetry counters for campaigns, coupons, rejections and
//!   in-flight requests.
//! - `stdout`: exports those metrics to stdout every 5 seconds.
//!
//! ```bash
//! cargo run --features metrics,stdout
//! ```

#[cfg(all(feature = "stdout", not(feature = "metrics")))]
compile_error!("The 'stdout' feature requires the 'metrics' feature to be enabled.");

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::metrics::{Counter, Meter, UpDownCounter};
#[cfg(feature = "metrics")]
use opentelemetry::{InstrumentationScope, KeyValue};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::Resource;
#[cfg(feature = "metrics")]
use opentelemetry_sdk::metrics as sdkmetrics;
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

const SERVICE_NAME: &str = "coupon-issuance";

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and stops every exporter. Errors are logged, not returned:
    /// this runs on the way out.
    pub fn shutdown(self) {
        #[cfg(feature = "metrics")]
        if let Err(_e) = self.meter_provider.shutdown() {
            #[cfg(feature = "tracing")]
            tracing::warn!("Failed to shut down meter provider: {_e}");
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics();

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        );

    #[cfg(feature = "metrics")]
    {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let scope = InstrumentationScope::builder(SERVICE_NAME)
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        init_metric_handles(&opentelemetry::global::meter_with_scope(scope));
    }

    registry.try_init()?;

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();

        builder.with_reader(reader)
    };

    builder.build()
}

#[cfg(feature = "metrics")]
static CAMPAIGNS_CREATED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static COUPONS_ISSUED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static ISSUANCE_REJECTED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static REQUESTS_INFLIGHT: OnceLock<UpDownCounter<i64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: &Meter) {
    let _ = CAMPAIGNS_CREATED.set(
        meter
            .u64_counter("campaigns_created")
            .with_description("Campaigns registered")
            .build(),
    );

    let _ = COUPONS_ISSUED.set(
        meter
            .u64_counter("coupons_issued")
            .with_description("Coupons handed out")
            .build(),
    );

    let _ = ISSUANCE_REJECTED.set(
        meter
            .u64_counter("issuance_rejected")
            .with_description("IssueCoupon calls that returned an error, by reason")
            .build(),
    );

    let _ = REQUESTS_INFLIGHT.set(
        meter
            .i64_up_down_counter("requests_inflight")
            .with_description("RPCs currently being handled")
            .build(),
    );
}

// Convenience functions that compile to no-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_campaigns_created() {
    if let Some(counter) = CAMPAIGNS_CREATED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_campaigns_created() {}

#[cfg(feature = "metrics")]
pub fn increment_coupons_issued() {
    if let Some(counter) = COUPONS_ISSUED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_coupons_issued() {}

#[cfg(feature = "metrics")]
pub fn increment_issuance_rejected(reason: &'static str) {
    if let Some(counter) = ISSUANCE_REJECTED.get() {
        counter.add(1, &[KeyValue::new("reason", reason)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_issuance_rejected(_reason: &'static str) {}

#[cfg(feature = "metrics")]
pub fn increment_requests_inflight() {
    if let Some(counter) = REQUESTS_INFLIGHT.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_requests_inflight() {}

#[cfg(feature = "metrics")]
pub fn decrement_requests_inflight() {
    if let Some(counter) = REQUESTS_INFLIGHT.get() {
        counter.add(-1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn decrement_requests_inflight() {}
