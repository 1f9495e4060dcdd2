use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use coupon_issuance::{CodeGenerator, CouponExpiry, DEFAULT_CODE_PREFIX, IssuanceConfig};

/// Runtime configuration for the `coupon-issuance-server` binary.
///
/// Values come from CLI flags or the matching environment variables (a `.env`
/// file is loaded first, when present).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "coupon-issuance-server",
    version,
    about = "A Connect-compatible service for issuing campaign coupons"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Text placed in front of the time digits of every coupon code.
    ///
    /// Must leave room for at least one digit in the ten-character stamp.
    ///
    /// Environment variable: `CODE_PREFIX`
    #[arg(long, env = "CODE_PREFIX", default_value_t = String::from(DEFAULT_CODE_PREFIX))]
    pub code_prefix: String,

    /// Lifetime of an issued coupon, in seconds.
    ///
    /// When unset, coupons expire together with their campaign.
    ///
    /// Environment variable: `COUPON_TTL_SECS`
    #[arg(long, env = "COUPON_TTL_SECS")]
    pub coupon_ttl_secs: Option<u64>,

    /// Seconds to wait for in-flight requests during shutdown.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub issuance: IssuanceConfig,
    pub shutdown_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if let Err(e) = CodeGenerator::new(args.code_prefix.as_str()) {
            bail!("CODE_PREFIX ({:?}) is unusable: {e}", args.code_prefix);
        }

        let coupon_expiry = match args.coupon_ttl_secs {
            None => CouponExpiry::CampaignEnd,
            Some(0) => bail!("COUPON_TTL_SECS must be greater than 0"),
            Some(secs) => CouponExpiry::AfterIssue(Duration::from_secs(secs)),
        };

        Ok(Self {
            server_addr: args.server_addr,
            issuance: IssuanceConfig {
                code_prefix: args.code_prefix,
                coupon_expiry,
            },
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
        })
    }
}
