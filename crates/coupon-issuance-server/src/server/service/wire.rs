//! JSON messages of `coupon.v1.CouponIssuanceService`.
//!
//! Field names and value encodings follow the proto3 JSON mapping: fields are
//! lowerCamelCase, `uint64` values are written as decimal strings (numbers are
//! accepted too), and timestamps are RFC 3339 strings in UTC. Absent scalar
//! fields take their zero value.

use coupon_issuance::{Campaign, CampaignId, Coupon, NewCampaign, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    #[serde(default, with = "uint64")]
    pub coupon_limit: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rfc3339")]
    pub start_at: Timestamp,
    #[serde(with = "rfc3339")]
    pub end_at: Timestamp,
}

impl From<CreateCampaignRequest> for NewCampaign {
    fn from(req: CreateCampaignRequest) -> Self {
        Self {
            coupon_limit: req.coupon_limit,
            name: req.name,
            description: req.description,
            start_at: req.start_at,
            end_at: req.end_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRequest {
    #[serde(default, with = "uint64")]
    pub campaign_id: u64,
}

impl CampaignRequest {
    pub const fn campaign_id(&self) -> CampaignId {
        CampaignId::new(self.campaign_id)
    }
}

pub type GetCampaignRequest = CampaignRequest;
pub type IssueCouponRequest = CampaignRequest;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponMessage {
    pub code: String,
    #[serde(with = "rfc3339")]
    pub issued_at: Timestamp,
    #[serde(with = "rfc3339")]
    pub expire_at: Timestamp,
}

impl From<Coupon> for CouponMessage {
    fn from(coupon: Coupon) -> Self {
        Self {
            code: coupon.code,
            issued_at: coupon.issued_at,
            expire_at: coupon.expire_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMessage {
    #[serde(with = "uint64")]
    pub id: u64,
    #[serde(with = "uint64")]
    pub coupon_limit: u64,
    pub name: String,
    pub description: String,
    #[serde(with = "rfc3339")]
    pub created_at: Timestamp,
    #[serde(with = "rfc3339")]
    pub start_at: Timestamp,
    #[serde(with = "rfc3339")]
    pub end_at: Timestamp,
    #[serde(default)]
    pub coupons: Vec<CouponMessage>,
}

impl From<&Campaign> for CampaignMessage {
    fn from(campaign: &Campaign) -> Self {
        Self {
            id: campaign.id().get(),
            coupon_limit: campaign.coupon_limit(),
            name: campaign.name().to_string(),
            description: campaign.description().to_string(),
            created_at: campaign.created_at(),
            start_at: campaign.start_at(),
            end_at: campaign.end_at(),
            coupons: campaign
                .coupons()
                .snapshot()
                .into_iter()
                .map(CouponMessage::from)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignResponse {
    pub campaign: CampaignMessage,
}

pub type CreateCampaignResponse = CampaignResponse;
pub type GetCampaignResponse = CampaignResponse;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCouponResponse {
    pub coupon: CouponMessage,
}

/// `uint64` fields: written as strings, read from numbers or strings.
pub mod uint64 {
    use core::fmt;
    use serde::{
        Deserializer, Serializer,
        de::{self, Unexpected, Visitor},
    };

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(Uint64Visitor)
    }

    struct Uint64Visitor;

    impl Visitor<'_> for Uint64Visitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an unsigned 64-bit integer or its decimal string")
        }

        fn visit_u64<E>(self, v: u64) -> Result<u64, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> Result<u64, E>
        where
            E: de::Error,
        {
            u64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_str<E>(self, v: &str) -> Result<u64, E>
        where
            E: de::Error,
        {
            v.parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }
}

/// Timestamp fields as RFC 3339 strings.
pub mod rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use coupon_issuance::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const NANOS_PER_SEC: u64 = 1_000_000_000;

    pub fn format(ts: Timestamp) -> String {
        let nanos = ts.as_unix_nanos();
        // u64 nanoseconds end in the year 2554, well inside chrono's range.
        let secs = (nanos / NANOS_PER_SEC) as i64;
        let subsec = (nanos % NANOS_PER_SEC) as u32;
        DateTime::<Utc>::from_timestamp(secs, subsec)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// # Errors
    ///
    /// Fails on malformed input and on instants outside
    /// `1970-01-01T00:00:00Z ..= 2554-07-21T23:34:33.709551615Z`.
    pub fn parse(text: &str) -> Result<Timestamp, String> {
        let parsed = DateTime::parse_from_rfc3339(text)
            .map_err(|e| format!("invalid RFC 3339 timestamp {text:?}: {e}"))?;
        parsed
            .timestamp_nanos_opt()
            .and_then(|nanos| u64::try_from(nanos).ok())
            .map(Timestamp::from_unix_nanos)
            .ok_or_else(|| format!("timestamp {text:?} is out of range"))
    }

    pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(*ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamps_render_in_utc_with_significant_fraction() {
        let ts = Timestamp::from_unix_nanos(1_742_911_351_203_015_000);
        assert_eq!(rfc3339::format(ts), "2025-03-25T14:02:31.203015Z");
        assert_eq!(
            rfc3339::format(Timestamp::UNIX_EPOCH),
            "1970-01-01T00:00:00Z"
        );
    }

    #[test]
    fn offsets_are_normalised_to_utc() {
        let with_offset = rfc3339::parse("2025-03-25T23:02:31.203015+09:00").unwrap();
        let utc = rfc3339::parse("2025-03-25T14:02:31.203015Z").unwrap();
        assert_eq!(with_offset, utc);
        assert_eq!(utc.as_unix_nanos(), 1_742_911_351_203_015_000);
    }

    #[test]
    fn pre_epoch_and_malformed_timestamps_are_rejected() {
        assert!(rfc3339::parse("1969-12-31T23:59:59Z").is_err());
        assert!(rfc3339::parse("yesterday").is_err());
    }

    #[test]
    fn uint64_accepts_numbers_and_strings() {
        let from_number: CampaignRequest =
            serde_json::from_value(json!({ "campaignId": 42 })).unwrap();
        let from_string: CampaignRequest =
            serde_json::from_value(json!({ "campaignId": "42" })).unwrap();
        assert_eq!(from_number.campaign_id(), CampaignId::new(42));
        assert_eq!(from_number, from_string);

        let max: CampaignRequest =
            serde_json::from_value(json!({ "campaignId": "18446744073709551615" })).unwrap();
        assert_eq!(max.campaign_id, u64::MAX);
    }

    #[test]
    fn uint64_rejects_negative_and_garbage() {
        assert!(serde_json::from_value::<CampaignRequest>(json!({ "campaignId": -1 })).is_err());
        assert!(serde_json::from_value::<CampaignRequest>(json!({ "campaignId": "1x" })).is_err());
        assert!(serde_json::from_value::<CampaignRequest>(json!({ "campaignId": 1.5 })).is_err());
    }

    #[test]
    fn absent_scalars_take_zero_values() {
        let req: CampaignRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.campaign_id, 0);

        let req: CreateCampaignRequest = serde_json::from_value(json!({
            "startAt": "2025-03-25T00:00:00Z",
            "endAt": "2025-03-26T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(req.coupon_limit, 0);
        assert!(req.name.is_empty());
        assert!(req.description.is_empty());
    }

    #[test]
    fn campaign_message_uses_camel_case_and_string_integers() {
        let message = CampaignMessage {
            id: 7,
            coupon_limit: 100,
            name: "Spring".into(),
            description: "Spring sale".into(),
            created_at: Timestamp::UNIX_EPOCH,
            start_at: Timestamp::from_unix_secs(60),
            end_at: Timestamp::from_unix_secs(120),
            coupons: vec![],
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "id": "7",
                "couponLimit": "100",
                "name": "Spring",
                "description": "Spring sale",
                "createdAt": "1970-01-01T00:00:00Z",
                "startAt": "1970-01-01T00:01:00Z",
                "endAt": "1970-01-01T00:02:00Z",
                "coupons": [],
            })
        );
    }
}
