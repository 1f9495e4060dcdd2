use core::{fmt, time::Duration};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A UTC instant with nanosecond resolution, counted from the UNIX epoch.
///
/// Instants before 1970 are not representable; conversions saturate at the
/// epoch instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// 1970-01-01T00:00:00Z.
    pub const UNIX_EPOCH: Self = Self(0);

    pub const fn from_unix_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn from_unix_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(NANOS_PER_SEC))
    }

    /// Converts a [`SystemTime`], clamping pre-epoch values to
    /// [`Timestamp::UNIX_EPOCH`] and far-future values to `u64::MAX` nanos.
    pub fn from_system_time(time: SystemTime) -> Self {
        time.duration_since(UNIX_EPOCH)
            .map_or(Self::UNIX_EPOCH, Self::from_duration)
    }

    fn from_duration(since_epoch: Duration) -> Self {
        Self(u64::try_from(since_epoch.as_nanos()).unwrap_or(u64::MAX))
    }

    pub const fn as_unix_nanos(self) -> u64 {
        self.0
    }

    pub const fn as_unix_micros(self) -> u64 {
        self.0 / 1_000
    }

    /// Time elapsed since the UNIX epoch.
    pub const fn since_epoch(self) -> Duration {
        Duration::from_nanos(self.0)
    }

    pub fn checked_add(self, rhs: Duration) -> Option<Self> {
        let rhs = u64::try_from(rhs.as_nanos()).ok()?;
        self.0.checked_add(rhs).map(Self)
    }

    pub fn checked_sub(self, rhs: Duration) -> Option<Self> {
        let rhs = u64::try_from(rhs.as_nanos()).ok()?;
        self.0.checked_sub(rhs).map(Self)
    }

    pub fn saturating_add(self, rhs: Duration) -> Self {
        self.checked_add(rhs).unwrap_or(Self(u64::MAX))
    }

    pub fn saturating_sub(self, rhs: Duration) -> Self {
        self.checked_sub(rhs).unwrap_or(Self::UNIX_EPOCH)
    }
}

impl fmt::Display for Timestamp {
    /// Formats as `<seconds>.<nanoseconds>` since the UNIX epoch.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:09}",
            self.0 / NANOS_PER_SEC,
            self.0 % NANOS_PER_SEC
        )
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Self::from_system_time(time)
    }
}

/// A source of wall-clock time.
///
/// The coordinator reads the clock once per request and derives every
/// time-dependent decision from that single reading. Tests swap in a fixed or
/// steppable clock to pin campaign windows.
///
/// # Example
///
/// ```
/// use coupon_issuance::{TimeSource, Timestamp};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now(&self) -> Timestamp {
///         Timestamp::from_unix_secs(1234)
///     }
/// }
///
/// assert_eq!(FixedTime.now().as_unix_nanos(), 1_234_000_000_000);
/// ```
pub trait TimeSource {
    /// Returns the current UTC instant.
    fn now(&self) -> Timestamp;
}

/// The operating system's wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_system_time(SystemTime::now())
    }
}

impl<T> TimeSource for &T
where
    T: TimeSource + ?Sized,
{
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<T> TimeSource for Arc<T>
where
    T: TimeSource + ?Sized,
{
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_splits_seconds_and_nanos() {
        let ts = Timestamp::from_unix_nanos(1_742_911_351_203_015_000);
        assert_eq!(ts.to_string(), "1742911351.203015000");
        assert_eq!(Timestamp::UNIX_EPOCH.to_string(), "0.000000000");
    }

    #[test]
    fn pre_epoch_system_time_clamps() {
        let before = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(Timestamp::from(before), Timestamp::UNIX_EPOCH);
    }

    #[test]
    fn arithmetic_saturates_at_bounds() {
        let ts = Timestamp::from_unix_secs(5);
        assert_eq!(ts.checked_sub(Duration::from_secs(6)), None);
        assert_eq!(ts.saturating_sub(Duration::from_secs(6)), Timestamp::UNIX_EPOCH);
        assert_eq!(
            ts.saturating_add(Duration::MAX),
            Timestamp::from_unix_nanos(u64::MAX)
        );
        assert_eq!(
            ts.checked_add(Duration::from_millis(1)),
            Some(Timestamp::from_unix_nanos(5_001_000_000))
        );
    }

    #[test]
    fn system_clock_is_after_2025() {
        // 2025-01-01T00:00:00Z
        assert!(SystemClock.now() > Timestamp::from_unix_secs(1_735_689_600));
    }
}
