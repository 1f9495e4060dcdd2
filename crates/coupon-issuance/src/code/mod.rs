//! Coupon code rendering.
//!
//! A code has two parts joined by [`CODE_SEPARATOR`]:
//!
//! - the **stamp**, [`CODE_STAMP_LEN`] characters: a textual prefix followed
//!   by the trailing digits of the issue instant in microseconds, see
//!   [`code`];
//! - the **serial**, [`SERIAL_LEN`] Crockford base32 characters drawn from a
//!   process-wide atomic counter shared by every [`CodeGenerator`].
//!
//! The stamp alone repeats whenever two instants share their trailing
//! microsecond digits (the 7-digit window wraps every ten seconds). The serial
//! never repeats within the process, so the full code is unique across every
//! generator, and therefore every coordinator, in it.

mod crockford;

use crate::{Error, Result, Timestamp};
pub use crockford::SERIAL_LEN;
use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Length of the timestamp stamp, in characters.
pub const CODE_STAMP_LEN: usize = 10;

/// Separator between the stamp and the serial.
pub const CODE_SEPARATOR: char = '-';

/// Length of a full coupon code, in characters.
pub const CODE_LEN: usize = CODE_STAMP_LEN + 1 + SERIAL_LEN;

/// Prefix used when none is configured.
pub const DEFAULT_CODE_PREFIX: &str = "테스트";

/// Serial source shared by every generator in the process.
static PROCESS_SERIALS: AtomicU64 = AtomicU64::new(0);

/// Renders the fixed-width stamp for `instant_nanos`.
///
/// The instant is truncated to microseconds, rendered in base 10, and its
/// trailing `CODE_STAMP_LEN - prefix.chars().count()` digits are appended to
/// `prefix`. Length is counted in characters, not bytes, so multi-byte
/// prefixes still yield a stamp of exactly [`CODE_STAMP_LEN`] characters.
///
/// The function is pure: identical inputs always produce identical output.
///
/// # Errors
///
/// Returns [`Error::CodeGeneration`] if the prefix leaves no room for at least
/// one digit, or if the microsecond rendering has fewer digits than needed.
///
/// # Example
///
/// ```
/// use coupon_issuance::code;
///
/// assert_eq!(code("테스트", 1_742_911_351_203_015_000).unwrap(), "테스트1203015");
/// ```
pub fn code(prefix: &str, instant_nanos: u64) -> Result<String> {
    let digits = digit_count(prefix)?;
    let micros = (instant_nanos / 1_000).to_string();
    let from = micros
        .len()
        .checked_sub(digits)
        .ok_or_else(|| Error::CodeGeneration {
            reason: format!(
                "instant {micros}us has fewer than the {digits} digits required"
            ),
        })?;

    let mut out = String::with_capacity(prefix.len() + digits);
    out.push_str(prefix);
    out.push_str(&micros[from..]);
    Ok(out)
}

/// Number of timestamp digits left after `prefix`.
fn digit_count(prefix: &str) -> Result<usize> {
    let prefix_len = prefix.chars().count();
    CODE_STAMP_LEN
        .checked_sub(prefix_len)
        .filter(|&digits| digits > 0)
        .ok_or_else(|| Error::CodeGeneration {
            reason: format!(
                "prefix of {prefix_len} characters leaves no digits in a {CODE_STAMP_LEN}-character stamp"
            ),
        })
}

/// Thread-safe renderer of unique coupon codes.
///
/// Every call to [`CodeGenerator::next_code`] consumes one serial from a
/// single process-wide [`AtomicU64`]. Serials are never handed out twice, even
/// when the stamps of two calls are identical or the calls go through
/// different generators.
///
/// # Example
///
/// ```
/// use coupon_issuance::{CodeGenerator, Timestamp, CODE_LEN};
///
/// let spring = CodeGenerator::new("테스트").unwrap();
/// let autumn = CodeGenerator::new("테스트").unwrap();
/// let at = Timestamp::from_unix_nanos(1_742_911_351_203_015_000);
///
/// let first = spring.next_code(at).unwrap();
/// let second = autumn.next_code(at).unwrap();
///
/// assert!(first.starts_with("테스트1203015-"));
/// assert!(second.starts_with("테스트1203015-"));
/// assert_ne!(first, second);
/// assert_eq!(first.chars().count(), CODE_LEN);
/// ```
#[derive(Debug)]
pub struct CodeGenerator {
    prefix: String,
    serials: &'static AtomicU64,
}

impl CodeGenerator {
    /// Creates a generator drawing serials from the process-wide counter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CodeGeneration`] if `prefix` is too long to leave any
    /// timestamp digits in the stamp.
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        Self::with_serials(prefix, &PROCESS_SERIALS)
    }

    /// Creates a generator with a private counter whose next serial is
    /// `next_serial`. Its codes may repeat those of other generators.
    #[cfg(test)]
    pub(crate) fn with_next_serial(prefix: impl Into<String>, next_serial: u64) -> Result<Self> {
        Self::with_serials(prefix, Box::leak(Box::new(AtomicU64::new(next_serial))))
    }

    fn with_serials(prefix: impl Into<String>, serials: &'static AtomicU64) -> Result<Self> {
        let prefix = prefix.into();
        digit_count(&prefix)?;
        Ok(Self { prefix, serials })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Renders the next unique code for a coupon issued at `instant`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CodeGeneration`] if the stamp cannot be rendered or
    /// the serial space is exhausted. A failed call does not consume a serial.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_code(&self, instant: Timestamp) -> Result<String> {
        let stamp = code(&self.prefix, instant.as_unix_nanos())?;
        let serial = self
            .serials
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |serial| {
                serial.checked_add(1)
            })
            .map_err(|_| Error::CodeGeneration {
                reason: "serial space exhausted".to_string(),
            })?;

        let mut out = String::with_capacity(stamp.len() + 1 + SERIAL_LEN);
        out.push_str(&stamp);
        out.push(CODE_SEPARATOR);
        out.extend(crockford::encode_serial(serial).iter().map(|&b| char::from(b)));
        Ok(out)
    }

    /// The serial the next successful [`CodeGenerator::next_code`] will use,
    /// unless another generator draws first.
    pub fn next_serial(&self) -> u64 {
        self.serials.load(Ordering::Acquire)
    }
}
