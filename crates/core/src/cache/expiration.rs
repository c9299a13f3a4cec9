//! Expiration arithmetic.
//!
//! Everything here is pure: given options and "now", compute the fields a
//! write persists, or the new `expires_at` a refresh persists. Timestamps
//! are stored as fixed-width RFC 3339 UTC strings so that string order in
//! SQL matches chronological order. Storage keeps microseconds, so every
//! comparison and sum here happens at microsecond precision.

use std::time::Duration;

use chrono::{DateTime, Datelike, SecondsFormat, SubsecRound, Utc};

use super::options::{AbsoluteExpiration, EntryOptions};
use crate::Error;

/// Fractional-second digits kept in storage.
const STORAGE_SUBSEC_DIGITS: u16 = 6;

/// Expiration fields resolved for a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedExpiration {
    pub expires_at: DateTime<Utc>,
    pub absolute_expiration: Option<DateTime<Utc>>,
    /// Microsecond precision.
    pub sliding_expiration: Option<Duration>,
}

/// Resolve write options against the current time.
///
/// The absolute form resolves first, then the sliding window; `expires_at` is
/// `now + sliding` capped by the absolute expiration, or the absolute
/// expiration alone when there is no sliding window.
///
/// # Errors
///
/// - `InvalidExpiration` for a literal absolute expiration at or before `now`,
///   a zero relative expiration or sliding window, or a result past year 9999.
/// - `MissingExpiration` when neither form is present.
pub fn resolve(options: &EntryOptions, now: DateTime<Utc>) -> Result<ResolvedExpiration, Error> {
    let now = to_storage_precision(now);

    let absolute_expiration = match options.absolute {
        Some(AbsoluteExpiration::RelativeToNow(after)) => {
            let after = positive_window(after, "relative expiration")?;
            Some(offset(now, after)?)
        }
        Some(AbsoluteExpiration::At(at)) => {
            let at = to_storage_precision(at);
            if at <= now {
                return Err(Error::InvalidExpiration(format!(
                    "the absolute expiration value {} must be in the future",
                    encode_timestamp(at)
                )));
            }
            Some(ensure_storable(at)?)
        }
        None => None,
    };

    let sliding_expiration = options
        .sliding
        .map(|sliding| positive_window(sliding, "sliding expiration"))
        .transpose()?;

    let expires_at = match (sliding_expiration, absolute_expiration) {
        (Some(sliding), absolute) => {
            let slid = offset(now, sliding)?;
            absolute.map_or(slid, |ceiling| slid.min(ceiling))
        }
        (None, Some(absolute)) => absolute,
        (None, None) => return Err(Error::MissingExpiration),
    };

    Ok(ResolvedExpiration { expires_at, absolute_expiration, sliding_expiration })
}

/// The `expires_at` a refresh at `now` should write, if any.
///
/// `None` for entries without a sliding window. The absolute expiration, when
/// present, stays the ceiling.
pub fn renew(
    sliding: Option<Duration>, absolute: Option<DateTime<Utc>>, now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let slid = offset(to_storage_precision(now), sliding?).ok()?;
    Some(absolute.map_or(slid, |ceiling| slid.min(ceiling)))
}

/// Truncate a duration to whole microseconds and require it to be non-zero.
fn positive_window(window: Duration, what: &str) -> Result<Duration, Error> {
    let micros = u64::try_from(window.as_micros())
        .map_err(|_| Error::InvalidExpiration(format!("the {what} is out of range")))?;
    if micros == 0 {
        return Err(Error::InvalidExpiration(format!("the {what} value must be positive")));
    }
    Ok(Duration::from_micros(micros))
}

fn offset(now: DateTime<Utc>, by: Duration) -> Result<DateTime<Utc>, Error> {
    let delta = chrono::Duration::from_std(by)
        .map_err(|_| Error::InvalidExpiration(format!("expiration of {}s is out of range", by.as_secs())))?;
    let at = now
        .checked_add_signed(delta)
        .ok_or_else(|| Error::InvalidExpiration(format!("expiration of {}s is out of range", by.as_secs())))?;
    ensure_storable(at)
}

fn ensure_storable(at: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
    if at.year() > 9999 {
        return Err(Error::InvalidExpiration("expiration must not be later than year 9999".into()));
    }
    Ok(at)
}

/// Drop the sub-microsecond part storage cannot keep.
pub fn to_storage_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(STORAGE_SUBSEC_DIGITS)
}

/// Encode a timestamp for storage.
pub fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp.
pub fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::CorruptEntry(format!("invalid timestamp {raw:?}: {e}")))
}

/// Encode a sliding window as whole microseconds.
pub fn encode_sliding(window: Duration) -> i64 {
    i64::try_from(window.as_micros()).unwrap_or(i64::MAX)
}

/// Decode a stored sliding window.
pub fn decode_sliding(micros: i64) -> Result<Duration, Error> {
    u64::try_from(micros)
        .map(Duration::from_micros)
        .map_err(|_| Error::CorruptEntry(format!("negative sliding expiration {micros}us")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_sliding_only() {
        let options = EntryOptions::new().with_sliding(Duration::from_secs(60));
        let resolved = resolve(&options, t0()).unwrap();
        assert_eq!(resolved.expires_at, t0() + chrono::Duration::seconds(60));
        assert_eq!(resolved.absolute_expiration, None);
        assert_eq!(resolved.sliding_expiration, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_absolute_only() {
        let at = t0() + chrono::Duration::hours(1);
        let resolved = resolve(&EntryOptions::new().with_absolute_at(at), t0()).unwrap();
        assert_eq!(resolved.expires_at, at);
        assert_eq!(resolved.absolute_expiration, Some(at));
        assert_eq!(resolved.sliding_expiration, None);
    }

    #[test]
    fn test_relative_resolves_to_absolute() {
        let options = EntryOptions::new().with_absolute_relative_to_now(Duration::from_secs(90));
        let resolved = resolve(&options, t0()).unwrap();
        assert_eq!(resolved.absolute_expiration, Some(t0() + chrono::Duration::seconds(90)));
        assert_eq!(resolved.expires_at, t0() + chrono::Duration::seconds(90));
    }

    #[test]
    fn test_absolute_caps_sliding() {
        let options = EntryOptions::new()
            .with_sliding(Duration::from_secs(600))
            .with_absolute_relative_to_now(Duration::from_secs(120));
        let resolved = resolve(&options, t0()).unwrap();
        assert_eq!(resolved.expires_at, t0() + chrono::Duration::seconds(120));

        let options = EntryOptions::new()
            .with_sliding(Duration::from_secs(60))
            .with_absolute_relative_to_now(Duration::from_secs(120));
        let resolved = resolve(&options, t0()).unwrap();
        assert_eq!(resolved.expires_at, t0() + chrono::Duration::seconds(60));
    }

    #[test]
    fn test_missing_expiration() {
        assert!(matches!(resolve(&EntryOptions::new(), t0()), Err(Error::MissingExpiration)));
    }

    #[test]
    fn test_absolute_in_past_or_now() {
        let past = EntryOptions::new().with_absolute_at(t0() - chrono::Duration::seconds(1));
        assert!(matches!(resolve(&past, t0()), Err(Error::InvalidExpiration(_))));

        let now = EntryOptions::new().with_absolute_at(t0());
        assert!(matches!(resolve(&now, t0()), Err(Error::InvalidExpiration(_))));
    }

    #[test]
    fn test_absolute_validated_before_missing_sliding() {
        let past = EntryOptions::new()
            .with_absolute_at(t0() - chrono::Duration::seconds(1))
            .with_sliding(Duration::from_secs(30));
        assert!(matches!(resolve(&past, t0()), Err(Error::InvalidExpiration(_))));
    }

    #[test]
    fn test_non_positive_durations() {
        let zero_relative = EntryOptions::new().with_absolute_relative_to_now(Duration::ZERO);
        assert!(matches!(resolve(&zero_relative, t0()), Err(Error::InvalidExpiration(_))));

        let zero_sliding = EntryOptions::new().with_sliding(Duration::ZERO);
        assert!(matches!(resolve(&zero_sliding, t0()), Err(Error::InvalidExpiration(_))));

        let sub_second_sliding = EntryOptions::new().with_sliding(Duration::from_millis(500));
        let resolved = resolve(&sub_second_sliding, t0()).unwrap();
        assert_eq!(resolved.sliding_expiration, Some(Duration::from_millis(500)));
        assert_eq!(resolved.expires_at, t0() + chrono::Duration::milliseconds(500));
    }

    #[test]
    fn test_sliding_keeps_fractional_seconds() {
        let options = EntryOptions::new().with_sliding(Duration::from_millis(2_500));
        let resolved = resolve(&options, t0()).unwrap();
        assert_eq!(resolved.sliding_expiration, Some(Duration::from_millis(2_500)));
        assert_eq!(resolved.expires_at, t0() + chrono::Duration::milliseconds(2_500));
        assert_eq!(decode_sliding(encode_sliding(Duration::from_millis(2_500))).unwrap(), Duration::from_millis(2_500));
    }

    #[test]
    fn test_absolute_compared_at_storage_precision() {
        let now = t0() + chrono::Duration::microseconds(7);
        let just_ahead = EntryOptions::new().with_absolute_at(now + chrono::Duration::nanoseconds(500));
        assert!(matches!(resolve(&just_ahead, now), Err(Error::InvalidExpiration(_))));

        let one_micro = EntryOptions::new().with_absolute_at(now + chrono::Duration::microseconds(1));
        let resolved = resolve(&one_micro, now).unwrap();
        assert_eq!(resolved.expires_at, now + chrono::Duration::microseconds(1));
        assert_eq!(decode_timestamp(&encode_timestamp(resolved.expires_at)).unwrap(), resolved.expires_at);

        let sub_micro_now = now + chrono::Duration::nanoseconds(900);
        let ahead_of_truncated_now = EntryOptions::new().with_absolute_at(now + chrono::Duration::microseconds(1));
        assert!(resolve(&ahead_of_truncated_now, sub_micro_now).is_ok());
    }

    #[test]
    fn test_sub_microsecond_sliding_is_zero() {
        let options = EntryOptions::new().with_sliding(Duration::from_nanos(500));
        assert!(matches!(resolve(&options, t0()), Err(Error::InvalidExpiration(_))));
    }

    #[test]
    fn test_out_of_range() {
        let options = EntryOptions::new().with_sliding(Duration::from_secs(u64::MAX));
        assert!(matches!(resolve(&options, t0()), Err(Error::InvalidExpiration(_))));
    }

    #[test]
    fn test_renew() {
        let later = t0() + chrono::Duration::seconds(30);
        assert_eq!(renew(Some(Duration::from_secs(60)), None, later), Some(t0() + chrono::Duration::seconds(90)));
        assert_eq!(renew(None, Some(t0()), later), None);

        let ceiling = t0() + chrono::Duration::seconds(45);
        assert_eq!(renew(Some(Duration::from_secs(60)), Some(ceiling), later), Some(ceiling));
    }

    #[test]
    fn test_timestamp_order_matches_time_order() {
        let a = encode_timestamp(t0());
        let b = encode_timestamp(t0() + chrono::Duration::microseconds(1));
        let c = encode_timestamp(t0() + chrono::Duration::days(400));
        assert!(a < b && b < c);
        assert_eq!(a, "2026-03-01T12:00:00.000000Z");
        assert_eq!(decode_timestamp(&a).unwrap(), t0());
    }

    #[test]
    fn test_decode_corrupt() {
        assert!(matches!(decode_timestamp("yesterday"), Err(Error::CorruptEntry(_))));
        assert!(matches!(decode_sliding(-5), Err(Error::CorruptEntry(_))));
        assert_eq!(decode_sliding(60_000_000).unwrap(), Duration::from_secs(60));
    }
}
