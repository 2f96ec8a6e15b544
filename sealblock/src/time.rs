//! Utils for time conversion and rounding.

use std::time::{Duration, SystemTime};

/// The precision block timestamps are rounded to.
///
/// A rounded timestamp survives serialization and recomputation unchanged,
/// so a reconstructed block compares equal to the block it was built from.
pub const DEFAULT_TIMESTAMP_PRECISION: Duration = Duration::from_millis(100);

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Convert a given `time` to a byte array.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn system_time_to_bytes(time: SystemTime) -> impl AsRef<[u8]> {
    (nanos_since_epoch(time) as i64).to_be_bytes()
}

/// Round `time` to the nearest multiple of `precision`.
///
/// Exact halves are rounded up. A zero `precision` leaves `time` untouched.
///
/// ```
/// use sealblock::time::round;
/// use std::time::{Duration, SystemTime};
///
/// let time = SystemTime::UNIX_EPOCH + Duration::from_millis(1_249);
/// let rounded = round(time, Duration::from_millis(100));
/// assert_eq!(rounded, SystemTime::UNIX_EPOCH + Duration::from_millis(1_200));
/// ```
#[must_use]
pub fn round(time: SystemTime, precision: Duration) -> SystemTime {
    #[allow(clippy::cast_possible_wrap)]
    let precision = precision.as_nanos() as i128;
    if precision == 0 {
        return time;
    }

    let nanos = nanos_since_epoch(time);
    let remainder = nanos.rem_euclid(precision);
    let rounded = if remainder * 2 >= precision {
        nanos - remainder + precision
    } else {
        nanos - remainder
    };
    system_time_from_nanos(rounded)
}

/// The current time rounded to `precision`.
#[must_use]
pub fn now(precision: Duration) -> SystemTime {
    round(SystemTime::now(), precision)
}

#[allow(clippy::cast_possible_wrap)]
fn nanos_since_epoch(time: SystemTime) -> i128 {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => duration.as_nanos() as i128,
        Err(err) => -(err.duration().as_nanos() as i128),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn system_time_from_nanos(nanos: i128) -> SystemTime {
    let magnitude = nanos.unsigned_abs();
    let duration = Duration::new(
        (magnitude / NANOS_PER_SEC) as u64,
        (magnitude % NANOS_PER_SEC) as u32,
    );
    if nanos >= 0 {
        SystemTime::UNIX_EPOCH + duration
    } else {
        SystemTime::UNIX_EPOCH - duration
    }
}
