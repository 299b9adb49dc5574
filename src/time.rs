use std::sync::Arc;

use arrow::array::{ArrayRef, TimestampNanosecondArray};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// Name of the photon column holding seconds since the ATLAS epoch.
pub const DELTA_TIME: &str = "delta_time";

/// Name of the decoded timestamp column.
pub const TIME: &str = "time";

/// ATLAS Standard Data Product epoch, 2018-01-01T00:00:00Z.
///
/// No leap second has been inserted since the epoch, so GPS-based
/// `delta_time` offsets map directly onto UTC.
pub fn atlas_epoch() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2018, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

pub fn delta_time_to_datetime(delta_time: f64) -> Option<DateTime<Utc>> {
    if !delta_time.is_finite() {
        return None;
    }
    let nanos = (delta_time * 1e9).round();
    if nanos.abs() >= i64::MAX as f64 {
        return None;
    }
    atlas_epoch().checked_add_signed(TimeDelta::nanoseconds(nanos as i64))
}

/// Converts `delta_time` values to a UTC timestamp column. Values that do not
/// map to a representable instant become nulls.
pub fn timestamp_column(delta_times: &[f64]) -> ArrayRef {
    let values: Vec<Option<i64>> = delta_times
        .iter()
        .map(|&dt| delta_time_to_datetime(dt).and_then(|t| t.timestamp_nanos_opt()))
        .collect();

    Arc::new(TimestampNanosecondArray::from(values).with_timezone("UTC"))
}
