use chrono::{DateTime, Duration, Months, SecondsFormat, SubsecRound, Utc};
use mongodb::bson::DateTime as BsonDateTime;

use crate::models::user_count::{DurationUnit, TimeWindow};

pub fn chrono_to_bson(dt: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

/// `2024-03-01T08:30:00+00:00`
pub fn to_iso8601(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Steps `amount` units back from `end`.
///
/// Months and years move on the calendar and clamp the day to the end of the
/// target month, so Mar 31 minus one month is Feb 28 (or 29) and Feb 29 minus
/// one year is Feb 28. Returns `None` when the result is not representable.
pub fn go_back(end: DateTime<Utc>, amount: u32, unit: DurationUnit) -> Option<DateTime<Utc>> {
    match unit {
        DurationUnit::Day => end.checked_sub_signed(Duration::try_days(i64::from(amount))?),
        DurationUnit::Week => end.checked_sub_signed(Duration::try_weeks(i64::from(amount))?),
        DurationUnit::Month => end.checked_sub_months(Months::new(amount)),
        DurationUnit::Year => end.checked_sub_months(Months::new(amount.checked_mul(12)?)),
    }
}

/// Window of `amount` units ending at `now`.
///
/// The start is counted back from the whole second of `now`, while the end
/// keeps its sub-second part so logins earlier in the current second fall
/// inside the window.
pub fn trailing_window(
    now: DateTime<Utc>,
    amount: u32,
    unit: DurationUnit,
) -> Option<TimeWindow> {
    let start = go_back(now.trunc_subsecs(0), amount, unit)?;
    Some(TimeWindow { start, end: now })
}
