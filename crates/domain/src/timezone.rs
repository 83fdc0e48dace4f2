use crate::date::{Day, TimeOfDay};
use chrono::prelude::*;
use chrono::Duration;
use chrono_tz::Tz;

/// The current calendar date on the wall clocks of the given IANA zone.
pub fn local_date_in_zone(zone: &Tz, now: DateTime<Utc>) -> Day {
    Day::from_date(&now.with_timezone(zone))
}

/// Converts a local wall-clock point in the given IANA zone to UTC.
///
/// Starts from the instant that would match the local fields if they were
/// already UTC, subtracts the zone offset at that estimate and, when the
/// estimate crossed a DST boundary, redoes the subtraction once with the
/// offset at the candidate instant. Local times that are ambiguous or
/// nonexistent around a DST transition resolve with the offset in effect
/// at the candidate UTC instant rather than failing. For a fall-back
/// repeat that choice is direction-dependent: the candidate sits before
/// the transition in zones west of UTC and after it in zones east of UTC,
/// so the former pick the earlier occurrence and the latter the later one.
pub fn to_utc(local_date: Day, local_time: TimeOfDay, zone: &Tz) -> (Day, TimeOfDay) {
    let naive = local_date
        .to_naive()
        .and_hms(local_time.hours, local_time.minutes, 0);
    let estimate = DateTime::<Utc>::from_utc(naive, Utc);

    let first_offset = zone_offset_secs(zone, &estimate);
    let candidate = estimate - Duration::seconds(first_offset);

    let second_offset = zone_offset_secs(zone, &candidate);
    let resolved = if second_offset != first_offset {
        estimate - Duration::seconds(second_offset)
    } else {
        candidate
    };

    (
        Day::from_date(&resolved),
        TimeOfDay {
            hours: resolved.hour(),
            minutes: resolved.minute(),
        },
    )
}

fn zone_offset_secs(zone: &Tz, instant: &DateTime<Utc>) -> i64 {
    zone.offset_from_utc_datetime(&instant.naive_utc())
        .fix()
        .local_minus_utc() as i64
}
