use anyhow::{anyhow, Result};
use chrono::{Duration, FixedOffset, LocalResult, NaiveTime, Offset, TimeZone, Utc};

/// Parses a fixed UTC offset such as `+02:00`, `-05:30`, `+2` or `UTC`.
pub fn parse_utc_offset(input: &str) -> Result<FixedOffset> {
    let s = input.trim();
    if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match s.chars().next() {
        Some('+') => (1i32, &s[1..]),
        Some('-') => (-1i32, &s[1..]),
        _ => return Err(anyhow!("expected an offset like +02:00, -05:30 or UTC")),
    };

    let (hours_str, minutes_str) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };

    let hours: i32 = hours_str
        .parse()
        .map_err(|_| anyhow!("invalid offset hours '{hours_str}'"))?;
    let minutes: i32 = minutes_str
        .parse()
        .map_err(|_| anyhow!("invalid offset minutes '{minutes_str}'"))?;

    if hours > 14 || minutes > 59 {
        return Err(anyhow!("offset out of range"));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow!("offset out of range"))
}

/// Parses a time of day in `HH:MM` form.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| anyhow!("invalid time '{}', expected HH:MM", input.trim()))
}

/// Formats an epoch-seconds timestamp in the given offset for user display.
pub fn format_timestamp(ts: i64, tz: &FixedOffset) -> String {
    match tz.timestamp_opt(ts, 0) {
        LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => ts.to_string(),
    }
}

/// Most recent occurrence of any of `times` (today or yesterday in `tz`)
/// that is not after `now_ts`. Returns epoch seconds.
pub fn latest_occurrence(times: &[NaiveTime], now_ts: i64, tz: &FixedOffset) -> Option<i64> {
    let now = match tz.timestamp_opt(now_ts, 0) {
        LocalResult::Single(dt) => dt,
        _ => return None,
    };
    let today = now.date_naive();

    let mut latest: Option<i64> = None;
    for day in [today - Duration::days(1), today] {
        for time in times {
            let local = day.and_time(*time);
            if let LocalResult::Single(dt) = tz.from_local_datetime(&local) {
                let ts = dt.timestamp();
                if ts <= now_ts && latest.map_or(true, |best| ts > best) {
                    latest = Some(ts);
                }
            }
        }
    }
    latest
}
