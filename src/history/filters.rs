//! Calendar-date filters for the read paths.
//!
//! Each read path reacts differently to a missing or malformed date:
//!
//! | Path        | absent bound    | malformed bound            |
//! |-------------|-----------------|----------------------------|
//! | history     | no bound        | no bound (that side only)  |
//! | daily       | today           | both bounds become today   |
//! | emergencies | no bound        | no filter at all           |

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive instant range; `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// From 00:00:00 of `start` to 23:59:59 of `end`, both local.
    pub fn days(start: NaiveDate, end: NaiveDate, tz: FixedOffset) -> Self {
        Self {
            start: Some(start_of_day(start, tz)),
            end: Some(end_of_day(end, tz)),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| instant >= s) && self.end.map_or(true, |e| instant <= e)
    }
}

/// `YYYY-MM-DD`, surrounding whitespace ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Today's calendar date in `tz`.
pub fn today(tz: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

pub fn start_of_day(date: NaiveDate, tz: FixedOffset) -> DateTime<Utc> {
    local_to_utc(date.and_time(NaiveTime::default()), tz)
}

/// 23:59:59 local. Sub-second instants after that fall outside the day.
pub fn end_of_day(date: NaiveDate, tz: FixedOffset) -> DateTime<Utc> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid time");
    local_to_utc(date.and_time(last_second), tz)
}

fn local_to_utc(local: chrono::NaiveDateTime, tz: FixedOffset) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(tz.local_minus_utc()))))
}

/// Per-fridge history: every bound that is present and parses is applied,
/// everything else is ignored.
pub fn history_range(start: Option<&str>, end: Option<&str>, tz: FixedOffset) -> DateRange {
    DateRange {
        start: start.and_then(parse_date).map(|d| start_of_day(d, tz)),
        end: end.and_then(parse_date).map(|d| end_of_day(d, tz)),
    }
}

/// Daily log: absent bounds default to `today`; if either given bound fails
/// to parse, the whole range collapses to `today`.
pub fn daily_range(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
    tz: FixedOffset,
) -> DateRange {
    let parse_or_today = |raw: Option<&str>| raw.map_or(Some(today), parse_date);
    match (parse_or_today(start), parse_or_today(end)) {
        (Some(s), Some(e)) => DateRange::days(s, e, tz),
        _ => DateRange::days(today, today, tz),
    }
}

/// Emergency log: empty strings count as absent; a malformed bound drops
/// both bounds.
pub fn emergency_range(start: Option<&str>, end: Option<&str>, tz: FixedOffset) -> DateRange {
    let start = non_empty(start);
    let end = non_empty(end);

    let parsed_start = start.map(parse_date);
    let parsed_end = end.map(parse_date);
    if matches!(parsed_start, Some(None)) || matches!(parsed_end, Some(None)) {
        return DateRange::default();
    }

    DateRange {
        start: parsed_start.flatten().map(|d| start_of_day(d, tz)),
        end: parsed_end.flatten().map(|d| end_of_day(d, tz)),
    }
}

/// `start_date=…&end_date=…` for pagination links, built from the raw
/// request values so the user's filter survives page changes verbatim.
/// Values are percent-encoded; they cannot inject extra parameters.
pub fn filter_query(start: Option<&str>, end: Option<&str>) -> String {
    [("start_date", non_empty(start)), ("end_date", non_empty(end))]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| format!("{key}={}", encode_query_value(v))))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode everything outside RFC 3986 unreserved characters.
fn encode_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(char::from(byte))
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}
