use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};

use crate::error::DateParseError;

const DAY_FORMAT: &str = "%Y-%m-%d";
const DATELINE_FORMAT: &str = "%b %d %Y";

/// Resolve a raw publish date to `YYYY-MM-DD`.
///
/// Accepts ISO-8601 (offset, trailing `Z`, naive datetime or plain date) and the
/// Newsmax dateline shape `Monday Jan 02 2017`. Offsets are not converted: the
/// calendar date is the one written in the string. The dateline's weekday only
/// has to be a weekday name; the site's labels are not always right.
pub fn resolve(raw: &str) -> Result<String, DateParseError> {
    parse_day(raw).map(|d| d.format(DAY_FORMAT).to_string())
}

pub fn parse_day(raw: &str) -> Result<NaiveDate, DateParseError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, DAY_FORMAT) {
        return Ok(d);
    }
    parse_dateline(s).ok_or_else(|| DateParseError(raw.to_string()))
}

fn parse_dateline(s: &str) -> Option<NaiveDate> {
    let mut words = s.split_whitespace();
    words.next()?.parse::<Weekday>().ok()?;
    let rest = words.collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&rest, DATELINE_FORMAT).ok()
}
