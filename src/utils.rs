//! A collection of utility functions
use std::sync::LazyLock;

use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::Utc;
use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::errors::Error;
use crate::path::trim_trailing_slash;

/// Date-time layouts emitted by directory listings, most common first.
const LISTING_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%d-%b-%Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
];

static LISTING_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}(?::\d{2})?|\d{1,2}-[A-Za-z]{3}-\d{4}\s+\d{2}:\d{2}(?::\d{2})?",
    )
    .expect("listing time regex is valid")
});

/// Formats a timestamp the way listings print it.
/// For example "2018-01-26 18:30"
#[cfg(feature = "test_utils")]
pub(crate) fn format_listing_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

/// Parses a listing timestamp such as "2018-01-26 18:30" or
/// "26-Jan-2018 18:30". Listings carry no zone, the value is taken as UTC.
pub fn parse_listing_time(s: &str) -> Result<DateTime<Utc>, Error> {
    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    LISTING_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::Parse {
            what: "listing time".into(),
            how: format!("unrecognized date-time {s:?}"),
        })
}

/// Finds the first listing timestamp inside free text.
pub fn find_listing_time(text: &str) -> Option<DateTime<Utc>> {
    let found = LISTING_TIME.find(text)?;
    parse_listing_time(found.as_str()).ok()
}

/// Returns the percent-decoded last segment of `href`, ignoring any query,
/// fragment or trailing separator.
pub fn href_basename(href: &str) -> Option<String> {
    let href = href.split(['?', '#']).next().unwrap_or_default();
    let segment = trim_trailing_slash(href).rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(percent_decode_str(segment).decode_utf8_lossy().into_owned())
}
