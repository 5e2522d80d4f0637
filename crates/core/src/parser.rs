//! Extraction of the embedded jam calendar from itch.io HTML.
//!
//! The calendar page ships its data as a JSON array embedded in a script tag.
//! There is no stable API, so the extractor scans for a handful of known
//! markers in order of specificity and then brackets out the array that
//! follows the first hit.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::GameJam;

/// Markers that precede the jams array, most specific first.
///
/// The first marker present anywhere in the document wins, so a page that
/// carries both the calendar mount call and a bare `"jams"` key is read from
/// the mount call.
const SEARCH_PATTERNS: [&str; 5] = [
    "ReactDOM.render(R.Jam.FilteredJamCalendar({\"jams\":[",
    "\"jams\":[",
    "\"jams\":",
    "data-calendar=",
    "data-jams=",
];

/// Errors produced while locating the embedded jam payload.
#[derive(Debug, Error)]
pub enum ParseError {
    /// None of the known markers appear in the document.
    #[error("no jams payload found in document")]
    PayloadNotFound,
    /// A marker was found but no array follows it.
    #[error("jams marker found but no array follows")]
    ArrayMissing,
    /// The array opened but never closed.
    #[error("unterminated jams array")]
    UnterminatedArray,
    /// The extracted array is not valid JSON.
    #[error("jams array is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Shape of one record inside the embedded array.
#[derive(Debug, Deserialize)]
struct RawJam {
    id: i64,
    title: String,
    url: String,
    start_date: String,
    end_date: String,
    #[serde(default)]
    voting_end_date: Option<String>,
    #[serde(default)]
    joined: u32,
    #[serde(default)]
    highlight: bool,
}

/// Parse the calendar page and return the jams it embeds.
///
/// Records that fail to deserialize are skipped with a warning; unparseable
/// dates inside an otherwise sound record fall back to `now` so one bad field
/// never sinks the batch.
pub fn parse_jams(html: &str, now: DateTime<Utc>) -> Result<Vec<GameJam>, ParseError> {
    let marker_pos = SEARCH_PATTERNS
        .iter()
        .find_map(|pattern| html.find(pattern))
        .ok_or(ParseError::PayloadNotFound)?;
    let open = html[marker_pos..]
        .find('[')
        .map(|offset| marker_pos + offset)
        .ok_or(ParseError::ArrayMissing)?;
    let close = matching_bracket(html, open).ok_or(ParseError::UnterminatedArray)?;
    let payload = &html[open..=close];

    let records: Vec<Value> = serde_json::from_str(payload)?;
    let mut jams = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value::<RawJam>(record) {
            Ok(raw) => jams.push(convert(raw, now)),
            Err(err) => warn!("Skipping malformed jam record: {err}"),
        }
    }
    Ok(jams)
}

/// Index of the `]` matching the `[` at `open`, skipping brackets inside
/// JSON string literals.
fn matching_bracket(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, &byte) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn convert(raw: RawJam, now: DateTime<Utc>) -> GameJam {
    let url = if raw.url.starts_with("http") {
        raw.url
    } else {
        format!("https://itch.io{}", raw.url)
    };
    GameJam {
        id: raw.id,
        title: raw.title,
        url,
        start_date: parse_jam_date(&raw.start_date, now),
        end_date: parse_jam_date(&raw.end_date, now),
        voting_end_date: raw
            .voting_end_date
            .filter(|value| !value.is_empty())
            .map(|value| parse_jam_date(&value, now)),
        joined_count: raw.joined,
        highlighted: raw.highlight,
        selected: false,
        cached_remaining: TimeDelta::zero(),
        cached_voting_remaining: TimeDelta::zero(),
    }
}

/// Parse the date formats the calendar has been observed to use.
///
/// Zoned timestamps are converted to UTC; bare timestamps are taken as UTC.
/// A string that matches none of the formats falls back to `now`.
fn parse_jam_date(value: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.with_timezone(&Utc);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return parsed.and_utc();
        }
    }
    warn!("Unparseable jam date {value:?}, falling back to fetch time");
    now
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_the_calendar_mount_call() -> Result<()> {
        let html = r#"<html><script>
            ReactDOM.render(R.Jam.FilteredJamCalendar({"jams":[
                {"id":1,"title":"Summer Jam","url":"/jam/summer-jam",
                 "start_date":"2025-06-01T00:00:00Z","end_date":"2025-06-08T00:00:00Z",
                 "voting_end_date":"2025-06-15T00:00:00Z","joined":120,"highlight":true},
                {"id":2,"title":"Tiny Jam","url":"/jam/tiny-jam",
                 "start_date":"2025-07-01T00:00:00Z","end_date":"2025-07-02T00:00:00Z"}
            ]}), mount);
        </script></html>"#;
        let jams = parse_jams(html, now())?;
        assert_eq!(jams.len(), 2);
        assert_eq!(jams[0].id, 1);
        assert_eq!(jams[0].title, "Summer Jam");
        assert_eq!(jams[0].url, "https://itch.io/jam/summer-jam");
        assert_eq!(jams[0].start_date, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(
            jams[0].voting_end_date,
            Some(Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(jams[0].joined_count, 120);
        assert!(jams[0].highlighted);
        assert_eq!(jams[1].voting_end_date, None);
        assert_eq!(jams[1].joined_count, 0);
        assert!(!jams[1].highlighted);
        Ok(())
    }

    #[test]
    fn falls_back_to_the_bare_jams_key() -> Result<()> {
        let html = r#"<script>var page = {"jams":[{"id":5,"title":"Bare","url":"/jam/bare",
            "start_date":"2025-06-01 10:00:00","end_date":"2025-06-02 10:00:00"}]};</script>"#;
        let jams = parse_jams(html, now())?;
        assert_eq!(jams.len(), 1);
        assert_eq!(jams[0].end_date, Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap());
        Ok(())
    }

    #[test]
    fn the_mount_call_outranks_an_earlier_bare_key() -> Result<()> {
        let html = r#"<script>var empty = {"jams":[]};</script>
            <script>ReactDOM.render(R.Jam.FilteredJamCalendar({"jams":[
                {"id":9,"title":"Real","url":"/jam/real",
                 "start_date":"2025-06-01T00:00:00Z","end_date":"2025-06-08T00:00:00Z"}
            ]}), mount);</script>"#;
        let jams = parse_jams(html, now())?;
        assert_eq!(jams.len(), 1);
        assert_eq!(jams[0].id, 9);
        Ok(())
    }

    #[test]
    fn brackets_inside_titles_do_not_truncate_the_array() -> Result<()> {
        let html = r#"{"jams":[{"id":3,"title":"Best [retro] jam ]2025[","url":"/jam/retro",
            "start_date":"2025-06-01T00:00:00Z","end_date":"2025-06-08T00:00:00Z",
            "tags":["pixel","[odd]"]}]}"#;
        let jams = parse_jams(html, now())?;
        assert_eq!(jams.len(), 1);
        assert_eq!(jams[0].title, "Best [retro] jam ]2025[");
        Ok(())
    }

    #[test]
    fn malformed_records_are_skipped() -> Result<()> {
        let html = r#"{"jams":[
            {"id":"not a number","title":"Broken","url":"/jam/broken",
             "start_date":"2025-06-01T00:00:00Z","end_date":"2025-06-08T00:00:00Z"},
            {"id":4,"title":"Fine","url":"/jam/fine",
             "start_date":"2025-06-01T00:00:00Z","end_date":"2025-06-08T00:00:00Z"}
        ]}"#;
        let jams = parse_jams(html, now())?;
        assert_eq!(jams.len(), 1);
        assert_eq!(jams[0].id, 4);
        Ok(())
    }

    #[test]
    fn unparseable_dates_fall_back_to_now() -> Result<()> {
        let html = r#"{"jams":[{"id":6,"title":"Odd dates","url":"/jam/odd",
            "start_date":"soon","end_date":"2025-06-08T00:00:00"}]}"#;
        let jams = parse_jams(html, now())?;
        assert_eq!(jams[0].start_date, now());
        assert_eq!(jams[0].end_date, Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap());
        Ok(())
    }

    #[test]
    fn absolute_urls_are_left_alone() -> Result<()> {
        let html = r#"{"jams":[{"id":7,"title":"Absolute","url":"https://example.com/jam",
            "start_date":"2025-06-01T00:00:00Z","end_date":"2025-06-08T00:00:00Z"}]}"#;
        let jams = parse_jams(html, now())?;
        assert_eq!(jams[0].url, "https://example.com/jam");
        Ok(())
    }

    #[test]
    fn an_empty_array_is_a_valid_calendar() -> Result<()> {
        let jams = parse_jams(r#"{"jams":[]}"#, now())?;
        assert!(jams.is_empty());
        Ok(())
    }

    #[test]
    fn a_page_without_markers_is_an_error() {
        let err = parse_jams("<html><body>nothing here</body></html>", now()).unwrap_err();
        assert!(matches!(err, ParseError::PayloadNotFound));
    }

    #[test]
    fn a_marker_without_an_array_is_an_error() {
        let err = parse_jams(r#"{"jams": null}"#, now()).unwrap_err();
        assert!(matches!(err, ParseError::ArrayMissing));
    }

    #[test]
    fn an_unterminated_array_is_an_error() {
        let err = parse_jams(r#"{"jams":[{"id":1"#, now()).unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedArray));
    }

    #[test]
    fn a_broken_array_is_an_error() {
        let err = parse_jams(r#"{"jams":[{,]}"#, now()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn date_parsing_accepts_all_observed_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_jam_date("2025-06-01T10:30:00Z", now()), expected);
        assert_eq!(parse_jam_date("2025-06-01T12:30:00+02:00", now()), expected);
        assert_eq!(parse_jam_date("2025-06-01T10:30:00", now()), expected);
        assert_eq!(parse_jam_date("2025-06-01 10:30:00", now()), expected);
        assert_eq!(parse_jam_date("whenever", now()), now());
    }
}
