//! Turning a parsed feed into events.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

use infoboard_core::{Event, EventTime, Interval};

use super::config::FeedSchema;
use super::parser::{self, Node};
use crate::error::{ProviderError, ProviderResult};

const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// Decodes a feed body into the events that have not ended yet.
///
/// The whole batch fails on a structural problem, a wrong `VERSION` or
/// `PRODID`, or a confirmed event without usable times or summary.
pub fn events_from_ics(
    text: &str,
    schema: &FeedSchema,
    now: NaiveDateTime,
) -> ProviderResult<Vec<Event>> {
    let root = parser::parse(text)?;

    let version = root.get("VERSION");
    if version != "2.0" {
        return Err(ProviderError::unexpected_value("VERSION", version));
    }

    let product_id = root.get("PRODID");
    if product_id != schema.product_id {
        return Err(ProviderError::unexpected_value("PRODID", product_id));
    }

    let mut events = Vec::new();
    for node in root.children("VEVENT") {
        if node.get("STATUS") != "CONFIRMED" {
            trace!(uid = node.get("UID"), "skipping unconfirmed event");
            continue;
        }

        let start = event_time(node, "DTSTART", &schema.tzid)?;
        let end = event_time(node, "DTEND", &schema.tzid)?;
        let interval = Interval::from_event_times(start, end)?;

        // the feed serves weeks of history
        if interval.has_ended(now) {
            continue;
        }

        let summary = node
            .find("SUMMARY")
            .ok_or_else(|| ProviderError::missing_field("SUMMARY", "VEVENT"))?;

        let mut event = Event::with_interval(summary, interval);
        if let Some(location) = non_empty(node, "LOCATION") {
            event = event.with_location(location);
        }
        if let Some(id) = non_empty(node, "UID") {
            event = event.with_id(id);
        }
        if let Some(description) = non_empty(node, "DESCRIPTION") {
            event = event.with_description(description);
        }
        events.push(event);
    }

    debug!(count = events.len(), "decoded feed");
    Ok(events)
}

/// Reads `DTSTART`/`DTEND` as either a zoned datetime or an all-day date.
fn event_time(node: &Node, key: &str, tzid: &str) -> ProviderResult<EventTime> {
    let zoned = format!("{key};TZID={tzid}");
    if let Some(value) = node.find(&zoned) {
        return NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
            .map(EventTime::DateTime)
            .map_err(|e| ProviderError::unexpected_value(&zoned, value).with_source(e));
    }

    let all_day = format!("{key};VALUE=DATE");
    if let Some(value) = node.find(&all_day) {
        return NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(EventTime::AllDay)
            .map_err(|e| ProviderError::unexpected_value(&all_day, value).with_source(e));
    }

    Err(ProviderError::missing_field(&zoned, "VEVENT"))
}

fn non_empty<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
    node.find(key).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn feed(events: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TUT.FI//POP-CALENDARSERVICE_V1.0//FI\r\n{events}END:VCALENDAR\r\n"
        )
    }

    const LECTURE: &str = "BEGIN:VEVENT\r\n\
        STATUS:CONFIRMED\r\n\
        SUMMARY:Algorithms Lecture\r\n\
        LOCATION:TB109\\, Tietotalo\r\n\
        UID:pop-1\r\n\
        DESCRIPTION:\r\n\
        DTSTART;TZID=Europe/Helsinki:20250304T101500\r\n\
        DTEND;TZID=Europe/Helsinki:20250304T120000\r\n\
        END:VEVENT\r\n";

    #[test]
    fn decodes_confirmed_event() {
        let events = events_from_ics(&feed(LECTURE), &FeedSchema::default(), now()).unwrap();
        assert_eq!(events.len(), 1);

        let e = &events[0];
        assert_eq!(e.name(), "Algorithms Lecture");
        assert_eq!(e.location(), Some("TB109, Tietotalo"));
        assert_eq!(e.id(), Some("pop-1"));
        assert_eq!(e.description(), None);
        assert_eq!(e.start().format("%H:%M").to_string(), "10:15");
        assert_eq!(e.end().format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn skips_unconfirmed_and_past() {
        let tentative = LECTURE.replace("CONFIRMED", "TENTATIVE");
        let past = LECTURE.replace("20250304T1", "20250303T1");
        let body = feed(&format!("{tentative}{past}"));

        let events = events_from_ics(&body, &FeedSchema::default(), now()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn all_day_event() {
        let body = feed(
            "BEGIN:VEVENT\nSTATUS:CONFIRMED\nSUMMARY:Exam week\n\
             DTSTART;VALUE=DATE:20250304\nDTEND;VALUE=DATE:20250305\nEND:VEVENT\n",
        );
        let events = events_from_ics(&body, &FeedSchema::default(), now()).unwrap();
        assert_eq!(events[0].start(), now().date().and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn custom_timezone_key() {
        let body = feed(&LECTURE.replace("Europe/Helsinki", "Europe/Oslo"));
        let schema = FeedSchema::default().with_tzid("Europe/Oslo");
        assert_eq!(events_from_ics(&body, &schema, now()).unwrap().len(), 1);

        // default tz key is then absent
        let err = events_from_ics(&body, &FeedSchema::default(), now()).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::MissingField);
    }

    #[test]
    fn rejects_wrong_version_or_product() {
        let body = feed(LECTURE).replace("VERSION:2.0", "VERSION:1.0");
        let err = events_from_ics(&body, &FeedSchema::default(), now()).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::UnexpectedValue);

        let schema = FeedSchema::default().with_product_id("-//Example//EN");
        let err = events_from_ics(&feed(LECTURE), &schema, now()).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::UnexpectedValue);
    }

    #[test]
    fn rejects_missing_summary() {
        let body = feed(&LECTURE.replace("SUMMARY:Algorithms Lecture\r\n", ""));
        let err = events_from_ics(&body, &FeedSchema::default(), now()).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::MissingField);
    }

    #[test]
    fn rejects_inverted_times() {
        let body = feed(&LECTURE.replace("T120000", "T090000"));
        let err = events_from_ics(&body, &FeedSchema::default(), now()).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidEvent);
    }

    #[test]
    fn malformed_text() {
        let err = events_from_ics("nonsense", &FeedSchema::default(), now()).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::MalformedFeed);
    }
}
