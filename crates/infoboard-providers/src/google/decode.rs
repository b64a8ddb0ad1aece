//! Decoding the calendar API's JSON event list.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, trace};

use infoboard_core::{Event, EventTime, Interval};

use crate::error::{ProviderError, ProviderResult};

const EVENTS_KIND: &str = "calendar#events";
const EVENT_KIND: &str = "calendar#event";

/// Response envelope.
#[derive(Debug, Deserialize)]
struct ApiEvents {
    kind: Option<String>,
    items: Option<Vec<ApiEvent>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    kind: Option<String>,
    status: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    #[serde(rename = "iCalUID")]
    ical_uid: Option<String>,
    description: Option<String>,
    start: Option<ApiEventTime>,
    end: Option<ApiEventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

/// Decodes an API response body into events.
///
/// Tentative events are skipped. Any other problem with an item fails the
/// whole batch.
pub fn events_from_json(body: &str) -> ProviderResult<Vec<Event>> {
    let data: ApiEvents = serde_json::from_str(body)?;

    let kind = data
        .kind
        .ok_or_else(|| ProviderError::missing_field("kind", "header"))?;
    if kind != EVENTS_KIND {
        return Err(ProviderError::unexpected_value("kind", &kind));
    }

    let Some(items) = data.items else {
        debug!("response has no items");
        return Ok(Vec::new());
    };

    let mut events = Vec::with_capacity(items.len());
    for item in items {
        if let Some(event) = decode_event(item)? {
            events.push(event);
        }
    }

    debug!(count = events.len(), "decoded calendar events");
    Ok(events)
}

fn decode_event(item: ApiEvent) -> ProviderResult<Option<Event>> {
    let kind = item
        .kind
        .ok_or_else(|| ProviderError::missing_field("kind", "event"))?;
    if kind != EVENT_KIND {
        return Err(ProviderError::unexpected_value("kind", &kind));
    }

    let status = item
        .status
        .ok_or_else(|| ProviderError::missing_field("status", "event"))?;
    match status.as_str() {
        "confirmed" => {}
        "tentative" => {
            trace!(summary = ?item.summary, "skipping tentative event");
            return Ok(None);
        }
        other => return Err(ProviderError::unexpected_value("status", other)),
    }

    let summary = item
        .summary
        .ok_or_else(|| ProviderError::missing_field("summary", "event"))?;
    let start = item
        .start
        .ok_or_else(|| ProviderError::missing_field("start", "event"))?;
    let end = item
        .end
        .ok_or_else(|| ProviderError::missing_field("end", "event"))?;

    let interval =
        Interval::from_event_times(event_time(start, "start")?, event_time(end, "end")?)?;

    let mut event = Event::with_interval(summary, interval);
    if let Some(location) = item.location.filter(|s| !s.is_empty()) {
        event = event.with_location(location);
    }
    if let Some(id) = item.ical_uid.filter(|s| !s.is_empty()) {
        event = event.with_id(id);
    }
    if let Some(description) = item.description.filter(|s| !s.is_empty()) {
        event = event.with_description(description);
    }

    Ok(Some(event))
}

fn event_time(time: ApiEventTime, field: &str) -> ProviderResult<EventTime> {
    if let Some(value) = time.date_time {
        return parse_datetime(&value)
            .map(EventTime::DateTime)
            .ok_or_else(|| ProviderError::unexpected_value(field, &value));
    }

    if let Some(value) = time.date {
        return NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map(EventTime::AllDay)
            .map_err(|e| ProviderError::unexpected_value(field, &value).with_source(e));
    }

    Err(ProviderError::missing_field("dateTime", field))
}

/// Parses an RFC 3339 datetime as wall-clock time, dropping the offset.
pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let (date, time) = value.split_once('T')?;
    let time = match time.find(['Z', 'z', '+', '-']) {
        Some(pos) => &time[..pos],
        None => time,
    };

    NaiveDateTime::parse_from_str(&format!("{date}T{time}"), "%Y-%m-%dT%H:%M:%S%.f").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn body(items: &str) -> String {
        format!(r#"{{"kind":"calendar#events","items":[{items}]}}"#)
    }

    const CONFIRMED: &str = r#"{
        "kind": "calendar#event",
        "status": "confirmed",
        "summary": "Weekly sync",
        "location": "Room 3",
        "iCalUID": "abc@google.com",
        "description": "",
        "start": {"dateTime": "2025-03-04T10:00:00+02:00"},
        "end": {"dateTime": "2025-03-04T11:00:00+02:00"}
    }"#;

    #[test]
    fn decodes_confirmed_event() {
        let events = events_from_json(&body(CONFIRMED)).unwrap();
        assert_eq!(events.len(), 1);

        let e = &events[0];
        assert_eq!(e.name(), "Weekly sync");
        assert_eq!(e.location(), Some("Room 3"));
        assert_eq!(e.id(), Some("abc@google.com"));
        assert_eq!(e.description(), None);
        // offset dropped, wall clock kept
        assert_eq!(e.start(), at(4, 10, 0));
        assert_eq!(e.end(), at(4, 11, 0));
    }

    #[test]
    fn skips_tentative() {
        let tentative = CONFIRMED.replace("confirmed", "tentative");
        let events = events_from_json(&body(&format!("{tentative},{CONFIRMED}"))).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn all_day_event() {
        let item = r#"{"kind":"calendar#event","status":"confirmed","summary":"Holiday",
            "start":{"date":"2025-03-04"},"end":{"date":"2025-03-05"}}"#;
        let events = events_from_json(&body(item)).unwrap();
        assert_eq!(events[0].start(), at(4, 0, 0));
        assert_eq!(events[0].end(), at(5, 0, 0));
    }

    #[test]
    fn missing_items_is_empty() {
        let events = events_from_json(r#"{"kind":"calendar#events"}"#).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn rejects_bad_header() {
        let err = events_from_json(r#"{"items":[]}"#).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::MissingField);

        let err = events_from_json(r#"{"kind":"calendar#list"}"#).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::UnexpectedValue);
    }

    #[test]
    fn rejects_cancelled_status() {
        let item = CONFIRMED.replace("confirmed", "cancelled");
        let err = events_from_json(&body(&item)).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::UnexpectedValue);
    }

    #[test]
    fn rejects_missing_summary() {
        let item = CONFIRMED.replace(r#""summary": "Weekly sync","#, "");
        let err = events_from_json(&body(&item)).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::MissingField);
        assert!(err.message().contains("summary"));
    }

    #[test]
    fn rejects_wrong_item_kind() {
        let item = CONFIRMED.replace(r#""calendar#event""#, r#""calendar#todo""#);
        let err = events_from_json(&body(&item)).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::UnexpectedValue);
    }

    #[test]
    fn rejects_garbage() {
        let err = events_from_json("<html>").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }

    #[test]
    fn datetime_suffixes() {
        assert_eq!(parse_datetime("2025-03-04T10:00:00Z"), Some(at(4, 10, 0)));
        assert_eq!(
            parse_datetime("2025-03-04T10:00:00-05:00"),
            Some(at(4, 10, 0))
        );
        let fractional = parse_datetime("2025-03-04T10:00:00.250+02:00").unwrap();
        assert_eq!(fractional.format("%H:%M:%S%.3f").to_string(), "10:00:00.250");
        assert_eq!(parse_datetime("2025-03-04T10:00:00"), Some(at(4, 10, 0)));
        assert_eq!(parse_datetime("2025-03-04"), None);
    }
}
