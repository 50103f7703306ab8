//! Typed field extractors over offer-shaped JSON.
//!
//! Extractors never fail: a missing, mistyped or malformed field yields
//! `None` (or an empty list for carriers).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;

use crate::lookup::{first_match, first_str, Accept, Candidate, Step::Key};

const PRICE: &[Candidate] = &[
    Candidate { path: &[Key("price")], accept: Accept::Number },
    Candidate { path: &[Key("price"), Key("amount")], accept: Accept::Number },
    Candidate { path: &[Key("price"), Key("total")], accept: Accept::Number },
];

const DURATION: &[Candidate] = &[
    Candidate { path: &[Key("totalDurationMinutes")], accept: Accept::Number },
    Candidate { path: &[Key("duration")], accept: Accept::Number },
    Candidate { path: &[Key("durationMinutes")], accept: Accept::Number },
];

const LEGS: &[Candidate] = &[
    Candidate { path: &[Key("legs")], accept: Accept::Array },
    Candidate { path: &[Key("segments")], accept: Accept::Array },
    Candidate { path: &[Key("flights")], accept: Accept::Array },
];

const LEG_DEPARTURE: &[Candidate] = &[
    Candidate { path: &[Key("departure")], accept: Accept::Present },
    Candidate { path: &[Key("departure_airport")], accept: Accept::Present },
];

const ENDPOINT_TIME: &[Candidate] = &[
    Candidate { path: &[Key("time")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("date")], accept: Accept::NonEmptyString },
];

const LEG_CARRIER: &[Candidate] = &[
    Candidate { path: &[Key("carrier")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("airline")], accept: Accept::NonEmptyString },
];

const SCORE: &[Candidate] = &[Candidate { path: &[Key("preferenceScore")], accept: Accept::Number }];

const BOOKING_URL: &[Candidate] = &[
    Candidate { path: &[Key("bookingUrl")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("bookingLink")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("url")], accept: Accept::NonEmptyString },
];

pub fn price(offer: &JsonValue) -> Option<f64> {
    first_match(offer, PRICE).and_then(JsonValue::as_f64)
}

pub fn duration_minutes(offer: &JsonValue) -> Option<f64> {
    first_match(offer, DURATION).and_then(JsonValue::as_f64)
}

/// Explicit `stops` when it is a non-negative whole number, otherwise
/// `legCount - 1` clamped at zero.
pub fn stops(offer: &JsonValue) -> Option<u32> {
    if let Some(explicit) = offer.get("stops").and_then(whole_non_negative) {
        return Some(explicit);
    }
    let legs = legs(offer)?;
    Some(u32::try_from(legs.len().saturating_sub(1)).unwrap_or(u32::MAX))
}

/// Epoch milliseconds of the first leg's departure. An unparseable time
/// string yields `Some(NAN)`; callers ranking on this value must treat NaN
/// as unknown.
pub fn departure_time(offer: &JsonValue) -> Option<f64> {
    let first = legs(offer)?.first()?;
    let departure = first_match(first, LEG_DEPARTURE)?;
    let text = first_str(departure, ENDPOINT_TIME)?;
    Some(parse_timestamp_millis(text))
}

pub fn preference_score(offer: &JsonValue) -> Option<f64> {
    first_match(offer, SCORE).and_then(JsonValue::as_f64)
}

pub fn carriers(offer: &JsonValue) -> Vec<String> {
    legs(offer)
        .map(|legs| {
            legs.iter()
                .filter_map(|leg| first_str(leg, LEG_CARRIER))
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Carrier of `legs[0]`, if that leg names one.
pub fn first_carrier(offer: &JsonValue) -> Option<&str> {
    let first = legs(offer)?.first()?;
    first_str(first, LEG_CARRIER)
}

/// First non-blank booking link among `bookingUrl`, `bookingLink`, `url`.
pub fn booking_url(offer: &JsonValue) -> Option<&str> {
    BOOKING_URL.iter().find_map(|candidate| {
        first_str(offer, std::slice::from_ref(candidate)).filter(|s| !s.trim().is_empty())
    })
}

pub fn legs(offer: &JsonValue) -> Option<&Vec<JsonValue>> {
    first_match(offer, LEGS).and_then(JsonValue::as_array)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_non_negative(value: &JsonValue) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return Some(u32::try_from(n).unwrap_or(u32::MAX));
    }
    let n = value.as_f64()?;
    if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) {
        return Some(n as u32);
    }
    None
}

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an RFC 3339 or RFC 2822 timestamp, an ISO date-time with a
/// colon-less offset, a zone-less date-time (read as UTC) or a bare date
/// (UTC midnight). Anything else is NaN.
#[allow(clippy::cast_precision_loss)]
pub fn parse_timestamp_millis(text: &str) -> f64 {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return dt.timestamp_millis() as f64;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return dt.timestamp_millis() as f64;
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return dt.timestamp_millis() as f64;
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return naive.and_utc().timestamp_millis() as f64;
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or(f64::NAN, |naive| naive.and_utc().timestamp_millis() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_prefers_bare_number_then_amount_then_total() {
        assert_eq!(price(&json!({ "price": 310 })), Some(310.0));
        assert_eq!(price(&json!({ "price": { "amount": 450, "total": 500 } })), Some(450.0));
        assert_eq!(price(&json!({ "price": { "total": 500 } })), Some(500.0));
        assert_eq!(price(&json!({ "price": "450" })), None);
        assert_eq!(price(&json!({ "price": { "amount": "450" } })), None);
        assert_eq!(price(&json!({})), None);
    }

    #[test]
    fn duration_checks_type_at_every_step() {
        assert_eq!(duration_minutes(&json!({ "totalDurationMinutes": 200, "duration": 10 })), Some(200.0));
        assert_eq!(duration_minutes(&json!({ "totalDurationMinutes": "200", "duration": 180 })), Some(180.0));
        assert_eq!(duration_minutes(&json!({ "durationMinutes": 95 })), Some(95.0));
        assert_eq!(duration_minutes(&json!({ "duration": "PT3H" })), None);
    }

    #[test]
    fn stops_falls_back_to_leg_count() {
        assert_eq!(stops(&json!({ "stops": 2, "legs": [] })), Some(2));
        assert_eq!(stops(&json!({ "legs": [{}, {}, {}] })), Some(2));
        assert_eq!(stops(&json!({ "segments": [{}] })), Some(0));
        assert_eq!(stops(&json!({ "flights": [] })), Some(0));
        assert_eq!(stops(&json!({ "legs": "none", "flights": [{}, {}] })), Some(1));
        assert_eq!(stops(&json!({})), None);
    }

    #[test]
    fn stops_is_never_negative() {
        assert_eq!(stops(&json!({ "stops": -1 })), None);
        assert_eq!(stops(&json!({ "stops": -1, "legs": [{}, {}] })), Some(1));
        assert_eq!(stops(&json!({ "stops": 1.5, "legs": [] })), Some(0));
        assert_eq!(stops(&json!({ "stops": 1.0 })), Some(1));
    }

    #[test]
    fn departure_time_reads_first_leg_only() {
        let offer = json!({
            "legs": [
                { "departure": { "time": "2026-05-01T09:00:00Z" } },
                { "departure": { "time": "2026-04-01T09:00:00Z" } }
            ]
        });
        assert_eq!(departure_time(&offer), Some(1_777_626_000_000.0));
    }

    #[test]
    fn departure_time_accepts_alternate_field_names() {
        let offer = json!({ "segments": [{ "departure_airport": { "date": "2026-05-01" } }] });
        assert_eq!(departure_time(&offer), Some(1_777_593_600_000.0));
        let naive = json!({ "legs": [{ "departure": { "time": "2026-05-01T09:00" } }] });
        assert_eq!(departure_time(&naive), Some(1_777_626_000_000.0));
    }

    #[test]
    fn timestamps_with_offsets_and_mail_dates_parse() {
        assert_eq!(parse_timestamp_millis("2026-05-01T09:00:00+0000"), 1_777_626_000_000.0);
        assert_eq!(parse_timestamp_millis("2026-05-01T11:00:00.000+0200"), 1_777_626_000_000.0);
        assert_eq!(parse_timestamp_millis("Fri, 01 May 2026 09:00:00 GMT"), 1_777_626_000_000.0);
        assert_eq!(parse_timestamp_millis("2026-05-01T09:00:00.000Z"), 1_777_626_000_000.0);
        let offer = json!({ "legs": [{ "departure": { "time": "Fri, 01 May 2026 09:00:00 GMT" } }] });
        assert_eq!(departure_time(&offer), Some(1_777_626_000_000.0));
    }

    #[test]
    fn departure_time_unknown_and_invalid_cases() {
        assert_eq!(departure_time(&json!({ "legs": [] })), None);
        assert_eq!(departure_time(&json!({ "legs": [null] })), None);
        assert_eq!(departure_time(&json!({ "legs": [{ "departure": { "time": 1_700_000_000 } }] })), None);
        let invalid = departure_time(&json!({ "legs": [{ "departure": { "time": "soon" } }] }));
        assert!(invalid.is_some_and(f64::is_nan));
    }

    #[test]
    fn carriers_keep_leg_order_and_drop_blanks() {
        let offer = json!({
            "legs": [
                { "carrier": "UA" },
                { "carrier": "" , "airline": "LH" },
                { "durationMinutes": 40 },
                { "airline": "NH" }
            ]
        });
        assert_eq!(carriers(&offer), vec!["UA", "LH", "NH"]);
        assert!(carriers(&json!({})).is_empty());
        assert_eq!(first_carrier(&offer), Some("UA"));
    }

    #[test]
    fn preference_score_requires_a_number() {
        assert_eq!(preference_score(&json!({ "preferenceScore": 0.82 })), Some(0.82));
        assert_eq!(preference_score(&json!({ "preferenceScore": "high" })), None);
    }

    #[test]
    fn booking_url_skips_blank_candidates() {
        let offer = json!({ "bookingUrl": "   ", "bookingLink": "delta.com/x" });
        assert_eq!(booking_url(&offer), Some("delta.com/x"));
        assert_eq!(booking_url(&json!({ "url": "" })), None);
    }
}
