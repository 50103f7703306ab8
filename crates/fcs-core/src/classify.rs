//! Direct-airline versus OTA booking classification.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use url::Url;

use crate::extract;

const DEFAULT_AIRLINE_DOMAINS: &[&str] = &[
    "united.com",
    "aa.com",
    "delta.com",
    "southwest.com",
    "jetblue.com",
    "alaskaair.com",
    "britishairways.com",
    "lufthansa.com",
    "airfrance.com",
    "klm.com",
    "virgin-atlantic.com",
    "qantas.com",
    "emirates.com",
];

const DEFAULT_OTA_DOMAINS: &[&str] = &[
    "expedia.com",
    "booking.com",
    "priceline.com",
    "kayak.com",
    "orbitz.com",
    "travelocity.com",
    "cheaptickets.com",
    "hotwire.com",
    "agoda.com",
    "hotels.com",
];

/// Static lookup sets consulted by [`DomainClassifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSets {
    #[serde(default, rename = "airline_domains")]
    pub airline: BTreeSet<String>,
    #[serde(default, rename = "ota_domains")]
    pub ota: BTreeSet<String>,
}

impl Default for DomainSets {
    fn default() -> Self {
        Self::new(
            DEFAULT_AIRLINE_DOMAINS.iter().copied(),
            DEFAULT_OTA_DOMAINS.iter().copied(),
        )
    }
}

impl DomainSets {
    /// Entries are lowercased and stripped of a leading `www.`.
    pub fn new<A, O>(airline: A, ota: O) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        O: IntoIterator,
        O::Item: AsRef<str>,
    {
        Self {
            airline: airline.into_iter().filter_map(normalize_entry).collect(),
            ota: ota.into_iter().filter_map(normalize_entry).collect(),
        }
    }

    /// Re-normalize entries that arrived through deserialization.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(self.airline, self.ota)
    }
}

fn normalize_entry(entry: impl AsRef<str>) -> Option<String> {
    let lower = entry.as_ref().trim().to_ascii_lowercase();
    let bare = lower.strip_prefix("www.").unwrap_or(&lower);
    if bare.is_empty() {
        None
    } else {
        Some(bare.to_string())
    }
}

/// How an offer's booking channel was decided, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    ExplicitFlag,
    AirlineDomain,
    OtaDomain,
    CarrierInDomain,
    UnknownDomain,
    UnparseableUrl,
    NoBookingUrl,
}

impl Verdict {
    pub fn is_direct(self) -> bool {
        matches!(self, Self::ExplicitFlag | Self::AirlineDomain | Self::CarrierInDomain)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DomainClassifier {
    sets: DomainSets,
}

impl DomainClassifier {
    pub fn new(sets: DomainSets) -> Self {
        Self { sets }
    }

    pub fn sets(&self) -> &DomainSets {
        &self.sets
    }

    pub fn is_direct_airline(&self, offer: &JsonValue) -> bool {
        self.classify(offer).is_direct()
    }

    pub fn classify(&self, offer: &JsonValue) -> Verdict {
        if offer.get("isDirectAirline").and_then(JsonValue::as_bool) == Some(true) {
            return Verdict::ExplicitFlag;
        }
        let Some(url) = extract::booking_url(offer) else {
            return Verdict::NoBookingUrl;
        };
        let Some(domain) = registrable_domain(url) else {
            return Verdict::UnparseableUrl;
        };
        if self.sets.airline.contains(&domain) {
            return Verdict::AirlineDomain;
        }
        if self.sets.ota.contains(&domain) {
            return Verdict::OtaDomain;
        }
        match extract::first_carrier(offer) {
            Some(carrier) if domain.contains(&carrier.to_lowercase()) => Verdict::CarrierInDomain,
            _ => Verdict::UnknownDomain,
        }
    }
}

/// Lowercased host of `url` without a leading `www.`. Scheme-less input is
/// read as `https://`.
pub fn registrable_domain(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = if has_scheme(trimmed) {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{trimmed}"))
    }
    .ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let bare = host.strip_prefix("www.").unwrap_or(&host);
    if bare.is_empty() {
        None
    } else {
        Some(bare.to_string())
    }
}

fn has_scheme(url: &str) -> bool {
    url.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registrable_domain_normalizes_host() {
        assert_eq!(registrable_domain("https://WWW.Delta.com/booking").as_deref(), Some("delta.com"));
        assert_eq!(registrable_domain("united.com/checkout?x=1").as_deref(), Some("united.com"));
        assert_eq!(registrable_domain("http://book.jetblue.com").as_deref(), Some("book.jetblue.com"));
        assert_eq!(registrable_domain("   "), None);
        assert_eq!(registrable_domain("https://"), None);
        assert_eq!(registrable_domain("not a url at all"), None);
    }

    #[test]
    fn airline_domain_is_direct() {
        let classifier = DomainClassifier::default();
        let offer = json!({ "bookingUrl": "https://www.delta.com/booking" });
        assert_eq!(classifier.classify(&offer), Verdict::AirlineDomain);
        assert!(classifier.is_direct_airline(&offer));
    }

    #[test]
    fn ota_domain_beats_carrier_heuristic() {
        let classifier = DomainClassifier::default();
        let offer = json!({
            "bookingUrl": "https://www.expedia.com/x",
            "legs": [{ "carrier": "DL" }]
        });
        assert_eq!(classifier.classify(&offer), Verdict::OtaDomain);
        assert!(!classifier.is_direct_airline(&offer));
    }

    #[test]
    fn explicit_flag_wins_regardless_of_url() {
        let classifier = DomainClassifier::default();
        let offer = json!({ "isDirectAirline": true, "bookingUrl": "https://www.expedia.com/x" });
        assert_eq!(classifier.classify(&offer), Verdict::ExplicitFlag);
        let not_flagged = json!({ "isDirectAirline": "true", "bookingUrl": "https://www.expedia.com/x" });
        assert!(!classifier.is_direct_airline(&not_flagged));
    }

    #[test]
    fn carrier_substring_fallback_for_unknown_domains() {
        let classifier = DomainClassifier::default();
        let offer = json!({
            "bookingUrl": "https://book.ba.co.uk/flights",
            "legs": [{ "carrier": "BA" }, { "carrier": "IB" }]
        });
        assert_eq!(classifier.classify(&offer), Verdict::CarrierInDomain);

        let unrelated = json!({
            "bookingUrl": "https://cheapflights.example/deal",
            "legs": [{ "carrier": "UA" }]
        });
        assert_eq!(classifier.classify(&unrelated), Verdict::UnknownDomain);
        assert!(!classifier.is_direct_airline(&unrelated));
    }

    #[test]
    fn unparseable_booking_url_is_not_direct() {
        let classifier = DomainClassifier::default();
        let offer = json!({ "bookingUrl": "not a url at all", "legs": [{ "carrier": "UA" }] });
        assert_eq!(classifier.classify(&offer), Verdict::UnparseableUrl);
        assert!(!classifier.is_direct_airline(&offer));
    }

    #[test]
    fn missing_or_blank_url_is_not_direct() {
        let classifier = DomainClassifier::default();
        assert_eq!(classifier.classify(&json!({ "legs": [{ "carrier": "UA" }] })), Verdict::NoBookingUrl);
        assert_eq!(classifier.classify(&json!({ "url": " " })), Verdict::NoBookingUrl);
    }

    #[test]
    fn injected_sets_replace_the_defaults() {
        let classifier = DomainClassifier::new(DomainSets::new(["WWW.Example-Air.test"], ["delta.com"]));
        let airline = json!({ "bookingUrl": "https://example-air.test/b" });
        assert_eq!(classifier.classify(&airline), Verdict::AirlineDomain);
        let demoted = json!({ "bookingUrl": "https://www.delta.com/booking" });
        assert_eq!(classifier.classify(&demoted), Verdict::OtaDomain);
    }
}
