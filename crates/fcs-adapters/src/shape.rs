//! Declarative per-provider field layouts and the shared listing mapper.

use fcs_core::lookup::{first_array, first_f64, first_match, first_str, Candidate};
use fcs_core::{Endpoint, Leg, Offer, Price};
use serde_json::Value as JsonValue;

/// Upper bound on listings taken from a single payload.
pub const MAX_LISTINGS_PER_PAYLOAD: usize = 50;

/// A chain of lookups from a document root down to its listings array; each
/// stage narrows the current node to the first candidate that matches.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListingRoute {
    pub stages: &'static [&'static [Candidate]],
}

impl ListingRoute {
    fn locate<'a>(&self, doc: &'a JsonValue) -> Option<&'a [JsonValue]> {
        let mut cur = doc;
        for stage in self.stages {
            cur = first_match(cur, stage)?;
        }
        cur.as_array()
            .map(Vec::as_slice)
            .filter(|listings| !listings.is_empty())
    }
}

/// Paths are relative to the segment; `anchor` must resolve for the endpoint
/// to exist at all.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EndpointShape {
    pub anchor: &'static [Candidate],
    pub airport: &'static [Candidate],
    pub time: &'static [Candidate],
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ItemShape {
    pub price: &'static [Candidate],
    pub currency: &'static [Candidate],
    pub default_currency: &'static str,
    pub duration: &'static [Candidate],
    pub legs: &'static [Candidate],
    pub carrier: &'static [Candidate],
    pub departure: EndpointShape,
    pub arrival: EndpointShape,
    pub leg_duration: &'static [Candidate],
    pub booking_url: &'static [Candidate],
    pub default_booking_url: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ProviderShape {
    /// Tried in order; within a route, documents are tried in order.
    pub routes: &'static [ListingRoute],
    pub item: ItemShape,
}

impl ProviderShape {
    pub(crate) fn normalize(&self, payload: &JsonValue, provider_id: &str) -> Vec<Offer> {
        self.locate_listings(payload)
            .iter()
            .filter(|item| item.is_object())
            .take(MAX_LISTINGS_PER_PAYLOAD)
            .map(|item| self.item.map(item, provider_id))
            .collect()
    }

    fn locate_listings<'a>(&self, payload: &'a JsonValue) -> &'a [JsonValue] {
        let docs: Vec<&JsonValue> = match payload {
            JsonValue::Array(docs) => docs.iter().collect(),
            JsonValue::Null => Vec::new(),
            doc => vec![doc],
        };
        self.routes
            .iter()
            .find_map(|route| docs.iter().find_map(|doc| route.locate(*doc)))
            .unwrap_or_default()
    }
}

impl ItemShape {
    fn map(&self, item: &JsonValue, provider_id: &str) -> Offer {
        let price = first_f64(item, self.price).map(|amount| {
            let currency = first_str(item, self.currency).unwrap_or(self.default_currency);
            Price::with_currency(amount, currency)
        });
        let segments = first_array(item, self.legs).map(Vec::as_slice).unwrap_or_default();
        let legs: Vec<Leg> = segments.iter().map(|segment| self.map_leg(segment)).collect();
        let total_duration_minutes = first_f64(item, self.duration).and_then(whole_minutes).or_else(|| {
            let durations: Vec<u32> = legs.iter().filter_map(|leg| leg.duration_minutes).collect();
            if durations.is_empty() {
                None
            } else {
                Some(durations.iter().fold(0u32, |total, d| total.saturating_add(*d)))
            }
        });
        let stops = u32::try_from(segments.len().saturating_sub(1)).unwrap_or(u32::MAX);
        let booking_url = first_str(item, self.booking_url).unwrap_or(self.default_booking_url);

        Offer {
            price,
            total_duration_minutes,
            stops: Some(stops),
            legs,
            booking_url: Some(booking_url.to_string()),
            is_direct_airline: None,
            preference_score: None,
            provider: Some(provider_id.to_string()),
        }
    }

    fn map_leg(&self, segment: &JsonValue) -> Leg {
        Leg {
            carrier: first_str(segment, self.carrier).map(ToString::to_string),
            departure: map_endpoint(segment, &self.departure),
            arrival: map_endpoint(segment, &self.arrival),
            duration_minutes: first_f64(segment, self.leg_duration).and_then(whole_minutes),
        }
    }
}

/// Provider durations are minutes; fractions round to the nearest minute and
/// negative values are dropped.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_minutes(minutes: f64) -> Option<u32> {
    if minutes.is_finite() && minutes >= 0.0 {
        Some(minutes.round().min(f64::from(u32::MAX)) as u32)
    } else {
        None
    }
}

fn map_endpoint(segment: &JsonValue, shape: &EndpointShape) -> Option<Endpoint> {
    first_match(segment, shape.anchor)?;
    Some(Endpoint {
        airport: first_str(segment, shape.airport).map(ToString::to_string),
        time: first_str(segment, shape.time).map(ToString::to_string),
    })
}
