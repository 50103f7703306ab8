//! Canonical flight offer model, field extraction and booking-channel classification.

pub mod classify;
pub mod extract;
pub mod lookup;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub use classify::{registrable_domain, DomainClassifier, DomainSets, Verdict};

pub const CRATE_NAME: &str = "fcs-core";

/// Total itinerary price, either a bare number or a structured amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        currency: Option<String>,
    },
}

impl Price {
    pub fn with_currency(amount: f64, currency: impl Into<String>) -> Self {
        Self::Structured {
            amount: Some(amount),
            total: None,
            currency: Some(currency.into()),
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Amount(amount) => Some(*amount),
            Self::Structured { amount, total, .. } => amount.or(*total),
        }
    }

    pub fn currency(&self) -> Option<&str> {
        match self {
            Self::Amount(_) => None,
            Self::Structured { currency, .. } => currency.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// One flown segment. Legs are kept in flight order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// Canonical offer as produced by a provider normalizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stops: Option<u32>,
    #[serde(default)]
    pub legs: Vec<Leg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_direct_airline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Read-only offer-shaped JSON object flowing through filtering and ranking.
///
/// Records are either serialized [`Offer`]s or caller-supplied near-canonical
/// objects; fields the model does not know about are preserved for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferRecord(JsonValue);

impl OfferRecord {
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_json(self) -> JsonValue {
        self.0
    }

    pub fn price(&self) -> Option<f64> {
        extract::price(&self.0)
    }

    pub fn duration_minutes(&self) -> Option<f64> {
        extract::duration_minutes(&self.0)
    }

    pub fn stops(&self) -> Option<u32> {
        extract::stops(&self.0)
    }

    pub fn departure_time(&self) -> Option<f64> {
        extract::departure_time(&self.0)
    }

    pub fn preference_score(&self) -> Option<f64> {
        extract::preference_score(&self.0)
    }

    pub fn carriers(&self) -> Vec<String> {
        extract::carriers(&self.0)
    }
}

impl From<&Offer> for OfferRecord {
    fn from(offer: &Offer) -> Self {
        // Offer holds only strings, finite-or-null numbers and nested structs.
        Self(serde_json::to_value(offer).unwrap_or(JsonValue::Null))
    }
}

impl From<Offer> for OfferRecord {
    fn from(offer: Offer) -> Self {
        Self::from(&offer)
    }
}

impl From<JsonValue> for OfferRecord {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}
