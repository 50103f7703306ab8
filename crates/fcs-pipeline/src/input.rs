//! Run input document: offers, provider payloads and user criteria.

use anyhow::{Context, Result};
use fcs_core::lookup::number_like;
use fcs_core::OfferRecord;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::filter::FilterCriteria;

/// One raw provider response to normalize before filtering.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderPayload {
    pub provider: String,
    #[serde(default)]
    pub payload: JsonValue,
}

/// Recognized run options. Malformed values degrade to "absent" rather than
/// failing the run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInput {
    #[serde(default, deserialize_with = "offers_or_empty")]
    pub flight_offers: Vec<OfferRecord>,
    #[serde(default, deserialize_with = "sort_key_text")]
    pub sort_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_stops: Option<f64>,
    #[serde(default, deserialize_with = "strictly_true")]
    pub direct_only: bool,
    #[serde(default, deserialize_with = "airline_codes")]
    pub include_airlines: Vec<String>,
    #[serde(default, deserialize_with = "airline_codes")]
    pub exclude_airlines: Vec<String>,
    #[serde(default, deserialize_with = "payloads_or_empty")]
    pub provider_payloads: Vec<ProviderPayload>,
}

impl RunInput {
    /// `null` and any other non-object value are an empty run with default
    /// options.
    pub fn from_value(value: JsonValue) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        if !value.is_object() {
            warn!(kind = json_kind(&value), "run input is not an object; using defaults");
            return Ok(Self::default());
        }
        serde_json::from_value(value).context("parsing run input")
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(text).context("parsing run input JSON")?;
        Self::from_value(value)
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from(self)
    }
}

impl From<&RunInput> for FilterCriteria {
    fn from(input: &RunInput) -> Self {
        Self {
            min_price: input.min_price,
            max_price: input.max_price,
            max_stops: input.max_stops,
            direct_only: input.direct_only,
            include_airlines: input.include_airlines.clone(),
            exclude_airlines: input.exclude_airlines.clone(),
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn offers_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<OfferRecord>, D::Error> {
    Ok(match JsonValue::deserialize(d)? {
        JsonValue::Array(items) => items.into_iter().map(OfferRecord::new).collect(),
        _ => Vec::new(),
    })
}

fn payloads_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<ProviderPayload>, D::Error> {
    Ok(match JsonValue::deserialize(d)? {
        JsonValue::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Non-string keys are kept as text so they are reported as unrecognized.
fn sort_key_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match JsonValue::deserialize(d)? {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(number_like(&JsonValue::deserialize(d)?))
}

fn strictly_true<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(JsonValue::deserialize(d)? == JsonValue::Bool(true))
}

fn airline_codes<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match JsonValue::deserialize(d)? {
        JsonValue::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                JsonValue::String(s) => Some(s),
                JsonValue::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
