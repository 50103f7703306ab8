//! User-constraint filter stages over canonical offers.

use std::collections::BTreeSet;

use fcs_core::{DomainClassifier, OfferRecord};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub max_stops: Option<f64>,
    pub direct_only: bool,
    pub include_airlines: Vec<String>,
    pub exclude_airlines: Vec<String>,
}

/// One enabled predicate. Stages are independent, so their order only
/// affects how much work later stages see.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterStage {
    MinPrice(f64),
    MaxPrice(f64),
    MaxStops(f64),
    DirectOnly,
    IncludeAirlines(BTreeSet<String>),
    ExcludeAirlines(BTreeSet<String>),
}

impl FilterStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinPrice(_) => "min_price",
            Self::MaxPrice(_) => "max_price",
            Self::MaxStops(_) => "max_stops",
            Self::DirectOnly => "direct_only",
            Self::IncludeAirlines(_) => "include_airlines",
            Self::ExcludeAirlines(_) => "exclude_airlines",
        }
    }

    pub fn accepts(&self, offer: &OfferRecord, classifier: &DomainClassifier) -> bool {
        match self {
            Self::MinPrice(min) => offer.price().unwrap_or(0.0) >= *min,
            Self::MaxPrice(max) => offer.price().unwrap_or(f64::INFINITY) <= *max,
            Self::MaxStops(max) => offer.stops().map_or(f64::INFINITY, f64::from) <= *max,
            Self::DirectOnly => classifier.is_direct_airline(offer.as_json()),
            Self::IncludeAirlines(codes) => any_carrier_in(offer, codes),
            Self::ExcludeAirlines(codes) => !any_carrier_in(offer, codes),
        }
    }
}

fn any_carrier_in(offer: &OfferRecord, codes: &BTreeSet<String>) -> bool {
    offer
        .carriers()
        .iter()
        .any(|carrier| codes.contains(&carrier.to_uppercase()))
}

fn code_set(codes: &[String]) -> BTreeSet<String> {
    codes
        .iter()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty())
        .map(str::to_uppercase)
        .collect()
}

impl FilterCriteria {
    /// Enabled stages in application order: price floor, price ceiling, stop
    /// limit, direct-only, airline include, airline exclude.
    pub fn stages(&self) -> Vec<FilterStage> {
        let mut stages = Vec::new();
        if let Some(min) = self.min_price.filter(|v| !v.is_nan()) {
            stages.push(FilterStage::MinPrice(min));
        }
        if let Some(max) = self.max_price.filter(|v| !v.is_nan()) {
            stages.push(FilterStage::MaxPrice(max));
        }
        if let Some(max) = self.max_stops.filter(|v| !v.is_nan()) {
            stages.push(FilterStage::MaxStops(max));
        }
        if self.direct_only {
            stages.push(FilterStage::DirectOnly);
        }
        let include = code_set(&self.include_airlines);
        if !include.is_empty() {
            stages.push(FilterStage::IncludeAirlines(include));
        }
        let exclude = code_set(&self.exclude_airlines);
        if !exclude.is_empty() {
            stages.push(FilterStage::ExcludeAirlines(exclude));
        }
        stages
    }
}

/// Keep the offers every enabled stage accepts, preserving input order.
pub fn apply_filters(
    offers: &[OfferRecord],
    criteria: &FilterCriteria,
    classifier: &DomainClassifier,
) -> Vec<OfferRecord> {
    let mut out = offers.to_vec();
    for stage in criteria.stages() {
        let before = out.len();
        out.retain(|offer| stage.accepts(offer, classifier));
        debug!(stage = stage.name(), before, after = out.len(), "filter stage applied");
    }
    out
}
