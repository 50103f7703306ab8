//! Sort keys and the null-tolerant ranking comparator.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use fcs_core::OfferRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    PriceAsc,
    PriceDesc,
    DurationAsc,
    DurationDesc,
    StopsAsc,
    StopsDesc,
    DepartureAsc,
    DepartureDesc,
    ScoreDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized sort key {0:?}")]
pub struct UnknownSortKey(pub String);

impl SortKey {
    pub const ALL: [Self; 9] = [
        Self::PriceAsc,
        Self::PriceDesc,
        Self::DurationAsc,
        Self::DurationDesc,
        Self::StopsAsc,
        Self::StopsDesc,
        Self::DepartureAsc,
        Self::DepartureDesc,
        Self::ScoreDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::DurationAsc => "duration_asc",
            Self::DurationDesc => "duration_desc",
            Self::StopsAsc => "stops_asc",
            Self::StopsDesc => "stops_desc",
            Self::DepartureAsc => "departure_asc",
            Self::DepartureDesc => "departure_desc",
            Self::ScoreDesc => "score_desc",
        }
    }

    /// The key to apply for a requested name, and whether the request was
    /// replaced because it was not recognized. An absent request is the
    /// default, not a substitution.
    pub fn resolve(requested: Option<&str>) -> (Self, bool) {
        match requested {
            None => (Self::default(), false),
            Some(raw) => raw.parse().map_or((Self::default(), true), |key| (key, false)),
        }
    }

    fn direction(self) -> Direction {
        match self {
            Self::PriceAsc | Self::DurationAsc | Self::StopsAsc | Self::DepartureAsc => Direction::Ascending,
            Self::PriceDesc
            | Self::DurationDesc
            | Self::StopsDesc
            | Self::DepartureDesc
            | Self::ScoreDesc => Direction::Descending,
        }
    }

    /// Extracted ranking value; NaN (an unparseable departure) is unknown.
    pub fn sort_value(self, offer: &OfferRecord) -> Option<f64> {
        let value = match self {
            Self::PriceAsc | Self::PriceDesc => offer.price(),
            Self::DurationAsc | Self::DurationDesc => offer.duration_minutes(),
            Self::StopsAsc | Self::StopsDesc => offer.stops().map(f64::from),
            Self::DepartureAsc | Self::DepartureDesc => offer.departure_time(),
            Self::ScoreDesc => offer.preference_score(),
        };
        value.filter(|v| !v.is_nan())
    }

    /// Total order over offers. Unknown values rank last in both directions.
    pub fn compare(self, a: &OfferRecord, b: &OfferRecord) -> Ordering {
        match (self.sort_value(a), self.sort_value(b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ascending = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                match self.direction() {
                    Direction::Ascending => ascending,
                    Direction::Descending => ascending.reverse(),
                }
            }
        }
    }
}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable sort: offers with equal keys keep their input order.
pub fn rank(mut offers: Vec<OfferRecord>, key: SortKey) -> Vec<OfferRecord> {
    offers.sort_by(|a, b| key.compare(a, b));
    offers
}
