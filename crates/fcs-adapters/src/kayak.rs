use fcs_core::lookup::{Accept, Candidate, Step::Key};
use fcs_core::Offer;
use serde_json::Value as JsonValue;
use url::Url;

use crate::shape::{EndpointShape, ItemShape, ListingRoute, ProviderShape};
use crate::{ProviderNormalizer, SearchRequest};

const PROVIDER_ID: &str = "kayak";
const BASE_URL: &str = "https://www.kayak.com";

const PAGE_PROPS: &[Candidate] = &[
    Candidate { path: &[Key("props"), Key("pageProps")], accept: Accept::Object },
    Candidate { path: &[Key("props")], accept: Accept::Object },
];

const SEARCH_RESULTS: &[Candidate] = &[
    Candidate { path: &[Key("searchResults")], accept: Accept::Object },
    Candidate { path: &[Key("results")], accept: Accept::Object },
    Candidate { path: &[Key("data"), Key("searchResults")], accept: Accept::Object },
];

const LISTINGS: &[Candidate] = &[
    Candidate { path: &[Key("listings")], accept: Accept::Array },
    Candidate { path: &[Key("flights")], accept: Accept::Array },
    Candidate { path: &[Key("itineraries")], accept: Accept::Array },
];

const STATE_LISTINGS: &[Candidate] = &[
    Candidate {
        path: &[Key("__INITIAL_STATE__"), Key("search"), Key("results"), Key("listings")],
        accept: Accept::Array,
    },
    Candidate { path: &[Key("search"), Key("results"), Key("listings")], accept: Accept::Array },
];

const PRICE: &[Candidate] = &[
    Candidate { path: &[Key("price"), Key("value")], accept: Accept::NumberLike },
    Candidate { path: &[Key("totalPrice"), Key("amount")], accept: Accept::NumberLike },
    Candidate { path: &[Key("amount")], accept: Accept::NumberLike },
];

const CURRENCY: &[Candidate] = &[
    Candidate { path: &[Key("price"), Key("currency")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("currency")], accept: Accept::NonEmptyString },
];

const DURATION: &[Candidate] = &[
    Candidate { path: &[Key("duration")], accept: Accept::PositiveNumber },
    Candidate { path: &[Key("totalDuration")], accept: Accept::PositiveNumber },
];

const SEGMENTS: &[Candidate] = &[
    Candidate { path: &[Key("segments")], accept: Accept::Array },
    Candidate { path: &[Key("legs")], accept: Accept::Array },
    Candidate { path: &[Key("slices")], accept: Accept::Array },
];

const CARRIER: &[Candidate] = &[
    Candidate { path: &[Key("carrier"), Key("code")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("operatingCarrier"), Key("code")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("marketingCarrier"), Key("code")], accept: Accept::NonEmptyString },
];

const DEPARTURE: EndpointShape = EndpointShape {
    anchor: &[Candidate { path: &[Key("departure")], accept: Accept::Present }],
    airport: &[
        Candidate { path: &[Key("departure"), Key("airport"), Key("code")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("departure"), Key("airport")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("origin")], accept: Accept::NonEmptyString },
    ],
    time: &[
        Candidate { path: &[Key("departure"), Key("time")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("departure"), Key("dateTime")], accept: Accept::NonEmptyString },
    ],
};

const ARRIVAL: EndpointShape = EndpointShape {
    anchor: &[Candidate { path: &[Key("arrival")], accept: Accept::Present }],
    airport: &[
        Candidate { path: &[Key("arrival"), Key("airport"), Key("code")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("arrival"), Key("airport")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("destination")], accept: Accept::NonEmptyString },
    ],
    time: &[
        Candidate { path: &[Key("arrival"), Key("time")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("arrival"), Key("dateTime")], accept: Accept::NonEmptyString },
    ],
};

const LEG_DURATION: &[Candidate] = &[
    Candidate { path: &[Key("duration")], accept: Accept::Number },
    Candidate { path: &[Key("durationMinutes")], accept: Accept::Number },
];

const BOOKING_URL: &[Candidate] = &[
    Candidate { path: &[Key("bookingUrl")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("deeplink")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("url")], accept: Accept::NonEmptyString },
];

const SHAPE: ProviderShape = ProviderShape {
    routes: &[
        ListingRoute { stages: &[PAGE_PROPS, SEARCH_RESULTS, LISTINGS] },
        ListingRoute { stages: &[STATE_LISTINGS] },
    ],
    item: ItemShape {
        price: PRICE,
        currency: CURRENCY,
        default_currency: "USD",
        duration: DURATION,
        legs: SEGMENTS,
        carrier: CARRIER,
        departure: DEPARTURE,
        arrival: ARRIVAL,
        leg_duration: LEG_DURATION,
        booking_url: BOOKING_URL,
        default_booking_url: "https://www.kayak.com/flights",
    },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct KayakNormalizer;

impl ProviderNormalizer for KayakNormalizer {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    /// `/flights/{ORIG}-{DEST}/{depart}[/{return}]?sort=bestflight_a`, with
    /// `adults` above one and a non-economy `cabin` appended.
    fn search_url(&self, request: &SearchRequest) -> Option<String> {
        let origin = request.origin_code()?.to_ascii_uppercase();
        let destination = request.destination_code()?.to_ascii_uppercase();
        let depart = request.depart()?;
        let mut path = format!("/flights/{origin}-{destination}/{depart}");
        if let Some(ret) = request.return_date() {
            path.push('/');
            path.push_str(ret);
        }

        let mut url = Url::parse(BASE_URL).ok()?;
        url.set_path(&path);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("sort", "bestflight_a");
            if request.adults > 1 {
                query.append_pair("adults", &request.adults.to_string());
            }
            if let Some(cabin) = request.cabin() {
                if !cabin.eq_ignore_ascii_case("economy") {
                    query.append_pair("cabin", cabin);
                }
            }
        }
        Some(url.to_string())
    }

    fn normalize(&self, payload: &JsonValue) -> Vec<Offer> {
        SHAPE.normalize(payload, PROVIDER_ID)
    }
}
