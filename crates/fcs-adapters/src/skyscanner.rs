use fcs_core::lookup::{Accept, Candidate, Step::Index, Step::Key};
use fcs_core::Offer;
use serde_json::Value as JsonValue;
use url::Url;

use crate::shape::{EndpointShape, ItemShape, ListingRoute, ProviderShape};
use crate::{ProviderNormalizer, SearchRequest};

const PROVIDER_ID: &str = "skyscanner";
const BASE_URL: &str = "https://www.skyscanner.com";

const PAGE_PROPS: &[Candidate] = &[
    Candidate { path: &[Key("props"), Key("pageProps")], accept: Accept::Object },
    Candidate { path: &[Key("props")], accept: Accept::Object },
];

const ITINERARIES: &[Candidate] = &[
    Candidate {
        path: &[Key("initialState"), Key("results"), Key("itineraries")],
        accept: Accept::Array,
    },
    Candidate { path: &[Key("itineraries")], accept: Accept::Array },
    Candidate { path: &[Key("results"), Key("itineraries")], accept: Accept::Array },
];

const STATE_ITINERARIES: &[Candidate] = &[
    Candidate {
        path: &[Key("__INITIAL_STATE__"), Key("results"), Key("itineraries")],
        accept: Accept::Array,
    },
    Candidate { path: &[Key("results"), Key("itineraries")], accept: Accept::Array },
];

const PRICE: &[Candidate] = &[
    Candidate {
        path: &[Key("pricing"), Key("options"), Index(0), Key("price"), Key("amount")],
        accept: Accept::NumberLike,
    },
    Candidate { path: &[Key("price"), Key("amount")], accept: Accept::NumberLike },
    Candidate { path: &[Key("minPrice")], accept: Accept::NumberLike },
];

const CURRENCY: &[Candidate] = &[
    Candidate {
        path: &[Key("pricing"), Key("options"), Index(0), Key("price"), Key("currency")],
        accept: Accept::NonEmptyString,
    },
    Candidate { path: &[Key("price"), Key("currency")], accept: Accept::NonEmptyString },
];

const DURATION: &[Candidate] = &[
    Candidate { path: &[Key("duration")], accept: Accept::PositiveNumber },
    Candidate { path: &[Key("totalDuration")], accept: Accept::PositiveNumber },
];

const LEGS: &[Candidate] = &[
    Candidate { path: &[Key("legs")], accept: Accept::Array },
    Candidate { path: &[Key("slices")], accept: Accept::Array },
    Candidate { path: &[Key("segments")], accept: Accept::Array },
];

const CARRIER: &[Candidate] = &[
    Candidate { path: &[Key("carrier"), Key("id")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("marketingCarrier"), Key("id")], accept: Accept::NonEmptyString },
];

const DEPARTURE: EndpointShape = EndpointShape {
    anchor: &[Candidate { path: &[Key("departure")], accept: Accept::Present }],
    airport: &[
        Candidate { path: &[Key("departure"), Key("origin"), Key("id")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("departure"), Key("from")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("departure"), Key("airport")], accept: Accept::NonEmptyString },
    ],
    time: &[
        Candidate { path: &[Key("departure"), Key("time")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("departure"), Key("dateTime")], accept: Accept::NonEmptyString },
    ],
};

const ARRIVAL: EndpointShape = EndpointShape {
    anchor: &[Candidate { path: &[Key("arrival")], accept: Accept::Present }],
    airport: &[
        Candidate { path: &[Key("arrival"), Key("destination"), Key("id")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("arrival"), Key("to")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("arrival"), Key("airport")], accept: Accept::NonEmptyString },
    ],
    time: &[
        Candidate { path: &[Key("arrival"), Key("time")], accept: Accept::NonEmptyString },
        Candidate { path: &[Key("arrival"), Key("dateTime")], accept: Accept::NonEmptyString },
    ],
};

const LEG_DURATION: &[Candidate] = &[Candidate { path: &[Key("duration")], accept: Accept::Number }];

const BOOKING_URL: &[Candidate] = &[
    Candidate { path: &[Key("bookingUrl")], accept: Accept::NonEmptyString },
    Candidate { path: &[Key("deeplink")], accept: Accept::NonEmptyString },
];

const SHAPE: ProviderShape = ProviderShape {
    routes: &[
        ListingRoute { stages: &[PAGE_PROPS, ITINERARIES] },
        ListingRoute { stages: &[STATE_ITINERARIES] },
    ],
    item: ItemShape {
        price: PRICE,
        currency: CURRENCY,
        default_currency: "USD",
        duration: DURATION,
        legs: LEGS,
        carrier: CARRIER,
        departure: DEPARTURE,
        arrival: ARRIVAL,
        leg_duration: LEG_DURATION,
        booking_url: BOOKING_URL,
        default_booking_url: "https://www.skyscanner.com/booking",
    },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct SkyscannerNormalizer;

impl ProviderNormalizer for SkyscannerNormalizer {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn search_url(&self, request: &SearchRequest) -> Option<String> {
        let origin = request.origin_code()?.to_ascii_lowercase();
        let destination = request.destination_code()?.to_ascii_lowercase();
        let depart = request.depart()?;
        let mut path = format!("/transport/flights-from/{origin}/to/{destination}/{depart}/");
        if let Some(ret) = request.return_date() {
            path.push_str(ret);
            path.push('/');
        }
        let mut url = Url::parse(BASE_URL).ok()?;
        url.set_path(&path);
        Some(url.to_string())
    }

    fn normalize(&self, payload: &JsonValue) -> Vec<Offer> {
        SHAPE.normalize(payload, PROVIDER_ID)
    }
}
