//! Ordered candidate-path lookup over loosely shaped provider JSON.
//!
//! Every fallback chain in the workspace is a `&[Candidate]` table: the first
//! candidate whose path resolves to a value its predicate accepts wins.

use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Key(&'static str),
    Index(usize),
}

/// Predicate a resolved value must satisfy for its candidate to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    /// Present and not `null`.
    Present,
    NonEmptyString,
    Number,
    /// A number greater than zero.
    PositiveNumber,
    /// A number, or a string that parses as one.
    NumberLike,
    Array,
    Object,
}

impl Accept {
    pub fn accepts(self, value: &JsonValue) -> bool {
        match self {
            Self::Present => !value.is_null(),
            Self::NonEmptyString => value.as_str().is_some_and(|s| !s.is_empty()),
            Self::Number => value.is_number(),
            Self::PositiveNumber => value.as_f64().is_some_and(|n| n > 0.0),
            Self::NumberLike => number_like(value).is_some(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub path: &'static [Step],
    pub accept: Accept,
}

/// Follow `path` from `value`, returning `None` as soon as a step is missing.
pub fn walk<'a>(value: &'a JsonValue, path: &[Step]) -> Option<&'a JsonValue> {
    let mut cur = value;
    for step in path {
        cur = match step {
            Step::Key(key) => cur.get(*key)?,
            Step::Index(idx) => cur.get(*idx)?,
        };
    }
    Some(cur)
}

pub fn first_match<'a>(value: &'a JsonValue, candidates: &[Candidate]) -> Option<&'a JsonValue> {
    candidates.iter().find_map(|candidate| {
        walk(value, candidate.path).filter(|found| candidate.accept.accepts(found))
    })
}

pub fn first_str<'a>(value: &'a JsonValue, candidates: &[Candidate]) -> Option<&'a str> {
    first_match(value, candidates).and_then(JsonValue::as_str)
}

pub fn first_f64(value: &JsonValue, candidates: &[Candidate]) -> Option<f64> {
    first_match(value, candidates).and_then(number_like)
}

pub fn first_array<'a>(value: &'a JsonValue, candidates: &[Candidate]) -> Option<&'a Vec<JsonValue>> {
    first_match(value, candidates).and_then(JsonValue::as_array)
}

/// Numbers pass through; strings are trimmed and parsed. Blank strings and
/// NaN are rejected.
pub fn number_like(value: &JsonValue) -> Option<f64> {
    let n = match value {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if n.is_nan() {
        None
    } else {
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PRICE: &[Candidate] = &[
        Candidate {
            path: &[Step::Key("pricing"), Step::Key("options"), Step::Index(0), Step::Key("amount")],
            accept: Accept::NumberLike,
        },
        Candidate {
            path: &[Step::Key("price"), Step::Key("amount")],
            accept: Accept::NumberLike,
        },
        Candidate {
            path: &[Step::Key("minPrice")],
            accept: Accept::NumberLike,
        },
    ];

    #[test]
    fn first_candidate_that_resolves_wins() {
        let item = json!({
            "pricing": { "options": [{ "amount": 210 }, { "amount": 90 }] },
            "price": { "amount": 300 }
        });
        assert_eq!(first_f64(&item, PRICE), Some(210.0));
    }

    #[test]
    fn rejected_values_fall_through_to_later_candidates() {
        let item = json!({
            "pricing": { "options": [] },
            "price": { "amount": "n/a" },
            "minPrice": "145.50"
        });
        assert_eq!(first_f64(&item, PRICE), Some(145.5));
    }

    #[test]
    fn walking_through_scalars_yields_nothing() {
        let item = json!({ "price": 12 });
        assert!(walk(&item, &[Step::Key("price"), Step::Key("amount")]).is_none());
        assert_eq!(first_f64(&item, PRICE), None);
        assert_eq!(first_f64(&JsonValue::Null, PRICE), None);
    }

    #[test]
    fn number_like_rejects_blank_and_nan() {
        assert_eq!(number_like(&json!(" 42 ")), Some(42.0));
        assert_eq!(number_like(&json!("")), None);
        assert_eq!(number_like(&json!("NaN")), None);
        assert_eq!(number_like(&json!(true)), None);
        assert_eq!(number_like(&json!(null)), None);
    }

    #[test]
    fn predicates_follow_truthiness_rules() {
        assert!(!Accept::PositiveNumber.accepts(&json!(0)));
        assert!(Accept::PositiveNumber.accepts(&json!(95)));
        assert!(!Accept::NonEmptyString.accepts(&json!("")));
        assert!(Accept::Present.accepts(&json!({})));
        assert!(!Accept::Present.accepts(&json!(null)));
        assert!(Accept::Array.accepts(&json!([])));
        assert!(!Accept::Object.accepts(&json!([])));
    }
}
