//! Provider normalizers: raw search-result payloads into canonical offers.

mod kayak;
mod shape;
mod skyscanner;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fcs_core::Offer;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

pub use kayak::KayakNormalizer;
pub use shape::MAX_LISTINGS_PER_PAYLOAD;
pub use skyscanner::SkyscannerNormalizer;

pub const CRATE_NAME: &str = "fcs-adapters";

pub const PROVIDER_IDS: &[&str] = &["kayak", "skyscanner"];

const EMBEDDED_JSON_SELECTOR: &str = r#"script#__NEXT_DATA__, script[type="application/json"]"#;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("no normalizer registered for provider {0:?}")]
    UnknownProvider(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Search parameters a provider needs to build its results-page URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub depart_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub cabin_class: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

fn default_adults() -> u32 {
    1
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            origin: String::new(),
            destination: String::new(),
            depart_date: String::new(),
            return_date: None,
            adults: default_adults(),
            cabin_class: None,
            currency: None,
        }
    }
}

impl SearchRequest {
    /// Origin with all whitespace removed; `None` when that leaves nothing.
    pub fn origin_code(&self) -> Option<String> {
        compact_code(&self.origin)
    }

    pub fn destination_code(&self) -> Option<String> {
        compact_code(&self.destination)
    }

    pub fn depart(&self) -> Option<&str> {
        non_blank(&self.depart_date)
    }

    pub fn return_date(&self) -> Option<&str> {
        self.return_date.as_deref().and_then(non_blank)
    }

    pub fn cabin(&self) -> Option<&str> {
        self.cabin_class.as_deref().and_then(non_blank)
    }
}

fn compact_code(raw: &str) -> Option<String> {
    let code: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

fn non_blank(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Maps one provider's raw payload into canonical offers.
///
/// `normalize` never fails: `null`, unrecognized shapes and malformed
/// listings degrade to fewer (or zero) offers.
pub trait ProviderNormalizer: Send + Sync {
    fn provider_id(&self) -> &'static str;
    fn base_url(&self) -> &'static str;
    fn search_url(&self, request: &SearchRequest) -> Option<String>;
    fn normalize(&self, payload: &JsonValue) -> Vec<Offer>;
}

pub fn kayak_normalizer() -> impl ProviderNormalizer {
    KayakNormalizer
}

pub fn skyscanner_normalizer() -> impl ProviderNormalizer {
    SkyscannerNormalizer
}

pub fn normalizer_for_provider(provider_id: &str) -> Result<Box<dyn ProviderNormalizer>, AdapterError> {
    match provider_id.trim().to_ascii_lowercase().as_str() {
        "kayak" => Ok(Box::new(KayakNormalizer)),
        "skyscanner" => Ok(Box::new(SkyscannerNormalizer)),
        _ => Err(AdapterError::UnknownProvider(provider_id.to_string())),
    }
}

/// Normalize with the registered provider and log how many offers came out.
pub fn normalize_payload(provider_id: &str, payload: &JsonValue) -> Result<Vec<Offer>, AdapterError> {
    let normalizer = normalizer_for_provider(provider_id)?;
    let offers = normalizer.normalize(payload);
    debug!(provider = normalizer.provider_id(), offers = offers.len(), "normalized provider payload");
    Ok(offers)
}

/// Parse every embedded JSON script of a captured results page, in document
/// order. Scripts that are empty or not valid JSON are skipped.
pub fn embedded_json_documents(html: &str) -> Result<Vec<JsonValue>, AdapterError> {
    let selector =
        Selector::parse(EMBEDDED_JSON_SELECTOR).map_err(|e| AdapterError::Message(e.to_string()))?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .filter_map(|node| {
            let text = node.text().collect::<String>();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            serde_json::from_str(trimmed).ok()
        })
        .collect())
}

/// Load a raw provider payload. `.html`/`.htm` files become an array of their
/// embedded JSON documents; anything else is read as JSON.
pub fn load_payload_file(path: impl AsRef<Path>) -> Result<JsonValue> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let is_html = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
    if is_html {
        let docs = embedded_json_documents(&data)
            .with_context(|| format!("extracting embedded JSON from {}", path.display()))?;
        return Ok(JsonValue::Array(docs));
    }
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}
