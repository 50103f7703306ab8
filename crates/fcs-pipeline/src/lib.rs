//! Filter, rank and emit canonical flight offers for one run.

pub mod filter;
pub mod input;
pub mod rank;
pub mod sink;

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fcs_adapters::normalize_payload;
use fcs_core::{DomainClassifier, DomainSets, OfferRecord};
use serde::Serialize;
use tokio::fs;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub use filter::{apply_filters, FilterCriteria, FilterStage};
pub use input::{ProviderPayload, RunInput};
pub use rank::{rank, SortKey, UnknownSortKey};
pub use sink::{emit_ordered, JsonLinesSink, ResultSink, SinkError, VecSink, DEFAULT_CHANNEL_CAPACITY};

pub const CRATE_NAME: &str = "fcs-pipeline";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    /// `None` writes JSON lines to stdout.
    pub output_path: Option<PathBuf>,
    pub domains_file: Option<PathBuf>,
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("./input.json"),
            output_path: None,
            domains_file: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            input_path: std::env::var("FCS_INPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./input.json")),
            output_path: std::env::var("FCS_OUTPUT").ok().filter(|v| !v.is_empty()).map(PathBuf::from),
            domains_file: std::env::var("FCS_DOMAINS_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            channel_capacity: std::env::var("FCS_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_CHANNEL_CAPACITY),
        }
    }
}

/// Read a YAML domain-set override (`airline_domains`, `ota_domains`).
pub fn load_domain_sets(path: impl AsRef<Path>) -> Result<DomainSets> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let sets: DomainSets =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(sets.normalized())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_offers: usize,
    pub normalized_offers: usize,
    pub filtered_offers: usize,
    pub emitted: usize,
    pub sort_key: SortKey,
    pub sort_key_substituted: bool,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    classifier: DomainClassifier,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let sets = match &config.domains_file {
            Some(path) => load_domain_sets(path)?,
            None => DomainSets::default(),
        };
        Ok(Self { config, classifier: DomainClassifier::new(sets) })
    }

    pub fn with_classifier(mut self, classifier: DomainClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &DomainClassifier {
        &self.classifier
    }

    /// Filter, rank and emit one run's offers into `sink`, in final order.
    pub async fn run<S>(&self, input: RunInput, sink: &mut S) -> Result<RunSummary>
    where
        S: ResultSink + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", %run_id);
        self.run_inner(run_id, input, sink).instrument(span).await
    }

    async fn run_inner<S>(&self, run_id: Uuid, input: RunInput, sink: &mut S) -> Result<RunSummary>
    where
        S: ResultSink + ?Sized,
    {
        let started_at = Utc::now();
        let (sort_key, sort_key_substituted) = SortKey::resolve(input.sort_by.as_deref());
        if sort_key_substituted {
            warn!(
                requested = input.sort_by.as_deref().unwrap_or_default(),
                applied = %sort_key,
                "unrecognized sort key replaced"
            );
        }

        let criteria = input.criteria();
        let RunInput { flight_offers, provider_payloads, .. } = input;
        let input_offers = flight_offers.len();
        let normalized = normalize_provider_payloads(&provider_payloads);
        let normalized_offers = normalized.len();
        let mut offers = flight_offers;
        offers.extend(normalized);

        let summary = |filtered_offers, emitted| RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            input_offers,
            normalized_offers,
            filtered_offers,
            emitted,
            sort_key,
            sort_key_substituted,
        };

        if offers.is_empty() {
            info!("no flight offers to process");
            sink.finish().await.context("finishing result sink")?;
            return Ok(summary(0, 0));
        }

        let before = offers.len();
        let filtered = apply_filters(&offers, &criteria, &self.classifier);
        let filtered_offers = filtered.len();
        info!(before, after = filtered_offers, "filters applied");

        let ranked = rank(filtered, sort_key);
        let emitted = emit_ordered(ranked, &mut *sink, self.config.channel_capacity)
            .await
            .context("emitting ranked offers")?;
        sink.finish().await.context("finishing result sink")?;
        info!(emitted, sort_key = %sort_key, "offers emitted");

        Ok(summary(filtered_offers, emitted))
    }

    /// Read the configured input file and write JSON lines to the configured
    /// output (stdout when unset).
    pub async fn run_once(&self) -> Result<RunSummary> {
        let input_path = &self.config.input_path;
        let text = fs::read_to_string(input_path)
            .await
            .with_context(|| format!("reading {}", input_path.display()))?;
        let input = RunInput::from_json_str(&text)
            .with_context(|| format!("interpreting {}", input_path.display()))?;

        let writer: Box<dyn Write + Send> = match &self.config.output_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                let file = std::fs::File::create(path)
                    .with_context(|| format!("creating {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(io::stdout())),
        };
        let mut sink = JsonLinesSink::new(writer);
        self.run(input, &mut sink).await
    }
}

/// Normalize every provider payload in order. Unknown providers are skipped.
pub fn normalize_provider_payloads(payloads: &[ProviderPayload]) -> Vec<OfferRecord> {
    let mut records = Vec::new();
    for entry in payloads {
        match normalize_payload(&entry.provider, &entry.payload) {
            Ok(offers) => {
                info!(provider = %entry.provider, offers = offers.len(), "provider payload normalized");
                records.extend(offers.into_iter().map(OfferRecord::from));
            }
            Err(err) => warn!(provider = %entry.provider, error = %err, "skipping provider payload"),
        }
    }
    records
}

pub async fn run_from_config(config: PipelineConfig) -> Result<RunSummary> {
    Pipeline::new(config)?.run_once().await
}

pub async fn run_from_env() -> Result<RunSummary> {
    run_from_config(PipelineConfig::from_env()).await
}
