use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fcs_adapters::{load_payload_file, normalize_payload, normalizer_for_provider, SearchRequest};
use fcs_pipeline::PipelineConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fcs-cli")]
#[command(about = "Flight Concierge Sorter command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Filter and rank a run input file, writing JSON lines.
    Run(RunArgs),
    /// Print a raw provider payload as canonical offers, one per line.
    Normalize {
        #[arg(long)]
        provider: String,
        payload: PathBuf,
    },
    /// Print a provider's results-page URL.
    SearchUrl(SearchUrlArgs),
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long)]
    domains: Option<PathBuf>,
}

impl RunArgs {
    fn apply(self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(output) = self.output {
            config.output_path = Some(output);
        }
        if let Some(domains) = self.domains {
            config.domains_file = Some(domains);
        }
        config
    }
}

#[derive(Debug, Args)]
struct SearchUrlArgs {
    #[arg(long)]
    provider: String,
    #[arg(long)]
    origin: String,
    #[arg(long)]
    destination: String,
    #[arg(long)]
    depart: String,
    #[arg(long = "return")]
    return_date: Option<String>,
    #[arg(long, default_value_t = 1)]
    adults: u32,
    #[arg(long)]
    cabin: Option<String>,
}

impl From<SearchUrlArgs> for SearchRequest {
    fn from(args: SearchUrlArgs) -> Self {
        Self {
            origin: args.origin,
            destination: args.destination,
            depart_date: args.depart,
            return_date: args.return_date,
            adults: args.adults,
            cabin_class: args.cabin,
            currency: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            let config = args.apply(PipelineConfig::from_env());
            debug!(?config, "starting run");
            let summary = fcs_pipeline::run_from_config(config).await?;
            eprintln!(
                "run complete: run_id={} offers={} normalized={} kept={} emitted={} sort={}{}",
                summary.run_id,
                summary.input_offers,
                summary.normalized_offers,
                summary.filtered_offers,
                summary.emitted,
                summary.sort_key,
                if summary.sort_key_substituted { " (substituted)" } else { "" }
            );
        }
        Commands::Normalize { provider, payload } => {
            let raw = load_payload_file(&payload)?;
            let offers = normalize_payload(&provider, &raw)?;
            let mut out = io::stdout().lock();
            for offer in &offers {
                serde_json::to_writer(&mut out, offer).context("serializing offer")?;
                writeln!(out)?;
            }
            out.flush()?;
            eprintln!("normalized {} offers from {}", offers.len(), payload.display());
        }
        Commands::SearchUrl(args) => {
            let normalizer = normalizer_for_provider(&args.provider)?;
            let request = SearchRequest::from(args);
            let Some(url) = normalizer.search_url(&request) else {
                bail!("origin, destination and depart date are all required");
            };
            println!("{url}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_override_environment_config() {
        let cli = Cli::try_parse_from(["fcs-cli", "run", "--input", "in.json", "--domains", "d.yaml"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        let config = args.apply(PipelineConfig::default());
        assert_eq!(config.input_path, PathBuf::from("in.json"));
        assert_eq!(config.domains_file, Some(PathBuf::from("d.yaml")));
        assert_eq!(config.output_path, None);
    }

    #[test]
    fn search_url_args_become_a_request() {
        let cli = Cli::try_parse_from([
            "fcs-cli",
            "search-url",
            "--provider",
            "kayak",
            "--origin",
            "sfo",
            "--destination",
            "JFK",
            "--depart",
            "2026-05-01",
            "--return",
            "2026-05-08",
        ])
        .unwrap();
        let Some(Commands::SearchUrl(args)) = cli.command else {
            panic!("expected search-url subcommand");
        };
        let request = SearchRequest::from(args);
        assert_eq!(request.adults, 1);
        assert_eq!(request.return_date.as_deref(), Some("2026-05-08"));
        assert!(normalizer_for_provider("kayak").unwrap().search_url(&request).is_some());
    }

    #[test]
    fn no_subcommand_defaults_to_run() {
        assert!(Cli::try_parse_from(["fcs-cli"]).unwrap().command.is_none());
    }
}
