use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use contractor_vetting::config::log_filter;
use contractor_vetting::io::load_page_text;
use contractor_vetting::llm::SummarizerConfig;
use contractor_vetting::matcher::{match_listing_block, score_listing_blocks, ExpectedIdentity};
use contractor_vetting::{
    load_requests_file, write_json, AnthropicConfig, Collaborators, DiscoveryJobRequest,
    FirecrawlConnector, HumanReport, JobRegistry, JobStatus, LlmSummarizer, VettingConfig,
    VettingPipeline,
};

#[derive(Parser)]
#[command(name = "contractor-vetting")]
#[command(author, version, about = "Contractor discovery and vetting pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover contractors for a service and vet the selected one
    Run {
        /// Service type to search for (e.g. "roofing")
        #[arg(long)]
        service_type: String,

        /// Zip code to search in
        #[arg(long)]
        zip: String,

        /// Number of listing candidates to keep
        #[arg(long, default_value = "5")]
        target: i64,

        /// Index of the candidate to vet
        #[arg(long, default_value = "0")]
        index: usize,

        /// Contractor name to use when no candidate is found
        #[arg(long)]
        name: Option<String>,

        /// Website to use when the selected candidate has none
        #[arg(long)]
        website: Option<String>,

        /// Output file for the report (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the human-readable report (text)
        #[arg(long)]
        human: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run every request in a file concurrently
    Batch {
        /// Requests file (one JSON request or a list)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for one result file per job
        #[arg(long)]
        output_dir: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show how a scraped maps page scores against a contractor identity
    Match {
        /// Scraped page text (markdown)
        #[arg(short, long)]
        input: PathBuf,

        /// Expected business name
        #[arg(long)]
        name: String,

        /// Expected phone number
        #[arg(long)]
        phone: Option<String>,

        /// Expected street address
        #[arg(long)]
        address: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            service_type,
            zip,
            target,
            index,
            name,
            website,
            output,
            human,
            verbose,
        } => {
            setup_logging(verbose);
            let request = DiscoveryJobRequest {
                service_type,
                zip_code: zip,
                target_contractor_count: target,
                selected_contractor_index: index,
                contractor_name: name,
                contractor_website: website,
            };
            run_single(request, output, human).await
        }
        Commands::Batch {
            input,
            output_dir,
            verbose,
        } => {
            setup_logging(verbose);
            run_batch(input, output_dir).await
        }
        Commands::Match {
            input,
            name,
            phone,
            address,
            verbose,
        } => {
            setup_logging(verbose);
            inspect_match(input, name, phone, address)
        }
    }
}

fn setup_logging(verbose: bool) {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_filter(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}

fn build_pipeline() -> Result<VettingPipeline> {
    let config = VettingConfig::from_env().context("Failed to load configuration")?;

    let connector =
        FirecrawlConnector::new(&config.firecrawl).context("Failed to build Firecrawl client")?;
    let summarizer = LlmSummarizer::from_config(
        AnthropicConfig::from_summary_config(&config.summary),
        SummarizerConfig::default(),
    );
    if !summarizer.is_configured() {
        warn!("ANTHROPIC_API_KEY not set; review summaries will be Unknown");
    }

    let collaborators = Collaborators::from_connector(Arc::new(connector), Arc::new(summarizer));
    Ok(VettingPipeline::new(collaborators, config.pipeline))
}

async fn run_single(
    request: DiscoveryJobRequest,
    output: Option<PathBuf>,
    human: Option<PathBuf>,
) -> Result<()> {
    let state = request.validate().context("Invalid discovery request")?;
    let pipeline = build_pipeline()?;

    let state = pipeline.run(state).await;

    for flag in &state.flags {
        warn!("{}", flag);
    }

    let Some(report) = state.report else {
        bail!("No report produced: {}", state.flags.join(" "));
    };

    match output {
        Some(path) => {
            write_json(&report, &path)?;
            info!("Report written to {:?}", path);
        }
        None => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }

    if let Some(path) = human {
        HumanReport::new(&report).write_file(&path)?;
        info!("Human-readable report written to {:?}", path);
    }

    Ok(())
}

async fn run_batch(input: PathBuf, output_dir: PathBuf) -> Result<()> {
    info!("Loading requests from {:?}", input);
    let requests = load_requests_file(&input).context("Failed to load requests")?;
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create directory: {:?}", output_dir))?;

    let registry = JobRegistry::new(build_pipeline()?);

    let mut job_ids = Vec::with_capacity(requests.len());
    for (i, request) in requests.into_iter().enumerate() {
        match registry.submit(request).await {
            Ok(job_id) => job_ids.push(job_id),
            Err(e) => warn!(request = i, error = %e, "Skipping invalid request"),
        }
    }
    info!("Submitted {} jobs", job_ids.len());

    let mut failed = 0;
    for job_id in job_ids {
        let Some(record) = registry.wait(job_id).await else {
            continue;
        };
        if record.status != JobStatus::Completed {
            failed += 1;
        }
        let path = output_dir.join(format!("{}.json", job_id));
        write_json(&record, &path)?;
        info!(job_id = %job_id, status = ?record.status, "Job result written to {:?}", path);
    }

    info!("Batch complete: {} failed", failed);
    Ok(())
}

fn inspect_match(
    input: PathBuf,
    name: String,
    phone: Option<String>,
    address: Option<String>,
) -> Result<()> {
    let page = load_page_text(&input)?;
    let identity = ExpectedIdentity {
        name: &name,
        phone: phone.as_deref(),
        address: address.as_deref(),
    };

    let blocks = score_listing_blocks(&page, &identity);

    println!("Listing Blocks");
    println!("==============");
    println!("Found {} listing blocks", blocks.len());
    println!();

    for block in &blocks {
        println!("Line {}: score {}", block.start_line + 1, block.score);
        if let Some(first) = block.text.lines().next() {
            println!("  {}", first.trim());
        }
    }

    let best = match_listing_block(&page, &name, phone.as_deref(), address.as_deref());

    println!();
    if best.is_empty() {
        println!("No confident match");
    } else {
        println!("Best match:");
        println!("{}", best);
    }

    Ok(())
}
