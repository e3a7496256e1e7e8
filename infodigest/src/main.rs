/*
infodigest - single-binary main.rs
Collects today's EAV railway infomobility notices, summarizes them and delivers
the digest, once or at the configured times of day.
*/

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use common::{Config, LlmConfig, ENV_MAX_PAGES, ENV_REFERENCE_DAY};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use infodigest::delivery::{create_delivery, Delivery, StdoutDelivery};
use infodigest::fetcher::{HttpFetcher, PageFetcher};
use infodigest::llm::remote::RemoteLlmProvider;
use infodigest::llm::LlmProvider;
use infodigest::pipeline::Pipeline;
use infodigest::scheduler::Schedule;

#[derive(Parser, Debug)]
#[command(name = "infodigest", about = "Daily digest of EAV railway infomobility notices")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Day treated as "today" (YYYY-MM-DD)
    #[arg(long, env = ENV_REFERENCE_DAY, value_name = "DATE")]
    reference_day: Option<NaiveDate>,

    /// Maximum number of listing pages to scan
    #[arg(long, env = ENV_MAX_PAGES)]
    max_pages: Option<u32>,

    /// Deliver the notices verbatim instead of an LLM summary
    #[arg(long)]
    raw: bool,

    /// Print the message instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Print the collected notices as JSON and exit
    #[arg(long)]
    json: bool,

    /// Keep running and start a digest at every scheduled time
    #[arg(long, conflicts_with = "json")]
    daemon: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap's env fallbacks see it
    dotenv::dotenv().ok();

    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = load_config(&args).await?;

    let fetcher: Arc<dyn PageFetcher> =
        Arc::new(HttpFetcher::from_config(&config.source).context("failed to build HTTP client")?);

    if args.json {
        let pipeline = Pipeline::new(config, fetcher, None, Arc::new(StdoutDelivery));
        let batch = pipeline.collect(pipeline.reference_day()).await?;
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    let summarizer = if args.raw {
        info!("raw mode: notices will be delivered verbatim");
        None
    } else {
        create_llm_provider(&config.llm)?
    };

    let delivery: Arc<dyn Delivery> = if args.dry_run {
        info!("dry run: message goes to stdout");
        Arc::new(StdoutDelivery)
    } else {
        Arc::from(create_delivery(&config.delivery).context("failed to set up delivery")?)
    };

    let schedule = Schedule::parse(&config.scheduler.times).context("invalid scheduler.times")?;
    let pinned_day = config.reference_day.is_some();
    let pipeline = Pipeline::new(config, fetcher, summarizer, delivery);

    if !args.daemon {
        return match pipeline.run().await {
            Some(_) => Ok(()),
            None => anyhow::bail!("digest run aborted"),
        };
    }

    if pinned_day {
        warn!("reference day is pinned; every scheduled run reports the same day");
    }
    info!(times = ?schedule.times(), "scheduler started");

    loop {
        let now = Local::now().naive_local();
        let next = schedule.next_after(now);
        info!(%next, "waiting for next run");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received, stopping scheduler");
                break;
            }
            _ = tokio::time::sleep(schedule.wait_from(now)) => {
                // runs inline: the next wait starts only after this one ends
                pipeline.run().await;
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Files, then environment, then command-line flags.
async fn load_config(args: &Args) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = &args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p.clone())
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let mut config = match Config::load_with_defaults(
        if default_path.exists() { Some(default_path.as_path()) } else { None },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    config.apply_env_overrides()?;

    if let Some(day) = args.reference_day {
        config.reference_day = Some(day);
    }
    if let Some(pages) = args.max_pages {
        config.source.max_pages = pages;
    }

    info!(
        default_file = ?default_path,
        override_file = ?override_path,
        max_pages = config.source.max_pages,
        reference_day = ?config.reference_day,
        "configuration loaded"
    );
    Ok(config)
}

/// Create the summarizer named by `llm.adapter`; `None` means verbatim delivery.
fn create_llm_provider(llm_config: &LlmConfig) -> Result<Option<Arc<dyn LlmProvider>>> {
    match llm_config.adapter.as_str() {
        "remote" => {
            let provider = RemoteLlmProvider::from_config(llm_config)
                .context("failed to initialize the remote LLM provider")?;
            info!(model = %llm_config.model, "LLM provider initialized");
            let provider: Arc<dyn LlmProvider> = Arc::new(provider);
            Ok(Some(provider))
        }
        "none" => {
            info!("LLM adapter 'none': notices will be delivered verbatim");
            Ok(None)
        }
        other => anyhow::bail!("Unknown LLM adapter type: {}", other),
    }
}
