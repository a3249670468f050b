use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moversdigest_core::config::Settings;
use moversdigest_core::domain::run::{Cadence, Direction, RunProfile};
use moversdigest_core::llm::groq::GroqClient;
use moversdigest_core::pipeline::{self, PipelineOptions};
use moversdigest_core::publish::wordpress::WordPressClient;
use moversdigest_core::publish::{ContentPublisher, PublishRecord};
use moversdigest_core::scrape;
use moversdigest_core::scrape::movers::RediffMoversClient;
use moversdigest_core::scrape::stockedge::StockEdgeClient;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    Gainers,
    Losers,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Gainers => Direction::Gainer,
            DirectionArg::Losers => Direction::Loser,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CadenceArg {
    Daily,
    Monthly,
}

impl From<CadenceArg> for Cadence {
    fn from(arg: CadenceArg) -> Self {
        match arg {
            CadenceArg::Daily => Cadence::Daily,
            CadenceArg::Monthly => Cadence::Monthly,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "moversdigest_worker")]
struct Args {
    /// Which side of the movers board to process.
    #[arg(long, value_enum, default_value_t = DirectionArg::Gainers)]
    direction: DirectionArg,

    /// Listing cadence; also selects the default change threshold.
    #[arg(long, value_enum, default_value_t = CadenceArg::Daily)]
    cadence: CadenceArg,

    /// Override the minimum absolute change-percent threshold.
    #[arg(long)]
    min_change: Option<f64>,

    /// Skip the publish-endpoint preflight check.
    #[arg(long)]
    skip_preflight: bool,

    /// Do everything except posting to the content endpoint.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&settings, &args).await {
        sentry_anyhow::capture_anyhow(&err);
        return Err(err);
    }
    Ok(())
}

async fn run(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    let mut profile = RunProfile::new(args.direction.into(), args.cadence.into());
    if let Some(min_change) = args.min_change {
        profile = profile.with_min_change_percent(min_change);
    }

    // Required configuration is checked up front, before any network call.
    let wordpress = WordPressClient::from_settings(settings)?;
    let groq = GroqClient::from_settings(settings)?;

    let http = scrape::build_http_client()?;
    let movers = RediffMoversClient::new(http.clone());
    let stockedge = StockEdgeClient::new(http)?;

    if args.skip_preflight {
        tracing::warn!("publish endpoint preflight skipped");
    } else {
        wordpress.preflight().await?;
    }

    let publisher: Box<dyn ContentPublisher> = if args.dry_run {
        Box::new(DryRunPublisher)
    } else {
        Box::new(wordpress)
    };

    let report = pipeline::run(
        &movers,
        &stockedge,
        &groq,
        publisher.as_ref(),
        &profile,
        &PipelineOptions::default(),
    )
    .await?;

    tracing::info!(
        tag = %profile.tag(),
        processed = report.processed,
        published = report.published,
        skipped = report.skipped,
        "worker finished"
    );
    Ok(())
}

/// Logs the payload that would have been posted.
struct DryRunPublisher;

#[async_trait::async_trait]
impl ContentPublisher for DryRunPublisher {
    async fn publish(
        &self,
        record: &PublishRecord,
    ) -> anyhow::Result<Option<serde_json::Value>> {
        let payload = serde_json::to_value(record)?;
        tracing::info!(payload = %payload, "dry run: skipping POST");
        Ok(Some(payload))
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
