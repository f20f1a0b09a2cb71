use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use savvystock_core::domain::advisor::{Advisor, RiskLevel, TimeHorizon};
use savvystock_core::market::jitter::{
    jitter_index, jitter_stock, RandomSource, SeededRandom, ThreadRandom,
};
use savvystock_core::market::provider::{MarketDataProvider, MockMarketProvider};
use savvystock_core::report;

#[derive(Debug, Parser)]
#[command(name = "savvystock_cli")]
struct Args {
    /// Risk tolerance: Low, Moderate or High.
    #[arg(long, default_value = "Moderate")]
    risk: String,

    /// Time horizon: short-term, medium-term or long-term.
    #[arg(long, default_value = "medium-term")]
    horizon: String,

    /// Simulated market ticks to apply before snapshotting.
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Seed for the jitter source; omit for ambient entropy.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    out: Option<std::path::PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Do everything except writing the report.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = savvystock_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let risk: RiskLevel = args
        .risk
        .parse()
        .with_context(|| format!("--risk {:?}", args.risk))?;
    let horizon: TimeHorizon = args
        .horizon
        .parse()
        .with_context(|| format!("--horizon {:?}", args.horizon))?;

    let advisor = Advisor::load()?;
    let provider = MockMarketProvider::from_env()?;

    let mut indices = provider.fetch_indices().await?;
    let mut stocks = provider.fetch_trending_stocks().await?;
    let news = provider.fetch_financial_news().await?;

    let mut rng: Box<dyn RandomSource> = match args.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    };

    for tick in 0..args.ticks {
        for index in indices.iter_mut() {
            *index = jitter_index(index, rng.as_mut())
                .with_context(|| format!("tick {tick} failed for {}", index.symbol))?;
        }
        for stock in stocks.iter_mut() {
            *stock = jitter_stock(stock, rng.as_mut())
                .with_context(|| format!("tick {tick} failed for {}", stock.symbol))?;
        }
    }

    let payload = report::build_report(
        &advisor,
        risk,
        horizon,
        indices,
        stocks,
        news,
        chrono::Utc::now(),
    );

    if args.dry_run {
        tracing::info!(
            %risk,
            %horizon,
            ticks = args.ticks,
            allocation_lines = payload.allocation.len(),
            title = %payload.title,
            dry_run = true,
            "report generated (not written)"
        );
        return Ok(());
    }

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        serde_json::to_string(&payload)?
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("write report to {path:?} failed"))?;
            tracing::info!(?path, title = %payload.title, "report written");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn init_sentry(settings: &savvystock_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
