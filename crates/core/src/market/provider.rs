use crate::domain::instrument::{IndexRecord, Stock};
use crate::domain::news::NewsItem;
use crate::market::{builtin_indices, builtin_stocks, find_by_symbol, validate_catalog};
use anyhow::Result;
use std::time::Duration;

// Artificial latencies, roughly matching what a thin market-data API shows.
const DEFAULT_INDICES_LATENCY_MS: u64 = 500;
const DEFAULT_STOCKS_LATENCY_MS: u64 = 1000;
const DEFAULT_DETAILS_LATENCY_MS: u64 = 800;
const DEFAULT_NEWS_LATENCY_MS: u64 = 1200;

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_indices(&self) -> Result<Vec<IndexRecord>>;

    async fn fetch_trending_stocks(&self) -> Result<Vec<Stock>>;

    async fn fetch_stock_details(&self, symbol: &str) -> Result<Option<Stock>>;

    async fn fetch_financial_news(&self) -> Result<Vec<NewsItem>>;
}

/// In-memory provider backed by the builtin catalogs. Completions are delayed
/// to model asynchronous I/O; a delayed completion always eventually succeeds
/// (no retry, timeout, or backpressure semantics).
#[derive(Debug, Clone)]
pub struct MockMarketProvider {
    stocks: Vec<Stock>,
    indices: Vec<IndexRecord>,
    news: Vec<NewsItem>,
    indices_latency: Duration,
    stocks_latency: Duration,
    details_latency: Duration,
    news_latency: Duration,
}

impl MockMarketProvider {
    pub fn new() -> Result<Self> {
        let stocks = builtin_stocks();
        let indices = builtin_indices();
        validate_catalog(&stocks, &indices)?;

        Ok(Self {
            stocks,
            indices,
            news: builtin_news(),
            indices_latency: Duration::from_millis(DEFAULT_INDICES_LATENCY_MS),
            stocks_latency: Duration::from_millis(DEFAULT_STOCKS_LATENCY_MS),
            details_latency: Duration::from_millis(DEFAULT_DETAILS_LATENCY_MS),
            news_latency: Duration::from_millis(DEFAULT_NEWS_LATENCY_MS),
        })
    }

    /// Honors MARKET_FETCH_LATENCY_MS as a flat override for every call.
    pub fn from_env() -> Result<Self> {
        let mut out = Self::new()?;
        if let Some(ms) = std::env::var("MARKET_FETCH_LATENCY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            out = out.with_flat_latency(Duration::from_millis(ms));
        }
        Ok(out)
    }

    pub fn with_flat_latency(mut self, latency: Duration) -> Self {
        self.indices_latency = latency;
        self.stocks_latency = latency;
        self.details_latency = latency;
        self.news_latency = latency;
        self
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for MockMarketProvider {
    fn provider_name(&self) -> &'static str {
        "builtin_mock"
    }

    async fn fetch_indices(&self) -> Result<Vec<IndexRecord>> {
        tokio::time::sleep(self.indices_latency).await;
        Ok(self.indices.clone())
    }

    async fn fetch_trending_stocks(&self) -> Result<Vec<Stock>> {
        tokio::time::sleep(self.stocks_latency).await;
        Ok(self.stocks.clone())
    }

    async fn fetch_stock_details(&self, symbol: &str) -> Result<Option<Stock>> {
        tokio::time::sleep(self.details_latency).await;
        Ok(find_by_symbol(&self.stocks, symbol).cloned())
    }

    async fn fetch_financial_news(&self) -> Result<Vec<NewsItem>> {
        tokio::time::sleep(self.news_latency).await;
        Ok(self.news.clone())
    }
}

fn news_item(id: u32, title: &str, source: &str, time_ago: &str, category: &str) -> NewsItem {
    NewsItem {
        id,
        title: title.to_string(),
        source: source.to_string(),
        time_ago: time_ago.to_string(),
        category: category.to_string(),
        url: Some(format!("https://example.com/news/{id}")),
    }
}

/// Static headline feed, newest first by construction (never re-sorted).
pub fn builtin_news() -> Vec<NewsItem> {
    vec![
        news_item(
            1,
            "Fed Signals Rate Cuts Could Begin in September",
            "Financial Times",
            "2 hours ago",
            "Policy",
        ),
        news_item(
            2,
            "Apple Beats Earnings Expectations, Shares Rise 5%",
            "Bloomberg",
            "4 hours ago",
            "Earnings",
        ),
        news_item(
            3,
            "Tech Sector Leads Market Rally Amid Cooling Inflation",
            "CNBC",
            "6 hours ago",
            "Markets",
        ),
        news_item(
            4,
            "Oil Prices Fall as Supply Concerns Ease",
            "Reuters",
            "8 hours ago",
            "Commodities",
        ),
        news_item(
            5,
            "Treasury Yields Drop to Three-Month Low",
            "WSJ",
            "12 hours ago",
            "Bonds",
        ),
        news_item(
            6,
            "European Markets Close Higher Following Positive Economic Data",
            "Bloomberg",
            "14 hours ago",
            "Markets",
        ),
        news_item(
            7,
            "SEC Approves New Rules for Cryptocurrency Trading",
            "Reuters",
            "1 day ago",
            "Regulation",
        ),
    ]
}
