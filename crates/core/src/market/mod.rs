pub mod jitter;
pub mod provider;

use crate::domain::instrument::{IndexRecord, Stock};
use anyhow::Context;

/// Exact, case-sensitive symbol lookup over a catalog slice.
pub fn find_by_symbol<'a>(stocks: &'a [Stock], symbol: &str) -> Option<&'a Stock> {
    stocks.iter().find(|s| s.symbol == symbol)
}

pub fn find_index_by_symbol<'a>(indices: &'a [IndexRecord], symbol: &str) -> Option<&'a IndexRecord> {
    indices.iter().find(|i| i.symbol == symbol)
}

pub fn validate_catalog(stocks: &[Stock], indices: &[IndexRecord]) -> anyhow::Result<()> {
    anyhow::ensure!(!stocks.is_empty(), "stock catalog must be non-empty");
    anyhow::ensure!(!indices.is_empty(), "index catalog must be non-empty");

    for stock in stocks {
        stock
            .validate()
            .with_context(|| format!("invalid catalog entry {}", stock.symbol))?;
    }
    for index in indices {
        index
            .validate()
            .with_context(|| format!("invalid catalog entry {}", index.symbol))?;
    }
    Ok(())
}

fn stock(
    symbol: &str,
    name: &str,
    price: &str,
    change: &str,
    is_up: bool,
    volume: &str,
    market_cap: &str,
    pe_ratio: &str,
    dividend: &str,
    sector: &str,
) -> Stock {
    Stock {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price: price.to_string(),
        change: change.to_string(),
        is_up,
        volume: Some(volume.to_string()),
        market_cap: Some(market_cap.to_string()),
        pe_ratio: Some(pe_ratio.to_string()),
        dividend: Some(dividend.to_string()),
        sector: Some(sector.to_string()),
    }
}

/// The demo trending-stock catalog. Stands in for a market-data feed.
pub fn builtin_stocks() -> Vec<Stock> {
    vec![
        stock(
            "AAPL", "Apple Inc.", "189.84", "+2.45%", true,
            "58.2M", "2.98T", "31.45", "0.92%", "Technology",
        ),
        stock(
            "MSFT", "Microsoft Corp.", "402.56", "+1.87%", true,
            "22.8M", "3.15T", "34.82", "0.74%", "Technology",
        ),
        stock(
            "GOOGL", "Alphabet Inc.", "141.16", "-0.54%", false,
            "14.6M", "1.78T", "27.11", "0%", "Technology",
        ),
        stock(
            "AMZN", "Amazon.com Inc.", "178.22", "+3.12%", true,
            "32.1M", "1.87T", "62.18", "0%", "Consumer Cyclical",
        ),
        stock(
            "META", "Meta Platforms", "459.32", "+0.78%", true,
            "18.7M", "1.16T", "26.43", "0%", "Technology",
        ),
        stock(
            "TSLA", "Tesla Inc.", "218.51", "-1.24%", false,
            "106.3M", "695.2B", "58.92", "0%", "Automotive",
        ),
        stock(
            "NVDA", "NVIDIA Corp.", "829.76", "+4.32%", true,
            "43.8M", "2.04T", "79.16", "0.05%", "Technology",
        ),
        stock(
            "JPM", "JPMorgan Chase", "194.52", "-0.75%", false,
            "8.9M", "559.7B", "11.89", "2.46%", "Financial Services",
        ),
    ]
}

fn index(
    symbol: &str,
    name: &str,
    value: &str,
    change: &str,
    is_up: bool,
    description: &str,
    components: &[&str],
) -> IndexRecord {
    IndexRecord {
        symbol: symbol.to_string(),
        name: name.to_string(),
        value: value.to_string(),
        change: change.to_string(),
        is_up,
        description: description.to_string(),
        components: components.iter().map(|s| s.to_string()).collect(),
    }
}

/// The demo index catalog, with the detail metadata the index page shows.
pub fn builtin_indices() -> Vec<IndexRecord> {
    vec![
        index(
            "SPX",
            "S&P 500",
            "4,781.24",
            "+0.83%",
            true,
            "Tracks the performance of 500 of the largest publicly traded US companies.",
            &["AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "JPM"],
        ),
        index(
            "DJI",
            "Dow 30",
            "38,519.84",
            "+0.55%",
            true,
            "Price-weighted average of 30 blue-chip US industrial and financial companies.",
            &["AAPL", "MSFT", "JPM", "UNH", "GS", "HD"],
        ),
        index(
            "IXIC",
            "Nasdaq",
            "15,361.64",
            "-0.12%",
            false,
            "Market-cap-weighted index of stocks listed on the Nasdaq exchange, heavy in technology.",
            &["AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA"],
        ),
        index(
            "RUT",
            "Russell 2000",
            "2,027.47",
            "+1.54%",
            true,
            "Benchmark for US small-cap equities, covering the 2,000 smallest Russell 3000 members.",
            &["SFIX", "PLUG", "CROX", "FIVN", "AXON"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        validate_catalog(&builtin_stocks(), &builtin_indices()).unwrap();
    }

    #[test]
    fn finds_known_symbol() {
        let stocks = builtin_stocks();
        let apple = find_by_symbol(&stocks, "AAPL").unwrap();
        assert_eq!(apple.name, "Apple Inc.");
        assert_eq!(apple.sector.as_deref(), Some("Technology"));
    }

    #[test]
    fn unknown_symbol_is_not_found() {
        let stocks = builtin_stocks();
        assert!(find_by_symbol(&stocks, "ZZZZ").is_none());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let stocks = builtin_stocks();
        assert!(find_by_symbol(&stocks, "aapl").is_none());
        let indices = builtin_indices();
        assert!(find_index_by_symbol(&indices, "spx").is_none());
    }

    #[test]
    fn index_detail_carries_description_and_components() {
        let indices = builtin_indices();
        let spx = find_index_by_symbol(&indices, "SPX").unwrap();
        assert!(spx.description.contains("500"));
        assert!(spx.components.contains(&"AAPL".to_string()));

        for idx in &indices {
            assert!(!idx.components.is_empty(), "{} has no components", idx.symbol);
        }
    }

    #[test]
    fn catalog_validation_rejects_bad_price() {
        let mut stocks = builtin_stocks();
        stocks[0].price = "not-a-price".to_string();
        assert!(validate_catalog(&stocks, &builtin_indices()).is_err());
    }
}
