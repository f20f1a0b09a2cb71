use anyhow::ensure;
use serde::{Deserialize, Serialize};

/// A tradable symbol tracked with its current displayed price and trend.
/// Price and change are kept as display strings ("189.84", "+2.45%"), the
/// form the dashboard renders and the jitter model rewrites on every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change: String,
    pub is_up: bool,
    pub volume: Option<String>,
    pub market_cap: Option<String>,
    pub pe_ratio: Option<String>,
    pub dividend: Option<String>,
    pub sector: Option<String>,
}

/// A market index. `value` keeps its thousands separators ("4,781.24").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub symbol: String,
    pub name: String,
    pub value: String,
    pub change: String,
    pub is_up: bool,
    pub description: String,
    pub components: Vec<String>,
}

impl Stock {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.symbol.trim().is_empty(), "symbol must be non-empty");
        ensure!(!self.name.trim().is_empty(), "name must be non-empty");
        let price = crate::market::jitter::parse_decimal(&self.price)?;
        ensure!(
            price >= 0.0,
            "price must be non-negative for {} (got {})",
            self.symbol,
            self.price
        );
        Ok(())
    }
}

impl IndexRecord {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.symbol.trim().is_empty(), "symbol must be non-empty");
        ensure!(!self.name.trim().is_empty(), "name must be non-empty");
        ensure!(
            !self.description.trim().is_empty(),
            "description must be non-empty for {}",
            self.symbol
        );
        ensure!(
            !self.components.is_empty(),
            "components must be non-empty for {}",
            self.symbol
        );
        let value = crate::market::jitter::parse_decimal(&self.value)?;
        ensure!(
            value >= 0.0,
            "value must be non-negative for {} (got {})",
            self.symbol,
            self.value
        );
        Ok(())
    }
}
