use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High];

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            other => bail!("unknown risk level: {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeHorizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeHorizon {
    pub const ALL: [TimeHorizon; 3] = [
        TimeHorizon::ShortTerm,
        TimeHorizon::MediumTerm,
        TimeHorizon::LongTerm,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeHorizon::ShortTerm => "Short-term (1-2 years)",
            TimeHorizon::MediumTerm => "Medium-term (3-5 years)",
            TimeHorizon::LongTerm => "Long-term (5+ years)",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TimeHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeHorizon {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        // Accept both the display label and a short machine form.
        match s.trim() {
            "Short-term (1-2 years)" => return Ok(TimeHorizon::ShortTerm),
            "Medium-term (3-5 years)" => return Ok(TimeHorizon::MediumTerm),
            "Long-term (5+ years)" => return Ok(TimeHorizon::LongTerm),
            _ => {}
        }
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "short-term" | "short" => Ok(TimeHorizon::ShortTerm),
            "medium-term" | "medium" => Ok(TimeHorizon::MediumTerm),
            "long-term" | "long" => Ok(TimeHorizon::LongTerm),
            other => bail!("unknown time horizon: {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationLine {
    pub category: String,
    pub percentage: u8,
    pub ticker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub allocation: Vec<AllocationLine>,
}

impl Recommendation {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.title.trim().is_empty(), "title must be non-empty");
        ensure!(
            !self.description.trim().is_empty(),
            "description must be non-empty"
        );
        ensure!(!self.allocation.is_empty(), "allocation must be non-empty");

        for line in &self.allocation {
            ensure!(
                !line.category.trim().is_empty(),
                "allocation category must be non-empty"
            );
            ensure!(
                !line.ticker.trim().is_empty(),
                "allocation ticker must be non-empty"
            );
            ensure!(
                line.percentage <= 100,
                "allocation percentage out of range for {}: {}",
                line.ticker,
                line.percentage
            );
        }

        let total: u32 = self.allocation.iter().map(|l| l.percentage as u32).sum();
        ensure!(
            total == 100,
            "allocation percentages must sum to 100 (got {total})"
        );

        Ok(())
    }
}

/// The static advisory table: one portfolio per (risk, horizon) pair.
/// Lookup is total over the 3x3 domain once `load` has validated the table.
#[derive(Debug, Clone)]
pub struct Advisor {
    table: [[Recommendation; 3]; 3],
}

impl Advisor {
    pub fn load() -> anyhow::Result<Self> {
        let table = [
            [
                checked(RiskLevel::Low, TimeHorizon::ShortTerm)?,
                checked(RiskLevel::Low, TimeHorizon::MediumTerm)?,
                checked(RiskLevel::Low, TimeHorizon::LongTerm)?,
            ],
            [
                checked(RiskLevel::Moderate, TimeHorizon::ShortTerm)?,
                checked(RiskLevel::Moderate, TimeHorizon::MediumTerm)?,
                checked(RiskLevel::Moderate, TimeHorizon::LongTerm)?,
            ],
            [
                checked(RiskLevel::High, TimeHorizon::ShortTerm)?,
                checked(RiskLevel::High, TimeHorizon::MediumTerm)?,
                checked(RiskLevel::High, TimeHorizon::LongTerm)?,
            ],
        ];
        Ok(Self { table })
    }

    pub fn resolve(&self, risk: RiskLevel, horizon: TimeHorizon) -> &Recommendation {
        &self.table[risk.index()][horizon.index()]
    }
}

fn checked(risk: RiskLevel, horizon: TimeHorizon) -> anyhow::Result<Recommendation> {
    let rec = builtin_portfolio(risk, horizon);
    rec.validate()
        .with_context(|| format!("invalid builtin portfolio for {risk} / {horizon}"))?;
    Ok(rec)
}

fn portfolio(title: &str, description: &str, allocation: &[(&str, u8, &str)]) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        description: description.to_string(),
        allocation: allocation
            .iter()
            .map(|(category, percentage, ticker)| AllocationLine {
                category: category.to_string(),
                percentage: *percentage,
                ticker: ticker.to_string(),
            })
            .collect(),
    }
}

fn builtin_portfolio(risk: RiskLevel, horizon: TimeHorizon) -> Recommendation {
    use RiskLevel::*;
    use TimeHorizon::*;

    match (risk, horizon) {
        (Low, ShortTerm) => portfolio(
            "Conservative Income Portfolio",
            "Focus on capital preservation with stable income generation.",
            &[
                ("US Treasury Bonds", 40, "VGIT"),
                ("Investment Grade Corporate Bonds", 30, "LQD"),
                ("Blue-Chip Dividend Stocks", 20, "VYM"),
                ("Cash & Short-Term Instruments", 10, "SHV"),
            ],
        ),
        (Low, MediumTerm) => portfolio(
            "Conservative Growth & Income",
            "Balanced approach with focus on quality dividend stocks and bonds.",
            &[
                ("Quality Dividend Stocks", 35, "SCHD"),
                ("Investment Grade Bonds", 35, "AGG"),
                ("International Developed Markets", 15, "VEA"),
                ("REITs", 15, "VNQ"),
            ],
        ),
        (Low, LongTerm) => portfolio(
            "Conservative Long-Term Growth",
            "Diversified portfolio with tilt toward quality equities.",
            &[
                ("Quality Large-Cap Stocks", 40, "QUAL"),
                ("Total Bond Market", 30, "BND"),
                ("International Equities", 20, "VXUS"),
                ("REITs & Infrastructure", 10, "IFRA"),
            ],
        ),
        (Moderate, ShortTerm) => portfolio(
            "Balanced Income Strategy",
            "Equal emphasis on current income and moderate capital appreciation.",
            &[
                ("Dividend Stocks", 40, "HDV"),
                ("Corporate Bonds", 25, "VCIT"),
                ("Preferred Stocks", 20, "PFF"),
                ("High-Yield Bonds", 15, "HYG"),
            ],
        ),
        (Moderate, MediumTerm) => portfolio(
            "Growth-Oriented Balanced Portfolio",
            "Emphasis on growth with moderate risk exposure.",
            &[
                ("US Large-Cap Growth", 35, "QQQ"),
                ("US Value Stocks", 20, "VTV"),
                ("International Equities", 25, "EFA"),
                ("Total Bond Market", 20, "BND"),
            ],
        ),
        (Moderate, LongTerm) => portfolio(
            "Global Growth Portfolio",
            "Diversified equity exposure across regions and sectors.",
            &[
                ("US Total Market", 40, "VTI"),
                ("International Developed", 25, "EFA"),
                ("Emerging Markets", 15, "VWO"),
                ("Bond Allocation", 20, "AGG"),
            ],
        ),
        (High, ShortTerm) => portfolio(
            "Opportunistic Sector Strategy",
            "Focus on cyclical sectors with potential for rapid appreciation.",
            &[
                ("Technology Sector", 30, "XLK"),
                ("Consumer Discretionary", 25, "XLY"),
                ("Industrials", 25, "XLI"),
                ("Small-Cap Growth", 20, "IJT"),
            ],
        ),
        (High, MediumTerm) => portfolio(
            "Aggressive Growth Portfolio",
            "Seeks maximum capital appreciation with higher volatility.",
            &[
                ("Tech & Innovation", 40, "VGT"),
                ("Small-Cap Growth", 25, "VBK"),
                ("Emerging Markets", 25, "IEMG"),
                ("High-Yield Bonds", 10, "JNK"),
            ],
        ),
        (High, LongTerm) => portfolio(
            "Maximum Growth Strategy",
            "Seeks aggressive growth through global equity exposure.",
            &[
                ("US Growth Stocks", 40, "VUG"),
                ("Emerging Markets", 25, "VWO"),
                ("Small-Cap Stocks", 25, "VB"),
                ("Sector Rotation", 10, "RYT"),
            ],
        ),
    }
}

/// Long fund name for an allocation ticker, used by the detailed report.
pub fn ticker_description(ticker: &str) -> &'static str {
    match ticker {
        "VGIT" => "Vanguard Intermediate-Term Treasury ETF",
        "LQD" => "iShares iBoxx $ Investment Grade Corporate Bond ETF",
        "VYM" => "Vanguard High Dividend Yield ETF",
        "SHV" => "iShares Short Treasury Bond ETF",
        "SCHD" => "Schwab US Dividend Equity ETF",
        "AGG" => "iShares Core U.S. Aggregate Bond ETF",
        "VEA" => "Vanguard FTSE Developed Markets ETF",
        "VNQ" => "Vanguard Real Estate ETF",
        "QUAL" => "iShares MSCI USA Quality Factor ETF",
        "BND" => "Vanguard Total Bond Market ETF",
        "VXUS" => "Vanguard Total International Stock ETF",
        "IFRA" => "iShares U.S. Infrastructure ETF",
        "HDV" => "iShares Core High Dividend ETF",
        "VCIT" => "Vanguard Intermediate-Term Corporate Bond ETF",
        "PFF" => "iShares Preferred & Income Securities ETF",
        "HYG" => "iShares iBoxx $ High Yield Corporate Bond ETF",
        "QQQ" => "Invesco QQQ Trust Series 1",
        "VTV" => "Vanguard Value ETF",
        "EFA" => "iShares MSCI EAFE ETF",
        "VTI" => "Vanguard Total Stock Market ETF",
        "VWO" => "Vanguard FTSE Emerging Markets ETF",
        "XLK" => "Technology Select Sector SPDR Fund",
        "XLY" => "Consumer Discretionary Select Sector SPDR Fund",
        "XLI" => "Industrial Select Sector SPDR Fund",
        "IJT" => "iShares S&P Small-Cap 600 Growth ETF",
        "VGT" => "Vanguard Information Technology ETF",
        "VBK" => "Vanguard Small-Cap Growth ETF",
        "IEMG" => "iShares Core MSCI Emerging Markets ETF",
        "JNK" => "SPDR Bloomberg High Yield Bond ETF",
        "VUG" => "Vanguard Growth ETF",
        "VB" => "Vanguard Small-Cap ETF",
        "RYT" => "Invesco S&P 500 Equal Weight Technology ETF",
        _ => "Exchange-Traded Fund",
    }
}
