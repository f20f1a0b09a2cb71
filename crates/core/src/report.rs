use crate::domain::advisor::{self, Advisor, RiskLevel, TimeHorizon};
use crate::domain::instrument::{IndexRecord, Stock};
use crate::domain::news::NewsItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One allocation row enriched with the long fund name the report shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    pub category: String,
    pub percentage: u8,
    pub ticker: String,
    pub fund_name: String,
}

/// The data side of the detailed report: everything the report page renders,
/// minus the rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPayload {
    pub generated_at: DateTime<Utc>,
    pub risk: String,
    pub time_horizon: String,
    pub title: String,
    pub description: String,
    pub allocation: Vec<ReportLine>,
    pub indices: Vec<IndexRecord>,
    pub stocks: Vec<Stock>,
    pub news: Vec<NewsItem>,
}

pub fn describe_allocation(rec: &crate::domain::advisor::Recommendation) -> Vec<ReportLine> {
    rec.allocation
        .iter()
        .map(|line| ReportLine {
            category: line.category.clone(),
            percentage: line.percentage,
            ticker: line.ticker.clone(),
            fund_name: advisor::ticker_description(&line.ticker).to_string(),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
pub fn build_report(
    advisor: &Advisor,
    risk: RiskLevel,
    horizon: TimeHorizon,
    indices: Vec<IndexRecord>,
    stocks: Vec<Stock>,
    news: Vec<NewsItem>,
    generated_at: DateTime<Utc>,
) -> ReportPayload {
    let rec = advisor.resolve(risk, horizon);
    ReportPayload {
        generated_at,
        risk: risk.label().to_string(),
        time_horizon: horizon.label().to_string(),
        title: rec.title.clone(),
        description: rec.description.clone(),
        allocation: describe_allocation(rec),
        indices,
        stocks,
        news,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{builtin_indices, builtin_stocks};
    use crate::market::provider::builtin_news;
    use chrono::TimeZone;

    #[test]
    fn report_carries_described_allocation() {
        let advisor = Advisor::load().unwrap();
        let generated_at = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();

        let report = build_report(
            &advisor,
            RiskLevel::Moderate,
            TimeHorizon::MediumTerm,
            builtin_indices(),
            builtin_stocks(),
            builtin_news(),
            generated_at,
        );

        assert_eq!(report.generated_at, generated_at);
        assert_eq!(report.risk, "Moderate");
        assert_eq!(report.time_horizon, "Medium-term (3-5 years)");
        assert_eq!(report.title, "Growth-Oriented Balanced Portfolio");
        assert_eq!(report.allocation.len(), 4);
        assert_eq!(report.allocation[0].ticker, "QQQ");
        assert_eq!(report.allocation[0].fund_name, "Invesco QQQ Trust Series 1");
        assert_eq!(report.indices.len(), 4);
        assert_eq!(report.stocks.len(), 8);
        assert_eq!(report.news.len(), 7);
    }

    #[test]
    fn report_serializes_to_json() {
        let advisor = Advisor::load().unwrap();
        let report = build_report(
            &advisor,
            RiskLevel::Low,
            TimeHorizon::ShortTerm,
            vec![],
            vec![],
            vec![],
            Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap(),
        );

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["title"], "Conservative Income Portfolio");
        assert_eq!(v["allocation"][0]["percentage"], 40);
        assert_eq!(
            v["allocation"][0]["fund_name"],
            "Vanguard Intermediate-Term Treasury ETF"
        );
    }
}
