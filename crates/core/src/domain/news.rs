use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: u32,
    pub title: String,
    pub source: String,
    pub time_ago: String,
    pub category: String,
    pub url: Option<String>,
}

/// Badge color class for a news category. Unmapped categories (e.g.
/// "Regulation") fall back to the neutral badge.
pub fn category_color(category: &str) -> &'static str {
    match category {
        "Policy" => "bg-blue-600",
        "Earnings" => "bg-green-600",
        "Markets" => "bg-purple-600",
        "Commodities" => "bg-yellow-600",
        "Bonds" => "bg-orange-600",
        _ => "bg-slate-600",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_categories() {
        assert_eq!(category_color("Policy"), "bg-blue-600");
        assert_eq!(category_color("Earnings"), "bg-green-600");
        assert_eq!(category_color("Markets"), "bg-purple-600");
        assert_eq!(category_color("Commodities"), "bg-yellow-600");
        assert_eq!(category_color("Bonds"), "bg-orange-600");
    }

    #[test]
    fn unmapped_categories_use_default() {
        assert_eq!(category_color("Regulation"), "bg-slate-600");
        assert_eq!(category_color(""), "bg-slate-600");
        assert_eq!(category_color("Crypto"), "bg-slate-600");
    }
}
