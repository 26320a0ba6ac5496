use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::investment::InvestmentEvent;

/// A venture-capital firm and its Web3 investment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firm {
    pub name: String,

    /// Logo image URL
    pub logo: String,

    pub description: String,

    /// Assets under management in USD (0 when unknown)
    pub aum: f64,

    /// Focus tags ("DeFi", "Gaming", ...)
    pub focus: Vec<String>,

    pub website: String,

    /// Discrete funding events: the input of the series builder
    pub investments: Vec<InvestmentEvent>,

    /// Stages the firm invests at ("Seed", "Series A", ...)
    #[serde(default)]
    pub investment_stages: Vec<String>,

    #[serde(default)]
    pub portfolio_companies: Vec<PortfolioCompany>,

    /// "Active Investor" / "Inactive" unless the data source says otherwise
    pub status: String,

    pub jurisdiction: String,
}

impl Firm {
    /// AUM scaled for display: `$35.0B`, `$450.0M`, `$800.0K`.
    pub fn formatted_aum(&self) -> String {
        format_aum(self.aum)
    }

    pub fn investment_count(&self) -> usize {
        self.investments.len()
    }

    /// Distinct project names across all investments, sorted.
    pub fn projects(&self) -> Vec<String> {
        self.investments
            .iter()
            .map(|i| i.project.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sum of all investment amounts.
    pub fn total_invested(&self) -> f64 {
        self.investments.iter().map(|i| i.amount).sum()
    }

    /// Case-insensitive substring match on the name or any focus tag.
    /// An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.focus.iter().any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// A company in the firm's portfolio, as listed by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioCompany {
    pub name: String,
    pub logo: String,
    pub profile_url: String,
    pub sectors: Vec<String>,
    pub investment_date: Option<NaiveDate>,
    pub investment_stage: String,
}

/// Default status label derived from whether the firm has any investments.
pub fn status_for(investment_count: usize) -> &'static str {
    if investment_count > 0 {
        "Active Investor"
    } else {
        "Inactive"
    }
}

/// Scale a USD amount to B / M / K with one decimal.
pub fn format_aum(value: f64) -> String {
    if value >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else {
        format!("${:.1}K", value / 1e3)
    }
}
