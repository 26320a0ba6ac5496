use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::firm::{status_for, Firm};
use crate::models::investment::InvestmentEvent;
use super::traits::FundProvider;

/// Built-in illustrative firms, used when no API key is configured.
///
/// Each firm carries a handful of sparse investment events so the series
/// pipeline has something to synthesize growth from offline.
pub struct SampleFundProvider;

impl SampleFundProvider {
    pub fn new() -> Self {
        Self
    }

    /// All sample firms, in display order.
    pub fn firms() -> Result<Vec<Firm>, CoreError> {
        Ok(vec![
            sample_firm(
                "Andreessen Horowitz",
                "https://picsum.photos/200",
                "Pioneering venture fund focused on technology companies across all stages.",
                35e9,
                &["Web3", "DeFi", "Infrastructure"],
                "https://a16z.com",
                vec![
                    event((2021, 3, 10), 7_000_000.0, "Seed", "Phantom")?,
                    event((2022, 1, 31), 109_000_000.0, "Series B", "Phantom")?,
                    event((2021, 6, 2), 25_000_000.0, "Series A", "Aptos")?,
                    event((2022, 7, 25), 150_000_000.0, "Series A", "Aptos")?,
                    event((2022, 7, 25), 50_000_000.0, "Series A", "Aptos")?,
                ],
            ),
            sample_firm(
                "Paradigm",
                "https://picsum.photos/201",
                "Investment firm focused on supporting crypto/Web3 entrepreneurs.",
                15e9,
                &["DeFi", "NFTs", "Gaming"],
                "https://paradigm.xyz",
                vec![
                    event((2020, 11, 4), 4_000_000.0, "Seed", "Blur")?,
                    event((2022, 3, 15), 11_000_000.0, "Series A", "Blur")?,
                    event((2021, 9, 20), 20_000_000.0, "Series A", "Optimism")?,
                ],
            ),
            sample_firm(
                "Polychain Capital",
                "https://picsum.photos/202",
                "Leading cryptocurrency investment firm.",
                4e9,
                &["Crypto", "DeFi", "Layer 1"],
                "https://polychain.capital",
                vec![
                    event((2019, 5, 1), 3_000_000.0, "Seed", "Celestia")?,
                    event((2022, 10, 19), 55_000_000.0, "Series A", "Celestia")?,
                    event((2021, 2, 14), 8_500_000.0, "Seed", "Berachain")?,
                ],
            ),
        ])
    }
}

impl Default for SampleFundProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn event(
    (y, m, d): (i32, u32, u32),
    amount: f64,
    round: &str,
    project: &str,
) -> Result<InvestmentEvent, CoreError> {
    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| CoreError::DataError(format!("invalid sample date {y}-{m}-{d}")))?;
    InvestmentEvent::new(date, amount, round, project)
}

fn sample_firm(
    name: &str,
    logo: &str,
    description: &str,
    aum: f64,
    focus: &[&str],
    website: &str,
    investments: Vec<InvestmentEvent>,
) -> Firm {
    let mut stages: Vec<String> = Vec::new();
    for inv in &investments {
        if !stages.contains(&inv.round) {
            stages.push(inv.round.clone());
        }
    }
    Firm {
        name: name.to_string(),
        logo: logo.to_string(),
        description: description.to_string(),
        aum,
        focus: focus.iter().map(|s| s.to_string()).collect(),
        website: website.to_string(),
        status: status_for(investments.len()).to_string(),
        investments,
        investment_stages: stages,
        portfolio_companies: Vec::new(),
        jurisdiction: "United States".to_string(),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl FundProvider for SampleFundProvider {
    fn name(&self) -> &str {
        "Sample data"
    }

    async fn fetch_funds(&self, limit: usize) -> Result<Vec<Firm>, CoreError> {
        Ok(Self::firms()?.into_iter().take(limit).collect())
    }
}
