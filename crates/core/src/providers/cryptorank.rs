use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::{redact_query, CoreError};
use crate::models::firm::{status_for, Firm, PortfolioCompany};
use crate::models::investment::{parse_event_date, InvestmentEvent, RawInvestment};
use crate::models::settings::DEFAULT_API_BASE_URL;
use super::traits::FundProvider;

const PROVIDER: &str = "CryptoRank";
const PLACEHOLDER_LOGO: &str = "https://picsum.photos/200";
const DEFAULT_DESCRIPTION: &str = "Investment firm focused on blockchain and crypto projects.";

/// CryptoRank API provider for VC fund profiles.
///
/// - **Requires**: API key, sent as the `key` query parameter.
/// - **Endpoint**: `GET {base}/fund?key=...&limit=...`
///
/// Missing fields are filled with display defaults; investment records are
/// validated and a malformed one fails the whole response.
pub struct CryptoRankProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CryptoRankProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// ── CryptoRank API response types ───────────────────────────────────

#[derive(Deserialize)]
struct FundsResponse {
    #[serde(default)]
    data: Vec<FundEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundEntry {
    name: Option<String>,
    image: Option<Image>,
    description: Option<String>,
    // Sometimes a number, sometimes a string or null; only numbers count.
    aum: Option<serde_json::Value>,
    categories: Option<Vec<String>>,
    links: Option<Links>,
    #[serde(default)]
    investments: Vec<InvestmentEntry>,
    #[serde(default)]
    investment_stages: Vec<String>,
    #[serde(default)]
    portfolio: Vec<PortfolioEntry>,
    status: Option<String>,
    location: Option<String>,
}

#[derive(Deserialize)]
struct Image {
    small: Option<String>,
}

#[derive(Deserialize)]
struct Links {
    website: Option<String>,
}

#[derive(Deserialize)]
struct InvestmentEntry {
    date: Option<String>,
    amount: Option<f64>,
    stage: Option<String>,
    project: Option<ProjectRef>,
}

#[derive(Deserialize)]
struct ProjectRef {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioEntry {
    name: Option<String>,
    image: Option<Image>,
    links: Option<Links>,
    #[serde(default)]
    categories: Vec<String>,
    investment_date: Option<String>,
    stage: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Parse a CryptoRank `/fund` response body into firms.
pub fn parse_funds_response(body: &str) -> Result<Vec<Firm>, CoreError> {
    let resp: FundsResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Failed to parse fund list: {e}"),
    })?;
    resp.data.into_iter().map(to_firm).collect()
}

fn to_firm(fund: FundEntry) -> Result<Firm, CoreError> {
    let name = fund.name.unwrap_or_else(|| "Unnamed Fund".to_string());

    let raw: Vec<RawInvestment> = fund
        .investments
        .into_iter()
        .map(|inv| {
            RawInvestment::new(
                inv.date.unwrap_or_default(),
                inv.amount.unwrap_or(0.0),
                inv.stage.unwrap_or_else(|| "Undisclosed".to_string()),
                inv.project
                    .and_then(|p| p.name)
                    .unwrap_or_else(|| "Unknown Project".to_string()),
            )
        })
        .collect();
    let investments = raw
        .into_iter()
        .map(InvestmentEvent::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| match e {
            CoreError::DataError(msg) => CoreError::DataError(format!("fund '{name}': {msg}")),
            other => other,
        })?;

    let portfolio_companies: Vec<PortfolioCompany> = fund
        .portfolio
        .into_iter()
        .map(|company| PortfolioCompany {
            name: company.name.unwrap_or_else(|| "Unknown Company".to_string()),
            logo: company
                .image
                .and_then(|i| i.small)
                .unwrap_or_else(|| PLACEHOLDER_LOGO.to_string()),
            profile_url: company
                .links
                .and_then(|l| l.website)
                .unwrap_or_else(|| "#".to_string()),
            sectors: company.categories,
            investment_date: company
                .investment_date
                .and_then(|d| parse_event_date(&d).ok()),
            investment_stage: company.stage.unwrap_or_else(|| "Undisclosed".to_string()),
        })
        .collect();

    // Fund-level stages first, then any stage seen in the portfolio.
    let mut investment_stages: Vec<String> = Vec::new();
    for stage in fund
        .investment_stages
        .into_iter()
        .chain(portfolio_companies.iter().map(|c| c.investment_stage.clone()))
    {
        if !stage.is_empty() && !investment_stages.contains(&stage) {
            investment_stages.push(stage);
        }
    }

    let status = fund
        .status
        .unwrap_or_else(|| status_for(investments.len()).to_string());

    Ok(Firm {
        name,
        logo: fund
            .image
            .and_then(|i| i.small)
            .unwrap_or_else(|| PLACEHOLDER_LOGO.to_string()),
        description: fund
            .description
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        aum: fund.aum.and_then(|v| v.as_f64()).unwrap_or(0.0),
        focus: fund
            .categories
            .unwrap_or_else(|| vec!["Crypto".to_string(), "Blockchain".to_string()]),
        website: fund
            .links
            .and_then(|l| l.website)
            .unwrap_or_else(|| "#".to_string()),
        investments,
        investment_stages,
        portfolio_companies,
        status,
        jurisdiction: fund
            .location
            .unwrap_or_else(|| "Unknown Location".to_string()),
    })
}

/// Build an API error from a non-success response, preferring the body's `message`.
fn api_error(status: reqwest::StatusCode, body: &str) -> CoreError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| format!("Failed to fetch data from CryptoRank (HTTP {status})"));
    CoreError::Api {
        provider: PROVIDER.into(),
        message: redact_query(&message),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl FundProvider for CryptoRankProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_funds(&self, limit: usize) -> Result<Vec<Firm>, CoreError> {
        let url = format!("{}/fund", self.base_url);
        let limit = limit.to_string();
        debug!(%url, %limit, "fetching CryptoRank funds");

        let resp = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("limit", limit.as_str())])
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(%status, "CryptoRank request failed");
            return Err(api_error(status, &body));
        }

        parse_funds_response(&body)
    }
}
