pub mod clock;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use clock::{Clock, SystemClock};
use models::{
    chart::{InvestmentChart, SeriesSet},
    firm::Firm,
    investment::InvestmentEvent,
    selection::Selection,
    settings::Settings,
};
use providers::{cryptorank::CryptoRankProvider, sample::SampleFundProvider, traits::FundProvider};
use services::{
    cache::ChartCache, chart_service::ChartService, firm_service::FirmService,
    series_service::SeriesBuilder,
};
use std::collections::HashMap;
use std::sync::Arc;
use storage::credentials::{CredentialStore, MemoryCredentialStore};
use tracing::{info, warn};

use errors::CoreError;

/// Main entry point for the VC dashboard core library.
///
/// Holds the loaded firms, the API-key store, the clock that defines "now"
/// and one memoizing chart cache per firm. Frontends call into this and
/// render what comes back.
#[must_use]
pub struct VcDashboard {
    settings: Settings,
    clock: Box<dyn Clock>,
    credentials: Box<dyn CredentialStore>,
    firms: Vec<Firm>,
    /// Name of the provider that produced `firms`
    source: Option<String>,
    firm_service: FirmService,
    chart_service: ChartService,
    caches: HashMap<String, ChartCache>,
}

impl std::fmt::Debug for VcDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VcDashboard")
            .field("settings", &self.settings)
            .field("today", &self.clock.today())
            .field("firms", &self.firms.len())
            .field("source", &self.source)
            .field("cached_charts", &self.caches.len())
            .finish()
    }
}

impl VcDashboard {
    /// Default settings, wall-clock time and an in-memory key store.
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            clock: Box::new(SystemClock),
            credentials: Box::new(MemoryCredentialStore::new()),
            firms: Vec::new(),
            source: None,
            firm_service: FirmService::new(),
            chart_service: ChartService::new(),
            caches: HashMap::new(),
        }
    }

    /// Assemble a dashboard from explicit parts. Settings are validated.
    pub fn with_parts(
        settings: Settings,
        clock: Box<dyn Clock>,
        credentials: Box<dyn CredentialStore>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self {
            settings,
            clock,
            credentials,
            ..Self::new()
        })
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings. Cached charts are dropped because the growth
    /// model may have changed.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        settings.validate()?;
        self.settings = settings;
        self.caches.clear();
        Ok(())
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ── API key ─────────────────────────────────────────────────────

    pub fn set_api_key(&mut self, api_key: &str) -> Result<(), CoreError> {
        self.credentials.store(api_key)?;
        info!("API key saved");
        Ok(())
    }

    pub fn api_key(&self) -> Result<Option<String>, CoreError> {
        self.credentials.load()
    }

    /// Whether a key is available. An unreadable store counts as "no key".
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        matches!(self.credentials.load(), Ok(Some(_)))
    }

    pub fn remove_api_key(&mut self) -> Result<(), CoreError> {
        self.credentials.clear()?;
        info!("API key removed");
        Ok(())
    }

    // ── Firms ───────────────────────────────────────────────────────

    /// Reload firms from CryptoRank when a key is configured, otherwise
    /// from the built-in sample data. Returns the number of firms loaded.
    pub async fn refresh_firms(&mut self) -> Result<usize, CoreError> {
        match self.refresh_live_firms().await {
            Err(CoreError::MissingApiKey) => {
                warn!("no API key configured, using sample firms");
                self.refresh_firms_with(&SampleFundProvider::new()).await
            }
            other => other,
        }
    }

    /// Reload firms from CryptoRank only; fails with `MissingApiKey` when no
    /// key has been saved.
    pub async fn refresh_live_firms(&mut self) -> Result<usize, CoreError> {
        let key = self.credentials.load()?.ok_or(CoreError::MissingApiKey)?;
        let provider = CryptoRankProvider::with_base_url(key, self.settings.api_base_url.clone());
        self.refresh_firms_with(&provider).await
    }

    /// Reload firms from a specific provider.
    /// On error the previously loaded firms are kept.
    pub async fn refresh_firms_with(&mut self, provider: &dyn FundProvider) -> Result<usize, CoreError> {
        let firms = provider.fetch_funds(self.settings.fund_limit).await?;
        info!(provider = provider.name(), firms = firms.len(), "firms refreshed");
        self.source = Some(provider.name().to_string());
        Ok(self.load_firms(firms))
    }

    /// Replace the loaded firms directly (e.g. from a frontend-side cache).
    pub fn load_firms(&mut self, firms: Vec<Firm>) -> usize {
        self.firms = firms;
        self.caches.clear();
        self.firms.len()
    }

    #[must_use]
    pub fn firms(&self) -> &[Firm] {
        &self.firms
    }

    /// Provider name of the last successful refresh, if any.
    #[must_use]
    pub fn data_source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Firms whose name or focus tags contain `query` (case-insensitive).
    #[must_use]
    pub fn search_firms(&self, query: &str) -> Vec<&Firm> {
        self.firm_service.search(&self.firms, query)
    }

    #[must_use]
    pub fn firm(&self, name: &str) -> Option<&Firm> {
        self.firm_service.find_by_name(&self.firms, name)
    }

    // ── Charts ──────────────────────────────────────────────────────

    /// Project list, date grid and per-project series for a firm (memoized).
    pub fn series(&mut self, firm_name: &str) -> Result<Arc<SeriesSet>, CoreError> {
        let today = self.clock.today();
        let firm = self
            .firm_service
            .find_by_name(&self.firms, firm_name)
            .ok_or_else(|| CoreError::FirmNotFound(firm_name.to_string()))?;
        let growth = self.settings.growth;
        self.caches
            .entry(firm.name.clone())
            .or_insert_with(|| ChartCache::new(SeriesBuilder::new(growth)))
            .series(&firm.investments, today)
    }

    /// Chart rows for a firm under `selection`, with the project list the
    /// renderer needs for its legend (memoized).
    pub fn investment_chart(
        &mut self,
        firm_name: &str,
        selection: &Selection,
    ) -> Result<InvestmentChart, CoreError> {
        let today = self.clock.today();
        let firm = self
            .firm_service
            .find_by_name(&self.firms, firm_name)
            .ok_or_else(|| CoreError::FirmNotFound(firm_name.to_string()))?;
        let growth = self.settings.growth;
        self.caches
            .entry(firm.name.clone())
            .or_insert_with(|| ChartCache::new(SeriesBuilder::new(growth)))
            .chart(&firm.name, &firm.investments, today, selection)
    }

    /// Uncached one-off chart for an arbitrary event list.
    pub fn chart_for_events(
        &self,
        label: &str,
        events: &[InvestmentEvent],
        selection: &Selection,
    ) -> Result<InvestmentChart, CoreError> {
        let set = SeriesBuilder::new(self.settings.growth).build(events, self.clock.today())?;
        Ok(self.chart_service.chart(label, selection, &set))
    }
}

impl Default for VcDashboard {
    fn default() -> Self {
        Self::new()
    }
}
