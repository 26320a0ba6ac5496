use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::firm::Firm;

/// Source of VC firm profiles and their investment events.
///
/// The dashboard only needs the resulting firms; how they are fetched,
/// cached or authenticated is the provider's business. Swapping CryptoRank
/// for another source means adding one implementation of this trait.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait FundProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch up to `limit` firms. Investment events must already be
    /// validated; a malformed record fails the whole fetch.
    async fn fetch_funds(&self, limit: usize) -> Result<Vec<Firm>, CoreError>;
}
