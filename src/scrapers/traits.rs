use crate::models::GeoDistrict;
use crate::scrapers::types::{SearchParams, Suggestion};
use anyhow::Result;
use async_trait::async_trait;

/// Free-text location lookup against the listing site
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Candidate locations matching `query`, best match first
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>>;
}

/// Filtered offer search against the listing site
#[async_trait]
pub trait OfferSource: Send + Sync {
    /// Raw results markup for `district`, limited to listings created in the last `since_days`
    async fn search(
        &self,
        district: &GeoDistrict,
        params: &SearchParams,
        since_days: u32,
    ) -> Result<String>;

    fn source_name(&self) -> &'static str;
}
