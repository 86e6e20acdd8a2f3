use crate::districts::resolver::DistrictResolver;
use crate::models::{DistrictQuery, GeoDistrict, Resolution};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// Write-once JSON file of resolved districts, shared across runs.
///
/// There is no invalidation: after the tracked districts change, the file
/// has to be deleted by hand so the next run resolves everything again.
pub struct DistrictCache {
    path: PathBuf,
}

impl DistrictCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cached districts, or `None` when no cache file exists yet
    pub async fn load(&self) -> Result<Option<Vec<GeoDistrict>>> {
        if !tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Failed to check {}", self.path.display()))?
        {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let districts: Vec<GeoDistrict> = serde_json::from_str(&content).with_context(|| {
            format!(
                "District cache {} is malformed, delete it to resolve districts again",
                self.path.display()
            )
        })?;

        info!("Loaded {} districts from {}", districts.len(), self.path.display());
        Ok(Some(districts))
    }

    /// Resolves every query and overwrites the cache with the resolved ones
    pub async fn populate(
        &self,
        resolver: &DistrictResolver<'_>,
        queries: &[DistrictQuery],
    ) -> Result<Vec<Resolution>> {
        let mut resolutions = Vec::with_capacity(queries.len());
        for query in queries {
            resolutions.push(resolver.resolve(query).await?);
        }

        let resolved: Vec<&GeoDistrict> =
            resolutions.iter().filter_map(Resolution::district).collect();
        if resolved.len() < resolutions.len() {
            warn!(
                "{} of {} districts could not be resolved and are left out of {}",
                resolutions.len() - resolved.len(),
                resolutions.len(),
                self.path.display()
            );
        }

        let json = serde_json::to_string(&resolved).context("Failed to encode districts")?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!("💾 Saved {} districts to {}", resolved.len(), self.path.display());

        Ok(resolutions)
    }

    /// Cached districts when available, otherwise a fresh resolution of `queries`
    pub async fn load_or_populate(
        &self,
        resolver: &DistrictResolver<'_>,
        queries: &[DistrictQuery],
    ) -> Result<Vec<Resolution>> {
        match self.load().await? {
            Some(districts) => Ok(districts.into_iter().map(Resolution::Resolved).collect()),
            None => {
                info!("No district cache at {}, resolving {} districts", self.path.display(), queries.len());
                self.populate(resolver, queries).await
            }
        }
    }
}
