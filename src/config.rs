use crate::models::DistrictQuery;
use crate::scrapers::SearchParams;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

pub const CONFIG_FILE: &str = "flat-scout.json";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.129 Safari/537.36";

const DEFAULT_DISTRICTS: [(&str, &str); 10] = [
    ("Gdańsk", "Zaspa"),
    ("Gdańsk", "Oliwa"),
    ("Gdańsk", "Śródmieście"),
    ("Gdańsk", "Morena"),
    ("Gdańsk", "Wrzeszcz"),
    ("Gdynia", "Redłowo"),
    ("Gdynia", "Orłowo"),
    ("Gdynia", "Śródmieście"),
    ("Gdynia", "Wzgórze"),
    ("Gdynia", "Witomino"),
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Where resolved districts are kept between runs
    pub cache_path: String,
    /// Only offers created within this many days are searched
    pub since_days: u32,
    pub search: SearchParams,
    pub districts: Vec<DistrictQuery>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.otodom.pl".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_path: "districts.json".to_string(),
            since_days: 1,
            search: SearchParams::default(),
            districts: DEFAULT_DISTRICTS
                .iter()
                .map(|(city, name)| DistrictQuery::new(city, name))
                .collect(),
        }
    }
}

impl AppConfig {
    /// Reads `path` when it exists, falling back to the built-in defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No {} found, using built-in configuration", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
