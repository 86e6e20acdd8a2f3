use crate::models::{DistrictQuery, GeoDistrict, Resolution};
use crate::scrapers::{GeoLookup, Suggestion};
use anyhow::Result;
use tracing::{debug, info, warn};

/// Parent level that has to carry the requested city name
const CITY_PARENT_LEVEL: &str = "SUBREGION";

/// Maps human district names to the site's location identifiers
pub struct DistrictResolver<'a> {
    lookup: &'a dyn GeoLookup,
}

impl<'a> DistrictResolver<'a> {
    pub fn new(lookup: &'a dyn GeoLookup) -> Self {
        Self { lookup }
    }

    pub async fn resolve(&self, query: &DistrictQuery) -> Result<Resolution> {
        let suggestions = self.lookup.suggest(&query.name).await?;
        debug!("{} candidates for {}", suggestions.len(), query.name);

        match pick_district(&query.city, &suggestions) {
            Some(district) => {
                info!("Resolved {} / {} to {}", query.city, query.name, district.text);
                Ok(Resolution::Resolved(district))
            }
            None => {
                warn!("No location under {} matches {}", query.city, query.name);
                Ok(Resolution::unresolved(query))
            }
        }
    }
}

/// First candidate whose subregion parent is named `city`.
///
/// A match without usable identifiers counts as no match.
fn pick_district(city: &str, suggestions: &[Suggestion]) -> Option<GeoDistrict> {
    let matched = suggestions.iter().find(|suggestion| {
        suggestion
            .parents
            .iter()
            .any(|parent| parent.level == CITY_PARENT_LEVEL && parent.name == city)
    })?;

    match serde_json::from_value(serde_json::Value::Object(matched.fields.clone())) {
        Ok(district) => Some(district),
        Err(e) => {
            warn!("Location under {} has unusable identifiers: {}", city, e);
            None
        }
    }
}
