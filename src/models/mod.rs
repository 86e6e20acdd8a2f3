use serde::{Deserialize, Deserializer, Serialize};

/// A (city, neighborhood) pair to track, as named by a human
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DistrictQuery {
    pub city: String,
    pub name: String,
}

impl DistrictQuery {
    pub fn new(city: &str, name: &str) -> Self {
        Self {
            city: city.to_string(),
            name: name.to_string(),
        }
    }
}

/// Geographic scope resolved against the listing site's location index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeoDistrict {
    pub text: String,
    pub name: String,
    #[serde(deserialize_with = "numeric_id")]
    pub region_id: u64,
    #[serde(deserialize_with = "numeric_id")]
    pub subregion_id: u64,
    #[serde(deserialize_with = "numeric_id")]
    pub city_id: u64,
    #[serde(deserialize_with = "numeric_id")]
    pub district_id: u64,
    /// Raw "lat, lon" string, passed back to the search endpoint untouched
    #[serde(default, deserialize_with = "lenient_text")]
    pub lat_lon: String,
}

/// Outcome of resolving a single `DistrictQuery`
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(GeoDistrict),
    Unresolved { city: String, name: String },
}

impl Resolution {
    pub fn unresolved(query: &DistrictQuery) -> Self {
        Resolution::Unresolved {
            city: query.city.clone(),
            name: query.name.clone(),
        }
    }

    pub fn district(&self) -> Option<&GeoDistrict> {
        match self {
            Resolution::Resolved(district) => Some(district),
            Resolution::Unresolved { .. } => None,
        }
    }
}

/// One organic apartment listing from a search results page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Offer {
    pub title: String,
    pub rooms: u32,
    pub price: f64,
    pub area: f64,
    pub price_per_m: f64,
    pub details: String,
    /// Listing URL, also the deduplication key
    pub link: String,
}

/// Identifiers arrive either as JSON numbers or as decimal strings
fn numeric_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("identifier {:?} is not a non-negative integer", text))
        }),
    }
}

/// `null` reads as an empty string
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
