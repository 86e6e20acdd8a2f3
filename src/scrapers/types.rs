use serde::{Deserialize, Serialize};

/// Filter applied to every offer search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchParams {
    /// Listing category (101 = flats)
    pub category_id: u32,
    /// Deal type (1 = sale)
    pub deal_type: u32,
    /// Maximum price (PLN)
    pub max_price: u64,
    /// Minimum size in square meters
    pub min_area: u32,
    /// Maximum size in square meters
    pub max_area: u32,
    /// Exact number of rooms
    pub rooms: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            category_id: 101,
            deal_type: 1,
            max_price: 700_000,
            min_area: 55,
            max_area: 70,
            rooms: 3,
        }
    }
}

/// Autosuggest candidate: the district record plus the entities it sits under
#[derive(Debug, Clone, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub parents: Vec<SuggestionParent>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionParent {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub name: String,
}
