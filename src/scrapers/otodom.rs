use crate::models::GeoDistrict;
use crate::scrapers::traits::{GeoLookup, OfferSource};
use crate::scrapers::types::{SearchParams, Suggestion};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
const AUTOSUGGEST_PATH: &str = "/ajax/geo6/autosuggest/";
const SEARCH_PATH: &str = "/ajax/search/list/";

/// Location levels requested from the autosuggest endpoint, in order
const LOOKUP_LEVELS: [&str; 5] = ["REGION", "SUBREGION", "CITY", "DISTRICT", "STREET"];

/// Otodom client covering both the location lookup and the offer search
pub struct OtodomClient {
    client: Client,
    base_url: String,
}

impl OtodomClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GeoLookup for OtodomClient {
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>> {
        let url = format!("{}{}", self.base_url, AUTOSUGGEST_PATH);
        debug!("Looking up location {:?}", query);

        let response = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .query(&lookup_query(query))
            .send()
            .await
            .with_context(|| format!("Failed to look up location {:?}", query))?;

        response
            .json::<Vec<Suggestion>>()
            .await
            .with_context(|| format!("Invalid autosuggest response for {:?}", query))
    }
}

#[async_trait]
impl OfferSource for OtodomClient {
    async fn search(
        &self,
        district: &GeoDistrict,
        params: &SearchParams,
        since_days: u32,
    ) -> Result<String> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let form = search_form(district, params, since_days)?;
        debug!("Searching offers in {} ({} form fields)", district.text, form.len());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .form(&form)
            .send()
            .await
            .with_context(|| format!("Failed to search offers in {}", district.text))?;

        let html = response
            .text()
            .await
            .context("Failed to read response body")?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }

    fn source_name(&self) -> &'static str {
        "Otodom"
    }
}

fn lookup_query(query: &str) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("data".to_string(), query.to_string()),
        ("lowPriorityStreetsSearch".to_string(), "true".to_string()),
    ];
    for (i, level) in LOOKUP_LEVELS.iter().enumerate() {
        pairs.push((format!("levels[{}]", i), level.to_string()));
    }
    pairs.push(("withParents".to_string(), "false".to_string()));
    pairs
}

/// Single entry of the `locationsPool_id` field
#[derive(Serialize)]
struct LocationPoolEntry {
    region_id: String,
    subregion_id: String,
    city_id: String,
    district_id: u64,
    lat_lon: String,
}

fn locations_pool(district: &GeoDistrict) -> Result<String> {
    let pool = [LocationPoolEntry {
        region_id: district.region_id.to_string(),
        subregion_id: district.subregion_id.to_string(),
        city_id: district.city_id.to_string(),
        district_id: district.district_id,
        lat_lon: district.lat_lon.clone(),
    }];
    let json = serde_json::to_string(&pool).context("Failed to encode locations pool")?;
    Ok(json.replace(' ', ""))
}

fn search_form(
    district: &GeoDistrict,
    params: &SearchParams,
    since_days: u32,
) -> Result<Vec<(&'static str, String)>> {
    Ok(vec![
        ("search[category_id]", params.category_id.to_string()),
        ("search[dealType]", params.deal_type.to_string()),
        ("search[filter_float_price:to]", params.max_price.to_string()),
        ("search[filter_float_m:from]", params.min_area.to_string()),
        ("search[filter_float_m:to]", params.max_area.to_string()),
        ("search[filter_enum_rooms_num][]", params.rooms.to_string()),
        ("search[created_since]", since_days.to_string()),
        ("search[region_id]", district.region_id.to_string()),
        ("search[subregion_id]", district.subregion_id.to_string()),
        ("search[city_id]", district.city_id.to_string()),
        ("search[district_id]", district.district_id.to_string()),
        ("search[locationsPool_id]", locations_pool(district)?),
        ("search[dist]", "0".to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zaspa() -> GeoDistrict {
        GeoDistrict {
            text: "Zaspa, Gdańsk, pomorskie".to_string(),
            name: "Zaspa".to_string(),
            region_id: 11,
            subregion_id: 439,
            city_id: 40,
            district_id: 117,
            lat_lon: "54.39, 18.60".to_string(),
        }
    }

    fn field<'a>(form: &'a [(&'static str, String)], key: &str) -> &'a str {
        form.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn locations_pool_is_compact_and_ordered() {
        let pool = locations_pool(&zaspa()).unwrap();
        assert_eq!(
            pool,
            r#"[{"region_id":"11","subregion_id":"439","city_id":"40","district_id":117,"lat_lon":"54.39,18.60"}]"#
        );
    }

    #[test]
    fn search_form_carries_filter_and_scope() {
        let params = SearchParams {
            max_price: 650_000,
            rooms: 2,
            ..SearchParams::default()
        };
        let form = search_form(&zaspa(), &params, 3).unwrap();

        assert_eq!(field(&form, "search[category_id]"), "101");
        assert_eq!(field(&form, "search[dealType]"), "1");
        assert_eq!(field(&form, "search[filter_float_price:to]"), "650000");
        assert_eq!(field(&form, "search[filter_float_m:from]"), "55");
        assert_eq!(field(&form, "search[filter_float_m:to]"), "70");
        assert_eq!(field(&form, "search[filter_enum_rooms_num][]"), "2");
        assert_eq!(field(&form, "search[created_since]"), "3");
        assert_eq!(field(&form, "search[district_id]"), "117");
        assert_eq!(field(&form, "search[dist]"), "0");
    }

    #[test]
    fn lookup_query_requests_all_levels() {
        let query = lookup_query("Oliwa");
        assert_eq!(query[0], ("data".to_string(), "Oliwa".to_string()));
        assert!(query.contains(&("levels[1]".to_string(), "SUBREGION".to_string())));
        assert!(query.contains(&("levels[4]".to_string(), "STREET".to_string())));
        assert_eq!(query.len(), 8);
    }
}
