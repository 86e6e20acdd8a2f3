use crate::models::{GeoDistrict, Offer, Resolution};
use crate::scrapers::extract::ExtractError;
use crate::scrapers::{OfferExtractor, OfferSource, SearchParams};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Write;
use tracing::{info, warn};

/// Links already reported during this run
#[derive(Debug, Default)]
pub struct SeenLinks(HashSet<String>);

impl SeenLinks {
    pub fn contains(&self, link: &str) -> bool {
        self.0.contains(link)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn extend<'a>(&mut self, links: impl IntoIterator<Item = &'a str>) {
        self.0.extend(links.into_iter().map(str::to_string));
    }
}

/// Outcome of searching a single district
#[derive(Debug)]
pub struct DistrictReport {
    pub text: String,
    pub found: usize,
    /// Offers not reported by an earlier district
    pub fresh: Vec<Offer>,
    pub failures: Vec<ExtractError>,
}

impl DistrictReport {
    pub fn render(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "found {} for {}", self.found, self.text)?;
        for offer in &self.fresh {
            let json = serde_json::to_string_pretty(offer).context("Failed to format offer")?;
            writeln!(out, "{}", json)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub searched: usize,
    pub unresolved: usize,
    pub found: usize,
    pub reported: usize,
    pub skipped_listings: usize,
}

/// Searches each district once and reports offers not seen earlier in the run
pub struct Runner<'a> {
    source: &'a dyn OfferSource,
    extractor: OfferExtractor,
    params: SearchParams,
    since_days: u32,
}

impl<'a> Runner<'a> {
    pub fn new(
        source: &'a dyn OfferSource,
        extractor: OfferExtractor,
        params: SearchParams,
        since_days: u32,
    ) -> Self {
        Self {
            source,
            extractor,
            params,
            since_days,
        }
    }

    pub async fn process_district(
        &self,
        district: &GeoDistrict,
        seen: &mut SeenLinks,
    ) -> Result<DistrictReport> {
        info!("Searching {} on {}...", district.text, self.source.source_name());
        let html = self
            .source
            .search(district, &self.params, self.since_days)
            .await?;
        let extraction = self.extractor.extract(&html);

        let found = extraction.offers.len();
        let batch: Vec<String> = extraction.offers.iter().map(|o| o.link.clone()).collect();
        let fresh: Vec<Offer> = extraction
            .offers
            .into_iter()
            .filter(|offer| !seen.contains(&offer.link))
            .collect();
        seen.extend(batch.iter().map(String::as_str));

        info!("{}: {} offers, {} new", district.text, found, fresh.len());
        Ok(DistrictReport {
            text: district.text.clone(),
            found,
            fresh,
            failures: extraction.failures,
        })
    }

    pub async fn run(&self, resolutions: &[Resolution], out: &mut impl Write) -> Result<RunSummary> {
        let mut seen = SeenLinks::default();
        let mut summary = RunSummary::default();

        for resolution in resolutions {
            let district = match resolution {
                Resolution::Resolved(district) => district,
                Resolution::Unresolved { city, name } => {
                    warn!("Skipping unresolved district {} / {}", city, name);
                    summary.unresolved += 1;
                    continue;
                }
            };

            let report = self.process_district(district, &mut seen).await?;
            report.render(out)?;

            summary.searched += 1;
            summary.found += report.found;
            summary.reported += report.fresh.len();
            summary.skipped_listings += report.failures.len();
        }

        info!(
            "Run finished: {} districts searched, {} unresolved, {} offers, {} new, {} listings skipped, {} links seen",
            summary.searched,
            summary.unresolved,
            summary.found,
            summary.reported,
            summary.skipped_listings,
            seen.len()
        );
        Ok(summary)
    }
}
