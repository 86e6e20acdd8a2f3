use crate::models::Offer;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

/// Shown when the site widened the search area because the district itself had no hits
const EXTENDED_LOCATION_WARNING: &str = ".search-location-extended-warning";
const LISTING: &str = ".offer-item";
const PROMO_ATTR: &str = "data-featured-name";
const ORGANIC_MARKER: &str = "listing_no_promo";
const LINK_ATTR: &str = "data-url";

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    #[error("listing has no {0} field")]
    MissingField(&'static str),

    #[error("listing has no {0} attribute")]
    MissingAttribute(&'static str),

    #[error("{field} value {value:?} is not a valid number")]
    InvalidNumber { field: &'static str, value: String },
}

/// Offers parsed from one results page, plus the listings that could not be read
#[derive(Debug, Default)]
pub struct Extraction {
    pub offers: Vec<Offer>,
    pub failures: Vec<ExtractError>,
}

struct FieldSelectors {
    title: Selector,
    rooms: Selector,
    area: Selector,
    price_per_m: Selector,
    price: Selector,
    details: Selector,
}

/// Turns search results markup into `Offer`s
pub struct OfferExtractor {
    extended_warning: Selector,
    listing: Selector,
    fields: FieldSelectors,
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

impl OfferExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            extended_warning: selector(EXTENDED_LOCATION_WARNING)?,
            listing: selector(LISTING)?,
            fields: FieldSelectors {
                title: selector(".offer-item-title")?,
                rooms: selector(".offer-item-rooms")?,
                area: selector(".offer-item-area")?,
                price_per_m: selector(".offer-item-price-per-m")?,
                price: selector(".offer-item-price")?,
                details: selector(".offer-item-details-bottom")?,
            },
        })
    }

    pub fn extract(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);

        if self.is_extended_location(&document) {
            debug!("Search area was extended, treating page as empty");
            return Extraction::default();
        }

        let mut extraction = Extraction::default();
        for node in document.select(&self.listing) {
            if !is_organic(&node) {
                continue;
            }
            match self.offer_from_node(&node) {
                Ok(offer) => extraction.offers.push(offer),
                Err(e) => {
                    warn!("Skipping listing: {}", e);
                    extraction.failures.push(e);
                }
            }
        }

        extraction
    }

    fn is_extended_location(&self, document: &Html) -> bool {
        document.select(&self.extended_warning).next().is_some()
    }

    fn offer_from_node(&self, node: &ElementRef) -> Result<Offer, ExtractError> {
        let link = node
            .value()
            .attr(LINK_ATTR)
            .ok_or(ExtractError::MissingAttribute(LINK_ATTR))?;

        let fields = &self.fields;
        let details = field_text(node, &fields.details, "details")?;

        Ok(Offer {
            title: field_text(node, &fields.title, "title")?,
            rooms: parse_rooms(&field_text(node, &fields.rooms, "rooms")?)?,
            price: parse_amount(&field_text(node, &fields.price, "price")?, "zł", "price")?,
            area: parse_amount(&field_text(node, &fields.area, "area")?, "m²", "area")?,
            price_per_m: parse_amount(
                &field_text(node, &fields.price_per_m, "price_per_m")?,
                "zł/m²",
                "price_per_m",
            )?,
            details: details.split_whitespace().collect::<Vec<_>>().join(" "),
            link: link.to_string(),
        })
    }
}

/// Promoted listings carry a different featured name, or none at all
fn is_organic(node: &ElementRef) -> bool {
    node.value().attr(PROMO_ATTR) == Some(ORGANIC_MARKER)
}

fn field_text(
    node: &ElementRef,
    selector: &Selector,
    field: &'static str,
) -> Result<String, ExtractError> {
    node.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .ok_or(ExtractError::MissingField(field))
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// "3 pokoje" -> 3
pub fn parse_rooms(text: &str) -> Result<u32, ExtractError> {
    let compact = strip_whitespace(text);
    let digits = compact.trim_end_matches(|c: char| c.is_alphabetic());
    match digits.parse::<u32>() {
        Ok(rooms) if rooms >= 1 => Ok(rooms),
        _ => Err(ExtractError::InvalidNumber {
            field: "rooms",
            value: text.to_string(),
        }),
    }
}

/// "62,5 m²" with unit "m²" -> 62.5
pub fn parse_amount(text: &str, unit: &str, field: &'static str) -> Result<f64, ExtractError> {
    let compact = strip_whitespace(text);
    let number = compact.strip_suffix(unit).unwrap_or(&compact).replace(',', ".");
    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ExtractError::InvalidNumber {
            field,
            value: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(featured: &str, url: &str, price: &str) -> String {
        format!(
            r#"<article class="offer-item" data-featured-name="{featured}" data-url="{url}">
                <span class="offer-item-title"> Mieszkanie z widokiem </span>
                <li class="offer-item-rooms">3 pokoje</li>
                <li class="offer-item-price">{price}</li>
                <li class="offer-item-area">62,5 m²</li>
                <li class="offer-item-price-per-m">10 400 zł/m²</li>
                <div class="offer-item-details-bottom">
                    Oferta prywatna
                    balkon
                </div>
            </article>"#
        )
    }

    fn page(items: &[String]) -> String {
        format!("<html><body><div class=\"listing\">{}</div></body></html>", items.join("\n"))
    }

    #[test]
    fn normalizes_locale_numbers() {
        assert_eq!(parse_rooms("3 pokoje").unwrap(), 3);
        assert_eq!(parse_amount("650 000 zł", "zł", "price").unwrap(), 650000.0);
        assert_eq!(parse_amount("62,5 m²", "m²", "area").unwrap(), 62.5);
        assert_eq!(parse_amount("10 400 zł/m²", "zł/m²", "price_per_m").unwrap(), 10400.0);
    }

    #[test]
    fn normalization_accepts_already_plain_numbers() {
        assert_eq!(parse_rooms("3").unwrap(), 3);
        assert_eq!(parse_amount("650000", "zł", "price").unwrap(), 650000.0);
        assert_eq!(parse_amount("62.5", "m²", "area").unwrap(), 62.5);
    }

    #[test]
    fn normalization_handles_non_breaking_spaces() {
        assert_eq!(parse_amount("1\u{a0}250\u{a0}000 zł", "zł", "price").unwrap(), 1250000.0);
    }

    #[test]
    fn rejects_unparseable_numbers() {
        assert!(parse_rooms("0 pokoi").is_err());
        assert!(parse_rooms("kawalerka").is_err());
        assert_eq!(
            parse_amount("Zapytaj o cenę", "zł", "price"),
            Err(ExtractError::InvalidNumber {
                field: "price",
                value: "Zapytaj o cenę".to_string()
            })
        );
    }

    #[test]
    fn extended_location_marker_yields_nothing() {
        let extractor = OfferExtractor::new().unwrap();
        let html = format!(
            "<div class=\"search-location-extended-warning\">Brak wyników</div>{}",
            page(&[listing("listing_no_promo", "https://x/1", "650 000 zł")])
        );

        let extraction = extractor.extract(&html);
        assert!(extraction.offers.is_empty());
        assert!(extraction.failures.is_empty());
    }

    #[test]
    fn promoted_listings_are_excluded() {
        let extractor = OfferExtractor::new().unwrap();
        let html = page(&[
            listing("listing_no_promo", "https://x/organic", "650 000 zł"),
            listing("listing_promo_top", "https://x/promo", "640 000 zł"),
        ]);

        let extraction = extractor.extract(&html);
        assert_eq!(extraction.offers.len(), 1);
        assert_eq!(extraction.offers[0].link, "https://x/organic");
    }

    #[test]
    fn listing_without_featured_flag_is_excluded() {
        let extractor = OfferExtractor::new().unwrap();
        let html = page(&[r#"<article class="offer-item" data-url="https://x/1"></article>"#.to_string()]);

        let extraction = extractor.extract(&html);
        assert!(extraction.offers.is_empty());
        assert!(extraction.failures.is_empty());
    }

    #[test]
    fn extracts_all_fields() {
        let extractor = OfferExtractor::new().unwrap();
        let html = page(&[listing("listing_no_promo", "https://x/1", "650 000 zł")]);

        let offer = &extractor.extract(&html).offers[0];
        assert_eq!(offer.title, "Mieszkanie z widokiem");
        assert_eq!(offer.rooms, 3);
        assert_eq!(offer.price, 650000.0);
        assert_eq!(offer.area, 62.5);
        assert_eq!(offer.price_per_m, 10400.0);
        assert_eq!(offer.details, "Oferta prywatna balkon");
        assert_eq!(offer.link, "https://x/1");
    }

    #[test]
    fn malformed_listing_does_not_abort_batch() {
        let extractor = OfferExtractor::new().unwrap();
        let broken_field = r#"<article class="offer-item" data-featured-name="listing_no_promo" data-url="https://x/2">
                <span class="offer-item-title">Bez metrażu</span>
            </article>"#
            .to_string();
        let html = page(&[
            listing("listing_no_promo", "https://x/1", "650 000 zł"),
            listing("listing_no_promo", "https://x/3", "Zapytaj o cenę"),
            broken_field,
        ]);

        let extraction = extractor.extract(&html);
        assert_eq!(extraction.offers.len(), 1);
        assert_eq!(extraction.failures.len(), 2);
        assert!(matches!(extraction.failures[0], ExtractError::InvalidNumber { field: "price", .. }));
        assert!(matches!(extraction.failures[1], ExtractError::MissingField(_)));
    }

    #[test]
    fn page_without_listings_is_empty() {
        let extractor = OfferExtractor::new().unwrap();
        let extraction = extractor.extract(&page(&[]));
        assert!(extraction.offers.is_empty());
        assert!(extraction.failures.is_empty());
    }
}
