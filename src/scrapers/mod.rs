pub mod extract;
pub mod otodom;
pub mod traits;
pub mod types;

pub use extract::OfferExtractor;
pub use otodom::OtodomClient;
pub use traits::{GeoLookup, OfferSource};
pub use types::{SearchParams, Suggestion};
