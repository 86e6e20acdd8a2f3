pub mod cache;
pub mod resolver;

pub use cache::DistrictCache;
pub use resolver::DistrictResolver;
