pub mod catalog;
pub mod config;
pub mod predict;
pub mod report;
pub mod search;

pub use report::PassReport;
pub use search::{SatelliteSearch, SearchError, SearchQuery};
