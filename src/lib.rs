// Funding Feed Mock - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod config;
pub mod sanitise;
pub mod fixture;       // Embedded workbook + PE and sport CSVs
pub mod models;        // Wire model (camelCase JSON)
pub mod catalog;       // LAs, regions, local-government groups
pub mod funding;       // Stream generators + template builder
pub mod feed;          // Filters + inverted Atom pagination
pub mod lookup;        // byId / provider funding resolution
pub mod reference;     // Periods, streams, logical models
pub mod bundle;        // Download-all zip bundles

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use catalog::{Organisation, OrganisationCatalog, OrganisationKind};
pub use config::FeedConfig;
pub use error::{FeedError, Result};
pub use feed::{generate_feed, get_page, FeedFilters};
pub use fixture::{CellMode, DsgSheet, Fixtures, Workbook};
pub use funding::{detect_stream, generator_for, FundingStream, StreamGenerator};
pub use lookup::{get_by_id, get_provider_funding};
pub use models::{FeedResponse, Funding, FundingValue, ProviderFunding};
pub use sanitise::sanitise_name;
