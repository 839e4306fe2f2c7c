//! Media catalog for the auto-filter bot
//!
//! This crate owns the indexed file and user records, the storage seam the
//! bot talks to, and the facet logic (season / quality) used to group
//! search results.

pub mod facets;
pub mod model;
pub mod store;

pub use facets::{distinct_qualities, extract, group, with_quality, Metadata, SeasonGroups, SeasonKey};
pub use model::{FileRecord, UserRecord};
pub use store::{CatalogError, CatalogStore, InMemoryCatalog};
