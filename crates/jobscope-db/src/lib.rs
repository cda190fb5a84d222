//! Jobscope DB - Storage for snapshots and search terms
//!
//! - [`ads`] reads the `job_analysis` table from the downloaded SQLite snapshot
//! - [`terms`] persists the search-term list as a local JSON file
//! - [`mirror`] publishes the term list to PostgreSQL for the scraper

pub mod ads;
pub mod mirror;
pub mod terms;

pub use ads::AdRepository;
pub use mirror::{TermDocument, TermMirror};
pub use terms::TermFileStore;
