//! Jobscope Core - Domain types, filtering, aggregation and configuration.
//!
//! The pipeline is: load an [`AdTable`] once, build a [`FilterSelection`],
//! apply it, then hand the filtered table to the functions in [`aggregate`].
//! [`narrow_options`] keeps each dimension's choices consistent with the
//! other active filters.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod filter;
pub mod geo;
pub mod models;
pub mod options;
pub mod snapshot;
pub mod table;
pub mod terms;

pub use aggregate::{
    company_size_histogram, compare, compensation_breakdown, kpis, region_counts, trend,
    Comparison, CompensationBreakdown, CompensationShare, Kpis, RegionCounts, SideReport,
    SideSelection, SizeBucket, TrendPoint, TrendSeries,
};
pub use config::{
    default_config_path, load_config, DashboardConfig, DbConfig, HttpConfig, SourceConfig,
    TermsConfig,
};
pub use error::AppError;
pub use filter::{Dimension, FilterSelection};
pub use geo::{expand_nationwide, RegionBoundaries};
pub use models::{
    CompanySize, CompensationFlag, CompensationGroup, EmploymentTerm, FieldValue, JobAd,
};
pub use options::{narrow_options, FilterOptions};
pub use snapshot::{content_hash, needs_refresh, RefreshDecision, RefreshReport, SnapshotOutcome};
pub use table::{AdTable, DataState};
pub use terms::SearchTermList;
