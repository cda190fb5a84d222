//! The in-memory job advertisement table.
//!
//! An [`AdTable`] is loaded once and never mutated; filtering produces a new
//! table. The set of source columns is carried along so consumers can degrade
//! gracefully when the snapshot schema drifts.

use std::collections::{BTreeSet, HashSet};

use crate::error::AppError;
use crate::models::{columns, CompensationFlag, JobAd};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdTable {
    ads: Vec<JobAd>,
    columns: BTreeSet<String>,
}

impl AdTable {
    pub fn new(ads: Vec<JobAd>, columns: impl IntoIterator<Item = String>) -> Self {
        Self {
            ads,
            columns: columns.into_iter().collect(),
        }
    }

    /// Builds a table that claims every known column.
    ///
    /// Handy for callers constructing records in code rather than reading a
    /// snapshot.
    pub fn with_full_schema(ads: Vec<JobAd>) -> Self {
        let mut names: Vec<String> = [
            columns::ID,
            columns::PORTAL,
            columns::COUNTRY,
            columns::REGION,
            columns::DATE,
            columns::EMPLOYMENT_TYPE,
            columns::TIME_MODEL,
            columns::EXPERIENCE_REQUIRED,
            columns::COMPANY_SIZE,
            columns::INDUSTRY,
            columns::POSITION,
            columns::JOB_TITLE,
            columns::COMPANY,
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        names.extend(CompensationFlag::ALL.iter().map(|f| f.column().to_string()));
        Self::new(ads, names)
    }

    pub fn ads(&self) -> &[JobAd] {
        &self.ads
    }

    pub fn len(&self) -> usize {
        self.ads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ads.is_empty()
    }

    pub fn columns(&self) -> &BTreeSet<String> {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// Compensation flags whose column exists in this table, in canonical order.
    pub fn flag_columns(&self) -> Vec<CompensationFlag> {
        CompensationFlag::ALL
            .into_iter()
            .filter(|flag| self.has_column(flag.column()))
            .collect()
    }

    /// Returns a table holding only the rows matching `keep`, same schema.
    pub fn retain_rows<F>(&self, mut keep: F) -> AdTable
    where
        F: FnMut(&JobAd) -> bool,
    {
        AdTable {
            ads: self.ads.iter().filter(|ad| keep(ad)).cloned().collect(),
            columns: self.columns.clone(),
        }
    }

    /// First occurrence of every distinct `id`, in table order.
    pub fn unique_ads(&self) -> Vec<&JobAd> {
        let mut seen = HashSet::new();
        self.ads
            .iter()
            .filter(|ad| seen.insert(ad.id.as_str()))
            .collect()
    }

    /// First occurrence of every distinct `(id, portal)` pair, in table order.
    pub fn unique_ads_per_portal(&self) -> Vec<&JobAd> {
        let mut seen = HashSet::new();
        self.ads
            .iter()
            .filter(|ad| seen.insert((ad.id.as_str(), ad.portal.as_deref())))
            .collect()
    }
}

/// Outcome of loading the dataset at startup.
///
/// Load failures are kept as a value so the presentation layer can report
/// "no data" once instead of crashing.
#[derive(Debug)]
pub enum DataState {
    Ready(AdTable),
    Unavailable(String),
}

impl DataState {
    pub fn from_result(result: Result<AdTable, AppError>) -> Self {
        match result {
            Ok(table) => DataState::Ready(table),
            Err(e) => DataState::Unavailable(e.to_string()),
        }
    }

    pub fn table(&self) -> Option<&AdTable> {
        match self {
            DataState::Ready(table) => Some(table),
            DataState::Unavailable(_) => None,
        }
    }

    /// Converts into the table, or the terminal `DataUnavailable` error.
    pub fn into_table(self) -> Result<AdTable, AppError> {
        match self {
            DataState::Ready(table) => Ok(table),
            DataState::Unavailable(reason) => Err(AppError::DataUnavailable(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(id: &str, portal: &str) -> JobAd {
        JobAd {
            id: id.to_string(),
            portal: Some(portal.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_unique_ads_keeps_first_occurrence() {
        let mut first = ad("a", "stepstone");
        first.job_title = Some("first".to_string());
        let mut second = ad("a", "indeed");
        second.job_title = Some("second".to_string());
        let table = AdTable::with_full_schema(vec![first, second, ad("b", "indeed")]);

        let unique = table.unique_ads();
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].job_title.as_deref(), Some("first"));
    }

    #[test]
    fn test_unique_ads_per_portal() {
        let table = AdTable::with_full_schema(vec![
            ad("a", "stepstone"),
            ad("a", "indeed"),
            ad("a", "indeed"),
        ]);
        assert_eq!(table.unique_ads_per_portal().len(), 2);
    }

    #[test]
    fn test_flag_columns_respect_schema() {
        let table = AdTable::new(
            vec![],
            vec![
                columns::ID.to_string(),
                "Homeoffice".to_string(),
                "Boni".to_string(),
            ],
        );
        assert_eq!(
            table.flag_columns(),
            vec![CompensationFlag::Bonuses, CompensationFlag::HomeOffice]
        );
    }

    #[test]
    fn test_retain_rows_keeps_schema() {
        let table = AdTable::with_full_schema(vec![ad("a", "x"), ad("b", "y")]);
        let filtered = table.retain_rows(|ad| ad.id == "b");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.columns(), table.columns());
    }

    #[test]
    fn test_data_state_unavailable() {
        let state = DataState::from_result(Err(AppError::Generic("boom".to_string())));
        assert!(state.table().is_none());
        assert!(matches!(
            state.into_table(),
            Err(AppError::DataUnavailable(_))
        ));
    }
}
