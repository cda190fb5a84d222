//! Mutual option narrowing.
//!
//! The options offered for a dimension are the values still reachable under
//! every *other* active constraint, so no option leads to an empty result.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::filter::{Dimension, FilterSelection};
use crate::geo::HOME_COUNTRY;
use crate::models::{CompanySize, EmploymentTerm, JobAd};
use crate::table::AdTable;

/// Sorted, distinct, non-null values of `dimension` consistent with the rest
/// of `selection`.
///
/// Company sizes follow the vocabulary order, months are chronological and
/// everything else is lexicographic. Employment types are offered as the
/// coarse terms a selection accepts. Regions are only offered from rows whose
/// country is [`HOME_COUNTRY`]; rows with no country do not contribute.
/// Returns nothing when the backing column is missing.
///
/// # Examples
///
/// ```
/// use jobscope_core::{narrow_options, AdTable, Dimension, FilterSelection, JobAd};
///
/// let ad = |id: &str, portal: &str, region: &str| JobAd {
///     id: id.to_string(),
///     portal: Some(portal.to_string()),
///     country: Some("Deutschland".to_string()),
///     region: Some(region.to_string()),
///     ..Default::default()
/// };
/// let table = AdTable::with_full_schema(vec![
///     ad("1", "indeed", "Bayern"),
///     ad("2", "stepstone", "Berlin"),
/// ]);
///
/// let selection = FilterSelection::from_pairs([("portal", "indeed")]);
/// assert_eq!(narrow_options(&table, &selection, Dimension::Region), vec!["Bayern"]);
/// // The portal dimension ignores its own constraint.
/// assert_eq!(
///     narrow_options(&table, &selection, Dimension::Portal),
///     vec!["indeed", "stepstone"]
/// );
/// ```
pub fn narrow_options(
    table: &AdTable,
    selection: &FilterSelection,
    dimension: Dimension,
) -> Vec<String> {
    if !table.has_column(dimension.column()) {
        return Vec::new();
    }

    let reachable = selection.without(dimension).apply(table);
    let values = reachable
        .ads()
        .iter()
        .filter(|ad| offered_in(dimension, ad))
        .filter_map(|ad| dimension.value_of(ad));

    match dimension {
        Dimension::CompanySize => {
            let sizes: BTreeSet<CompanySize> =
                values.filter_map(|v| CompanySize::parse(&v)).collect();
            sizes.into_iter().map(|s| s.label().to_string()).collect()
        }
        Dimension::EmploymentType => {
            let terms: BTreeSet<&str> = values
                .filter_map(|v| EmploymentTerm::from_stored(&v))
                .map(|t| t.label())
                .collect();
            terms.into_iter().map(str::to_string).collect()
        }
        // `YYYY-MM` sorts chronologically as text.
        _ => values.collect::<BTreeSet<String>>().into_iter().collect(),
    }
}

fn offered_in(dimension: Dimension, ad: &JobAd) -> bool {
    match dimension {
        Dimension::Region => ad.country.as_deref() == Some(HOME_COUNTRY),
        _ => true,
    }
}

/// Options for every dimension under one selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub options: BTreeMap<Dimension, Vec<String>>,
}

impl FilterOptions {
    pub fn compute(table: &AdTable, selection: &FilterSelection) -> Self {
        let options = Dimension::ALL
            .into_iter()
            .map(|d| (d, narrow_options(table, selection, d)))
            .collect();
        Self { options }
    }

    pub fn get(&self, dimension: Dimension) -> &[String] {
        self.options
            .get(&dimension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns;
    use chrono::NaiveDate;

    fn ad(id: &str, portal: &str, region: &str, size: CompanySize) -> JobAd {
        JobAd {
            id: id.to_string(),
            portal: Some(portal.to_string()),
            country: Some(HOME_COUNTRY.to_string()),
            region: Some(region.to_string()),
            company_size: Some(size),
            ..Default::default()
        }
    }

    #[test]
    fn test_company_sizes_follow_vocabulary() {
        let table = AdTable::with_full_schema(vec![
            ad("1", "a", "Bayern", CompanySize::Over10000),
            ad("2", "a", "Bayern", CompanySize::UpTo10),
            ad("3", "a", "Bayern", CompanySize::UpTo250),
        ]);
        let options = narrow_options(&table, &FilterSelection::new(), Dimension::CompanySize);
        assert_eq!(options, vec!["0-10", "51-250", "10000+"]);
    }

    #[test]
    fn test_months_are_chronological() {
        let dated = |id: &str, y: i32, m: u32| JobAd {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(y, m, 1),
            ..Default::default()
        };
        let table = AdTable::with_full_schema(vec![
            dated("1", 2025, 2),
            dated("2", 2024, 11),
            dated("3", 2025, 2),
        ]);
        let options = narrow_options(&table, &FilterSelection::new(), Dimension::Month);
        assert_eq!(options, vec!["2024-11", "2025-02"]);
    }

    #[test]
    fn test_region_options_limited_to_home_country() {
        let mut vienna = ad("1", "a", "Wien", CompanySize::UpTo10);
        vienna.country = Some("Österreich".to_string());
        let mut unset = ad("2", "a", "Hessen", CompanySize::UpTo10);
        unset.country = None;
        let munich = ad("3", "a", "Bayern", CompanySize::UpTo10);
        let nationwide = ad("4", "a", "bundesweit", CompanySize::UpTo10);

        let table = AdTable::with_full_schema(vec![vienna, unset, munich, nationwide]);
        let options = narrow_options(&table, &FilterSelection::new(), Dimension::Region);
        assert_eq!(options, vec!["Bayern", "bundesweit"]);
    }

    #[test]
    fn test_employment_options_are_coarse_terms() {
        let stored = |id: &str, label: &str| JobAd {
            id: id.to_string(),
            employment_type: Some(label.to_string()),
            ..Default::default()
        };
        let table = AdTable::with_full_schema(vec![
            stored("1", "Feste Anstellung"),
            stored("2", "befristet"),
            stored("3", "Praktikum"),
        ]);
        let options = narrow_options(&table, &FilterSelection::new(), Dimension::EmploymentType);
        assert_eq!(options, vec!["befristet", "unbefristet"]);
    }

    #[test]
    fn test_missing_column_yields_no_options() {
        let table = AdTable::new(
            vec![ad("1", "a", "Bayern", CompanySize::UpTo10)],
            vec![columns::ID.to_string(), columns::PORTAL.to_string()],
        );
        let selection = FilterSelection::new();
        let regions = narrow_options(&table, &selection, Dimension::Region);
        let portals = narrow_options(&table, &selection, Dimension::Portal);
        assert!(regions.is_empty());
        assert_eq!(portals, vec!["a"]);
    }

    #[test]
    fn test_compute_all_dimensions() {
        let table = AdTable::with_full_schema(vec![
            ad("1", "indeed", "Bayern", CompanySize::UpTo10),
            ad("2", "stepstone", "Berlin", CompanySize::UpTo50),
        ]);
        let selection = FilterSelection::from_pairs([("region", "Berlin")]);
        let options = FilterOptions::compute(&table, &selection);

        assert_eq!(options.options.len(), Dimension::ALL.len());
        assert_eq!(options.get(Dimension::Portal), ["stepstone"]);
        assert_eq!(options.get(Dimension::Region), ["Bayern", "Berlin"]);
        assert_eq!(options.get(Dimension::CompanySize), ["11-50"]);
        assert!(options.get(Dimension::Industry).is_empty());
    }
}
