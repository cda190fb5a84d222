//! Filter predicate evaluation.
//!
//! A [`FilterSelection`] holds one optional constraint per [`Dimension`].
//! Active constraints are ANDed; each is an equality or membership test, so
//! the order in which they are applied never changes the result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::models::{columns, CompanySize, EmploymentTerm, JobAd};
use crate::table::AdTable;

/// A filterable attribute of a job ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Portal,
    Region,
    Month,
    Industry,
    Position,
    CompanySize,
    EmploymentType,
    TimeModel,
    ExperienceRequired,
    JobTitle,
    Company,
}

impl Dimension {
    pub const ALL: [Dimension; 11] = [
        Dimension::Portal,
        Dimension::Region,
        Dimension::Month,
        Dimension::Industry,
        Dimension::Position,
        Dimension::CompanySize,
        Dimension::EmploymentType,
        Dimension::TimeModel,
        Dimension::ExperienceRequired,
        Dimension::JobTitle,
        Dimension::Company,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Portal => "portal",
            Dimension::Region => "region",
            Dimension::Month => "month",
            Dimension::Industry => "industry",
            Dimension::Position => "position",
            Dimension::CompanySize => "company_size",
            Dimension::EmploymentType => "employment_type",
            Dimension::TimeModel => "time_model",
            Dimension::ExperienceRequired => "experience_required",
            Dimension::JobTitle => "job_title",
            Dimension::Company => "company",
        }
    }

    /// Source column backing this dimension.
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Portal => columns::PORTAL,
            Dimension::Region => columns::REGION,
            Dimension::Month => columns::DATE,
            Dimension::Industry => columns::INDUSTRY,
            Dimension::Position => columns::POSITION,
            Dimension::CompanySize => columns::COMPANY_SIZE,
            Dimension::EmploymentType => columns::EMPLOYMENT_TYPE,
            Dimension::TimeModel => columns::TIME_MODEL,
            Dimension::ExperienceRequired => columns::EXPERIENCE_REQUIRED,
            Dimension::JobTitle => columns::JOB_TITLE,
            Dimension::Company => columns::COMPANY,
        }
    }

    /// The ad's value for this dimension, as offered to the user.
    ///
    /// Employment type yields the stored label; experience yields `"1"`/`"0"`.
    pub fn value_of(&self, ad: &JobAd) -> Option<String> {
        match self {
            Dimension::Portal => ad.portal.clone(),
            Dimension::Region => ad.region.clone(),
            Dimension::Month => ad.month(),
            Dimension::Industry => ad.industry.clone(),
            Dimension::Position => ad.position.clone(),
            Dimension::CompanySize => ad.company_size.map(|s| s.label().to_string()),
            Dimension::EmploymentType => ad.employment_type.clone(),
            Dimension::TimeModel => ad.time_model.clone(),
            Dimension::ExperienceRequired => ad
                .experience_required
                .map(|b| if b { "1" } else { "0" }.to_string()),
            Dimension::JobTitle => ad.job_title.clone(),
            Dimension::Company => ad.company.clone(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Dimension::ALL
            .into_iter()
            .find(|d| d.name() == normalized)
            .ok_or_else(|| format!("unknown dimension: {}", s))
    }
}

/// The currently active filter values across all dimensions.
///
/// Empty sets and `None` mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub portals: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    /// Months as `YYYY-MM`.
    pub months: BTreeSet<String>,
    pub industries: BTreeSet<String>,
    pub positions: BTreeSet<String>,
    pub company_sizes: BTreeSet<CompanySize>,
    pub employment: Option<EmploymentTerm>,
    pub time_model: Option<String>,
    pub experience_required: Option<bool>,
    pub job_title: Option<String>,
    pub company: Option<String>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection from `(dimension, value)` pairs.
    ///
    /// Unknown dimension names and malformed values are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use jobscope_core::{Dimension, FilterSelection};
    ///
    /// let selection = FilterSelection::from_pairs([
    ///     ("portal", "stepstone"),
    ///     ("company_size", "51-250"),
    ///     ("colour", "blue"),
    /// ]);
    /// assert!(selection.is_active(Dimension::Portal));
    /// assert!(selection.is_active(Dimension::CompanySize));
    /// assert_eq!(selection.active_dimensions().len(), 2);
    /// ```
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut selection = Self::default();
        for (name, value) in pairs {
            match name.parse::<Dimension>() {
                Ok(dimension) => selection.add_value(dimension, value),
                Err(e) => debug!("Ignoring filter: {}", e),
            }
        }
        selection
    }

    /// Adds one value to a dimension.
    ///
    /// Multi-valued dimensions accumulate; single-valued ones are replaced.
    /// Blank or unparsable values leave the dimension untouched.
    pub fn add_value(&mut self, dimension: Dimension, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }

        match dimension {
            Dimension::Portal => {
                self.portals.insert(value.to_string());
            }
            Dimension::Region => {
                self.regions.insert(value.to_string());
            }
            Dimension::Month => match normalize_month(value) {
                Some(month) => {
                    self.months.insert(month);
                }
                None => debug!("Ignoring malformed month: {}", value),
            },
            Dimension::Industry => {
                self.industries.insert(value.to_string());
            }
            Dimension::Position => {
                self.positions.insert(value.to_string());
            }
            Dimension::CompanySize => match CompanySize::parse(value) {
                Some(size) => {
                    self.company_sizes.insert(size);
                }
                None => debug!("Ignoring unknown company size: {}", value),
            },
            Dimension::EmploymentType => match value.parse::<EmploymentTerm>() {
                Ok(term) => self.employment = Some(term),
                Err(e) => debug!("Ignoring filter: {}", e),
            },
            Dimension::TimeModel => self.time_model = Some(value.to_string()),
            Dimension::ExperienceRequired => match parse_bool(value) {
                Some(flag) => self.experience_required = Some(flag),
                None => debug!("Ignoring malformed experience flag: {}", value),
            },
            Dimension::JobTitle => self.job_title = Some(value.to_string()),
            Dimension::Company => self.company = Some(value.to_string()),
        }
    }

    /// Removes any constraint on `dimension`.
    pub fn clear_dimension(&mut self, dimension: Dimension) {
        match dimension {
            Dimension::Portal => self.portals.clear(),
            Dimension::Region => self.regions.clear(),
            Dimension::Month => self.months.clear(),
            Dimension::Industry => self.industries.clear(),
            Dimension::Position => self.positions.clear(),
            Dimension::CompanySize => self.company_sizes.clear(),
            Dimension::EmploymentType => self.employment = None,
            Dimension::TimeModel => self.time_model = None,
            Dimension::ExperienceRequired => self.experience_required = None,
            Dimension::JobTitle => self.job_title = None,
            Dimension::Company => self.company = None,
        }
    }

    /// Resets every dimension.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// A copy of this selection without the constraint on `dimension`.
    pub fn without(&self, dimension: Dimension) -> Self {
        let mut other = self.clone();
        other.clear_dimension(dimension);
        other
    }

    pub fn is_active(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Portal => !self.portals.is_empty(),
            Dimension::Region => !self.regions.is_empty(),
            Dimension::Month => !self.months.is_empty(),
            Dimension::Industry => !self.industries.is_empty(),
            Dimension::Position => !self.positions.is_empty(),
            Dimension::CompanySize => !self.company_sizes.is_empty(),
            Dimension::EmploymentType => self.employment.is_some(),
            Dimension::TimeModel => self.time_model.is_some(),
            Dimension::ExperienceRequired => self.experience_required.is_some(),
            Dimension::JobTitle => self.job_title.is_some(),
            Dimension::Company => self.company.is_some(),
        }
    }

    pub fn active_dimensions(&self) -> Vec<Dimension> {
        Dimension::ALL
            .into_iter()
            .filter(|d| self.is_active(*d))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.active_dimensions().is_empty()
    }

    /// Tests one ad against the constraint on a single dimension.
    ///
    /// Inactive dimensions always match.
    pub fn matches_dimension(&self, dimension: Dimension, ad: &JobAd) -> bool {
        if !self.is_active(dimension) {
            return true;
        }

        match dimension {
            Dimension::Portal => member(&self.portals, ad.portal.as_ref()),
            Dimension::Region => member(&self.regions, ad.region.as_ref()),
            Dimension::Month => member(&self.months, ad.month().as_ref()),
            Dimension::Industry => member(&self.industries, ad.industry.as_ref()),
            Dimension::Position => member(&self.positions, ad.position.as_ref()),
            Dimension::CompanySize => ad
                .company_size
                .is_some_and(|size| self.company_sizes.contains(&size)),
            Dimension::EmploymentType => match (self.employment, ad.employment_type.as_deref()) {
                (Some(term), Some(stored)) => term.matches(stored),
                _ => false,
            },
            Dimension::TimeModel => ad.time_model == self.time_model,
            Dimension::ExperienceRequired => ad.experience_required == self.experience_required,
            Dimension::JobTitle => ad.job_title == self.job_title,
            Dimension::Company => ad.company == self.company,
        }
    }

    /// Applies every active predicate to `table`.
    ///
    /// Predicates on columns the table does not have are skipped.
    pub fn apply(&self, table: &AdTable) -> AdTable {
        let active: Vec<Dimension> = self
            .active_dimensions()
            .into_iter()
            .filter(|d| {
                let present = table.has_column(d.column());
                if !present {
                    debug!("Skipping {} filter: column {} missing", d, d.column());
                }
                present
            })
            .collect();

        if active.is_empty() {
            return table.clone();
        }

        table.retain_rows(|ad| active.iter().all(|d| self.matches_dimension(*d, ad)))
    }
}

impl AdTable {
    /// Rows matching every active predicate of `selection`.
    pub fn filter(&self, selection: &FilterSelection) -> AdTable {
        selection.apply(self)
    }
}

fn member(set: &BTreeSet<String>, value: Option<&String>) -> bool {
    value.is_some_and(|v| set.contains(v))
}

/// Accepts `YYYY-MM` (or a full date, whose month is taken).
fn normalize_month(value: &str) -> Option<String> {
    let candidate = value.get(..7)?;
    let (year, month) = candidate.split_once('-')?;
    let valid = year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && month.parse::<u32>().is_ok_and(|m| (1..=12).contains(&m))
        && month.len() == 2;
    valid.then(|| candidate.to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "ja" => Some(true),
        "0" | "false" | "no" | "nein" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ad(id: &str) -> JobAd {
        JobAd {
            id: id.to_string(),
            portal: Some("stepstone".to_string()),
            region: Some("Bayern".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 5, 3),
            employment_type: Some("Feste Anstellung".to_string()),
            time_model: Some("Vollzeit".to_string()),
            experience_required: Some(true),
            company_size: Some(CompanySize::UpTo250),
            industry: Some("IT".to_string()),
            position: Some("Senior".to_string()),
            job_title: Some("Data Engineer".to_string()),
            company: Some("ACME".to_string()),
            ..Default::default()
        }
    }

    fn table() -> AdTable {
        let mut b = ad("b");
        b.portal = Some("indeed".to_string());
        b.region = Some("Berlin".to_string());
        b.employment_type = Some("befristet".to_string());
        b.time_model = Some("Teilzeit".to_string());
        b.experience_required = Some(false);
        b.date = NaiveDate::from_ymd_opt(2025, 6, 1);
        b.company_size = None;
        AdTable::with_full_schema(vec![ad("a"), b])
    }

    fn ids(table: &AdTable) -> Vec<&str> {
        table.ads().iter().map(|ad| ad.id.as_str()).collect()
    }

    #[test]
    fn test_empty_selection_is_identity() {
        let t = table();
        assert_eq!(FilterSelection::new().apply(&t), t);
    }

    #[test]
    fn test_membership_filter() {
        let selection = FilterSelection::from_pairs([("portal", "indeed"), ("portal", "xing")]);
        assert_eq!(ids(&selection.apply(&table())), vec!["b"]);
    }

    #[test]
    fn test_employment_term_is_expanded() {
        let permanent = FilterSelection::from_pairs([("employment_type", "unbefristet")]);
        assert_eq!(ids(&permanent.apply(&table())), vec!["a"]);

        let fixed = FilterSelection::from_pairs([("employment_type", "befristet")]);
        assert_eq!(ids(&fixed.apply(&table())), vec!["b"]);
    }

    #[test]
    fn test_malformed_values_impose_no_constraint() {
        let selection = FilterSelection::from_pairs([
            ("employment_type", "freelance"),
            ("month", "May"),
            ("company_size", "enormous"),
            ("experience_required", "perhaps"),
            ("unknown", "x"),
        ]);
        assert!(selection.is_empty());
        assert_eq!(selection.apply(&table()).len(), 2);
    }

    #[test]
    fn test_month_and_experience_filters() {
        let selection = FilterSelection::from_pairs([("month", "2025-05")]);
        assert_eq!(ids(&selection.apply(&table())), vec!["a"]);

        let selection = FilterSelection::from_pairs([("experience_required", "0")]);
        assert_eq!(ids(&selection.apply(&table())), vec!["b"]);
    }

    #[test]
    fn test_month_accepts_full_dates() {
        assert_eq!(normalize_month("2025-06-17").as_deref(), Some("2025-06"));
        assert_eq!(normalize_month("2025-13"), None);
        assert_eq!(normalize_month("25-06"), None);
    }

    #[test]
    fn test_company_size_filter_excludes_absent() {
        let selection = FilterSelection::from_pairs([("company_size", "51-250")]);
        assert_eq!(ids(&selection.apply(&table())), vec!["a"]);
    }

    #[test]
    fn test_scalar_dimensions_replace() {
        let mut selection = FilterSelection::new();
        selection.add_value(Dimension::TimeModel, "Vollzeit");
        selection.add_value(Dimension::TimeModel, "Teilzeit");
        assert_eq!(selection.time_model.as_deref(), Some("Teilzeit"));
        assert_eq!(ids(&selection.apply(&table())), vec!["b"]);
    }

    #[test]
    fn test_missing_column_skips_predicate() {
        let t = AdTable::new(table().ads().to_vec(), vec![columns::ID.to_string()]);
        let selection = FilterSelection::from_pairs([("portal", "nowhere")]);
        assert_eq!(selection.apply(&t).len(), 2);
    }

    #[test]
    fn test_without_and_clear() {
        let mut selection =
            FilterSelection::from_pairs([("portal", "indeed"), ("region", "Berlin")]);
        let relaxed = selection.without(Dimension::Portal);
        assert!(!relaxed.is_active(Dimension::Portal));
        assert!(relaxed.is_active(Dimension::Region));

        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_dimension_parsing() {
        assert_eq!(
            "company-size".parse::<Dimension>(),
            Ok(Dimension::CompanySize)
        );
        assert_eq!(" Portal ".parse::<Dimension>(), Ok(Dimension::Portal));
        assert!("salary".parse::<Dimension>().is_err());
    }
}
