//! Domain types for scraped job advertisements.
//!
//! The column names in [`columns`] are the external snapshot schema and must
//! match the `job_analysis` table exactly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Source column names of the `job_analysis` table.
pub mod columns {
    pub const ID: &str = "MongoDB_ID";
    pub const PORTAL: &str = "Portal_Name";
    pub const COUNTRY: &str = "Land";
    pub const REGION: &str = "Bundesland";
    pub const DATE: &str = "Datum";
    pub const EMPLOYMENT_TYPE: &str = "Beschäftigungsart";
    pub const TIME_MODEL: &str = "Zeitmodell";
    pub const EXPERIENCE_REQUIRED: &str = "Berufserfahrung_vorausgesetzt";
    pub const COMPANY_SIZE: &str = "Unternehmensgröße";
    pub const INDUSTRY: &str = "Kategorie";
    pub const POSITION: &str = "Position";
    pub const JOB_TITLE: &str = "Job_Titel";
    pub const COMPANY: &str = "Unternehmen";
}

/// A single cell read from the snapshot table.
///
/// SQLite is dynamically typed, so the reader hands every cell over in the
/// storage class it was found in and conversion happens here.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
}

impl FieldValue {
    /// Returns the value as trimmed, non-empty text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Real(f) if f.is_finite() => Some(f.to_string()),
            FieldValue::Real(_) => None,
        }
    }

    /// Interprets the value as a number. Yes/no words map to 1 and 0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Null => None,
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Real(f) if f.is_finite() => Some(*f),
            FieldValue::Real(_) => None,
            FieldValue::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" | "ja" | "yes" => Some(1.0),
                "false" | "nein" | "no" => Some(0.0),
                other => other.parse::<f64>().ok().filter(|f| f.is_finite()),
            },
        }
    }

    /// Interprets the value as a boolean flag. Non-zero numbers are true.
    pub fn as_flag(&self) -> Option<bool> {
        self.as_number().map(|n| n != 0.0)
    }

    /// Parses the value as a calendar date.
    ///
    /// Snapshots store `DD.MM.YYYY`; ISO dates and timestamps are accepted too.
    pub fn as_date(&self) -> Option<NaiveDate> {
        let text = self.as_text()?;
        NaiveDate::parse_from_str(&text, "%d.%m.%Y")
            .or_else(|_| NaiveDate::parse_from_str(&text, "%Y-%m-%d"))
            .or_else(|_| NaiveDate::parse_from_str(text.get(..10).unwrap_or(""), "%Y-%m-%d"))
            .ok()
    }
}

/// Company size category from the fixed, ordered vocabulary.
///
/// The derived `Ord` follows declaration order, which is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompanySize {
    #[serde(rename = "0-10")]
    UpTo10,
    #[serde(rename = "11-50")]
    UpTo50,
    #[serde(rename = "51-250")]
    UpTo250,
    #[serde(rename = "251-500")]
    UpTo500,
    #[serde(rename = "501-1000")]
    UpTo1000,
    #[serde(rename = "1001-2500")]
    UpTo2500,
    #[serde(rename = "2501-10000")]
    UpTo10000,
    #[serde(rename = "10000+")]
    Over10000,
    #[serde(rename = "Keine Angaben")]
    Unspecified,
}

impl CompanySize {
    /// All categories in display order.
    pub const ALL: [CompanySize; 9] = [
        CompanySize::UpTo10,
        CompanySize::UpTo50,
        CompanySize::UpTo250,
        CompanySize::UpTo500,
        CompanySize::UpTo1000,
        CompanySize::UpTo2500,
        CompanySize::UpTo10000,
        CompanySize::Over10000,
        CompanySize::Unspecified,
    ];

    /// The label stored in the snapshot.
    pub fn label(&self) -> &'static str {
        match self {
            CompanySize::UpTo10 => "0-10",
            CompanySize::UpTo50 => "11-50",
            CompanySize::UpTo250 => "51-250",
            CompanySize::UpTo500 => "251-500",
            CompanySize::UpTo1000 => "501-1000",
            CompanySize::UpTo2500 => "1001-2500",
            CompanySize::UpTo10000 => "2501-10000",
            CompanySize::Over10000 => "10000+",
            CompanySize::Unspecified => "Keine Angaben",
        }
    }

    /// Parses a stored label. Unknown labels yield `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use jobscope_core::CompanySize;
    ///
    /// assert_eq!(CompanySize::parse("51-250"), Some(CompanySize::UpTo250));
    /// assert_eq!(CompanySize::parse("huge"), None);
    /// ```
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|size| size.label() == label)
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse employment term offered to the user.
///
/// One coarse label maps to one or more stored `Beschäftigungsart` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentTerm {
    #[serde(rename = "befristet")]
    FixedTerm,
    #[serde(rename = "unbefristet")]
    Permanent,
}

impl EmploymentTerm {
    pub const ALL: [EmploymentTerm; 2] = [EmploymentTerm::FixedTerm, EmploymentTerm::Permanent];

    pub fn label(&self) -> &'static str {
        match self {
            EmploymentTerm::FixedTerm => "befristet",
            EmploymentTerm::Permanent => "unbefristet",
        }
    }

    /// Stored employment type values this term stands for.
    pub fn stored_labels(&self) -> &'static [&'static str] {
        match self {
            EmploymentTerm::FixedTerm => &["befristet"],
            EmploymentTerm::Permanent => &["Feste Anstellung"],
        }
    }

    pub fn matches(&self, stored: &str) -> bool {
        self.stored_labels().contains(&stored)
    }

    /// The coarse term a stored employment type belongs to, if any.
    pub fn from_stored(stored: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|term| term.matches(stored))
    }
}

impl FromStr for EmploymentTerm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "befristet" | "fixed-term" | "fixed_term" | "temporary" => {
                Ok(EmploymentTerm::FixedTerm)
            }
            "unbefristet" | "permanent" => Ok(EmploymentTerm::Permanent),
            other => Err(format!("unknown employment term: {}", other)),
        }
    }
}

/// Semantic group of a compensation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationGroup {
    Financial,
    WorkEnvironment,
    AdditionalBenefits,
}

impl CompensationGroup {
    pub const ALL: [CompensationGroup; 3] = [
        CompensationGroup::Financial,
        CompensationGroup::WorkEnvironment,
        CompensationGroup::AdditionalBenefits,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CompensationGroup::Financial => "Finanzielle Vergütung",
            CompensationGroup::WorkEnvironment => "Arbeitsumfeld",
            CompensationGroup::AdditionalBenefits => "Zusatzleistungen",
        }
    }

    /// Flags of this group in their canonical order.
    pub fn flags(&self) -> impl Iterator<Item = CompensationFlag> + '_ {
        CompensationFlag::ALL
            .into_iter()
            .filter(move |flag| flag.group() == *self)
    }
}

/// One of the fixed compensation and benefit attributes of an ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationFlag {
    CollectivePayScale,
    OvertimePay,
    SalaryIncreases,
    EquityOrProfitSharing,
    Bonuses,
    SpecialPayments,
    ThirteenthSalary,
    CompanyPension,
    FlexibleWorkModels,
    HomeOffice,
    WorkplaceEquipment,
    TrainingAndDevelopment,
    HealthAndWellbeing,
    FinancialPerks,
    Mobility,
    Meals,
    ExtraVacationDays,
    FamilySupport,
    OnboardingAndMentoring,
    TeamEvents,
}

impl CompensationFlag {
    pub const ALL: [CompensationFlag; 20] = [
        CompensationFlag::CollectivePayScale,
        CompensationFlag::OvertimePay,
        CompensationFlag::SalaryIncreases,
        CompensationFlag::EquityOrProfitSharing,
        CompensationFlag::Bonuses,
        CompensationFlag::SpecialPayments,
        CompensationFlag::ThirteenthSalary,
        CompensationFlag::CompanyPension,
        CompensationFlag::FlexibleWorkModels,
        CompensationFlag::HomeOffice,
        CompensationFlag::WorkplaceEquipment,
        CompensationFlag::TrainingAndDevelopment,
        CompensationFlag::HealthAndWellbeing,
        CompensationFlag::FinancialPerks,
        CompensationFlag::Mobility,
        CompensationFlag::Meals,
        CompensationFlag::ExtraVacationDays,
        CompensationFlag::FamilySupport,
        CompensationFlag::OnboardingAndMentoring,
        CompensationFlag::TeamEvents,
    ];

    /// Source column holding this flag.
    pub fn column(&self) -> &'static str {
        match self {
            CompensationFlag::CollectivePayScale => "Gehalt_anhand_von_Tarifklassen",
            CompensationFlag::OvertimePay => "Überstundenvergütung",
            CompensationFlag::SalaryIncreases => "Gehaltserhöhungen",
            CompensationFlag::EquityOrProfitSharing => "Aktienoptionen_Gewinnbeteiligung",
            CompensationFlag::Bonuses => "Boni",
            CompensationFlag::SpecialPayments => "Sonderzahlungen",
            CompensationFlag::ThirteenthSalary => "13. Gehalt",
            CompensationFlag::CompanyPension => "Betriebliche_Altersvorsorge",
            CompensationFlag::FlexibleWorkModels => "Flexible_Arbeitsmodelle",
            CompensationFlag::HomeOffice => "Homeoffice",
            CompensationFlag::WorkplaceEquipment => "Arbeitsumfeld_Ausstattung",
            CompensationFlag::TrainingAndDevelopment => {
                "Weiterbildung_und_Entwicklungsmöglichkeiten"
            }
            CompensationFlag::HealthAndWellbeing => "Gesundheit_und_Wohlbefinden",
            CompensationFlag::FinancialPerks => "Finanzielle_Vergünstigungen",
            CompensationFlag::Mobility => "Mobilitätsangebote",
            CompensationFlag::Meals => "Verpflegung",
            CompensationFlag::ExtraVacationDays => "Zusätzliche_Urlaubstage",
            CompensationFlag::FamilySupport => "Familien_Unterstützung",
            CompensationFlag::OnboardingAndMentoring => "Onboarding_und_Mentoring_Programme",
            CompensationFlag::TeamEvents => "Teamevents_Firmenfeiern",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            CompensationFlag::CollectivePayScale => "Gehalt nach Tarifklassen",
            CompensationFlag::OvertimePay => "Überstundenvergütung",
            CompensationFlag::SalaryIncreases => "Gehaltserhöhungen",
            CompensationFlag::EquityOrProfitSharing => "Aktienoptionen/Gewinnbeteiligung",
            CompensationFlag::Bonuses => "Boni",
            CompensationFlag::SpecialPayments => "Sonderzahlungen",
            CompensationFlag::ThirteenthSalary => "13. Gehalt",
            CompensationFlag::CompanyPension => "Betriebliche Altersvorsorge",
            CompensationFlag::FlexibleWorkModels => "Flexible Arbeitsmodelle",
            CompensationFlag::HomeOffice => "Homeoffice",
            CompensationFlag::WorkplaceEquipment => "Arbeitsumfeld Ausstattung",
            CompensationFlag::TrainingAndDevelopment => "Weiterbildung",
            CompensationFlag::HealthAndWellbeing => "Gesundheit & Wohlbefinden",
            CompensationFlag::FinancialPerks => "Finanzielle Vergünstigungen",
            CompensationFlag::Mobility => "Mobilitätsangebote",
            CompensationFlag::Meals => "Verpflegung",
            CompensationFlag::ExtraVacationDays => "Zusätzliche Urlaubstage",
            CompensationFlag::FamilySupport => "Familienunterstützung",
            CompensationFlag::OnboardingAndMentoring => "Onboarding/Mentoring",
            CompensationFlag::TeamEvents => "Teamevents/Firmenfeiern",
        }
    }

    pub fn group(&self) -> CompensationGroup {
        use CompensationFlag::*;
        match self {
            CollectivePayScale | OvertimePay | SalaryIncreases | EquityOrProfitSharing => {
                CompensationGroup::Financial
            }
            Bonuses | SpecialPayments | ThirteenthSalary | CompanyPension => {
                CompensationGroup::Financial
            }
            FlexibleWorkModels | HomeOffice | WorkplaceEquipment => {
                CompensationGroup::WorkEnvironment
            }
            _ => CompensationGroup::AdditionalBenefits,
        }
    }

    /// Looks a flag up by its source column name.
    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.column() == column)
    }
}

/// One job advertisement occurrence, as scraped from one portal.
///
/// `id` is shared by repeated sightings of the same ad, so it is not a row key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobAd {
    pub id: String,
    pub portal: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub date: Option<NaiveDate>,
    pub employment_type: Option<String>,
    pub time_model: Option<String>,
    pub experience_required: Option<bool>,
    pub company_size: Option<CompanySize>,
    pub industry: Option<String>,
    pub position: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    /// Compensation flag values on this row. Flags are usually 0/1 but are
    /// summed as numbers; zero values are not stored.
    #[serde(default)]
    pub compensation: BTreeMap<CompensationFlag, f64>,
}

impl JobAd {
    /// Builds a record from a row of named cells.
    ///
    /// Returns `None` when the row has no usable `MongoDB_ID`, since such a
    /// row can neither be deduplicated nor counted.
    pub fn from_row(row: &BTreeMap<String, FieldValue>) -> Option<Self> {
        let text = |column: &str| row.get(column).and_then(FieldValue::as_text);

        let id = text(columns::ID)?;

        let compensation = row
            .iter()
            .filter_map(|(column, value)| {
                let flag = CompensationFlag::from_column(column)?;
                value.as_number().filter(|n| *n != 0.0).map(|n| (flag, n))
            })
            .collect();

        Some(JobAd {
            id,
            portal: text(columns::PORTAL),
            country: text(columns::COUNTRY),
            region: text(columns::REGION),
            date: row.get(columns::DATE).and_then(FieldValue::as_date),
            employment_type: text(columns::EMPLOYMENT_TYPE),
            time_model: text(columns::TIME_MODEL),
            experience_required: row
                .get(columns::EXPERIENCE_REQUIRED)
                .and_then(FieldValue::as_flag),
            company_size: text(columns::COMPANY_SIZE).and_then(|s| CompanySize::parse(&s)),
            industry: text(columns::INDUSTRY),
            position: text(columns::POSITION),
            job_title: text(columns::JOB_TITLE),
            company: text(columns::COMPANY),
            compensation,
        })
    }

    /// Month bucket of the ad as `YYYY-MM`.
    pub fn month(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m").to_string())
    }

    /// Stored value of `flag`, 0 when unset.
    pub fn flag_value(&self, flag: CompensationFlag) -> f64 {
        self.compensation.get(&flag).copied().unwrap_or(0.0)
    }

    pub fn has_flag(&self, flag: CompensationFlag) -> bool {
        self.flag_value(flag) != 0.0
    }
}
