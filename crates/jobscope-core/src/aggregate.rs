//! Aggregations over a filtered [`AdTable`].
//!
//! Every function here is total: an empty table yields zero counts and empty
//! series, never a NaN.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::filter::FilterSelection;
use crate::geo::{expand_nationwide, RegionBoundaries};
use crate::models::{CompanySize, CompensationFlag, CompensationGroup};
use crate::table::AdTable;

/// Headline counts over deduplicated ads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Kpis {
    /// Distinct ad ids.
    pub total_ads: usize,
    /// Distinct job titles among the deduplicated ads.
    pub job_titles: usize,
    /// Distinct companies among the deduplicated ads.
    pub companies: usize,
}

pub fn kpis(table: &AdTable) -> Kpis {
    let unique = table.unique_ads();

    let job_titles: HashSet<&str> = unique
        .iter()
        .filter_map(|ad| ad.job_title.as_deref())
        .collect();
    let companies: HashSet<&str> = unique
        .iter()
        .filter_map(|ad| ad.company.as_deref())
        .collect();

    Kpis {
        total_ads: unique.len(),
        job_titles: job_titles.len(),
        companies: companies.len(),
    }
}

/// Ad counts per region, after nationwide expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionCounts {
    pub counts: BTreeMap<String, usize>,
}

impl RegionCounts {
    pub fn get(&self, region: &str) -> usize {
        self.counts.get(region).copied().unwrap_or(0)
    }

    pub fn max(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Colour-scale domain for a choropleth: `[0, max]`.
    pub fn color_domain(&self) -> (usize, usize) {
        (0, self.max())
    }

    /// Regions with a count but no boundary to draw them with.
    pub fn without_boundaries<'a>(&'a self, boundaries: &RegionBoundaries) -> Vec<&'a str> {
        self.counts
            .keys()
            .map(String::as_str)
            .filter(|name| !boundaries.contains(name))
            .collect()
    }
}

/// Counts filtered rows per region, expanding nationwide ads first.
///
/// Rows are not deduplicated, so an ad scraped twice in a region counts twice.
pub fn region_counts(table: &AdTable) -> RegionCounts {
    let mut counts = BTreeMap::new();
    for ad in expand_nationwide(table.ads()) {
        if let Some(region) = ad.region {
            *counts.entry(region).or_insert(0) += 1;
        }
    }
    RegionCounts { counts }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeBucket {
    pub size: CompanySize,
    pub count: usize,
}

/// Deduplicated ads per company size, in vocabulary order.
///
/// Categories with no ads are omitted.
pub fn company_size_histogram(table: &AdTable) -> Vec<SizeBucket> {
    let mut counts: BTreeMap<CompanySize, usize> = BTreeMap::new();
    for ad in table.unique_ads() {
        if let Some(size) = ad.company_size {
            *counts.entry(size).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|(size, count)| SizeBucket { size, count })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// Ads per day for one portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendSeries {
    pub portal: String,
    pub points: Vec<TrendPoint>,
}

/// Daily ad counts per portal, deduplicated by `(id, portal)`.
///
/// Days without ads are absent rather than zero. Series are ordered by
/// portal name, points by date.
pub fn trend(table: &AdTable) -> Vec<TrendSeries> {
    let mut grouped: BTreeMap<&str, BTreeMap<NaiveDate, usize>> = BTreeMap::new();
    for ad in table.unique_ads_per_portal() {
        if let (Some(portal), Some(date)) = (ad.portal.as_deref(), ad.date) {
            *grouped.entry(portal).or_default().entry(date).or_insert(0) += 1;
        }
    }

    grouped
        .into_iter()
        .map(|(portal, days)| TrendSeries {
            portal: portal.to_string(),
            points: days
                .into_iter()
                .map(|(date, count)| TrendPoint { date, count })
                .collect(),
        })
        .collect()
}

/// Share of ads offering one compensation attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompensationShare {
    pub flag: CompensationFlag,
    pub label: &'static str,
    pub group: CompensationGroup,
    /// Summed flag values per ad, as a percentage rounded to two decimals.
    /// Lies in `(0, 100]` when the flags are 0/1.
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompensationBreakdown {
    /// Number of deduplicated ads the percentages refer to.
    pub ads: usize,
    /// Non-zero shares, highest first.
    pub shares: Vec<CompensationShare>,
}

impl CompensationBreakdown {
    /// True when there is nothing to chart.
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

/// Percentage breakdown of the compensation flags over deduplicated ads.
///
/// Each flag's values are summed, not counted, so a stored `2` weighs twice
/// and a `0.5` half. Only flags whose column exists in the table are
/// considered, group by group. Zero percentages are dropped and the result is
/// sorted by percentage, descending; ties keep group then flag order.
pub fn compensation_breakdown(table: &AdTable) -> CompensationBreakdown {
    let unique = table.unique_ads();
    let ads = unique.len();
    let present = table.flag_columns();

    if ads == 0 || present.is_empty() {
        return CompensationBreakdown {
            ads,
            shares: Vec::new(),
        };
    }

    let mut shares = Vec::new();
    for group in CompensationGroup::ALL {
        for flag in group.flags().filter(|f| present.contains(f)) {
            let total: f64 = unique.iter().map(|ad| ad.flag_value(flag)).sum();
            let percentage = round2(total / ads as f64 * 100.0);
            if percentage > 0.0 {
                shares.push(CompensationShare {
                    flag,
                    label: flag.label(),
                    group,
                    percentage,
                });
            }
        }
    }

    shares.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

    CompensationBreakdown { ads, shares }
}

/// Rounds to two decimals, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Narrowing for one side of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideSelection {
    pub job_title: Option<String>,
    pub company: Option<String>,
}

impl SideSelection {
    /// The global selection with this side's job title and company applied.
    pub fn merged_with(&self, base: &FilterSelection) -> FilterSelection {
        let mut selection = base.clone();
        selection.job_title = self.job_title.clone();
        selection.company = self.company.clone();
        selection
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SideReport {
    pub ads: usize,
    pub breakdown: CompensationBreakdown,
}

/// Two market segments side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comparison {
    pub left: SideReport,
    pub right: SideReport,
}

/// Compares the compensation profile of two segments under a shared selection.
pub fn compare(
    table: &AdTable,
    base: &FilterSelection,
    left: &SideSelection,
    right: &SideSelection,
) -> Comparison {
    let report = |side: &SideSelection| {
        let filtered = side.merged_with(base).apply(table);
        let breakdown = compensation_breakdown(&filtered);
        SideReport {
            ads: breakdown.ads,
            breakdown,
        }
    };

    Comparison {
        left: report(left),
        right: report(right),
    }
}
