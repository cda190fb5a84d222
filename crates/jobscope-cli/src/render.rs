//! Plain-text rendering of analysis results.
//!
//! Renderers write to any `io::Write` and pass write errors back to the caller.

use jobscope_core::{
    Comparison, CompensationBreakdown, Dimension, FilterOptions, Kpis, RefreshReport,
    RegionCounts, SearchTermList, SizeBucket, SnapshotOutcome, TrendSeries,
};
use std::io::{self, Write};
use std::path::Path;

const BAR_WIDTH: usize = 30;
const NO_MATCHES: &str = "No job advertisements match the current filters.";

/// Create a visual bar for `value` relative to `max`
pub fn create_bar(value: f64, max: f64, width: usize) -> String {
    let filled = if max > 0.0 {
        ((value / max) * width as f64).round().clamp(0.0, width as f64) as usize
    } else {
        0
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Truncate text to a maximum number of characters, adding ellipsis if needed
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.chars().count() <= max_len {
        cleaned
    } else {
        let head: String = cleaned.chars().take(max_len).collect();
        format!("{}...", head)
    }
}

pub fn summary(out: &mut dyn Write, kpis: &Kpis) -> io::Result<()> {
    writeln!(out, "\n📊 Job Market Summary\n")?;
    writeln!(out, "  Job ads:               {}", kpis.total_ads)?;
    writeln!(out, "  Distinct job titles:   {}", kpis.job_titles)?;
    writeln!(out, "  Distinct companies:    {}", kpis.companies)
}

/// Regions ordered by count, highest first.
pub fn regions(
    out: &mut dyn Write,
    counts: &RegionCounts,
    without_boundaries: &[&str],
) -> io::Result<()> {
    if counts.counts.is_empty() {
        return writeln!(out, "{}", NO_MATCHES);
    }

    let mut rows: Vec<(&String, &usize)> = counts.counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let max = counts.max() as f64;
    writeln!(
        out,
        "\n🗺  Job ads per federal state (scale 0-{})\n",
        counts.max()
    )?;
    for (region, count) in rows {
        writeln!(
            out,
            "  {:<24} {} {}",
            region,
            create_bar(*count as f64, max, BAR_WIDTH),
            count
        )?;
    }

    if !without_boundaries.is_empty() {
        let missing = without_boundaries.join(", ");
        writeln!(out, "\n  No boundary data for: {}", missing)?;
    }
    Ok(())
}

pub fn sizes(out: &mut dyn Write, buckets: &[SizeBucket]) -> io::Result<()> {
    if buckets.is_empty() {
        return writeln!(out, "{}", NO_MATCHES);
    }

    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    writeln!(out, "\n🏢 Job ads by company size\n")?;
    for bucket in buckets {
        writeln!(
            out,
            "  {:<14} {} {}",
            bucket.size.label(),
            create_bar(bucket.count as f64, max, BAR_WIDTH),
            bucket.count
        )?;
    }
    Ok(())
}

pub fn trend(out: &mut dyn Write, series: &[TrendSeries]) -> io::Result<()> {
    if series.is_empty() {
        return writeln!(out, "{}", NO_MATCHES);
    }

    writeln!(out, "\n📈 Job ads per day and portal")?;
    for line in series {
        let total: usize = line.points.iter().map(|p| p.count).sum();
        writeln!(out, "\n  {} ({} ads)", line.portal, total)?;
        for point in &line.points {
            let date = point.date.format("%d.%m.%Y");
            writeln!(out, "    {}  {:>5}", date, point.count)?;
        }
    }
    Ok(())
}

pub fn compensation(out: &mut dyn Write, breakdown: &CompensationBreakdown) -> io::Result<()> {
    if breakdown.is_empty() {
        return writeln!(out, "No compensation data for the current filters.");
    }

    writeln!(out, "\n💶 Benefits offered ({} ads)\n", breakdown.ads)?;
    for share in &breakdown.shares {
        writeln!(
            out,
            "  {:<36} {:>6.2}%  {} [{}]",
            share.label,
            share.percentage,
            create_bar(share.percentage, 100.0, 20),
            share.group.label()
        )?;
    }
    Ok(())
}

pub fn options(
    out: &mut dyn Write,
    options: &FilterOptions,
    only: Option<Dimension>,
) -> io::Result<()> {
    let dimensions: Vec<Dimension> = match only {
        Some(dimension) => vec![dimension],
        None => Dimension::ALL.to_vec(),
    };

    for dimension in dimensions {
        let values = options.get(dimension);
        writeln!(out, "\n{} ({})", dimension, values.len())?;
        for value in values {
            writeln!(out, "  • {}", truncate_text(value, 80))?;
        }
    }
    Ok(())
}

pub fn comparison(
    out: &mut dyn Write,
    report: &Comparison,
    left: &str,
    right: &str,
) -> io::Result<()> {
    for (label, side) in [(left, &report.left), (right, &report.right)] {
        writeln!(out, "\n⚖  {} ({} ads)", label, side.ads)?;
        if side.breakdown.is_empty() {
            writeln!(out, "  No compensation data.")?;
            continue;
        }
        for share in &side.breakdown.shares {
            writeln!(out, "  {:<36} {:>6.2}%", share.label, share.percentage)?;
        }
    }
    Ok(())
}

pub fn terms(out: &mut dyn Write, list: &SearchTermList) -> io::Result<()> {
    if list.is_empty() {
        return writeln!(out, "No search terms defined.");
    }

    for (index, term) in list.iter().enumerate() {
        writeln!(out, "{:>3}. {}", index, term)?;
    }
    Ok(())
}

pub fn refresh(out: &mut dyn Write, report: &RefreshReport, path: &Path) -> io::Result<()> {
    let verb = match report.outcome {
        SnapshotOutcome::Created => "Downloaded new snapshot to",
        SnapshotOutcome::Updated => "Updated snapshot at",
        SnapshotOutcome::Unchanged => "Snapshot unchanged at",
    };
    writeln!(
        out,
        "{} {} ({} bytes, sha256 {})",
        verb,
        path.display(),
        report.bytes,
        &report.hash[..report.hash.len().min(12)]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscope_core::{CompanySize, CompensationFlag, CompensationGroup, CompensationShare};
    use std::collections::BTreeMap;

    fn rendered(render: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        render(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    /// Accepts nothing, like a closed pipe.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_create_bar() {
        assert_eq!(create_bar(5.0, 10.0, 4), "██░░");
        assert_eq!(create_bar(3.0, 0.0, 3), "░░░");
        assert_eq!(create_bar(20.0, 10.0, 2), "██");
    }

    #[test]
    fn test_truncate_text_respects_characters() {
        let title = "Gesundheits-  und\nKrankenpfleger";
        assert_eq!(truncate_text(title, 100), "Gesundheits- und Krankenpfleger");
        assert_eq!(truncate_text("Größenordnung", 4), "Größ...");
    }

    #[test]
    fn test_regions_sorted_by_count() {
        let counts = RegionCounts {
            counts: BTreeMap::from([
                ("Berlin".to_string(), 2),
                ("Bayern".to_string(), 5),
                ("Wien".to_string(), 1),
            ]),
        };
        let text = rendered(|out| regions(out, &counts, &["Wien"]));
        let bayern = text.find("Bayern").unwrap();
        let berlin = text.find("Berlin").unwrap();
        assert!(bayern < berlin);
        assert!(text.contains("No boundary data for: Wien"));
        assert!(text.contains("scale 0-5"));
    }

    #[test]
    fn test_empty_results_explain_themselves() {
        let no_regions = rendered(|out| regions(out, &RegionCounts::default(), &[]));
        assert!(no_regions.contains("No job advertisements"));
        assert!(rendered(|out| sizes(out, &[])).contains("No job advertisements"));

        let breakdown = CompensationBreakdown::default();
        let no_benefits = rendered(|out| compensation(out, &breakdown));
        assert!(no_benefits.contains("No compensation data"));

        let no_terms = rendered(|out| terms(out, &SearchTermList::new()));
        assert_eq!(no_terms, "No search terms defined.\n");
    }

    #[test]
    fn test_sizes_and_compensation() {
        let buckets = [SizeBucket {
            size: CompanySize::UpTo50,
            count: 3,
        }];
        assert!(rendered(|out| sizes(out, &buckets)).contains("11-50"));

        let breakdown = CompensationBreakdown {
            ads: 4,
            shares: vec![CompensationShare {
                flag: CompensationFlag::HomeOffice,
                label: "Homeoffice",
                group: CompensationGroup::WorkEnvironment,
                percentage: 75.0,
            }],
        };
        let text = rendered(|out| compensation(out, &breakdown));
        assert!(text.contains("75.00%"));
        assert!(text.contains("Arbeitsumfeld"));
    }

    #[test]
    fn test_terms_are_numbered_from_zero() {
        let list = SearchTermList::from_terms(["Koch", "Bäcker"]);
        let text = rendered(|out| terms(out, &list));
        assert_eq!(text, "  0. Koch\n  1. Bäcker\n");
    }

    #[test]
    fn test_write_errors_are_returned() {
        let list = SearchTermList::from_terms(["Koch"]);
        let err = terms(&mut ClosedPipe, &list).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let kpis = Kpis::default();
        assert!(summary(&mut ClosedPipe, &kpis).is_err());
    }
}
