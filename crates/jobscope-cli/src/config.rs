use clap::{Args, Parser, Subcommand, ValueEnum};
use jobscope_core::{Dimension, FilterSelection};
use std::path::PathBuf;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "jobscope")]
#[command(author, version, about = "Analytics for scraped job advertisements")]
#[command(after_help = "Examples:
  jobscope fetch
  jobscope summary --portal stepstone --month 2025-05
  jobscope map --region Bayern --geojson bundeslaender.geojson
  jobscope compare --left-title \"Data Engineer\" --right-title \"Data Scientist\"
  jobscope terms add \"Pflegefachkraft\"")]
pub struct Config {
    /// Path to the configuration file
    #[arg(long, global = true, env = "JOBSCOPE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Local snapshot file, overriding the configured path
    #[arg(long, global = true, env = "JOBSCOPE_SNAPSHOT", value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download the published snapshot if it changed
    #[command(after_help = "Examples:
  jobscope fetch
  jobscope fetch --force
  jobscope fetch --url https://example.org/job_analysis.db")]
    Fetch {
        /// Rewrite the local file even if the content is unchanged
        #[arg(long)]
        force: bool,
        /// Download from this URL instead of the configured one
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
    /// Show deduplicated ad, job title and company counts
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show ad counts per federal state
    Map {
        #[command(flatten)]
        filters: FilterArgs,
        /// GeoJSON file with region boundaries, overriding the configured one
        #[arg(long, value_name = "PATH")]
        geojson: Option<PathBuf>,
    },
    /// Show the company-size histogram
    Sizes {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show daily ad counts per portal
    Trend {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show how often each benefit is offered
    Compensation {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List the values still selectable for each filter
    Options {
        #[command(flatten)]
        filters: FilterArgs,
        /// Only show this dimension (e.g. portal, company-size)
        #[arg(long, value_name = "DIMENSION")]
        dimension: Option<Dimension>,
    },
    /// Compare the benefits of two job titles or companies
    #[command(after_help = "Example: jobscope compare --left-company ACME --right-company Initech")]
    Compare {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_name = "TITLE")]
        left_title: Option<String>,
        #[arg(long, value_name = "COMPANY")]
        left_company: Option<String>,
        #[arg(long, value_name = "TITLE")]
        right_title: Option<String>,
        #[arg(long, value_name = "COMPANY")]
        right_company: Option<String>,
    },
    /// Manage the search terms handed to the scraper
    Terms {
        #[command(subcommand)]
        action: TermsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TermsAction {
    /// Print the current terms
    List,
    /// Append one or more terms
    Add {
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Remove a term by value or by position
    Remove {
        #[arg(required_unless_present = "index", conflicts_with = "index")]
        term: Option<String>,
        /// Zero-based position in the list
        #[arg(long)]
        index: Option<usize>,
    },
    /// Remove every term
    Clear,
    /// Publish the list to the PostgreSQL mirror
    Upload {
        /// PostgreSQL database connection URL
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Filter flags shared by every analysis command.
///
/// Repeatable flags accept several values; the rest take one.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long = "portal", value_name = "NAME")]
    pub portals: Vec<String>,
    #[arg(long = "region", value_name = "STATE")]
    pub regions: Vec<String>,
    /// Month as YYYY-MM
    #[arg(long = "month", value_name = "YYYY-MM")]
    pub months: Vec<String>,
    #[arg(long = "industry", value_name = "NAME")]
    pub industries: Vec<String>,
    #[arg(long = "position", value_name = "NAME")]
    pub positions: Vec<String>,
    /// Company size category, e.g. 51-250
    #[arg(long = "company-size", value_name = "SIZE")]
    pub company_sizes: Vec<String>,
    /// befristet or unbefristet
    #[arg(long, value_name = "TERM")]
    pub employment: Option<String>,
    #[arg(long, value_name = "MODEL")]
    pub time_model: Option<String>,
    /// Whether experience is required (yes/no)
    #[arg(long, value_name = "BOOL")]
    pub experience: Option<String>,
    #[arg(long, value_name = "TITLE")]
    pub job_title: Option<String>,
    #[arg(long, value_name = "COMPANY")]
    pub company: Option<String>,
}

impl FilterArgs {
    /// Builds the selection; malformed values impose no constraint.
    pub fn to_selection(&self) -> FilterSelection {
        let mut selection = FilterSelection::new();

        let multi = [
            (Dimension::Portal, &self.portals),
            (Dimension::Region, &self.regions),
            (Dimension::Month, &self.months),
            (Dimension::Industry, &self.industries),
            (Dimension::Position, &self.positions),
            (Dimension::CompanySize, &self.company_sizes),
        ];
        for (dimension, values) in multi {
            for value in values {
                selection.add_value(dimension, value);
            }
        }

        let single = [
            (Dimension::EmploymentType, &self.employment),
            (Dimension::TimeModel, &self.time_model),
            (Dimension::ExperienceRequired, &self.experience),
            (Dimension::JobTitle, &self.job_title),
            (Dimension::Company, &self.company),
        ];
        for (dimension, value) in single {
            if let Some(value) = value {
                selection.add_value(dimension, value);
            }
        }

        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscope_core::{CompanySize, EmploymentTerm};

    #[test]
    fn test_parse_filters() {
        let config = Config::try_parse_from([
            "jobscope",
            "summary",
            "--portal",
            "stepstone",
            "--portal",
            "indeed",
            "--company-size",
            "51-250",
            "--employment",
            "unbefristet",
            "--experience",
            "no",
        ])
        .unwrap();

        let Command::Summary { filters } = config.command else {
            panic!("expected summary");
        };
        let selection = filters.to_selection();
        assert_eq!(selection.portals.len(), 2);
        assert!(selection.company_sizes.contains(&CompanySize::UpTo250));
        assert_eq!(selection.employment, Some(EmploymentTerm::Permanent));
        assert_eq!(selection.experience_required, Some(false));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let config =
            Config::try_parse_from(["jobscope", "sizes", "--format", "json", "-v"]).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.verbose);
    }

    #[test]
    fn test_malformed_filter_is_ignored() {
        let args = ["jobscope", "trend", "--month", "5", "--company-size", "xl"];
        let config = Config::try_parse_from(args).unwrap();
        let Command::Trend { filters } = config.command else {
            panic!("expected trend");
        };
        assert!(filters.to_selection().is_empty());
    }

    #[test]
    fn test_options_dimension_argument() {
        let config =
            Config::try_parse_from(["jobscope", "options", "--dimension", "company-size"]).unwrap();
        let Command::Options { dimension, .. } = config.command else {
            panic!("expected options");
        };
        assert_eq!(dimension, Some(Dimension::CompanySize));
    }

    #[test]
    fn test_terms_remove_requires_term_or_index() {
        assert!(Config::try_parse_from(["jobscope", "terms", "remove"]).is_err());
        assert!(Config::try_parse_from(["jobscope", "terms", "remove", "--index", "2"]).is_ok());
        assert!(Config::try_parse_from(["jobscope", "terms", "remove", "Koch"]).is_ok());
    }
}
