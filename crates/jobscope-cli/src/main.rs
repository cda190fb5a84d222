use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use jobscope_cli::{render, Command, Config, FilterArgs, OutputFormat, TermsAction};
use jobscope_client::SnapshotClient;
use jobscope_core::{
    aggregate, load_config, AdTable, AppError, DashboardConfig, DataState, FilterOptions,
    RegionBoundaries, SearchTermList, SideSelection,
};
use jobscope_db::{AdRepository, TermFileStore, TermMirror};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Parse command line arguments
    let config = Config::parse();

    // Setup logging (stderr to keep stdout clean for JSON output)
    let level = if config.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match run(config).await {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<AppError>() {
            Some(app_error) => {
                eprintln!("\n❌ {}\n", app_error.user_message());
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let mut settings =
        load_config(config.config.as_deref()).context("Failed to load configuration")?;
    if let Some(snapshot) = &config.snapshot {
        settings.source.snapshot_path = snapshot.clone();
    }
    let format = config.format;

    match config.command {
        Command::Fetch { force, url } => {
            fetch(&settings, url.as_deref(), force, format).await?;
        }
        Command::Summary { filters } => {
            let table = filtered_table(&settings, &filters).await?;
            let kpis = aggregate::kpis(&table);
            emit(format, &kpis, |out| render::summary(out, &kpis))?;
        }
        Command::Map { filters, geojson } => {
            let table = filtered_table(&settings, &filters).await?;
            let geojson = geojson.or_else(|| settings.source.geojson_path.clone());
            show_map(&table, geojson.as_deref(), format)?;
        }
        Command::Sizes { filters } => {
            let table = filtered_table(&settings, &filters).await?;
            let buckets = aggregate::company_size_histogram(&table);
            emit(format, &buckets, |out| render::sizes(out, &buckets))?;
        }
        Command::Trend { filters } => {
            let table = filtered_table(&settings, &filters).await?;
            let series = aggregate::trend(&table);
            emit(format, &series, |out| render::trend(out, &series))?;
        }
        Command::Compensation { filters } => {
            let table = filtered_table(&settings, &filters).await?;
            let breakdown = aggregate::compensation_breakdown(&table);
            emit(format, &breakdown, |out| {
                render::compensation(out, &breakdown)
            })?;
        }
        Command::Options { filters, dimension } => {
            let table = load_table(&settings).await?;
            let options = FilterOptions::compute(&table, &filters.to_selection());
            match dimension {
                Some(d) => emit(format, options.get(d), |out| {
                    render::options(out, &options, Some(d))
                })?,
                None => emit(format, &options, |out| render::options(out, &options, None))?,
            }
        }
        Command::Compare {
            filters,
            left_title,
            left_company,
            right_title,
            right_company,
        } => {
            let left = SideSelection {
                job_title: left_title,
                company: left_company,
            };
            let right = SideSelection {
                job_title: right_title,
                company: right_company,
            };
            let table = load_table(&settings).await?;
            let report = aggregate::compare(&table, &filters.to_selection(), &left, &right);
            let (left, right) = (side_label(&left), side_label(&right));
            emit(format, &report, |out| {
                render::comparison(out, &report, &left, &right)
            })?;
        }
        Command::Terms { action } => {
            manage_terms(&settings, action, format).await?;
        }
    }

    Ok(())
}

/// Print `value` as JSON, or the text rendering
fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            writeln!(stdout, "{}", json)?;
        }
        OutputFormat::Text => text(&mut stdout)?,
    }
    stdout.flush()?;
    Ok(())
}

/// Download the snapshot and replace the local copy if it changed
async fn fetch(
    settings: &DashboardConfig,
    url: Option<&str>,
    force: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let url = url.unwrap_or(&settings.source.snapshot_url);
    let path = &settings.source.snapshot_path;
    info!("Fetching snapshot from {}", url);

    let client = SnapshotClient::new(url, &settings.http)?;
    let report = client.refresh(path, force).await?;

    emit(format, &report, |out| render::refresh(out, &report, path))
}

/// Load the snapshot table, reporting the "no data" state as an error
async fn load_table(settings: &DashboardConfig) -> anyhow::Result<AdTable> {
    let source = &settings.source;
    debug!("Opening snapshot {}", source.snapshot_path.display());

    let state = match AdRepository::open(&source.snapshot_path, &source.table_name).await {
        Ok(repo) => repo.load_state().await,
        Err(e) => DataState::from_result(Err(e)),
    };

    if let DataState::Unavailable(reason) = &state {
        warn!("Job advertisement data unavailable: {}", reason);
    }
    Ok(state.into_table()?)
}

async fn filtered_table(
    settings: &DashboardConfig,
    filters: &FilterArgs,
) -> anyhow::Result<AdTable> {
    let table = load_table(settings).await?;
    let selection = filters.to_selection();
    let filtered = table.filter(&selection);
    debug!(
        "{} of {} rows match {} active filters",
        filtered.len(),
        table.len(),
        selection.active_dimensions().len()
    );
    Ok(filtered)
}

/// Show regional counts, joined with boundaries when available
fn show_map(table: &AdTable, geojson: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let counts = aggregate::region_counts(table);

    let boundaries = match geojson {
        Some(path) => {
            let context = || format!("Failed to load boundaries from {}", path.display());
            Some(RegionBoundaries::load(path).with_context(context)?)
        }
        None => None,
    };
    let without_boundaries = boundaries
        .as_ref()
        .map(|b| counts.without_boundaries(b))
        .unwrap_or_default();

    let (min, max) = counts.color_domain();
    let json = serde_json::json!({
        "counts": counts.counts,
        "color_domain": [min, max],
        "without_boundaries": without_boundaries,
    });
    emit(format, &json, |out| {
        render::regions(out, &counts, &without_boundaries)
    })
}

fn side_label(side: &SideSelection) -> String {
    match (&side.job_title, &side.company) {
        (Some(title), Some(company)) => format!("{} @ {}", title, company),
        (Some(title), None) => title.clone(),
        (None, Some(company)) => company.clone(),
        (None, None) => "All ads".to_string(),
    }
}

/// Edit the local term list, or publish it upstream
async fn manage_terms(
    settings: &DashboardConfig,
    action: TermsAction,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let store = TermFileStore::new(settings.terms.path.clone());
    let mut list = store.load()?;

    match action {
        TermsAction::List => {}
        TermsAction::Add { terms } => {
            for term in &terms {
                if !list.add(term) {
                    warn!("Skipping blank or duplicate term: {:?}", term);
                }
            }
            store.save(&list)?;
        }
        TermsAction::Remove { term, index } => {
            let removed = match (term, index) {
                (Some(term), _) => list.remove(&term).then_some(term),
                (None, Some(index)) => list.remove_at(index),
                (None, None) => None,
            };
            match removed {
                Some(term) => {
                    info!("Removed term {:?}", term);
                    store.save(&list)?;
                }
                None => anyhow::bail!("No such term in {}", store.path().display()),
            }
        }
        TermsAction::Clear => {
            list.clear();
            store.save(&list)?;
        }
        TermsAction::Upload { database_url } => {
            upload_terms(settings, &database_url, &list).await?;
            return Ok(());
        }
    }

    emit(format, &list, |out| render::terms(out, &list))
}

async fn upload_terms(
    settings: &DashboardConfig,
    database_url: &str,
    list: &SearchTermList,
) -> anyhow::Result<()> {
    info!("Connecting to database...");
    let mirror = TermMirror::connect(database_url, &settings.db)
        .await
        .context("Failed to connect to database")?;
    mirror.ping().await?;
    mirror.ensure_schema().await?;

    let document = mirror.upload(&settings.terms.document_id, list).await?;
    println!(
        "✓ Uploaded {} terms to '{}' at {}",
        document.term_count,
        document.id,
        document.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}
