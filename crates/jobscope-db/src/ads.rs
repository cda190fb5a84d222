//! Reader for the `job_analysis` table of a downloaded SQLite snapshot.
//!
//! The snapshot is produced by an external pipeline and its schema drifts, so
//! columns are discovered at load time rather than bound to a struct.

use jobscope_core::error::AppError;
use jobscope_core::models::{FieldValue, JobAd};
use jobscope_core::table::{AdTable, DataState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Read-only access to the job advertisement snapshot.
///
/// # Examples
///
/// ```no_run
/// use jobscope_db::AdRepository;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = AdRepository::open(Path::new("job_analysis.db"), "job_analysis").await?;
/// let table = repo.load_table().await?;
/// println!("{} rows", table.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdRepository {
    pool: SqlitePool,
    table: String,
}

impl AdRepository {
    /// Wraps an existing pool. `table` must be a plain identifier.
    pub fn new(pool: SqlitePool, table: &str) -> Self {
        Self {
            pool,
            table: table.to_string(),
        }
    }

    /// Opens the snapshot file read-only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::DataUnavailable` if the file does not exist.
    pub async fn open(path: &Path, table: &str) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::DataUnavailable(format!(
                "snapshot not found at {}",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool, table))
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Column names of the snapshot table, in table order.
    pub async fn columns(&self) -> Result<Vec<String>, AppError> {
        let names: Vec<(String,)> = sqlx::query_as("SELECT name FROM pragma_table_info(?1)")
            .bind(&self.table)
            .fetch_all(&self.pool)
            .await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    /// Loads the whole table into memory (`SELECT *`).
    ///
    /// Rows without an ad id are skipped with a warning.
    pub async fn load_table(&self) -> Result<AdTable, AppError> {
        let query = format!("SELECT * FROM {}", self.table);
        let rows: Vec<SqliteRow> = sqlx::query(&query).fetch_all(&self.pool).await?;
        let columns = self.columns().await?;

        let mut ads = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for row in &rows {
            match JobAd::from_row(&read_cells(row)) {
                Some(ad) => ads.push(ad),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("Skipped {} rows without an ad id", skipped);
        }
        info!(
            "Loaded {} rows ({} columns) from {}",
            ads.len(),
            columns.len(),
            self.table
        );

        Ok(AdTable::new(ads, columns))
    }

    /// Loads the table, turning any failure into the "no data" state.
    pub async fn load_state(&self) -> DataState {
        DataState::from_result(self.load_table().await)
    }
}

fn read_cells(row: &SqliteRow) -> BTreeMap<String, FieldValue> {
    row.columns()
        .iter()
        .map(|column| {
            let value = read_cell(row, column.ordinal());
            (column.name().to_string(), value)
        })
        .collect()
}

/// Decodes a cell by its SQLite storage class. BLOBs are treated as null.
fn read_cell(row: &SqliteRow, index: usize) -> FieldValue {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map_or(FieldValue::Null, FieldValue::Integer);
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map_or(FieldValue::Null, FieldValue::Real);
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.map_or(FieldValue::Null, FieldValue::Text);
    }
    FieldValue::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscope_core::{CompanySize, CompensationFlag};

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    async fn seeded_repository() -> AdRepository {
        let pool = memory_pool().await;
        sqlx::query(
            r#"
            CREATE TABLE job_analysis (
                "MongoDB_ID" TEXT,
                "Portal_Name" TEXT,
                "Bundesland" TEXT,
                "Datum" TEXT,
                "Unternehmensgröße" TEXT,
                "Berufserfahrung_vorausgesetzt" INTEGER,
                "Homeoffice" REAL,
                "Boni" INTEGER
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            r#"
            INSERT INTO job_analysis VALUES
                ('a1', 'stepstone', 'Bayern', '14.05.2025', '51-250', 1, 1.0, 0),
                ('a1', 'indeed', 'bundesweit', '15.05.2025', 'gigantic', 0, NULL, 1),
                (NULL, 'xing', 'Berlin', '16.05.2025', '0-10', 0, 0.0, 0)
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        AdRepository::new(pool, "job_analysis")
    }

    #[tokio::test]
    async fn test_load_table_maps_rows() {
        let repo = seeded_repository().await;
        let table = repo.load_table().await.unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.has_column("Homeoffice"));
        assert!(!table.has_column("Kategorie"));

        let first = &table.ads()[0];
        assert_eq!(first.id, "a1");
        assert_eq!(first.region.as_deref(), Some("Bayern"));
        assert_eq!(first.company_size, Some(CompanySize::UpTo250));
        assert_eq!(first.experience_required, Some(true));
        assert!(first.has_flag(CompensationFlag::HomeOffice));
        assert!(!first.has_flag(CompensationFlag::Bonuses));
        assert_eq!(first.month().as_deref(), Some("2025-05"));

        let second = &table.ads()[1];
        assert_eq!(second.company_size, None);
        assert!(second.has_flag(CompensationFlag::Bonuses));
        assert!(!second.has_flag(CompensationFlag::HomeOffice));
    }

    #[tokio::test]
    async fn test_columns_follow_table_order() {
        let repo = seeded_repository().await;
        let columns = repo.columns().await.unwrap();
        assert_eq!(columns.first().map(String::as_str), Some("MongoDB_ID"));
        assert_eq!(columns.len(), 8);
    }

    #[tokio::test]
    async fn test_missing_table_is_unavailable() {
        let repo = AdRepository::new(memory_pool().await, "job_analysis");
        assert!(matches!(
            repo.load_table().await,
            Err(AppError::DatabaseError(_))
        ));
        assert!(repo.load_state().await.table().is_none());
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AdRepository::open(&dir.path().join("absent.db"), "job_analysis").await;
        assert!(matches!(result, Err(AppError::DataUnavailable(_))));
    }
}
