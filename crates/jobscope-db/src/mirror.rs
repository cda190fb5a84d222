//! PostgreSQL mirror of the search-term list.
//!
//! The scraper reads its job titles from this table; each list is stored as
//! one row keyed by a document id.

use chrono::{DateTime, Utc};
use jobscope_core::config::DbConfig;
use jobscope_core::error::AppError;
use jobscope_core::terms::SearchTermList;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

/// Mirrored term list as stored upstream.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TermDocument {
    pub id: String,
    pub terms: Json<Vec<String>>,
    pub term_count: i32,
    pub updated_at: DateTime<Utc>,
}

impl TermDocument {
    pub fn term_list(&self) -> SearchTermList {
        SearchTermList::from_terms(self.terms.0.iter())
    }
}

/// Publishes the term list to PostgreSQL.
///
/// # Examples
///
/// ```no_run
/// use jobscope_core::{DbConfig, SearchTermList};
/// use jobscope_db::TermMirror;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = "postgresql://localhost/jobscope";
/// let mirror = TermMirror::connect(url, &DbConfig::default()).await?;
/// mirror.ensure_schema().await?;
/// let terms = SearchTermList::from_terms(["Data Engineer"]);
/// mirror.upload("current_job_titles", &terms).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TermMirror {
    pool: PgPool,
}

impl TermMirror {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, config: &DbConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Checks that the database answers.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS search_term_lists (
                id TEXT PRIMARY KEY,
                terms JSONB NOT NULL,
                term_count INTEGER NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or replaces the list stored under `document_id`.
    pub async fn upload(
        &self,
        document_id: &str,
        terms: &SearchTermList,
    ) -> Result<TermDocument, AppError> {
        let term_count = i32::try_from(terms.len())
            .map_err(|_| AppError::Generic(format!("too many terms: {}", terms.len())))?;

        let document: TermDocument = sqlx::query_as(
            r#"
            INSERT INTO search_term_lists (id, terms, term_count, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                terms = EXCLUDED.terms,
                term_count = EXCLUDED.term_count,
                updated_at = NOW()
            RETURNING id, terms, term_count, updated_at
            "#,
        )
        .bind(document_id)
        .bind(Json(terms.as_slice().to_vec()))
        .bind(term_count)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Mirrored {} terms to document {}",
            document.term_count, document.id
        );
        Ok(document)
    }

    /// Reads the list stored under `document_id`, if any.
    pub async fn fetch(&self, document_id: &str) -> Result<Option<TermDocument>, AppError> {
        let document = sqlx::query_as::<_, TermDocument>(
            "SELECT id, terms, term_count, updated_at FROM search_term_lists WHERE id = $1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }
}
