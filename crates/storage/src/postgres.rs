use async_trait::async_trait;
use futures_util::TryStreamExt;
use serde::de::DeserializeOwned;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};

use crate::{Collection, Collections, PersistenceAdapter, Record, Result};

/// Remote document database backed by PostgreSQL.
///
/// Each record is one JSONB document keyed by `(collection, id)`. Insertion
/// order is kept in `seq`, which an upsert of an existing record leaves as is.
#[derive(Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Creates a new adapter over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn load_collection<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        let sql = match collection {
            Collection::Sales => {
                "SELECT id, body FROM documents WHERE collection = $1 ORDER BY seq DESC"
            }
            _ => "SELECT id, body FROM documents WHERE collection = $1 ORDER BY seq ASC",
        };

        let mut rows = sqlx::query(sql).bind(collection.as_str()).fetch(&self.pool);
        let mut items = Vec::new();
        while let Some(row) = rows.try_next().await? {
            let id: String = row.try_get("id")?;
            let body: serde_json::Value = row.try_get("body")?;
            match serde_json::from_value(body) {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!(%collection, id = %id, error = %e, "skipping undecodable document");
                }
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl PersistenceAdapter for PostgresAdapter {
    fn name(&self) -> &'static str {
        "postgres"
    }

    #[tracing::instrument(skip(self))]
    async fn load(&self) -> Result<Collections> {
        Ok(Collections {
            products: self.load_collection(Collection::Products).await?,
            customers: self.load_collection(Collection::Customers).await?,
            sales: self.load_collection(Collection::Sales).await?,
        })
    }

    #[tracing::instrument(skip(self, record), fields(collection = %record.collection(), id = record.id()))]
    async fn save(&self, record: &Record) -> Result<()> {
        let body = record.to_json()?;

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, updated_at = now()
            "#,
        )
        .bind(record.collection().as_str())
        .bind(record.id())
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, collection: Collection, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
