//! Direct PostgreSQL access to the same relational schema
//!
//! The composed read is built with JSONB aggregation so the payload matches
//! the REST gateway's embedding output row for row.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{Document, OpportunityRow, OpportunityStatus, Review};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{OpportunityQuery, RemoteStore};
use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Composed read: one JSONB object per opportunity, newest first
pub const COMPOSED_READ_SQL: &str = r#"
    SELECT to_jsonb(o)
        || jsonb_build_object(
            'documents', COALESCE((
                SELECT jsonb_agg(to_jsonb(d) ORDER BY d.created_at DESC)
                FROM contract_farming_documents d
                WHERE d.opportunity_id = o.id
            ), '[]'::jsonb),
            'reviews', COALESCE((
                SELECT jsonb_agg(
                    to_jsonb(r) || jsonb_build_object(
                        'profile',
                        CASE WHEN p.id IS NULL THEN NULL
                             ELSE jsonb_build_object(
                                 'id', p.id,
                                 'full_name', p.full_name,
                                 'avatar_url', p.avatar_url)
                        END)
                    ORDER BY r.created_at DESC)
                FROM contract_farming_reviews r
                LEFT JOIN profiles p ON p.id = r.reviewer_id
                WHERE r.opportunity_id = o.id
            ), '[]'::jsonb)
        ) AS record
    FROM contract_farming_opportunities o
    WHERE ($1::uuid IS NULL OR o.id = $1)
      AND ($2::text IS NULL OR o.status = $2)
    ORDER BY o.created_at DESC, o.id DESC
    LIMIT $3 OFFSET $4
"#;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PostgresStore {
    db: PgPool,
}

impl PostgresStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open a connection pool
    pub async fn connect(config: &DatabaseConfig, acquire_timeout: Duration) -> AppResult<Self> {
        tracing::info!("Connecting to database...");
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(acquire_timeout)
            .connect(&config.url)
            .await?;
        tracing::info!("Database connection established");
        Ok(Self { db })
    }

    /// Apply bundled schema migrations
    pub async fn migrate(&self) -> AppResult<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .map_err(|e| AppError::Configuration(format!("Migration failed: {}", e)))?;
        tracing::info!("Migrations completed");
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for PostgresStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_opportunities(&self, query: &OpportunityQuery) -> AppResult<Value> {
        tracing::debug!(?query, "Fetching opportunities from database");
        let records = sqlx::query_scalar::<_, Value>(COMPOSED_READ_SQL)
            .bind(query.opportunity_id)
            .bind(query.status.map(|s| s.as_str()))
            .bind(i64::from(query.page.limit))
            .bind(i64::from(query.page.offset))
            .fetch_all(&self.db)
            .await?;

        Ok(Value::Array(records))
    }

    async fn insert_opportunity(&self, row: &OpportunityRow) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contract_farming_opportunities (
                id, title, description, company_name, location, crop_type,
                contract_duration, requirements, benefits, contact_person,
                contact_email, contact_phone, price_per_unit, minimum_quantity,
                maximum_quantity, unit, status, created_by, created_at,
                updated_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21)
            "#,
        )
        .bind(row.id)
        .bind(&row.title)
        .bind(&row.description)
        .bind(&row.company_name)
        .bind(&row.location)
        .bind(&row.crop_type)
        .bind(&row.contract_duration)
        .bind(&row.requirements)
        .bind(&row.benefits)
        .bind(&row.contact_person)
        .bind(&row.contact_email)
        .bind(&row.contact_phone)
        .bind(row.price_per_unit)
        .bind(row.minimum_quantity)
        .bind(row.maximum_quantity)
        .bind(&row.unit)
        .bind(row.status.as_str())
        .bind(row.created_by)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn update_status(
        &self,
        opportunity_id: Uuid,
        status: OpportunityStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE contract_farming_opportunities SET status = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(opportunity_id)
        .bind(status.as_str())
        .bind(updated_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_document(&self, document: &Document) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contract_farming_documents
                (id, opportunity_id, name, url, file_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(document.id)
        .bind(document.opportunity_id)
        .bind(&document.name)
        .bind(&document.url)
        .bind(&document.file_type)
        .bind(document.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn delete_document(&self, opportunity_id: Uuid, document_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM contract_farming_documents WHERE id = $1 AND opportunity_id = $2",
        )
        .bind(document_id)
        .bind(opportunity_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contract_farming_reviews
                (id, opportunity_id, reviewer_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(review.id)
        .bind(review.opportunity_id)
        .bind(review.reviewer_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
