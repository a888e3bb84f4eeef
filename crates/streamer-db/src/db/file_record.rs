use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use streamer_core::FileRecord;
use uuid::Uuid;

/// Persistence of upload metadata records.
///
/// `save` is a single write and is never retried here; retry policy belongs to the
/// caller.
#[async_trait]
pub trait FileRecordRepository: Send + Sync {
    /// Insert a new record
    async fn save(&self, record: &FileRecord) -> anyhow::Result<()>;

    /// Look up a record by upload id
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<FileRecord>>;
}

/// PostgreSQL-backed repository for `file_details`
#[derive(Clone)]
pub struct PgFileRecordRepository {
    pool: PgPool,
}

impl PgFileRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRecordRepository for PgFileRecordRepository {
    #[tracing::instrument(skip(self, record), fields(upload.id = %record.id))]
    async fn save(&self, record: &FileRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO file_details (id, name, content_type, uploaded_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.content_type)
        .bind(record.uploaded_at)
        .execute(&self.pool)
        .await
        .context("failed to insert file details")?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, name, content_type, uploaded_at
            FROM file_details
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch file details")?;

        Ok(record)
    }
}
