//! PostgreSQL implementation of RecordStore

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use roster_core::entities::{RawRecord, ReviewRecord};
use roster_core::traits::{LookupResult, RecordStore, RepoResult};
use roster_core::value_objects::Snowflake;

use crate::models::{MemberRecordModel, MemberReviewModel};

use super::error::{map_db_error, map_lookup_error};

/// PostgreSQL implementation of RecordStore
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Create a new PgRecordStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Set a member's affiliation and class attributes
    ///
    /// These columns are owned by the roster admins; the engine itself only
    /// reads them. Used by seeding tools and tests.
    pub async fn upsert_attributes(
        &self,
        member_id: Snowflake,
        guild: Option<&str>,
        class: Option<&str>,
        primary_weapon: Option<&str>,
        secondary_weapon: Option<&str>,
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO member_records (discord_id, guild, class, primary_weapon, secondary_weapon)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (discord_id) DO UPDATE SET
                guild = EXCLUDED.guild,
                class = EXCLUDED.class,
                primary_weapon = EXCLUDED.primary_weapon,
                secondary_weapon = EXCLUDED.secondary_weapon,
                updated_at = NOW()
            "#,
        )
        .bind(member_id.into_inner())
        .bind(guild)
        .bind(class)
        .bind(primary_weapon)
        .bind(secondary_weapon)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    /// Delete a member's record and review data
    pub async fn delete(&self, member_id: Snowflake) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("DELETE FROM member_reviews WHERE discord_id = $1")
            .bind(member_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("DELETE FROM member_records WHERE discord_id = $1")
            .bind(member_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn ping(&self) -> LookupResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_lookup_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, member_id: Snowflake) -> LookupResult<Option<RawRecord>> {
        let result = sqlx::query_as::<_, MemberRecordModel>(
            r#"
            SELECT r.discord_id, r.guild, r.class, r.primary_weapon, r.secondary_weapon,
                   r.ingame_name, r.created_at, r.updated_at,
                   (v.discord_id IS NOT NULL) AS has_review,
                   v.has_vod, v.vod_check_date, v.gear_checked, v.gear_check_date,
                   v.gear_score, v.notes
            FROM member_records r
            LEFT JOIN member_reviews v ON v.discord_id = r.discord_id
            WHERE r.discord_id = $1
            "#,
        )
        .bind(member_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_lookup_error)?;

        Ok(result.map(RawRecord::from))
    }

    #[instrument(skip(self, member_ids), fields(count = member_ids.len()))]
    async fn find_by_members(&self, member_ids: &[Snowflake]) -> LookupResult<Vec<RawRecord>> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = member_ids.iter().map(|id| id.into_inner()).collect();

        let results = sqlx::query_as::<_, MemberRecordModel>(
            r#"
            SELECT r.discord_id, r.guild, r.class, r.primary_weapon, r.secondary_weapon,
                   r.ingame_name, r.created_at, r.updated_at,
                   (v.discord_id IS NOT NULL) AS has_review,
                   v.has_vod, v.vod_check_date, v.gear_checked, v.gear_check_date,
                   v.gear_score, v.notes
            FROM member_records r
            LEFT JOIN member_reviews v ON v.discord_id = r.discord_id
            WHERE r.discord_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_lookup_error)?;

        Ok(results.into_iter().map(RawRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn upsert_registered_name(&self, member_id: Snowflake, name: &str) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO member_records (discord_id, ingame_name)
            VALUES ($1, $2)
            ON CONFLICT (discord_id) DO UPDATE SET
                ingame_name = EXCLUDED.ingame_name,
                updated_at = NOW()
            "#,
        )
        .bind(member_id.into_inner())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_review(&self, member_id: Snowflake) -> RepoResult<Option<ReviewRecord>> {
        let result = sqlx::query_as::<_, MemberReviewModel>(
            r#"
            SELECT discord_id, has_vod, vod_check_date, gear_checked, gear_check_date,
                   gear_score, notes, updated_at
            FROM member_reviews
            WHERE discord_id = $1
            "#,
        )
        .bind(member_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ReviewRecord::from))
    }

    #[instrument(skip(self, review))]
    async fn upsert_review(&self, member_id: Snowflake, review: &ReviewRecord) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO member_reviews
                (discord_id, has_vod, vod_check_date, gear_checked, gear_check_date,
                 gear_score, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (discord_id) DO UPDATE SET
                has_vod = EXCLUDED.has_vod,
                vod_check_date = EXCLUDED.vod_check_date,
                gear_checked = EXCLUDED.gear_checked,
                gear_check_date = EXCLUDED.gear_check_date,
                gear_score = EXCLUDED.gear_score,
                notes = EXCLUDED.notes,
                updated_at = NOW()
            "#,
        )
        .bind(member_id.into_inner())
        .bind(review.has_vod)
        .bind(&review.vod_check_date)
        .bind(review.gear_checked)
        .bind(&review.gear_check_date)
        .bind(review.gear_score)
        .bind(&review.notes)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
