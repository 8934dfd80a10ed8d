//! Moment Repository Implementation
//!
//! Moments and their ordered images live in two tables; reads aggregate
//! image URLs into the entity with `array_agg`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Moment, MomentRepository, MomentStatus};
use crate::infrastructure::database::execute_in_transaction;
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

/// Select list aggregating images per moment. Queries using it must
/// GROUP BY m.id.
const MOMENT_SELECT: &str = "SELECT m.id, m.game_player_id, m.content, m.status, \
     m.created_at, m.updated_at, \
     COALESCE(array_agg(mi.image_url ORDER BY mi.display_order) \
              FILTER (WHERE mi.image_url IS NOT NULL), '{}') AS image_urls \
     FROM moments m \
     LEFT JOIN moment_images mi ON mi.moment_id = m.id";

#[derive(Debug, sqlx::FromRow)]
struct MomentRow {
    id: i64,
    game_player_id: i64,
    content: String,
    status: String,
    image_urls: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MomentRow {
    fn into_moment(self) -> Moment {
        Moment {
            id: self.id,
            game_player_id: self.game_player_id,
            content: self.content,
            status: MomentStatus::from_str(&self.status),
            image_urls: self.image_urls,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL moment repository implementation.
#[derive(Clone)]
pub struct PgMomentRepository {
    pool: PgPool,
}

impl PgMomentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn rows_to_page(rows: Vec<MomentRow>, page: PageRequest, total: i64) -> Page<Moment> {
    Page::new(rows.into_iter().map(|r| r.into_moment()).collect(), page, total)
}

#[async_trait]
impl MomentRepository for PgMomentRepository {
    async fn create(&self, moment: &Moment) -> Result<Moment, AppError> {
        let moment = moment.clone();
        execute_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let (id, created_at, updated_at): (i64, DateTime<Utc>, DateTime<Utc>) =
                    sqlx::query_as(
                        "INSERT INTO moments (game_player_id, content, status) \
                         VALUES ($1, $2, $3) RETURNING id, created_at, updated_at",
                    )
                    .bind(moment.game_player_id)
                    .bind(&moment.content)
                    .bind(moment.status.as_str())
                    .fetch_one(&mut **tx)
                    .await
                    .map_err(AppError::Database)?;

                for (order, url) in moment.image_urls.iter().enumerate() {
                    sqlx::query(
                        "INSERT INTO moment_images (moment_id, image_url, display_order) \
                         VALUES ($1, $2, $3)",
                    )
                    .bind(id)
                    .bind(url)
                    .bind((order + 1) as i32)
                    .execute(&mut **tx)
                    .await
                    .map_err(AppError::Database)?;
                }

                Ok(Moment {
                    id,
                    created_at,
                    updated_at,
                    ..moment
                })
            })
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Moment>, AppError> {
        let sql = format!("{} WHERE m.id = $1 GROUP BY m.id", MOMENT_SELECT);
        let row = sqlx::query_as::<_, MomentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_moment()))
    }

    async fn find_owned(&self, id: i64, user_id: i64) -> Result<Option<Moment>, AppError> {
        let sql = format!(
            "{} WHERE m.id = $1 AND m.game_player_id IN \
             (SELECT id FROM game_players WHERE user_id = $2) GROUP BY m.id",
            MOMENT_SELECT
        );
        let row = sqlx::query_as::<_, MomentRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_moment()))
    }

    async fn page_by_player(
        &self,
        game_player_id: i64,
        page: PageRequest,
    ) -> Result<Page<Moment>, AppError> {
        let sql = format!(
            "{} WHERE m.game_player_id = $1 AND m.status = 'ACTIVE' \
             GROUP BY m.id ORDER BY m.created_at DESC LIMIT $2 OFFSET $3",
            MOMENT_SELECT
        );
        let rows = sqlx::query_as::<_, MomentRow>(&sql)
            .bind(game_player_id)
            .bind(page.per_page())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM moments WHERE game_player_id = $1 AND status = 'ACTIVE'",
        )
        .bind(game_player_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(rows_to_page(rows, page, total))
    }

    async fn page_by_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<Moment>, AppError> {
        let sql = format!(
            "{} WHERE m.status <> 'DELETED' AND m.game_player_id IN \
             (SELECT id FROM game_players WHERE user_id = $1) \
             GROUP BY m.id ORDER BY m.created_at DESC LIMIT $2 OFFSET $3",
            MOMENT_SELECT
        );
        let rows = sqlx::query_as::<_, MomentRow>(&sql)
            .bind(user_id)
            .bind(page.per_page())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM moments WHERE status <> 'DELETED' AND game_player_id IN \
             (SELECT id FROM game_players WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(rows_to_page(rows, page, total))
    }

    async fn page_by_players(
        &self,
        game_player_ids: &[i64],
        page: PageRequest,
    ) -> Result<Page<Moment>, AppError> {
        if game_player_ids.is_empty() {
            return Ok(Page::empty(page));
        }

        let ids = game_player_ids.to_vec();
        let sql = format!(
            "{} WHERE m.game_player_id = ANY($1) AND m.status = 'ACTIVE' \
             GROUP BY m.id ORDER BY m.created_at DESC LIMIT $2 OFFSET $3",
            MOMENT_SELECT
        );
        let rows = sqlx::query_as::<_, MomentRow>(&sql)
            .bind(&ids)
            .bind(page.per_page())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM moments WHERE game_player_id = ANY($1) AND status = 'ACTIVE'",
        )
        .bind(&ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(rows_to_page(rows, page, total))
    }

    async fn page_all(&self, page: PageRequest) -> Result<Page<Moment>, AppError> {
        let sql = format!(
            "{} WHERE m.status = 'ACTIVE' \
             GROUP BY m.id ORDER BY m.created_at DESC LIMIT $1 OFFSET $2",
            MOMENT_SELECT
        );
        let rows = sqlx::query_as::<_, MomentRow>(&sql)
            .bind(page.per_page())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM moments WHERE status = 'ACTIVE'")
                .fetch_one(&self.pool)
                .await?;

        Ok(rows_to_page(rows, page, total))
    }

    async fn update(&self, moment: &Moment) -> Result<Moment, AppError> {
        let moment = moment.clone();
        execute_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let result = sqlx::query(
                    "UPDATE moments SET content = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(moment.id)
                .bind(&moment.content)
                .execute(&mut **tx)
                .await
                .map_err(AppError::Database)?;

                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!(
                        "Moment with id {} not found",
                        moment.id
                    )));
                }

                sqlx::query("DELETE FROM moment_images WHERE moment_id = $1")
                    .bind(moment.id)
                    .execute(&mut **tx)
                    .await
                    .map_err(AppError::Database)?;

                for (order, url) in moment.image_urls.iter().enumerate() {
                    sqlx::query(
                        "INSERT INTO moment_images (moment_id, image_url, display_order) \
                         VALUES ($1, $2, $3)",
                    )
                    .bind(moment.id)
                    .bind(url)
                    .bind((order + 1) as i32)
                    .execute(&mut **tx)
                    .await
                    .map_err(AppError::Database)?;
                }

                Ok(moment)
            })
        })
        .await
    }

    async fn set_status(&self, id: i64, status: MomentStatus) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE moments SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Moment with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
