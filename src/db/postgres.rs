use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    db::TrackerStore,
    error::{AppError, AppResult},
    models::{
        NewProgress, NewSeries, NewWatchSession, ProgressUpdate, Series, SessionStatus,
        UserContext, UserSeriesProgress, WatchSession,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Store backed directly by PostgreSQL
///
/// The schema in `migrations/` enforces one progress record per
/// (user, series); per-user queries filter on `ctx.user_id`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending schema migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn missing<T>(row: Option<T>, kind: &str, id: Uuid) -> AppResult<T> {
    row.ok_or_else(|| AppError::NotFound(format!("{} {} does not exist", kind, id)))
}

#[async_trait::async_trait]
impl TrackerStore for PgStore {
    async fn list_series(&self, _ctx: &UserContext) -> AppResult<Vec<Series>> {
        let series = sqlx::query_as::<_, Series>("SELECT * FROM series ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(series)
    }

    async fn get_series(&self, _ctx: &UserContext, id: Uuid) -> AppResult<Series> {
        let row = sqlx::query_as::<_, Series>("SELECT * FROM series WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        missing(row, "series", id)
    }

    async fn insert_series(&self, _ctx: &UserContext, series: NewSeries) -> AppResult<Series> {
        let row = sqlx::query_as::<_, Series>(
            r#"
            INSERT INTO series
                (title, description, genre, release_year, poster_url, imdb_rating, total_episodes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(series.title)
        .bind(series.description)
        .bind(series.genre)
        .bind(series.release_year)
        .bind(series.poster_url)
        .bind(series.imdb_rating)
        .bind(series.total_episodes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_progress(&self, ctx: &UserContext) -> AppResult<Vec<UserSeriesProgress>> {
        let rows = sqlx::query_as::<_, UserSeriesProgress>(
            "SELECT * FROM user_series WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(ctx.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_progress(&self, ctx: &UserContext, id: Uuid) -> AppResult<UserSeriesProgress> {
        let row = sqlx::query_as::<_, UserSeriesProgress>(
            "SELECT * FROM user_series WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(ctx.user_id)
        .fetch_optional(&self.pool)
        .await?;
        missing(row, "progress record", id)
    }

    async fn insert_progress(
        &self,
        ctx: &UserContext,
        progress: NewProgress,
    ) -> AppResult<UserSeriesProgress> {
        let row = sqlx::query_as::<_, UserSeriesProgress>(
            r#"
            INSERT INTO user_series (user_id, series_id, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(ctx.user_id)
        .bind(progress.series_id)
        .bind(progress.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_progress(
        &self,
        ctx: &UserContext,
        id: Uuid,
        update: ProgressUpdate,
    ) -> AppResult<UserSeriesProgress> {
        let row = sqlx::query_as::<_, UserSeriesProgress>(
            r#"
            UPDATE user_series
            SET current_episode = $1,
                status = $2,
                updated_at = $3,
                started_at = COALESCE($4, started_at),
                completed_at = $5
            WHERE id = $6 AND user_id = $7
            RETURNING *
            "#,
        )
        .bind(update.current_episode)
        .bind(update.status)
        .bind(update.updated_at)
        .bind(update.started_at)
        .bind(update.completed_at)
        .bind(id)
        .bind(ctx.user_id)
        .fetch_optional(&self.pool)
        .await?;
        missing(row, "progress record", id)
    }

    async fn list_sessions(&self, ctx: &UserContext) -> AppResult<Vec<WatchSession>> {
        let rows = sqlx::query_as::<_, WatchSession>(
            "SELECT * FROM watch_sessions WHERE user_id = $1 ORDER BY scheduled_date, created_at",
        )
        .bind(ctx.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_session(&self, ctx: &UserContext, id: Uuid) -> AppResult<WatchSession> {
        let row = sqlx::query_as::<_, WatchSession>(
            "SELECT * FROM watch_sessions WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(ctx.user_id)
        .fetch_optional(&self.pool)
        .await?;
        missing(row, "watch session", id)
    }

    async fn insert_session(
        &self,
        ctx: &UserContext,
        session: NewWatchSession,
    ) -> AppResult<WatchSession> {
        let row = sqlx::query_as::<_, WatchSession>(
            r#"
            INSERT INTO watch_sessions
                (user_id, series_id, scheduled_date, scheduled_time, episode_number, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(ctx.user_id)
        .bind(session.series_id)
        .bind(session.scheduled_date)
        .bind(session.scheduled_time)
        .bind(session.episode_number)
        .bind(session.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_session_status(
        &self,
        ctx: &UserContext,
        id: Uuid,
        status: SessionStatus,
    ) -> AppResult<WatchSession> {
        let row = sqlx::query_as::<_, WatchSession>(
            r#"
            UPDATE watch_sessions
            SET status = $1
            WHERE id = $2 AND user_id = $3 AND status = 'scheduled'
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(id)
        .bind(ctx.user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(session) => Ok(session),
            // Either missing or no longer scheduled
            None => Err(self.get_session(ctx, id).await?.already_final()),
        }
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
