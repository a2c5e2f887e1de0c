use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::TrackerStore,
    error::{AppError, AppResult},
    models::{
        NewProgress, NewSeries, NewWatchSession, ProgressUpdate, Series, SessionStatus,
        UserContext, UserSeriesProgress, WatchSession,
    },
};

/// Process-local store used for development and tests
///
/// Mirrors the constraints of the SQL schema: progress is unique per
/// (user, series) and per-user rows are only visible to their owner.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<InMemoryStoreInner>>,
}

#[derive(Default)]
struct InMemoryStoreInner {
    series: HashMap<Uuid, Series>,
    progress: HashMap<Uuid, UserSeriesProgress>,
    sessions: HashMap<Uuid, WatchSession>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(kind: &str, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {} does not exist", kind, id))
}

#[async_trait::async_trait]
impl TrackerStore for InMemoryStore {
    async fn list_series(&self, _ctx: &UserContext) -> AppResult<Vec<Series>> {
        let inner = self.inner.read().await;
        let mut series: Vec<Series> = inner.series.values().cloned().collect();
        series.sort_by(|a, b| a.title.cmp(&b.title).then(a.created_at.cmp(&b.created_at)));
        Ok(series)
    }

    async fn get_series(&self, _ctx: &UserContext, id: Uuid) -> AppResult<Series> {
        let inner = self.inner.read().await;
        inner
            .series
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("series", id))
    }

    async fn insert_series(&self, _ctx: &UserContext, series: NewSeries) -> AppResult<Series> {
        let series = series.into_series(Uuid::new_v4(), Utc::now());
        let mut inner = self.inner.write().await;
        inner.series.insert(series.id, series.clone());
        Ok(series)
    }

    async fn list_progress(&self, ctx: &UserContext) -> AppResult<Vec<UserSeriesProgress>> {
        let inner = self.inner.read().await;
        let mut progress: Vec<UserSeriesProgress> = inner
            .progress
            .values()
            .filter(|p| p.user_id == ctx.user_id)
            .cloned()
            .collect();
        progress.sort_by_key(|p| p.created_at);
        Ok(progress)
    }

    async fn get_progress(&self, ctx: &UserContext, id: Uuid) -> AppResult<UserSeriesProgress> {
        let inner = self.inner.read().await;
        inner
            .progress
            .get(&id)
            .filter(|p| p.user_id == ctx.user_id)
            .cloned()
            .ok_or_else(|| not_found("progress record", id))
    }

    async fn insert_progress(
        &self,
        ctx: &UserContext,
        progress: NewProgress,
    ) -> AppResult<UserSeriesProgress> {
        let mut inner = self.inner.write().await;

        if !inner.series.contains_key(&progress.series_id) {
            return Err(AppError::Store(format!(
                "series {} violates foreign key on user_series",
                progress.series_id
            )));
        }

        let duplicate = inner
            .progress
            .values()
            .any(|p| p.user_id == ctx.user_id && p.series_id == progress.series_id);
        if duplicate {
            return Err(AppError::Store(
                "duplicate key value violates unique constraint on (user_id, series_id)"
                    .to_string(),
            ));
        }

        let now = Utc::now();
        let record = UserSeriesProgress {
            id: Uuid::new_v4(),
            user_id: ctx.user_id,
            series_id: progress.series_id,
            current_episode: 0,
            status: progress.status,
            rating: None,
            notes: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.progress.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_progress(
        &self,
        ctx: &UserContext,
        id: Uuid,
        update: ProgressUpdate,
    ) -> AppResult<UserSeriesProgress> {
        let mut inner = self.inner.write().await;
        let record = inner
            .progress
            .get_mut(&id)
            .filter(|p| p.user_id == ctx.user_id)
            .ok_or_else(|| not_found("progress record", id))?;

        update.apply_to(record);
        Ok(record.clone())
    }

    async fn list_sessions(&self, ctx: &UserContext) -> AppResult<Vec<WatchSession>> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<WatchSession> = inner
            .sessions
            .values()
            .filter(|s| s.user_id == ctx.user_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.scheduled_date, s.created_at));
        Ok(sessions)
    }

    async fn get_session(&self, ctx: &UserContext, id: Uuid) -> AppResult<WatchSession> {
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(&id)
            .filter(|s| s.user_id == ctx.user_id)
            .cloned()
            .ok_or_else(|| not_found("watch session", id))
    }

    async fn insert_session(
        &self,
        ctx: &UserContext,
        session: NewWatchSession,
    ) -> AppResult<WatchSession> {
        let mut inner = self.inner.write().await;

        if !inner.series.contains_key(&session.series_id) {
            return Err(AppError::Store(format!(
                "series {} violates foreign key on watch_sessions",
                session.series_id
            )));
        }

        let session = session.into_session(Uuid::new_v4(), ctx.user_id, Utc::now());
        inner.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn update_session_status(
        &self,
        ctx: &UserContext,
        id: Uuid,
        status: SessionStatus,
    ) -> AppResult<WatchSession> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(&id)
            .filter(|s| s.user_id == ctx.user_id)
            .ok_or_else(|| not_found("watch session", id))?;

        if session.status.is_terminal() {
            return Err(session.already_final());
        }
        session.status = status;
        Ok(session.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProgressStatus;
    use chrono::NaiveDate;

    fn user() -> UserContext {
        UserContext::new(Uuid::new_v4(), "token")
    }

    #[tokio::test]
    async fn test_series_listed_by_title() {
        let store = InMemoryStore::new();
        let ctx = user();
        store.insert_series(&ctx, NewSeries::new("Succession")).await.unwrap();
        store.insert_series(&ctx, NewSeries::new("Andor")).await.unwrap();

        let titles: Vec<String> = store
            .list_series(&ctx)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Andor", "Succession"]);
    }

    #[tokio::test]
    async fn test_progress_unique_per_user_and_series() {
        let store = InMemoryStore::new();
        let ctx = user();
        let series = store.insert_series(&ctx, NewSeries::new("Andor")).await.unwrap();
        let new = NewProgress {
            series_id: series.id,
            status: ProgressStatus::PlanToWatch,
        };

        store.insert_progress(&ctx, new.clone()).await.unwrap();
        let duplicate = store.insert_progress(&ctx, new.clone()).await;
        assert!(matches!(duplicate, Err(AppError::Store(_))));

        // A different user may track the same series
        let other = user();
        assert!(store.insert_progress(&other, new).await.is_ok());
    }

    #[tokio::test]
    async fn test_sessions_scoped_to_owner() {
        let store = InMemoryStore::new();
        let owner = user();
        let stranger = user();
        let series = store.insert_series(&owner, NewSeries::new("Dark")).await.unwrap();

        let session = store
            .insert_session(
                &owner,
                NewWatchSession {
                    series_id: series.id,
                    scheduled_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    scheduled_time: None,
                    episode_number: 1,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert!(store.list_sessions(&stranger).await.unwrap().is_empty());
        let lookup = store.get_session(&stranger, session.id).await;
        assert!(matches!(lookup, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sessions_ordered_by_date() {
        let store = InMemoryStore::new();
        let ctx = user();
        let series = store.insert_series(&ctx, NewSeries::new("Dark")).await.unwrap();

        for day in [5, 1, 3] {
            store
                .insert_session(
                    &ctx,
                    NewWatchSession {
                        series_id: series.id,
                        scheduled_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                        scheduled_time: None,
                        episode_number: 1,
                        notes: None,
                    },
                )
                .await
                .unwrap();
        }

        let days: Vec<u32> = store
            .list_sessions(&ctx)
            .await
            .unwrap()
            .iter()
            .map(|s| chrono::Datelike::day(&s.scheduled_date))
            .collect();
        assert_eq!(days, vec![1, 3, 5]);
    }

    #[tokio::test]
    async fn test_status_update_refuses_final_session() {
        let store = InMemoryStore::new();
        let ctx = user();
        let series = store.insert_series(&ctx, NewSeries::new("Dark")).await.unwrap();
        let session = store
            .insert_session(
                &ctx,
                NewWatchSession {
                    series_id: series.id,
                    scheduled_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    scheduled_time: None,
                    episode_number: 1,
                    notes: None,
                },
            )
            .await
            .unwrap();

        store
            .update_session_status(&ctx, session.id, SessionStatus::Completed)
            .await
            .unwrap();
        let second = store
            .update_session_status(&ctx, session.id, SessionStatus::Skipped)
            .await;
        assert!(matches!(second, Err(AppError::InvalidTransition(_))));

        let stored = store.get_session(&ctx, session.id).await.unwrap();
        assert_eq!(stored.status, SessionStatus::Completed);
    }
}
