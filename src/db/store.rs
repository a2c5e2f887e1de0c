use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        NewProgress, NewSeries, NewWatchSession, ProgressUpdate, Series, SessionStatus,
        UserContext, UserSeriesProgress, WatchSession,
    },
};

/// Remote data store contract
///
/// Three record collections (catalog series, per-user progress, per-user watch
/// sessions), each supporting ordered listing, single inserts and single-row
/// updates. Every call carries the caller's `UserContext`; implementations
/// scope per-user collections to `ctx.user_id`.
///
/// Each mutation is one request: a failure leaves the stored record unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TrackerStore: Send + Sync {
    /// Catalog, ordered by title
    async fn list_series(&self, ctx: &UserContext) -> AppResult<Vec<Series>>;

    async fn get_series(&self, ctx: &UserContext, id: Uuid) -> AppResult<Series>;

    async fn insert_series(&self, ctx: &UserContext, series: NewSeries) -> AppResult<Series>;

    async fn list_progress(&self, ctx: &UserContext) -> AppResult<Vec<UserSeriesProgress>>;

    async fn get_progress(&self, ctx: &UserContext, id: Uuid) -> AppResult<UserSeriesProgress>;

    async fn insert_progress(
        &self,
        ctx: &UserContext,
        progress: NewProgress,
    ) -> AppResult<UserSeriesProgress>;

    /// Writes every field of `update` atomically
    async fn update_progress(
        &self,
        ctx: &UserContext,
        id: Uuid,
        update: ProgressUpdate,
    ) -> AppResult<UserSeriesProgress>;

    /// Caller's sessions, ordered by scheduled date
    async fn list_sessions(&self, ctx: &UserContext) -> AppResult<Vec<WatchSession>>;

    async fn get_session(&self, ctx: &UserContext, id: Uuid) -> AppResult<WatchSession>;

    async fn insert_session(
        &self,
        ctx: &UserContext,
        session: NewWatchSession,
    ) -> AppResult<WatchSession>;

    /// Moves a still-scheduled session to `status`
    ///
    /// The check and the write happen together. A session that is already
    /// completed or skipped yields `InvalidTransition` and is left unchanged.
    async fn update_session_status(
        &self,
        ctx: &UserContext,
        id: Uuid,
        status: SessionStatus,
    ) -> AppResult<WatchSession>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
