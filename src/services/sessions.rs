use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::TrackerStore,
    error::{AppError, AppResult},
    models::{NewWatchSession, SessionOutcome, SessionStatus, UserContext, WatchSession},
};

/// Marks a scheduled session as completed or skipped
///
/// Completed and skipped are terminal; any transition out of them is rejected
/// and the session is left as it was.
pub fn mark_session(session: &WatchSession, outcome: SessionOutcome) -> AppResult<WatchSession> {
    if session.status.is_terminal() {
        return Err(session.already_final());
    }

    let mut updated = session.clone();
    updated.status = outcome.into();
    Ok(updated)
}

/// Normalizes a scheduling request, rejecting it before any store call
pub fn validate_new_session(mut session: NewWatchSession) -> AppResult<NewWatchSession> {
    if session.episode_number < 1 {
        return Err(AppError::Validation(format!(
            "Episode number must be at least 1, got {}",
            session.episode_number
        )));
    }

    session.notes = session
        .notes
        .map(|notes| notes.trim().to_string())
        .filter(|notes| !notes.is_empty());

    Ok(session)
}

/// Schedules a watch session for one of the catalog's series
pub async fn schedule_session(
    store: &dyn TrackerStore,
    ctx: &UserContext,
    new: NewWatchSession,
) -> AppResult<WatchSession> {
    let new = validate_new_session(new)?;
    store.get_series(ctx, new.series_id).await?;

    let session = store.insert_session(ctx, new).await?;

    tracing::info!(
        user_id = %ctx.user_id,
        session_id = %session.id,
        series_id = %session.series_id,
        date = %session.scheduled_date,
        episode = session.episode_number,
        "Watch session scheduled"
    );

    Ok(session)
}

/// Persists a session outcome after checking the transition is allowed
///
/// The store re-checks the status as part of the write, so of two racing
/// outcomes for the same session only one is applied.
pub async fn record_outcome(
    store: &dyn TrackerStore,
    ctx: &UserContext,
    session_id: Uuid,
    outcome: SessionOutcome,
) -> AppResult<WatchSession> {
    let session = store.get_session(ctx, session_id).await?;
    let target = mark_session(&session, outcome)?;

    let updated = store
        .update_session_status(ctx, session_id, target.status)
        .await?;

    tracing::info!(
        user_id = %ctx.user_id,
        session_id = %session_id,
        status = %updated.status,
        "Watch session marked"
    );

    Ok(updated)
}

/// Session totals per status
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct SessionCounts {
    pub scheduled: usize,
    pub completed: usize,
    pub skipped: usize,
}

impl SessionCounts {
    pub fn total(&self) -> usize {
        self.scheduled + self.completed + self.skipped
    }
}

pub fn count_by_status<'a>(sessions: impl IntoIterator<Item = &'a WatchSession>) -> SessionCounts {
    sessions
        .into_iter()
        .fold(SessionCounts::default(), |mut counts, session| {
            match session.status {
                SessionStatus::Scheduled => counts.scheduled += 1,
                SessionStatus::Completed => counts.completed += 1,
                SessionStatus::Skipped => counts.skipped += 1,
            }
            counts
        })
}
