use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    api::AppState,
    error::AppResult,
    models::{NewWatchSession, SessionOutcome, UserContext, WatchSession},
    services::sessions,
};

/// All of the caller's sessions, by scheduled date
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
) -> AppResult<Json<Vec<WatchSession>>> {
    let sessions = state.store.list_sessions(&ctx).await?;
    Ok(Json(sessions))
}

pub async fn schedule(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Json(request): Json<NewWatchSession>,
) -> AppResult<(StatusCode, Json<WatchSession>)> {
    let session = sessions::schedule_session(state.store.as_ref(), &ctx, request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<WatchSession>> {
    let session = sessions::record_outcome(
        state.store.as_ref(),
        &ctx,
        session_id,
        SessionOutcome::Completed,
    )
    .await?;
    Ok(Json(session))
}

pub async fn skip(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<WatchSession>> {
    let session = sessions::record_outcome(
        state.store.as_ref(),
        &ctx,
        session_id,
        SessionOutcome::Skipped,
    )
    .await?;
    Ok(Json(session))
}
