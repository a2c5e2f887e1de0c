use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::AppState,
    error::AppResult,
    models::{NewProgress, UserContext, UserSeriesProgress},
    services::progress,
};

#[derive(Debug, Default, Deserialize)]
pub struct AdvanceRequest {
    /// Target episode; the next one when omitted
    #[serde(default)]
    pub episode: Option<i32>,
}

/// Puts a catalog series on the caller's list
pub async fn add_to_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Json(request): Json<NewProgress>,
) -> AppResult<(StatusCode, Json<UserSeriesProgress>)> {
    let progress = progress::add_to_list(state.store.as_ref(), &ctx, request).await?;
    Ok((StatusCode::CREATED, Json(progress)))
}

/// Records a watched episode
pub async fn advance(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(progress_id): Path<Uuid>,
    body: Option<Json<AdvanceRequest>>,
) -> AppResult<Json<UserSeriesProgress>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let updated = progress::record_episode(
        state.store.as_ref(),
        &ctx,
        progress_id,
        request.episode,
        Utc::now(),
    )
    .await?;
    Ok(Json(updated))
}
