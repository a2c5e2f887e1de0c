use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::{
    api::AppState,
    error::AppResult,
    models::UserContext,
    services::calendar::{self, WeekView},
};

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    /// Defaults to today
    anchor: Option<NaiveDate>,
    /// Whole weeks to move from the anchor, negative for the past
    #[serde(default)]
    weeks: i64,
}

/// Monday-first week of scheduled sessions
pub async fn week(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Query(params): Query<WeekQuery>,
) -> AppResult<Json<WeekView>> {
    let anchor = params.anchor.unwrap_or_else(|| Local::now().date_naive());
    let view = calendar::load_week(state.store.as_ref(), &ctx, anchor, params.weeks).await?;
    Ok(Json(view))
}
