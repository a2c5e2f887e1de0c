use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    api::AppState,
    error::AppResult,
    models::{NewSeries, Series, UserContext},
    services::{
        catalog::{self, StatusFilter},
        dashboard::{self, SeriesCard},
    },
};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    q: String,
    #[serde(default)]
    status: StatusFilter,
}

/// Catalog joined with the caller's progress, filtered by search term and status
pub async fn list_series(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Query(params): Query<DashboardQuery>,
) -> AppResult<Json<Vec<SeriesCard>>> {
    let cards = dashboard::dashboard(state.store.as_ref(), &ctx, &params.q, params.status).await?;
    Ok(Json(cards))
}

/// Adds a series to the shared catalog
pub async fn create_series(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Json(request): Json<NewSeries>,
) -> AppResult<(StatusCode, Json<Series>)> {
    let series = catalog::add_series(state.store.as_ref(), &ctx, request).await?;
    Ok((StatusCode::CREATED, Json(series)))
}
