use serde::Serialize;

use crate::{
    db::TrackerStore,
    error::AppResult,
    models::{SeriesWithProgress, UserContext},
    services::{
        catalog::{filter, join_progress, StatusFilter},
        progress::{can_advance, next_episode, progress_percent},
    },
};

/// A catalog entry as the dashboard shows it
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesCard {
    #[serde(flatten)]
    pub entry: SeriesWithProgress,
    pub status_label: Option<&'static str>,
    pub progress_percent: Option<f64>,
    pub next_episode: Option<i32>,
    pub can_advance: bool,
}

impl From<SeriesWithProgress> for SeriesCard {
    fn from(entry: SeriesWithProgress) -> Self {
        let progress = entry.user_progress.as_ref();
        let total = entry.series.total_episodes;

        Self {
            status_label: progress.map(|p| p.status.label()),
            progress_percent: progress.and_then(|p| progress_percent(p.current_episode, total)),
            next_episode: progress.filter(|p| can_advance(p)).map(next_episode),
            can_advance: progress.is_some_and(can_advance),
            entry,
        }
    }
}

/// Fetches catalog and progress concurrently and joins them
pub async fn load_library(
    store: &dyn TrackerStore,
    ctx: &UserContext,
) -> AppResult<Vec<SeriesWithProgress>> {
    let (series, progress) = tokio::try_join!(store.list_series(ctx), store.list_progress(ctx))?;
    Ok(join_progress(series, &progress))
}

/// The filtered dashboard for one user
pub async fn dashboard(
    store: &dyn TrackerStore,
    ctx: &UserContext,
    search_term: &str,
    status: StatusFilter,
) -> AppResult<Vec<SeriesCard>> {
    let library = load_library(store, ctx).await?;
    let cards: Vec<SeriesCard> = filter(&library, search_term, status)
        .into_iter()
        .map(SeriesCard::from)
        .collect();

    tracing::debug!(
        user_id = %ctx.user_id,
        total = library.len(),
        shown = cards.len(),
        "Dashboard assembled"
    );

    Ok(cards)
}
