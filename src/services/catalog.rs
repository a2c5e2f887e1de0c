use serde::Deserialize;

use crate::{
    db::TrackerStore,
    error::{AppError, AppResult},
    models::{NewSeries, ProgressStatus, Series, SeriesWithProgress, UserContext, UserSeriesProgress},
};

const MIN_RELEASE_YEAR: i32 = 1900;
const MAX_RELEASE_YEAR: i32 = 2030;
const MAX_IMDB_RATING: f64 = 10.0;

/// Status filter applied to the joined catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum StatusFilter {
    /// Sentinel `all`: every series, tracked or not
    #[default]
    All,
    Only(ProgressStatus),
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl StatusFilter {
    fn matches(&self, progress: Option<&UserSeriesProgress>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => progress.is_some_and(|p| p.status == *status),
        }
    }
}

/// Left outer join of the catalog with the caller's progress records
///
/// Keyed on `series.id == progress.series_id`. Should more than one record
/// exist for a series, the first one in `progress` wins.
pub fn join_progress(series: Vec<Series>, progress: &[UserSeriesProgress]) -> Vec<SeriesWithProgress> {
    series
        .into_iter()
        .map(|series| {
            let user_progress = progress.iter().find(|p| p.series_id == series.id).cloned();
            SeriesWithProgress {
                series,
                user_progress,
            }
        })
        .collect()
}

fn matches_term(series: &Series, needle: &str) -> bool {
    series.title.to_lowercase().contains(needle)
        || series
            .genre
            .as_deref()
            .is_some_and(|genre| genre.to_lowercase().contains(needle))
}

/// Case-insensitive title-or-genre search ANDed with a status filter
///
/// Pure: the same inputs always yield the same output, in input order.
pub fn filter(
    items: &[SeriesWithProgress],
    search_term: &str,
    status: StatusFilter,
) -> Vec<SeriesWithProgress> {
    let needle = search_term.to_lowercase();

    items
        .iter()
        .filter(|item| needle.is_empty() || matches_term(&item.series, &needle))
        .filter(|item| status.matches(item.user_progress.as_ref()))
        .cloned()
        .collect()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalizes a new catalog entry, rejecting it before any store call
pub fn validate_new_series(series: NewSeries) -> AppResult<NewSeries> {
    let title = series.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    if let Some(total) = series.total_episodes {
        if total < 1 {
            return Err(AppError::Validation(format!(
                "Total episodes must be at least 1, got {}",
                total
            )));
        }
    }

    if let Some(year) = series.release_year {
        if !(MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&year) {
            return Err(AppError::Validation(format!(
                "Release year must be between {} and {}, got {}",
                MIN_RELEASE_YEAR, MAX_RELEASE_YEAR, year
            )));
        }
    }

    if let Some(rating) = series.imdb_rating {
        if !(0.0..=MAX_IMDB_RATING).contains(&rating) {
            return Err(AppError::Validation(format!(
                "IMDb rating must be between 0 and {}, got {}",
                MAX_IMDB_RATING, rating
            )));
        }
    }

    Ok(NewSeries {
        title,
        description: blank_to_none(series.description),
        genre: blank_to_none(series.genre),
        poster_url: blank_to_none(series.poster_url),
        ..series
    })
}

/// Adds a series to the shared catalog
pub async fn add_series(
    store: &dyn TrackerStore,
    ctx: &UserContext,
    new: NewSeries,
) -> AppResult<Series> {
    let new = validate_new_series(new)?;
    let series = store.insert_series(ctx, new).await?;

    tracing::info!(
        user_id = %ctx.user_id,
        series_id = %series.id,
        title = %series.title,
        "Series added to catalog"
    );

    Ok(series)
}
