use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UserSeriesProgress;

/// A series in the shared catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Series {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub imdb_rating: Option<f64>,
    /// Unknown episode counts never trigger auto-completion
    pub total_episodes: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Payload for adding a series to the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewSeries {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    #[serde(default)]
    pub total_episodes: Option<i32>,
}

impl NewSeries {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Materializes the payload into a catalog row
    pub fn into_series(self, id: Uuid, created_at: DateTime<Utc>) -> Series {
        Series {
            id,
            title: self.title,
            description: self.description,
            genre: self.genre,
            release_year: self.release_year,
            poster_url: self.poster_url,
            imdb_rating: self.imdb_rating,
            total_episodes: self.total_episodes,
            created_at,
        }
    }
}

/// A catalog entry joined with the caller's progress record, if any
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesWithProgress {
    #[serde(flatten)]
    pub series: Series,
    pub user_progress: Option<UserSeriesProgress>,
}
