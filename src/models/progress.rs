use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tracking status of a series on a user's list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "series_status", rename_all = "snake_case")]
pub enum ProgressStatus {
    Watching,
    Completed,
    OnHold,
    Dropped,
    #[default]
    PlanToWatch,
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 5] = [
        ProgressStatus::Watching,
        ProgressStatus::Completed,
        ProgressStatus::OnHold,
        ProgressStatus::Dropped,
        ProgressStatus::PlanToWatch,
    ];

    /// Wire name, as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Watching => "watching",
            ProgressStatus::Completed => "completed",
            ProgressStatus::OnHold => "on_hold",
            ProgressStatus::Dropped => "dropped",
            ProgressStatus::PlanToWatch => "plan_to_watch",
        }
    }

    /// Human-readable label for list badges
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStatus::Watching => "Watching",
            ProgressStatus::Completed => "Completed",
            ProgressStatus::OnHold => "On Hold",
            ProgressStatus::Dropped => "Dropped",
            ProgressStatus::PlanToWatch => "Plan to Watch",
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProgressStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown series status '{}'", s))
    }
}

/// A user's tracking state for one series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct UserSeriesProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub series_id: Uuid,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub current_episode: i32,
    pub status: ProgressStatus,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The hosted store reports a never-advanced record as `null`
fn null_as_zero<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i32>::deserialize(deserializer)?.unwrap_or(0))
}

/// Payload for "add to list"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProgress {
    pub series_id: Uuid,
    #[serde(default)]
    pub status: ProgressStatus,
}

/// Fields written by a single progress update request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProgressUpdate {
    pub current_episode: i32,
    pub status: ProgressStatus,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Always written: `None` clears a stale completion stamp
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressUpdate {
    /// Applies the update in place; an absent `started_at` keeps the stored one
    pub fn apply_to(&self, progress: &mut UserSeriesProgress) {
        progress.current_episode = self.current_episode;
        progress.status = self.status;
        progress.updated_at = self.updated_at;
        if let Some(started_at) = self.started_at {
            progress.started_at = Some(started_at);
        }
        progress.completed_at = self.completed_at;
    }
}
