use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

/// Lifecycle of a scheduled watch session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "session_status", rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Skipped,
}

impl SessionStatus {
    /// Completed and skipped sessions accept no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Scheduled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal outcome a scheduled session can be marked with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Completed,
    Skipped,
}

impl From<SessionOutcome> for SessionStatus {
    fn from(outcome: SessionOutcome) -> Self {
        match outcome {
            SessionOutcome::Completed => SessionStatus::Completed,
            SessionOutcome::Skipped => SessionStatus::Skipped,
        }
    }
}

/// A dated intent to watch one episode of a series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct WatchSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub series_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub episode_number: i32,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WatchSession {
    /// Rejection for a transition out of this session's current, final status
    pub fn already_final(&self) -> AppError {
        AppError::InvalidTransition(format!("Session {} is already {}", self.id, self.status))
    }
}

fn default_episode_number() -> i32 {
    1
}

/// Payload for scheduling a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewWatchSession {
    pub series_id: Uuid,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub scheduled_time: Option<NaiveTime>,
    #[serde(default = "default_episode_number")]
    pub episode_number: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewWatchSession {
    /// Materializes the payload into a freshly scheduled session owned by `user_id`
    pub fn into_session(self, id: Uuid, user_id: Uuid, created_at: DateTime<Utc>) -> WatchSession {
        WatchSession {
            id,
            user_id,
            series_id: self.series_id,
            scheduled_date: self.scheduled_date,
            scheduled_time: self.scheduled_time,
            episode_number: self.episode_number,
            status: SessionStatus::Scheduled,
            notes: self.notes,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!SessionStatus::Scheduled.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Skipped.is_terminal());
    }

    #[test]
    fn test_outcome_maps_to_status() {
        assert_eq!(SessionStatus::from(SessionOutcome::Skipped), SessionStatus::Skipped);
        assert_eq!(SessionStatus::from(SessionOutcome::Completed), SessionStatus::Completed);
    }

    #[test]
    fn test_new_session_defaults_to_first_episode() {
        let series_id = Uuid::new_v4();
        let json = serde_json::json!({
            "series_id": series_id,
            "scheduled_date": "2024-01-01",
        });

        let payload: NewWatchSession = serde_json::from_value(json).unwrap();
        assert_eq!(payload.episode_number, 1);
        assert_eq!(payload.scheduled_time, None);
        assert_eq!(payload.scheduled_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_scheduled_time_parses_store_format() {
        let json = serde_json::json!({
            "series_id": Uuid::new_v4(),
            "scheduled_date": "2024-03-09",
            "scheduled_time": "20:30:00",
            "episode_number": 4,
        });

        let payload: NewWatchSession = serde_json::from_value(json).unwrap();
        assert_eq!(payload.scheduled_time, NaiveTime::from_hms_opt(20, 30, 0));
    }
}
