use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::TrackerStore,
    error::{AppError, AppResult},
    models::{Series, UserContext, WatchSession},
    services::sessions::{count_by_status, SessionCounts},
};

/// The seven days of the Monday-first week containing `anchor`
///
/// Fails only when that week runs past the edge of the representable calendar.
pub fn week_of(anchor: NaiveDate) -> AppResult<[NaiveDate; 7]> {
    let monday = anchor
        .checked_sub_days(Days::new(u64::from(anchor.weekday().num_days_from_monday())))
        .filter(|monday| monday.checked_add_days(Days::new(6)).is_some())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "The week of {} leaves the supported calendar range",
                anchor
            ))
        })?;

    // Sunday is representable, so every day in between is too
    Ok(std::array::from_fn(|offset| monday + Days::new(offset as u64)))
}

/// Sessions falling on `date`, in their original order
pub fn sessions_on<'a>(date: NaiveDate, sessions: &'a [WatchSession]) -> Vec<&'a WatchSession> {
    sessions
        .iter()
        .filter(|session| session.scheduled_date == date)
        .collect()
}

/// Moves `anchor` by whole weeks, forwards or backwards
pub fn shift_week(anchor: NaiveDate, delta_weeks: i64) -> AppResult<NaiveDate> {
    let out_of_range = || {
        AppError::Validation(format!(
            "Shifting {} by {} weeks leaves the supported calendar range",
            anchor, delta_weeks
        ))
    };

    let days = delta_weeks.checked_mul(7).ok_or_else(out_of_range)?;
    let step = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        anchor.checked_add_days(step)
    } else {
        anchor.checked_sub_days(step)
    };

    shifted.ok_or_else(out_of_range)
}

/// A session on the calendar, with the title of its series
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarEntry {
    #[serde(flatten)]
    pub session: WatchSession,
    /// `None` when the series is no longer in the catalog
    pub series_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub weekday: String,
    pub sessions: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekView {
    pub anchor: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DaySchedule>,
    pub counts: SessionCounts,
}

/// Buckets `sessions` into the week containing `anchor`
pub fn build_week(
    anchor: NaiveDate,
    sessions: &[WatchSession],
    series: &[Series],
) -> AppResult<WeekView> {
    let titles: HashMap<Uuid, &str> = series.iter().map(|s| (s.id, s.title.as_str())).collect();
    let dates = week_of(anchor)?;

    let days: Vec<DaySchedule> = dates
        .iter()
        .map(|&date| DaySchedule {
            date,
            weekday: date.format("%A").to_string(),
            sessions: sessions_on(date, sessions)
                .into_iter()
                .map(|session| CalendarEntry {
                    session: session.clone(),
                    series_title: titles.get(&session.series_id).map(|t| t.to_string()),
                })
                .collect(),
        })
        .collect();

    let counts = count_by_status(days.iter().flat_map(|d| d.sessions.iter().map(|e| &e.session)));

    Ok(WeekView {
        anchor,
        start: dates[0],
        end: dates[6],
        days,
        counts,
    })
}

/// Loads the week `delta_weeks` away from `anchor`
///
/// Catalog and sessions are fetched concurrently and joined once both arrive.
pub async fn load_week(
    store: &dyn TrackerStore,
    ctx: &UserContext,
    anchor: NaiveDate,
    delta_weeks: i64,
) -> AppResult<WeekView> {
    let anchor = shift_week(anchor, delta_weeks)?;

    let (series, sessions) = tokio::try_join!(store.list_series(ctx), store.list_sessions(ctx))?;

    tracing::debug!(
        user_id = %ctx.user_id,
        anchor = %anchor,
        session_count = sessions.len(),
        "Building week view"
    );

    build_week(anchor, &sessions, &series)
}
