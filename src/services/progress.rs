use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::TrackerStore,
    error::{AppError, AppResult},
    models::{NewProgress, ProgressStatus, ProgressUpdate, UserContext, UserSeriesProgress},
};

/// Computes the single update that moves `progress` to `new_episode`
///
/// The status becomes `completed` (stamped with `now`) once a known episode
/// total is reached, `watching` otherwise. An unknown total never completes.
/// Moving to a lower episode is allowed.
pub fn episode_update(
    progress: &UserSeriesProgress,
    new_episode: i32,
    total_episodes: Option<i32>,
    now: DateTime<Utc>,
) -> AppResult<ProgressUpdate> {
    if new_episode < 1 {
        return Err(AppError::Validation(format!(
            "Episode must be a positive number, got {}",
            new_episode
        )));
    }

    if new_episode < progress.current_episode {
        tracing::debug!(
            progress_id = %progress.id,
            from = progress.current_episode,
            to = new_episode,
            "Episode moved backwards"
        );
    }

    let completed = total_episodes.is_some_and(|total| new_episode >= total);
    let status = if completed {
        ProgressStatus::Completed
    } else {
        ProgressStatus::Watching
    };

    Ok(ProgressUpdate {
        current_episode: new_episode,
        status,
        updated_at: now,
        started_at: progress.started_at.is_none().then_some(now),
        completed_at: completed.then_some(now),
    })
}

/// Returns `progress` as it reads after advancing to `new_episode`
pub fn advance_episode(
    progress: &UserSeriesProgress,
    new_episode: i32,
    total_episodes: Option<i32>,
    now: DateTime<Utc>,
) -> AppResult<UserSeriesProgress> {
    let update = episode_update(progress, new_episode, total_episodes, now)?;
    let mut updated = progress.clone();
    update.apply_to(&mut updated);
    Ok(updated)
}

/// Episode the "watch next" action targets
pub fn next_episode(progress: &UserSeriesProgress) -> i32 {
    progress.current_episode.saturating_add(1)
}

/// Only series being actively watched offer the next-episode action
pub fn can_advance(progress: &UserSeriesProgress) -> bool {
    progress.status == ProgressStatus::Watching
}

/// Share of episodes watched, in percent, when the total is known
pub fn progress_percent(current_episode: i32, total_episodes: Option<i32>) -> Option<f64> {
    match total_episodes {
        Some(total) if total > 0 => {
            let percent = f64::from(current_episode) / f64::from(total) * 100.0;
            Some(percent.clamp(0.0, 100.0))
        }
        _ => None,
    }
}

/// Adds a catalog series to the caller's list
pub async fn add_to_list(
    store: &dyn TrackerStore,
    ctx: &UserContext,
    new: NewProgress,
) -> AppResult<UserSeriesProgress> {
    // Unknown series surface as NotFound before touching user_series
    store.get_series(ctx, new.series_id).await?;

    let existing = store.list_progress(ctx).await?;
    if existing.iter().any(|p| p.series_id == new.series_id) {
        return Err(AppError::Validation(
            "Series is already on your list".to_string(),
        ));
    }

    let progress = store.insert_progress(ctx, new).await?;

    tracing::info!(
        user_id = %ctx.user_id,
        series_id = %progress.series_id,
        status = %progress.status,
        "Series added to list"
    );

    Ok(progress)
}

/// Persists an episode advance; `episode` defaults to the next one
pub async fn record_episode(
    store: &dyn TrackerStore,
    ctx: &UserContext,
    progress_id: Uuid,
    episode: Option<i32>,
    now: DateTime<Utc>,
) -> AppResult<UserSeriesProgress> {
    let progress = store.get_progress(ctx, progress_id).await?;
    let series = store.get_series(ctx, progress.series_id).await?;

    let episode = episode.unwrap_or_else(|| next_episode(&progress));
    let update = episode_update(&progress, episode, series.total_episodes, now)?;
    let updated = store.update_progress(ctx, progress_id, update).await?;

    tracing::info!(
        user_id = %ctx.user_id,
        progress_id = %progress_id,
        episode = updated.current_episode,
        status = %updated.status,
        "Episode progress recorded"
    );

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InMemoryStore, MockTrackerStore};
    use crate::models::NewSeries;

    fn progress_at(current_episode: i32) -> UserSeriesProgress {
        let now = Utc::now();
        UserSeriesProgress {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            series_id: Uuid::new_v4(),
            current_episode,
            status: ProgressStatus::Watching,
            rating: None,
            notes: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reaching_total_completes() {
        let now = Utc::now();
        let progress = progress_at(11);

        let updated = advance_episode(&progress, 12, Some(12), now).unwrap();
        assert_eq!(updated.current_episode, 12);
        assert_eq!(updated.status, ProgressStatus::Completed);
        assert_eq!(updated.completed_at, Some(now));
    }

    #[test]
    fn test_completion_threshold_across_episodes() {
        let now = Utc::now();
        let progress = progress_at(0);

        for episode in 1..=15 {
            let updated = advance_episode(&progress, episode, Some(10), now).unwrap();
            if episode >= 10 {
                assert_eq!(updated.status, ProgressStatus::Completed);
                assert!(updated.completed_at.is_some());
            } else {
                assert_eq!(updated.status, ProgressStatus::Watching);
                assert!(updated.completed_at.is_none());
            }
        }
    }

    #[test]
    fn test_unknown_total_never_completes() {
        let progress = progress_at(0);
        for episode in [1, 12, 500, i32::MAX] {
            let updated = advance_episode(&progress, episode, None, Utc::now()).unwrap();
            assert_eq!(updated.status, ProgressStatus::Watching);
            assert!(updated.completed_at.is_none());
        }
    }

    #[test]
    fn test_non_positive_episode_rejected() {
        let progress = progress_at(3);
        for episode in [0, -1] {
            let result = episode_update(&progress, episode, Some(10), Utc::now());
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_regression_is_permitted() {
        let progress = progress_at(8);
        let updated = advance_episode(&progress, 2, Some(10), Utc::now()).unwrap();
        assert_eq!(updated.current_episode, 2);
        assert_eq!(updated.status, ProgressStatus::Watching);

        // Moving back from a finished series reopens it
        let finished = advance_episode(&progress, 10, Some(10), Utc::now()).unwrap();
        assert!(finished.completed_at.is_some());
        let reopened = advance_episode(&finished, 5, Some(10), Utc::now()).unwrap();
        assert_eq!(reopened.status, ProgressStatus::Watching);
        assert_eq!(reopened.completed_at, None);
    }

    #[test]
    fn test_started_at_stamped_once() {
        let first = Utc::now();
        let progress = advance_episode(&progress_at(0), 1, None, first).unwrap();
        assert_eq!(progress.started_at, Some(first));

        let later = first + chrono::Duration::hours(2);
        let update = episode_update(&progress, 2, None, later).unwrap();
        assert_eq!(update.started_at, None);
        assert_eq!(update.updated_at, later);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(6, Some(12)), Some(50.0));
        assert_eq!(progress_percent(0, Some(12)), Some(0.0));
        assert_eq!(progress_percent(15, Some(12)), Some(100.0));
        assert_eq!(progress_percent(3, None), None);
        assert_eq!(progress_percent(3, Some(0)), None);
    }

    #[test]
    fn test_next_episode_and_advance_gate() {
        let mut progress = progress_at(4);
        assert_eq!(next_episode(&progress), 5);
        assert!(can_advance(&progress));

        progress.status = ProgressStatus::PlanToWatch;
        assert!(!can_advance(&progress));
    }

    #[tokio::test]
    async fn test_record_episode_defaults_to_next_and_persists_once() {
        let ctx = UserContext::new(Uuid::new_v4(), "token");
        let progress = progress_at(11);
        let progress_id = progress.id;
        let series = NewSeries {
            total_episodes: Some(12),
            ..NewSeries::new("Foo")
        }
        .into_series(progress.series_id, Utc::now());
        let now = Utc::now();

        let mut store = MockTrackerStore::new();
        let stored = progress.clone();
        store
            .expect_get_progress()
            .returning(move |_, _| Ok(stored.clone()));
        store
            .expect_get_series()
            .returning(move |_, _| Ok(series.clone()));
        let base = progress.clone();
        store
            .expect_update_progress()
            .withf(move |_, id, update| {
                *id == progress_id
                    && update.current_episode == 12
                    && update.status == ProgressStatus::Completed
                    && update.completed_at == Some(now)
            })
            .times(1)
            .returning(move |_, _, update| {
                let mut updated = base.clone();
                update.apply_to(&mut updated);
                Ok(updated)
            });

        let updated = record_episode(&store, &ctx, progress_id, None, now)
            .await
            .unwrap();
        assert_eq!(updated.current_episode, 12);
        assert_eq!(updated.status, ProgressStatus::Completed);
    }

    #[tokio::test]
    async fn test_record_episode_store_failure_propagates() {
        let ctx = UserContext::new(Uuid::new_v4(), "token");
        let progress = progress_at(1);
        let series = NewSeries::new("Foo").into_series(progress.series_id, Utc::now());

        let mut store = MockTrackerStore::new();
        let stored = progress.clone();
        store
            .expect_get_progress()
            .returning(move |_, _| Ok(stored.clone()));
        store
            .expect_get_series()
            .returning(move |_, _| Ok(series.clone()));
        store
            .expect_update_progress()
            .returning(|_, _, _| Err(AppError::Store("permission denied".to_string())));

        let result = record_episode(&store, &ctx, progress.id, Some(2), Utc::now()).await;
        tokio_test::assert_err!(&result);
        assert!(result.unwrap_err().is_store_error());
    }

    #[tokio::test]
    async fn test_add_to_list_rejects_duplicate() {
        let ctx = UserContext::new(Uuid::new_v4(), "token");
        let existing = progress_at(0);
        let series = NewSeries::new("Foo").into_series(existing.series_id, Utc::now());
        let series_id = series.id;

        let mut store = MockTrackerStore::new();
        store
            .expect_get_series()
            .returning(move |_, _| Ok(series.clone()));
        store
            .expect_list_progress()
            .returning(move |_| Ok(vec![existing.clone()]));
        store.expect_insert_progress().never();

        let result = add_to_list(
            &store,
            &ctx,
            NewProgress {
                series_id,
                status: ProgressStatus::PlanToWatch,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_recorded_regression_clears_completion() {
        let store = InMemoryStore::new();
        let ctx = UserContext::new(Uuid::new_v4(), "token");
        let series = store
            .insert_series(
                &ctx,
                NewSeries {
                    total_episodes: Some(12),
                    ..NewSeries::new("Foo")
                },
            )
            .await
            .unwrap();
        let progress = add_to_list(
            &store,
            &ctx,
            NewProgress {
                series_id: series.id,
                status: ProgressStatus::Watching,
            },
        )
        .await
        .unwrap();

        let finished = record_episode(&store, &ctx, progress.id, Some(12), Utc::now())
            .await
            .unwrap();
        assert_eq!(finished.status, ProgressStatus::Completed);
        assert!(finished.completed_at.is_some());

        let reopened = record_episode(&store, &ctx, progress.id, Some(5), Utc::now())
            .await
            .unwrap();
        assert_eq!(reopened.status, ProgressStatus::Watching);
        assert_eq!(reopened.completed_at, None);

        let stored = store.get_progress(&ctx, progress.id).await.unwrap();
        assert_eq!(stored.completed_at, None);
        assert!(stored.started_at.is_some());
    }
}
