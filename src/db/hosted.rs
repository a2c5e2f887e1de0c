//! Hosted store client
//!
//! Talks to a managed relational backend over its REST interface:
//! `GET /rest/v1/{table}?select=*&order=...` lists rows, `POST` inserts and
//! `PATCH ?id=eq.{id}` updates, both returning the affected rows when asked
//! via `Prefer: return=representation`. The caller's bearer token is
//! forwarded on every request so the backend's row-level auth scopes
//! per-user tables.

use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    db::TrackerStore,
    error::{AppError, AppResult},
    models::{
        NewProgress, NewSeries, NewWatchSession, ProgressUpdate, Series, SessionStatus,
        UserContext, UserSeriesProgress, WatchSession,
    },
};

const SERIES_TABLE: &str = "series";
const PROGRESS_TABLE: &str = "user_series";
const SESSIONS_TABLE: &str = "watch_sessions";

#[derive(Clone)]
pub struct HostedStore {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
}

/// Insert body for per-user tables
#[derive(Serialize)]
struct Owned<'a, T: Serialize> {
    #[serde(flatten)]
    payload: &'a T,
    user_id: Uuid,
}

impl HostedStore {
    pub fn new(http_client: HttpClient, api_url: String, api_key: String) -> Self {
        Self {
            http_client,
            api_url,
            api_key,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.api_url, table)
    }

    fn authorized(&self, ctx: &UserContext, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&ctx.access_token)
    }

    /// Maps non-success statuses onto store errors, keeping the backend's message
    async fn check(response: Response) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await?;
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["message"].as_str().map(str::to_string))
            .unwrap_or(body);

        Err(AppError::Store(format!(
            "Store returned status {}: {}",
            status, message
        )))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        ctx: &UserContext,
        table: &str,
        query: &[(&str, String)],
    ) -> AppResult<Vec<T>> {
        let request = self
            .http_client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(query);

        let response = Self::check(self.authorized(ctx, request).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        ctx: &UserContext,
        table: &str,
        kind: &str,
        id: Uuid,
    ) -> AppResult<T> {
        self.select(ctx, table, &[("id", format!("eq.{}", id))])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("{} {} does not exist", kind, id)))
    }

    async fn insert<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        ctx: &UserContext,
        table: &str,
        body: &B,
    ) -> AppResult<T> {
        let request = self
            .http_client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body);

        let response = Self::check(self.authorized(ctx, request).send().await?).await?;
        let rows: Vec<T> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Store(format!("Insert into {} returned no row", table)))
    }

    /// PATCHes the row `id`, narrowed further by `filters`
    async fn update<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        ctx: &UserContext,
        table: &str,
        kind: &str,
        id: Uuid,
        filters: &[(&str, String)],
        body: &B,
    ) -> AppResult<T> {
        let request = self
            .http_client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .query(filters)
            .header("Prefer", "return=representation")
            .json(body);

        let response = Self::check(self.authorized(ctx, request).send().await?).await?;
        let rows: Vec<T> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("{} {} does not exist", kind, id)))
    }
}

#[async_trait::async_trait]
impl TrackerStore for HostedStore {
    async fn list_series(&self, ctx: &UserContext) -> AppResult<Vec<Series>> {
        self.select(ctx, SERIES_TABLE, &[("order", "title.asc".to_string())])
            .await
    }

    async fn get_series(&self, ctx: &UserContext, id: Uuid) -> AppResult<Series> {
        self.select_one(ctx, SERIES_TABLE, "series", id).await
    }

    async fn insert_series(&self, ctx: &UserContext, series: NewSeries) -> AppResult<Series> {
        self.insert(ctx, SERIES_TABLE, &series).await
    }

    async fn list_progress(&self, ctx: &UserContext) -> AppResult<Vec<UserSeriesProgress>> {
        self.select(
            ctx,
            PROGRESS_TABLE,
            &[
                ("user_id", format!("eq.{}", ctx.user_id)),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn get_progress(&self, ctx: &UserContext, id: Uuid) -> AppResult<UserSeriesProgress> {
        self.select_one(ctx, PROGRESS_TABLE, "progress record", id)
            .await
    }

    async fn insert_progress(
        &self,
        ctx: &UserContext,
        progress: NewProgress,
    ) -> AppResult<UserSeriesProgress> {
        let body = Owned {
            payload: &progress,
            user_id: ctx.user_id,
        };
        self.insert(ctx, PROGRESS_TABLE, &body).await
    }

    async fn update_progress(
        &self,
        ctx: &UserContext,
        id: Uuid,
        update: ProgressUpdate,
    ) -> AppResult<UserSeriesProgress> {
        self.update(ctx, PROGRESS_TABLE, "progress record", id, &[], &update)
            .await
    }

    async fn list_sessions(&self, ctx: &UserContext) -> AppResult<Vec<WatchSession>> {
        self.select(
            ctx,
            SESSIONS_TABLE,
            &[
                ("user_id", format!("eq.{}", ctx.user_id)),
                ("order", "scheduled_date.asc,created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn get_session(&self, ctx: &UserContext, id: Uuid) -> AppResult<WatchSession> {
        self.select_one(ctx, SESSIONS_TABLE, "watch session", id)
            .await
    }

    async fn insert_session(
        &self,
        ctx: &UserContext,
        session: NewWatchSession,
    ) -> AppResult<WatchSession> {
        let body = Owned {
            payload: &session,
            user_id: ctx.user_id,
        };
        self.insert(ctx, SESSIONS_TABLE, &body).await
    }

    async fn update_session_status(
        &self,
        ctx: &UserContext,
        id: Uuid,
        status: SessionStatus,
    ) -> AppResult<WatchSession> {
        let result = self
            .update(
                ctx,
                SESSIONS_TABLE,
                "watch session",
                id,
                &[("status", "eq.scheduled".to_string())],
                &json!({ "status": status }),
            )
            .await;

        match result {
            // Either missing or no longer scheduled
            Err(AppError::NotFound(_)) => {
                let current: WatchSession = self.get_session(ctx, id).await?;
                Err(current.already_final())
            }
            other => other,
        }
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}
