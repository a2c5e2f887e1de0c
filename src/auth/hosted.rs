use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthProvider,
    error::{AppError, AppResult},
    models::UserContext,
};

/// Resolves sessions against the hosted identity endpoint (`/auth/v1/user`)
#[derive(Clone)]
pub struct HostedAuth {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct HostedUser {
    id: Uuid,
}

impl HostedAuth {
    pub fn new(http_client: HttpClient, api_url: String, api_key: String) -> Self {
        Self {
            http_client,
            api_url,
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl AuthProvider for HostedAuth {
    async fn resolve(&self, access_token: &str) -> AppResult<Option<UserContext>> {
        let url = format!("{}/auth/v1/user", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::debug!("Hosted auth rejected access token");
                Ok(None)
            }
            status if status.is_success() => {
                let user: HostedUser = response.json().await?;
                Ok(Some(UserContext::new(user.id, access_token)))
            }
            status => {
                let body = response.text().await?;
                Err(AppError::Store(format!(
                    "Auth endpoint returned status {}: {}",
                    status, body
                )))
            }
        }
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}
