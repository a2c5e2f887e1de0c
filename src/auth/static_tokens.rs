use std::collections::HashMap;

use uuid::Uuid;

use crate::{auth::AuthProvider, error::AppResult, models::UserContext};

/// Fixed token table, for local development and tests
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuth {
    tokens: HashMap<String, Uuid>,
}

impl StaticTokenAuth {
    pub fn new(tokens: impl IntoIterator<Item = (String, Uuid)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn resolve(&self, access_token: &str) -> AppResult<Option<UserContext>> {
        Ok(self
            .tokens
            .get(access_token)
            .map(|user_id| UserContext::new(*user_id, access_token)))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
