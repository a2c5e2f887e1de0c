use crate::{error::AppResult, models::UserContext};

pub mod hosted;
pub mod static_tokens;

pub use hosted::HostedAuth;
pub use static_tokens::StaticTokenAuth;

/// Authentication collaborator
///
/// Only the session-presence check lives here: a bearer token either maps to a
/// signed-in user or it does not. Sign-in and sign-up happen against the
/// identity provider directly.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the user behind `access_token`, or `None` if the session is absent or expired
    async fn resolve(&self, access_token: &str) -> AppResult<Option<UserContext>>;

    fn name(&self) -> &'static str;
}
