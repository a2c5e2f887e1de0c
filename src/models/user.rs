use uuid::Uuid;

/// Authenticated caller, resolved once per request and passed explicitly
/// into every store and view-model call.
#[derive(Clone)]
pub struct UserContext {
    pub user_id: Uuid,
    /// Bearer token forwarded to the hosted store so row-level auth applies
    pub access_token: String,
}

impl UserContext {
    pub fn new(user_id: Uuid, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            access_token: access_token.into(),
        }
    }
}

impl std::fmt::Debug for UserContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserContext")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let ctx = UserContext::new(Uuid::new_v4(), "secret-token");
        let rendered = format!("{:?}", ctx);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
