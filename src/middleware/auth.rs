use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    api::AppState,
    error::{AppError, AppResult},
};

/// Resolves the bearer token into a `UserContext` extension, or rejects with 401
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?
        .to_string();

    let ctx = state
        .auth
        .resolve(&token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;

    tracing::Span::current().record("user_id", tracing::field::display(ctx.user_id));
    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        http::{header, HeaderValue, StatusCode},
        routing::get,
        Extension, Router,
    };
    use axum_test::TestServer;
    use uuid::Uuid;

    use super::*;
    use crate::{auth::MockAuthProvider, db::InMemoryStore, models::UserContext};

    fn server_with(auth: MockAuthProvider) -> TestServer {
        let state = AppState::new(Arc::new(InMemoryStore::new()), Arc::new(auth));
        let app = Router::new()
            .route(
                "/whoami",
                get(|Extension(ctx): Extension<UserContext>| async move { ctx.user_id.to_string() }),
            )
            .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_user))
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_resolved_user_reaches_handler() {
        let user_id = Uuid::new_v4();
        let mut auth = MockAuthProvider::new();
        auth.expect_resolve()
            .withf(|token| token == "abc")
            .returning(move |token| Ok(Some(UserContext::new(user_id, token))));

        let response = server_with(auth)
            .get("/whoami")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"))
            .await;
        response.assert_status_ok();
        response.assert_text(user_id.to_string());
    }

    #[tokio::test]
    async fn test_non_bearer_header_rejected_without_lookup() {
        let mut auth = MockAuthProvider::new();
        auth.expect_resolve().never();

        let response = server_with(auth)
            .get("/whoami")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_backend_failure_is_store_error() {
        let mut auth = MockAuthProvider::new();
        auth.expect_resolve()
            .returning(|_| Err(AppError::Store("auth endpoint unavailable".to_string())));

        let response = server_with(auth)
            .get("/whoami")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"))
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);
    }
}
