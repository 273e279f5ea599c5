//! Axum router construction.

use axum::Router;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`]: every method and path goes to
/// [`handlers::origin`].
pub fn build(state: AppState) -> Router {
    Router::new()
        .fallback(handlers::origin)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::storage::MockObjectStore;

    fn app() -> Router {
        let mut store = MockObjectStore::new();
        store.expect_get_object().never();
        build(AppState::new(Arc::new(store), &Config::default()).unwrap())
    }

    #[tokio::test]
    async fn every_path_reaches_the_origin_handler() {
        for uri in ["/", "/deeply/nested/path", "/file.txt?query=1"] {
            let req = Request::builder()
                .method("OPTIONS")
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let resp = app().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), 204, "uri {uri}");
        }
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected() {
        let req = Request::builder()
            .method("DELETE")
            .uri("/index.html")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 405);
    }
}
