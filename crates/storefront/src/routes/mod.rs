//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog (featured shelf + all books, ?genre=)
//! GET  /books/{id}             - Book detail with reviews
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//! GET  /static/*               - Stylesheets and cover images
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Set quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! POST /cart/clear             - Empty the cart (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # JSON API
//! GET    /api/books            - List books (?featured=&genre=)
//! POST   /api/books            - Create book
//! GET    /api/books/{id}       - Fetch book
//! PUT    /api/books/{id}       - Partial update
//! DELETE /api/books/{id}       - Delete book
//! GET    /api/reviews          - List reviews (?bookId=)
//! POST   /api/reviews          - Create review
//! GET    /api/reviews/{id}     - Fetch review
//! PUT    /api/reviews/{id}     - Partial update
//! DELETE /api/reviews/{id}     - Delete review
//! GET    /api/cart             - Cart with totals
//! POST   /api/cart             - Add or merge a line
//! PUT    /api/cart             - Set a line's quantity
//! DELETE /api/cart             - Remove a line (?cartItemId=) or empty (?clear=true)
//! ```

pub mod api;
pub mod books;
pub mod cart;
pub mod home;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// The `HX-Trigger` event fired after every successful cart mutation.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Static assets, relative to the workspace root.
const STATIC_DIR: &str = "crates/storefront/static";

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog pages
        .route("/", get(home::home))
        .route("/books/{id}", get(books::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // JSON API
        .nest("/api", api::routes())
        // Health
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Static files
        .nest_service("/static", ServeDir::new(STATIC_DIR))
}

/// Build the complete application with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    routes()
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.storage().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
