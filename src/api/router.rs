use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_loan, get_loan_by_id, list_active_loans, list_loans, list_overdue_loans,
    return_item,
};

/// Creates the API router with all circulation endpoints
///
/// Command endpoints (Write operations):
/// - POST /loans - Create a new loan
/// - POST /loans/:id/return - Return an item
///
/// Query endpoints (Read operations):
/// - GET /loans - List loans with optional filters
/// - GET /loans/active - List active loans
/// - GET /loans/overdue - List overdue loans (runs the overdue sweep first)
/// - GET /loans/:id - Get loan details
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Command endpoints (Write operations)
        .route("/loans", post(create_loan))
        .route("/loans/:id/return", post(return_item))
        // Query endpoints (Read operations)
        .route("/loans", get(list_loans))
        .route("/loans/active", get(list_active_loans))
        .route("/loans/overdue", get(list_overdue_loans))
        .route("/loans/:id", get(get_loan_by_id))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
