use axum::Router;

use crate::middleware::AuthState;

pub mod auth;
pub mod categories;
pub mod products;
pub mod system;

/// Router for every resource endpoint; each area decides which routes need a token.
pub fn router(auth_state: AuthState) -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router(auth_state.clone()))
        .nest("/categories", categories::router(auth_state))
}
