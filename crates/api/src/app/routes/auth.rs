use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/login/access-token", post(refresh_tokens))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::validated_json(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.auth.register(body.into()).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::validated_json(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.auth.login(body.into()).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn refresh_tokens(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RefreshTokenRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::validated_json(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.auth.get_new_tokens(&body.refresh_token).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
