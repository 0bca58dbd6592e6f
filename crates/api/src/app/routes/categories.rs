use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use storefront_core::{CategoryId, PaginationQuery};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;
use crate::middleware::{self, AuthState};

pub fn router(auth_state: AuthState) -> Router {
    let public = Router::new()
        .route("/", get(list_categories))
        .route("/by-slug/:slug", get(category_by_slug))
        .route("/:id", get(get_category));

    let protected = Router::new()
        .route("/", post(create_category))
        .route("/:id", put(update_category).delete(delete_category))
        .route_layer(from_fn_with_state(auth_state, middleware::auth_middleware));

    public.merge(protected)
}

fn parse_id(raw: &str) -> Result<CategoryId, axum::response::Response> {
    raw.parse().map_err(|_| errors::invalid_id("category"))
}

fn forbidden(principal: &PrincipalContext) -> Option<axum::response::Response> {
    crate::authz::authorize_admin(principal)
        .err()
        .map(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> axum::response::Response {
    let query = match dto::pagination_query(query) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    match services.categories.get_all().await {
        Ok(all) => {
            let length = all.len();
            let items = query.resolve(services.default_page_size).apply(all);
            Json(dto::ListResponse { items, length }).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.categories.by_id(id).await {
        Ok(category) => Json(category).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn category_by_slug(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    match services.categories.by_slug(&slug).await {
        Ok(category) => Json(category).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CategoryRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Some(resp) = forbidden(&principal) {
        return resp;
    }
    let body = match dto::validated_json(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.categories.create(body.into()).await {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::CategoryRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Some(resp) = forbidden(&principal) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::validated_json(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.categories.update(id, body.into()).await {
        Ok(category) => Json(category).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Some(resp) = forbidden(&principal) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.categories.delete(id).await {
        Ok(category) => Json(category).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
