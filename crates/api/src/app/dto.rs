use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use storefront_auth::{LoginInput, RegisterInput};
use storefront_catalog::{CategoryDto, ProductDto};
use storefront_core::{CategoryId, PaginationQuery};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(r: RegisterRequest) -> Self {
        Self {
            email: r.email,
            password: r.password,
            name: r.name,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

impl From<LoginRequest> for LoginInput {
    fn from(r: LoginRequest) -> Self {
        Self {
            email: r.email,
            password: r.password,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub price: i32,
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(range(min = 1))]
    pub category_id: i32,
}

impl From<ProductRequest> for ProductDto {
    fn from(r: ProductRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            price: r.price,
            images: r.images,
            category_id: CategoryId::new(r.category_id),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

impl From<CategoryRequest> for CategoryDto {
    fn from(r: CategoryRequest) -> Self {
        Self { name: r.name }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    /// Size of the unpaged result set.
    pub length: usize,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse<I> {
    pub id: I,
}

// -------------------------
// Extraction helpers
// -------------------------

/// Turn a JSON extraction result into a validated body, or a 400 response.
pub fn validated_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response>
where
    T: DeserializeOwned + Validate,
{
    let Json(value) = body.map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text())
    })?;
    value.validate().map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "validation_error", describe(&e))
    })?;
    Ok(value)
}

pub fn pagination_query(
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<PaginationQuery, axum::response::Response> {
    query
        .map(|Query(q)| q)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text()))
}

/// Flatten field errors into `field: message` pairs, sorted for stable output.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{field}: {msg}"),
                None => format!("{field}: invalid ({})", e.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(json: serde_json::Value) -> Result<ProductRequest, axum::response::Response> {
        let parsed: ProductRequest = serde_json::from_value(json).unwrap();
        validated_json(Ok(Json(parsed)))
    }

    #[test]
    fn valid_product_passes_and_converts() {
        let req = product(serde_json::json!({
            "name": "Red Shoes",
            "price": 100,
            "categoryId": 2
        }))
        .unwrap();
        let dto = ProductDto::from(req);
        assert_eq!(dto.category_id, CategoryId::new(2));
        assert_eq!(dto.description, "");
        assert!(dto.images.is_empty());
    }

    #[test]
    fn invalid_product_is_rejected() {
        for body in [
            serde_json::json!({"name": "", "price": 1, "categoryId": 1}),
            serde_json::json!({"name": "x", "price": -1, "categoryId": 1}),
            serde_json::json!({"name": "x", "price": 1, "categoryId": 0}),
        ] {
            let resp = product(body).unwrap_err();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn register_checks_email_and_password() {
        let bad = RegisterRequest {
            email: "nope".into(),
            password: "123".into(),
            name: None,
        };
        let errs = bad.validate().unwrap_err();
        let text = describe(&errs);
        assert!(text.contains("email: must be a valid email"));
        assert!(text.contains("password: must be at least 6 characters"));
    }

    #[test]
    fn refresh_request_uses_camel_case() {
        let req: RefreshTokenRequest =
            serde_json::from_str(r#"{"refreshToken":"abc"}"#).unwrap();
        assert_eq!(req.refresh_token, "abc");
    }
}
