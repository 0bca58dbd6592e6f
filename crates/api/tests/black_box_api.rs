use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use storefront_api::config::ApiConfig;
use storefront_auth::{JwtClaims, Role, TokenKind};
use storefront_core::UserId;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(ApiConfig {
            jwt_secret: JWT_SECRET.to_string(),
            ..ApiConfig::default()
        })
        .await
    }

    async fn spawn_with(config: ApiConfig) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = storefront_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, email: &str) -> Value {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "email": email, "password": "password1" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    /// Register a real account (products reference their owner) and mint an admin token for it.
    async fn admin_token(&self) -> String {
        let user = self.register("admin@shop.test").await;
        let id = user["user"]["id"].as_i64().unwrap() as i32;
        mint_jwt(UserId::new(id), Role::for_account(true), TokenKind::Access)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(sub: UserId, roles: Vec<Role>, kind: TokenKind) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub,
        roles,
        kind,
        jti: uuid::Uuid::now_v7(),
        iat: now,
        exp: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn product_by_id_requires_an_access_token() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    let refresh = mint_jwt(UserId::new(1), vec![Role::customer()], TokenKind::Refresh);
    let res = srv
        .client
        .get(srv.url("/products/1"))
        .bearer_auth(refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let access = mint_jwt(UserId::new(1), vec![Role::customer()], TokenKind::Access);
    let res = srv
        .client
        .get(srv.url("/products/1"))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Product not found!");
}

#[tokio::test]
async fn register_login_and_refresh() {
    let srv = TestServer::spawn().await;

    let registered = srv.register("Ann@Shop.test").await;
    assert_eq!(registered["user"]["email"], "ann@shop.test");
    assert_eq!(registered["user"]["isAdmin"], false);
    assert!(registered["accessToken"].is_string());

    let res = srv
        .client
        .post(srv.url("/auth/register"))
        .json(&json!({ "email": "ann@shop.test", "password": "password1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "User already exists");

    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": "ann@shop.test", "password": "wrong-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": "bob@shop.test", "password": "password1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": "ann@shop.test", "password": "password1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let logged_in: Value = res.json().await.unwrap();
    assert_eq!(logged_in["user"]["id"], registered["user"]["id"]);

    let res = srv
        .client
        .post(srv.url("/auth/login/access-token"))
        .json(&json!({ "refreshToken": logged_in["refreshToken"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let refreshed: Value = res.json().await.unwrap();
    assert_eq!(refreshed["user"]["email"], "ann@shop.test");

    let res = srv
        .client
        .post(srv.url("/auth/login/access-token"))
        .json(&json!({ "refreshToken": logged_in["accessToken"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_bodies_are_rejected_before_the_handler() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/auth/register"))
        .json(&json!({ "email": "not-an-email", "password": "123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn customers_cannot_write_the_catalog() {
    let srv = TestServer::spawn().await;
    let customer = srv.register("cust@shop.test").await;
    let token = customer["accessToken"].as_str().unwrap();

    let res = srv
        .client
        .post(srv.url("/products"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .post(srv.url("/categories"))
        .bearer_auth(token)
        .json(&json!({ "name": "Shoes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn product_lifecycle_create_update_query_delete() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    // Category
    let res = srv
        .client
        .post(srv.url("/categories"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Shoes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let category: Value = res.json().await.unwrap();
    assert_eq!(category["slug"], "shoes");
    let category_id = category["id"].as_i64().unwrap();

    // Create draft
    let res = srv
        .client
        .post(srv.url("/products"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let res = srv
        .client
        .get(srv.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let draft: Value = res.json().await.unwrap();
    assert_eq!(draft["name"], "");
    assert_eq!(draft["slug"], "");
    assert_eq!(draft["price"], 0);

    // Unknown category: nothing is written
    let res = srv
        .client
        .put(srv.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "name": "Red Shoes", "price": 100, "categoryId": 999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Category not found!");

    // Name without letters or digits: rejected, draft untouched
    let res = srv
        .client
        .put(srv.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "name": "!!!", "price": 100, "categoryId": category_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Update
    let res = srv
        .client
        .put(srv.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Red Shoes",
            "description": "Bright red",
            "price": 100,
            "images": ["/uploads/red.png"],
            "categoryId": category_id
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["slug"], "red-shoes");
    assert_eq!(updated["categoryId"], category_id);

    // Public reads
    let res = srv.client.get(srv.url("/products/by-slug/red-shoes")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let full: Value = res.json().await.unwrap();
    assert_eq!(full["id"], id);
    assert_eq!(full["category"]["slug"], "shoes");
    assert_eq!(full["user"]["avatarPath"], "/uploads/default-avatar.png");

    let res = srv.client.get(srv.url("/products/by-category/shoes")).send().await.unwrap();
    let listed: Value = res.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id);

    let res = srv.client.get(srv.url("/products/by-category/hats")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: Value = res.json().await.unwrap();
    assert!(listed.as_array().unwrap().is_empty());

    let res = srv.client.get(srv.url(&format!("/products/similar/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The category is still referenced
    let res = srv
        .client
        .delete(srv.url(&format!("/categories/{category_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Delete
    let res = srv
        .client
        .delete(srv.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .get(srv.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv.client.get(srv.url("/products/by-slug/red-shoes")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_listing_is_paginated() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    for _ in 0..3 {
        let res = srv
            .client
            .post(srv.url("/products"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = srv.client.get(srv.url("/products")).send().await.unwrap();
    let all: Value = res.json().await.unwrap();
    assert_eq!(all["length"], 3);
    assert_eq!(all["items"].as_array().unwrap().len(), 3);

    let res = srv
        .client
        .get(srv.url("/products?page=2&perPage=2"))
        .send()
        .await
        .unwrap();
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["length"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["id"], 3);

    let res = srv.client.get(srv.url("/products?page=abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_ids_are_rejected() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    for path in ["/products/abc", "/products/0", "/products/-4"] {
        let res = srv
            .client
            .get(srv.url(path))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
    }

    let res = srv.client.get(srv.url("/categories/xyz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn configured_admin_email_can_manage_categories() {
    let srv = TestServer::spawn_with(ApiConfig {
        jwt_secret: JWT_SECRET.to_string(),
        admin_emails: vec!["boss@shop.test".to_string()],
        ..ApiConfig::default()
    })
    .await;

    let boss = srv.register("boss@shop.test").await;
    assert_eq!(boss["user"]["isAdmin"], true);
    let token = boss["accessToken"].as_str().unwrap();

    let res = srv
        .client
        .post(srv.url("/categories"))
        .bearer_auth(token)
        .json(&json!({ "name": "Winter Coats" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let res = srv
        .client
        .put(srv.url(&format!("/categories/{id}")))
        .bearer_auth(token)
        .json(&json!({ "name": "Snow Coats" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/categories/by-slug/snow-coats")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/categories")).send().await.unwrap();
    let listed: Value = res.json().await.unwrap();
    assert_eq!(listed["length"], 1);

    let res = srv
        .client
        .delete(srv.url(&format!("/categories/{id}")))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url(&format!("/categories/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
