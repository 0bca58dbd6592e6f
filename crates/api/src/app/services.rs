//! Service wiring: pick a store, then hand it to every service as an explicit dependency.

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use tracing::info;

use storefront_auth::{AuthService, TokenIssuer, UserGateway};
use storefront_catalog::{
    CatalogService, CategoryGateway, CategoryResolver, CategoryService, ProductGateway,
};
use storefront_infra::{InMemoryStore, PgStore};

use crate::config::ApiConfig;

pub type Catalog = CatalogService<Arc<dyn ProductGateway>, Arc<dyn CategoryResolver>>;
pub type Categories = CategoryService<Arc<dyn CategoryGateway>>;
pub type Auth = AuthService<Arc<dyn UserGateway>>;

/// Shared, immutable application services (one instance per process).
pub struct AppServices {
    pub catalog: Catalog,
    pub categories: Arc<Categories>,
    pub auth: Auth,
    pub default_page_size: u32,
}

impl AppServices {
    /// Wire every service over one store implementing all gateways.
    pub fn over<S>(store: Arc<S>, tokens: TokenIssuer, config: &ApiConfig) -> Self
    where
        S: ProductGateway + CategoryGateway + UserGateway + 'static,
    {
        let products: Arc<dyn ProductGateway> = store.clone();
        let category_gateway: Arc<dyn CategoryGateway> = store.clone();
        let users: Arc<dyn UserGateway> = store;

        let categories = Arc::new(CategoryService::new(category_gateway));
        let resolver: Arc<dyn CategoryResolver> = categories.clone();

        Self {
            catalog: CatalogService::new(products, resolver),
            categories,
            auth: AuthService::new(users, tokens).with_admin_emails(&config.admin_emails),
            default_page_size: config.default_page_size,
        }
    }
}

pub fn token_issuer(config: &ApiConfig) -> anyhow::Result<TokenIssuer> {
    let access_ttl = Duration::try_seconds(config.jwt_access_ttl_secs)
        .context("JWT_ACCESS_TTL_SECS out of range")?;
    let refresh_ttl = Duration::try_seconds(config.jwt_refresh_ttl_secs)
        .context("JWT_REFRESH_TTL_SECS out of range")?;
    Ok(TokenIssuer::new(config.jwt_secret.as_bytes(), access_ttl, refresh_ttl))
}

pub async fn build_services(config: &ApiConfig, tokens: TokenIssuer) -> anyhow::Result<AppServices> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to Postgres")?;
            store.migrate().await.context("failed to apply schema")?;
            info!("using Postgres store");
            Ok(AppServices::over(Arc::new(store), tokens, config))
        }
        None => {
            info!("DATABASE_URL not set; using in-memory store");
            Ok(AppServices::over(Arc::new(InMemoryStore::new()), tokens, config))
        }
    }
}
