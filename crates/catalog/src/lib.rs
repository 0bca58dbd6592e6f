//! `storefront-catalog`: product catalog domain and services.
//!
//! Persistence is reached only through the gateway traits in [`gateway`]; this crate
//! has no storage or HTTP dependencies.

pub mod category;
pub mod category_service;
pub mod gateway;
pub mod product;
pub mod service;

pub use category::{Category, CategoryDto};
pub use category_service::CategoryService;
pub use gateway::{CategoryGateway, CategoryResolver, ProductGateway};
pub use product::{CategorySummary, OwnerSummary, Product, ProductChanges, ProductDto, ProductFull};
pub use service::{CatalogService, SIMILAR_LIMIT};
