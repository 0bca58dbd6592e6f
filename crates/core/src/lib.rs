//! `storefront-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;
pub mod slug;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError};
pub use id::{CategoryId, ProductId, UserId};
pub use pagination::{Pagination, PaginationQuery};
pub use slug::generate_slug;
