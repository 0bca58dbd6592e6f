//! Persistence gateway contracts.
//!
//! Implementations execute one store call per method and report absence either as
//! `Option::None` (lookups) or [`StoreError::NotFound`] (writes). Schema constraints
//! (unique slug, foreign keys) surface as [`StoreError::Constraint`].

use std::sync::Arc;

use async_trait::async_trait;

use storefront_core::{CategoryId, DomainResult, ProductId, StoreError};

use crate::category::Category;
use crate::product::{Product, ProductChanges, ProductFull};

/// Product persistence.
#[async_trait]
pub trait ProductGateway: Send + Sync {
    /// Every product, in store-native order.
    async fn find_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Insert a draft product and return its store-assigned id.
    async fn insert_draft(&self) -> Result<ProductId, StoreError>;

    async fn find_full_by_id(&self, id: ProductId) -> Result<Option<ProductFull>, StoreError>;

    async fn find_full_by_slug(&self, slug: &str) -> Result<Option<ProductFull>, StoreError>;

    async fn find_full_by_category_slug(&self, category_slug: &str) -> Result<Vec<ProductFull>, StoreError>;

    /// Products of `category_id` other than `exclude`, newest first, at most `limit`.
    async fn find_full_by_category_excluding(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
        limit: usize,
    ) -> Result<Vec<ProductFull>, StoreError>;

    /// Replace the mutable fields of `id` and return the stored row.
    async fn update(&self, id: ProductId, changes: ProductChanges) -> Result<Product, StoreError>;

    /// Remove `id` and return the removed row.
    async fn delete(&self, id: ProductId) -> Result<Product, StoreError>;
}

/// Category persistence.
#[async_trait]
pub trait CategoryGateway: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Category>, StoreError>;

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError>;

    async fn insert(&self, name: String, slug: String) -> Result<Category, StoreError>;

    async fn update(&self, id: CategoryId, name: String, slug: String) -> Result<Category, StoreError>;

    async fn delete(&self, id: CategoryId) -> Result<Category, StoreError>;
}

/// Validates that a category exists.
#[async_trait]
pub trait CategoryResolver: Send + Sync {
    /// Fails with `DomainError::NotFound` when the category does not exist.
    async fn by_id(&self, id: CategoryId) -> DomainResult<Category>;
}

#[async_trait]
impl<S> ProductGateway for Arc<S>
where
    S: ProductGateway + ?Sized,
{
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        (**self).find_all().await
    }

    async fn insert_draft(&self) -> Result<ProductId, StoreError> {
        (**self).insert_draft().await
    }

    async fn find_full_by_id(&self, id: ProductId) -> Result<Option<ProductFull>, StoreError> {
        (**self).find_full_by_id(id).await
    }

    async fn find_full_by_slug(&self, slug: &str) -> Result<Option<ProductFull>, StoreError> {
        (**self).find_full_by_slug(slug).await
    }

    async fn find_full_by_category_slug(&self, category_slug: &str) -> Result<Vec<ProductFull>, StoreError> {
        (**self).find_full_by_category_slug(category_slug).await
    }

    async fn find_full_by_category_excluding(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
        limit: usize,
    ) -> Result<Vec<ProductFull>, StoreError> {
        (**self)
            .find_full_by_category_excluding(category_id, exclude, limit)
            .await
    }

    async fn update(&self, id: ProductId, changes: ProductChanges) -> Result<Product, StoreError> {
        (**self).update(id, changes).await
    }

    async fn delete(&self, id: ProductId) -> Result<Product, StoreError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<S> CategoryGateway for Arc<S>
where
    S: CategoryGateway + ?Sized,
{
    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        (**self).find_by_slug(slug).await
    }

    async fn insert(&self, name: String, slug: String) -> Result<Category, StoreError> {
        (**self).insert(name, slug).await
    }

    async fn update(&self, id: CategoryId, name: String, slug: String) -> Result<Category, StoreError> {
        (**self).update(id, name, slug).await
    }

    async fn delete(&self, id: CategoryId) -> Result<Category, StoreError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<S> CategoryResolver for Arc<S>
where
    S: CategoryResolver + ?Sized,
{
    async fn by_id(&self, id: CategoryId) -> DomainResult<Category> {
        (**self).by_id(id).await
    }
}
