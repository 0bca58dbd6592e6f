//! Category lookups and maintenance; also the category resolver used by product updates.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use storefront_core::{CategoryId, DomainError, DomainResult, generate_slug};

use crate::category::{Category, CategoryDto};
use crate::gateway::{CategoryGateway, CategoryResolver};

const CATEGORY_NOT_FOUND: &str = "Category not found!";

pub struct CategoryService<G> {
    categories: G,
}

impl<G> CategoryService<G>
where
    G: CategoryGateway,
{
    pub fn new(categories: G) -> Self {
        Self { categories }
    }

    #[instrument(name = "categories::get_all", skip(self))]
    pub async fn get_all(&self) -> DomainResult<Vec<Category>> {
        Ok(self.categories.find_all().await?)
    }

    #[instrument(name = "categories::by_id", skip(self))]
    pub async fn by_id(&self, id: CategoryId) -> DomainResult<Category> {
        match self.categories.find_by_id(id).await? {
            Some(category) => Ok(category),
            None => {
                warn!(category_id = %id, "category not found");
                Err(DomainError::not_found(CATEGORY_NOT_FOUND))
            }
        }
    }

    #[instrument(name = "categories::by_slug", skip(self))]
    pub async fn by_slug(&self, slug: &str) -> DomainResult<Category> {
        match self.categories.find_by_slug(slug).await? {
            Some(category) => Ok(category),
            None => {
                warn!(%slug, "category not found");
                Err(DomainError::not_found(CATEGORY_NOT_FOUND))
            }
        }
    }

    #[instrument(name = "categories::create", skip(self, dto), fields(name = %dto.name))]
    pub async fn create(&self, dto: CategoryDto) -> DomainResult<Category> {
        let slug = category_slug(&dto.name)?;
        let category = self.categories.insert(dto.name, slug).await?;
        debug!(category_id = %category.id, "category created");
        Ok(category)
    }

    #[instrument(name = "categories::update", skip(self, dto), fields(name = %dto.name))]
    pub async fn update(&self, id: CategoryId, dto: CategoryDto) -> DomainResult<Category> {
        let slug = category_slug(&dto.name)?;
        Ok(self.categories.update(id, dto.name, slug).await?)
    }

    /// Fails in the store while products still reference the category.
    #[instrument(name = "categories::delete", skip(self))]
    pub async fn delete(&self, id: CategoryId) -> DomainResult<Category> {
        Ok(self.categories.delete(id).await?)
    }
}

/// Category slugs must be non-empty; only drafts may share the empty slug.
fn category_slug(name: &str) -> DomainResult<String> {
    let slug = generate_slug(name);
    if slug.is_empty() {
        return Err(DomainError::validation(
            "category name must contain at least one letter or digit",
        ));
    }
    Ok(slug)
}

#[async_trait]
impl<G> CategoryResolver for CategoryService<G>
where
    G: CategoryGateway,
{
    async fn by_id(&self, id: CategoryId) -> DomainResult<Category> {
        CategoryService::by_id(self, id).await
    }
}
