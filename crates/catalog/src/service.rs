//! Product catalog read/write service.

use tracing::{debug, instrument, warn};

use storefront_core::{DomainError, DomainResult, ProductId, UserId, generate_slug};

use crate::gateway::{CategoryResolver, ProductGateway};
use crate::product::{Product, ProductChanges, ProductDto, ProductFull};

/// Maximum number of products returned by [`CatalogService::similar`].
pub const SIMILAR_LIMIT: usize = 4;

const PRODUCT_NOT_FOUND: &str = "Product not found!";

/// Resolves, creates, updates and deletes products.
///
/// Collaborators are passed in at construction; the service itself holds no mutable
/// state, so one instance is shared by all requests.
pub struct CatalogService<P, R> {
    products: P,
    categories: R,
}

impl<P, R> CatalogService<P, R>
where
    P: ProductGateway,
    R: CategoryResolver,
{
    pub fn new(products: P, categories: R) -> Self {
        Self { products, categories }
    }

    /// Every product in store-native order, drafts included.
    #[instrument(name = "catalog::get_all", skip(self))]
    pub async fn get_all(&self) -> DomainResult<Vec<Product>> {
        let products = self.products.find_all().await?;
        debug!(count = products.len(), "listed products");
        Ok(products)
    }

    /// Insert a draft product and return its id.
    #[instrument(name = "catalog::create", skip(self))]
    pub async fn create(&self) -> DomainResult<ProductId> {
        let id = self.products.insert_draft().await?;
        debug!(product_id = %id, "draft product created");
        Ok(id)
    }

    #[instrument(name = "catalog::by_id", skip(self))]
    pub async fn by_id(&self, id: ProductId) -> DomainResult<ProductFull> {
        match self.products.find_full_by_id(id).await? {
            Some(product) => Ok(product),
            None => {
                warn!(product_id = %id, "product not found");
                Err(DomainError::not_found(PRODUCT_NOT_FOUND))
            }
        }
    }

    /// Drafts all share the empty slug, so an empty slug never resolves.
    #[instrument(name = "catalog::by_slug", skip(self))]
    pub async fn by_slug(&self, slug: &str) -> DomainResult<ProductFull> {
        if slug.is_empty() {
            return Err(DomainError::not_found(PRODUCT_NOT_FOUND));
        }

        match self.products.find_full_by_slug(slug).await? {
            Some(product) => Ok(product),
            None => {
                warn!(%slug, "product not found");
                Err(DomainError::not_found(PRODUCT_NOT_FOUND))
            }
        }
    }

    /// Products whose category slug matches. No match is an empty list, not an error.
    #[instrument(name = "catalog::by_category", skip(self))]
    pub async fn by_category(&self, category_slug: &str) -> DomainResult<Vec<ProductFull>> {
        let products = self.products.find_full_by_category_slug(category_slug).await?;
        debug!(count = products.len(), "listed products by category");
        Ok(products)
    }

    /// Other products from the same category as `id`, newest first.
    #[instrument(name = "catalog::similar", skip(self))]
    pub async fn similar(&self, id: ProductId) -> DomainResult<Vec<ProductFull>> {
        let current = self.by_id(id).await?;
        let Some(category) = current.category else {
            return Ok(Vec::new());
        };

        Ok(self
            .products
            .find_full_by_category_excluding(category.id, id, SIMILAR_LIMIT)
            .await?)
    }

    /// Validate the category, derive the slug, then write every mutable field at once.
    ///
    /// The category check and the write are two separate store calls; a missing
    /// category or a name without a usable slug aborts before anything is written.
    /// The empty slug stays reserved for drafts.
    #[instrument(
        name = "catalog::update",
        skip(self, dto),
        fields(category_id = %dto.category_id)
    )]
    pub async fn update(&self, id: ProductId, dto: ProductDto, user_id: UserId) -> DomainResult<Product> {
        self.categories.by_id(dto.category_id).await?;

        let slug = generate_slug(&dto.name);
        if slug.is_empty() {
            return Err(DomainError::validation(
                "product name must contain at least one letter or digit",
            ));
        }
        let changes = ProductChanges::new(dto, slug, user_id);

        let product = self.products.update(id, changes).await?;
        debug!(product_id = %product.id, slug = %product.slug, "product updated");
        Ok(product)
    }

    /// Remove a product. Missing ids and referenced rows fail in the store.
    #[instrument(name = "catalog::delete", skip(self))]
    pub async fn delete(&self, id: ProductId) -> DomainResult<Product> {
        let product = self.products.delete(id).await?;
        debug!(product_id = %id, "product deleted");
        Ok(product)
    }
}
