use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use storefront_auth::{NewUser, User, UserGateway};
use storefront_catalog::{
    Category, CategoryGateway, OwnerSummary, Product, ProductChanges, ProductFull, ProductGateway,
};
use storefront_core::{CategoryId, Entity, ProductId, StoreError, UserId};

/// In-memory store for tests/dev.
///
/// Mirrors the Postgres schema rules: ids ascend from 1, non-empty product slugs and
/// category slugs are unique, emails are unique, and rows referenced by a product cannot
/// be deleted.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    categories: BTreeMap<CategoryId, Category>,
    users: BTreeMap<UserId, User>,
    last_product: i32,
    last_category: i32,
    last_user: i32,
}

impl Tables {
    fn full(&self, product: &Product) -> ProductFull {
        let category = product
            .category_id
            .and_then(|id| self.categories.get(&id))
            .map(Category::summary);
        let user = product
            .user_id
            .and_then(|id| self.users.get(&id))
            .map(|u| OwnerSummary {
                id: u.id,
                name: u.name.clone(),
                avatar_path: u.avatar_path.clone(),
            });
        ProductFull::from_parts(product.clone(), category, user)
    }

    fn product_slug_taken(&self, slug: &str, except: ProductId) -> bool {
        !slug.is_empty()
            && self
                .products
                .values()
                .any(|p| p.id != except && p.slug == slug)
    }

    fn category_slug_taken(&self, slug: &str, except: Option<CategoryId>) -> bool {
        self.categories
            .values()
            .any(|c| Some(c.id) != except && c.slug == slug)
    }
}

/// Store a freshly built row under its own id and hand back a copy.
fn insert_row<E>(table: &mut BTreeMap<E::Id, E>, row: E) -> E
where
    E: Entity + Clone,
    E::Id: Ord,
{
    table.insert(row.id(), row.clone());
    row
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))
    }

    /// Grant or revoke the admin flag; accounts are never promoted through the API.
    pub fn set_admin(&self, id: UserId, is_admin: bool) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.is_admin = is_admin;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl ProductGateway for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.products.values().cloned().collect())
    }

    async fn insert_draft(&self) -> Result<ProductId, StoreError> {
        let mut tables = self.write()?;
        tables.last_product += 1;
        let id = ProductId::new(tables.last_product);
        Ok(insert_row(&mut tables.products, Product::draft(id, Utc::now())).id)
    }

    async fn find_full_by_id(&self, id: ProductId) -> Result<Option<ProductFull>, StoreError> {
        let tables = self.read()?;
        Ok(tables.products.get(&id).map(|p| tables.full(p)))
    }

    async fn find_full_by_slug(&self, slug: &str) -> Result<Option<ProductFull>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .products
            .values()
            .find(|p| p.slug == slug)
            .map(|p| tables.full(p)))
    }

    async fn find_full_by_category_slug(&self, category_slug: &str) -> Result<Vec<ProductFull>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .products
            .values()
            .filter(|p| {
                p.category_id
                    .and_then(|id| tables.categories.get(&id))
                    .is_some_and(|c| c.slug == category_slug)
            })
            .map(|p| tables.full(p))
            .collect())
    }

    async fn find_full_by_category_excluding(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
        limit: usize,
    ) -> Result<Vec<ProductFull>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .products
            .values()
            .rev()
            .filter(|p| p.id != exclude && p.category_id == Some(category_id))
            .take(limit)
            .map(|p| tables.full(p))
            .collect())
    }

    async fn update(&self, id: ProductId, changes: ProductChanges) -> Result<Product, StoreError> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if !tables.categories.contains_key(&changes.category_id) {
            return Err(StoreError::constraint("products_category_id_fkey"));
        }
        if !tables.users.contains_key(&changes.user_id) {
            return Err(StoreError::constraint("products_user_id_fkey"));
        }
        if tables.product_slug_taken(&changes.slug, id) {
            return Err(StoreError::constraint("products_slug_key"));
        }

        let product = tables.products.get_mut(&id).ok_or(StoreError::NotFound)?;
        changes.apply_to(product, Utc::now());
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<Product, StoreError> {
        self.write()?.products.remove(&id).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl CategoryGateway for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.read()?.categories.values().cloned().collect())
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .read()?
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn insert(&self, name: String, slug: String) -> Result<Category, StoreError> {
        let mut tables = self.write()?;
        if tables.category_slug_taken(&slug, None) {
            return Err(StoreError::constraint("categories_slug_key"));
        }
        tables.last_category += 1;
        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(tables.last_category),
            created_at: now,
            updated_at: now,
            name,
            slug,
        };
        Ok(insert_row(&mut tables.categories, category))
    }

    async fn update(&self, id: CategoryId, name: String, slug: String) -> Result<Category, StoreError> {
        let mut tables = self.write()?;
        if !tables.categories.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if tables.category_slug_taken(&slug, Some(id)) {
            return Err(StoreError::constraint("categories_slug_key"));
        }
        let category = tables.categories.get_mut(&id).ok_or(StoreError::NotFound)?;
        category.name = name;
        category.slug = slug;
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> Result<Category, StoreError> {
        let mut tables = self.write()?;
        if !tables.categories.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if tables.products.values().any(|p| p.category_id == Some(id)) {
            return Err(StoreError::constraint("products_category_id_fkey"));
        }
        tables.categories.remove(&id).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl UserGateway for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::constraint("users_email_key"));
        }
        tables.last_user += 1;
        let now = Utc::now();
        let user = User {
            id: UserId::new(tables.last_user),
            created_at: now,
            updated_at: now,
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            avatar_path: new.avatar_path,
            phone: new.phone,
            is_admin: new.is_admin,
        };
        Ok(insert_row(&mut tables.users, user))
    }
}
