//! Postgres-backed store implementation.
//!
//! Queries are built at runtime and rows mapped by hand with `Row::try_get`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (foreign key violation) | `23503` | `Constraint` |
//! | RowNotFound | N/A | `NotFound` |
//! | Anything else | N/A | `Backend` |
//!
//! Writes addressing a missing row come back as an empty `RETURNING` set and are
//! reported as `NotFound`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{error, instrument};

use storefront_auth::{NewUser, User, UserGateway};
use storefront_catalog::{
    Category, CategoryGateway, CategorySummary, OwnerSummary, Product, ProductChanges, ProductFull,
    ProductGateway,
};
use storefront_core::{CategoryId, ProductId, StoreError, UserId};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const PRODUCT_COLUMNS: &str = "p.id, p.created_at, p.updated_at, p.name, p.slug, p.description, \
     p.price, p.images, p.category_id, p.user_id";

const FULL_SELECT: &str = "SELECT p.id, p.created_at, p.updated_at, p.name, p.slug, p.description, \
     p.price, p.images, p.category_id, p.user_id, \
     c.name AS category_name, c.slug AS category_slug, \
     u.name AS user_name, u.avatar_path AS user_avatar_path \
     FROM products p \
     LEFT JOIN categories c ON c.id = p.category_id \
     LEFT JOIN users u ON u.id = p.user_id";

const CATEGORY_COLUMNS: &str = "id, created_at, updated_at, name, slug";

const USER_COLUMNS: &str =
    "id, created_at, updated_at, email, password, name, avatar_path, phone, is_admin";

/// Postgres-backed store for products, categories and users.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; every gateway call is one
/// statement with no explicit transaction.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema. Every statement is `IF NOT EXISTS`, so this is safe on
    /// every start.
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn fetch_full(&self, operation: &str, sql: String, bind: Bind<'_>) -> Result<Vec<ProductFull>, StoreError> {
        let query = sqlx::query(&sql);
        let query = match bind {
            Bind::None => query,
            Bind::Int(v) => query.bind(v),
            Bind::Text(v) => query.bind(v),
            Bind::Similar { category_id, exclude, limit } => {
                query.bind(category_id).bind(exclude).bind(limit)
            }
        };
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter()
            .map(full_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

enum Bind<'a> {
    None,
    Int(i32),
    Text(&'a str),
    Similar { category_id: i32, exclude: i32, limit: i64 },
}

#[async_trait]
impl ProductGateway for PgStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p ORDER BY p.id");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all_products", e))?;
        rows.iter()
            .map(product_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("find_all_products", e))
    }

    #[instrument(skip(self))]
    async fn insert_draft(&self) -> Result<ProductId, StoreError> {
        let row = sqlx::query("INSERT INTO products DEFAULT VALUES RETURNING id")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_draft", e))?;
        row.try_get::<i32, _>("id")
            .map(ProductId::new)
            .map_err(|e| map_sqlx_error("insert_draft", e))
    }

    #[instrument(skip(self))]
    async fn find_full_by_id(&self, id: ProductId) -> Result<Option<ProductFull>, StoreError> {
        let sql = format!("{FULL_SELECT} WHERE p.id = $1");
        let mut rows = self.fetch_full("find_product_by_id", sql, Bind::Int(id.get())).await?;
        Ok(rows.pop())
    }

    #[instrument(skip(self))]
    async fn find_full_by_slug(&self, slug: &str) -> Result<Option<ProductFull>, StoreError> {
        let sql = format!("{FULL_SELECT} WHERE p.slug = $1 ORDER BY p.id LIMIT 1");
        let mut rows = self.fetch_full("find_product_by_slug", sql, Bind::Text(slug)).await?;
        Ok(rows.pop())
    }

    #[instrument(skip(self))]
    async fn find_full_by_category_slug(&self, category_slug: &str) -> Result<Vec<ProductFull>, StoreError> {
        let sql = format!("{FULL_SELECT} WHERE c.slug = $1 ORDER BY p.id");
        self.fetch_full("find_products_by_category", sql, Bind::Text(category_slug))
            .await
    }

    #[instrument(skip(self))]
    async fn find_full_by_category_excluding(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
        limit: usize,
    ) -> Result<Vec<ProductFull>, StoreError> {
        let sql = format!(
            "{FULL_SELECT} WHERE p.category_id = $1 AND p.id <> $2 ORDER BY p.created_at DESC, p.id DESC LIMIT $3"
        );
        let bind = Bind::Similar {
            category_id: category_id.get(),
            exclude: exclude.get(),
            limit: i64::try_from(limit).unwrap_or(i64::MAX),
        };
        self.fetch_full("find_similar_products", sql, bind).await
    }

    #[instrument(skip(self, changes), fields(slug = %changes.slug))]
    async fn update(&self, id: ProductId, changes: ProductChanges) -> Result<Product, StoreError> {
        let sql = format!(
            "UPDATE products p SET name = $2, slug = $3, description = $4, price = $5, images = $6, \
             category_id = $7, user_id = $8, updated_at = NOW() \
             WHERE p.id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.get())
            .bind(&changes.name)
            .bind(&changes.slug)
            .bind(&changes.description)
            .bind(changes.price)
            .bind(&changes.images)
            .bind(changes.category_id.get())
            .bind(changes.user_id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_product", e))?
            .ok_or(StoreError::NotFound)?;
        product_from_row(&row).map_err(|e| map_sqlx_error("update_product", e))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> Result<Product, StoreError> {
        let sql = format!("DELETE FROM products p WHERE p.id = $1 RETURNING {PRODUCT_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?
            .ok_or(StoreError::NotFound)?;
        product_from_row(&row).map_err(|e| map_sqlx_error("delete_product", e))
    }
}

#[async_trait]
impl CategoryGateway for PgStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all_categories", e))?;
        rows.iter()
            .map(category_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("find_all_categories", e))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_category_by_id", e))?;
        row.as_ref()
            .map(category_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_category_by_id", e))
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1");
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_category_by_slug", e))?;
        row.as_ref()
            .map(category_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_category_by_slug", e))
    }

    #[instrument(skip(self))]
    async fn insert(&self, name: String, slug: String) -> Result<Category, StoreError> {
        let sql = format!("INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING {CATEGORY_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(&name)
            .bind(&slug)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_category", e))?;
        category_from_row(&row).map_err(|e| map_sqlx_error("insert_category", e))
    }

    #[instrument(skip(self))]
    async fn update(&self, id: CategoryId, name: String, slug: String) -> Result<Category, StoreError> {
        let sql = format!(
            "UPDATE categories SET name = $2, slug = $3, updated_at = NOW() WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.get())
            .bind(&name)
            .bind(&slug)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_category", e))?
            .ok_or(StoreError::NotFound)?;
        category_from_row(&row).map_err(|e| map_sqlx_error("update_category", e))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: CategoryId) -> Result<Category, StoreError> {
        let sql = format!("DELETE FROM categories WHERE id = $1 RETURNING {CATEGORY_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?
            .ok_or(StoreError::NotFound)?;
        category_from_row(&row).map_err(|e| map_sqlx_error("delete_category", e))
    }
}

#[async_trait]
impl UserGateway for PgStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_user_by_id", e))
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_user_by_email", e))
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (email, password, name, avatar_path, phone, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(&user.avatar_path)
            .bind(&user.phone)
            .bind(user.is_admin)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_user", e))?;
        user_from_row(&row).map_err(|e| map_sqlx_error("insert_user", e))
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        images: row.try_get("images")?,
        category_id: row.try_get::<Option<i32>, _>("category_id")?.map(CategoryId::new),
        user_id: row.try_get::<Option<i32>, _>("user_id")?.map(UserId::new),
    })
}

fn full_from_row(row: &PgRow) -> Result<ProductFull, sqlx::Error> {
    let product = product_from_row(row)?;

    let category = match product.category_id {
        Some(id) => Some(CategorySummary {
            id,
            name: row.try_get("category_name")?,
            slug: row.try_get("category_slug")?,
        }),
        None => None,
    };
    let user = match product.user_id {
        Some(id) => Some(OwnerSummary {
            id,
            name: row.try_get("user_name")?,
            avatar_path: row.try_get("user_avatar_path")?,
        }),
        None => None,
    };

    Ok(ProductFull::from_parts(product, category, user))
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: CategoryId::new(row.try_get("id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password")?,
        name: row.try_get("name")?,
        avatar_path: row.try_get("avatar_path")?,
        phone: row.try_get("phone")?,
        is_admin: row.try_get("is_admin")?,
    })
}

/// Map SQLx errors to store errors.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = match db_err.constraint() {
                Some(constraint) => format!("{operation}: {constraint}"),
                None => format!("{operation}: {}", db_err.message()),
            };
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") => StoreError::Constraint(msg),
                _ => {
                    error!(%operation, error = %db_err.message(), "database error");
                    StoreError::Backend(msg)
                }
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => {
            error!(%operation, error = %other, "store backend failure");
            StoreError::Backend(format!("{operation}: {other}"))
        }
    }
}
