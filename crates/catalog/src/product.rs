use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, Entity, ProductId, UserId};

/// Product row as stored.
///
/// A freshly created product is a draft: empty name/slug/description, zero price and no
/// category or owner. The first `update` fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: i32,
    pub images: Vec<String>,
    pub category_id: Option<CategoryId>,
    pub user_id: Option<UserId>,
}

impl Product {
    pub fn draft(id: ProductId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            price: 0,
            images: Vec::new(),
            category_id: None,
            user_id: None,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.category_id.is_none()
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Category fields embedded in the fullest product projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Owner fields embedded in the fullest product projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: UserId,
    pub name: String,
    pub avatar_path: String,
}

/// Fullest product projection: the row plus its nested category and owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFull {
    pub id: ProductId,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: i32,
    pub images: Vec<String>,
    pub category: Option<CategorySummary>,
    pub user: Option<OwnerSummary>,
}

impl ProductFull {
    pub fn from_parts(product: Product, category: Option<CategorySummary>, user: Option<OwnerSummary>) -> Self {
        Self {
            id: product.id,
            created_at: product.created_at,
            name: product.name,
            slug: product.slug,
            description: product.description,
            price: product.price,
            images: product.images,
            category,
            user,
        }
    }
}

/// Input for a product update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub name: String,
    pub description: String,
    pub price: i32,
    #[serde(default)]
    pub images: Vec<String>,
    pub category_id: CategoryId,
}

/// Full replacement written by a single gateway update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: i32,
    pub images: Vec<String>,
    pub category_id: CategoryId,
    pub user_id: UserId,
}

impl ProductChanges {
    pub fn new(dto: ProductDto, slug: String, user_id: UserId) -> Self {
        Self {
            name: dto.name,
            slug,
            description: dto.description,
            price: dto.price,
            images: dto.images,
            category_id: dto.category_id,
            user_id,
        }
    }

    /// Apply onto a stored row, keeping identity and creation time.
    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        product.name = self.name.clone();
        product.slug = self.slug.clone();
        product.description = self.description.clone();
        product.price = self.price;
        product.images = self.images.clone();
        product.category_id = Some(self.category_id);
        product.user_id = Some(self.user_id);
        product.updated_at = now;
    }
}
