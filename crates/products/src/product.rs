use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ironmonger_core::{BrandId, CategoryId, DomainError, DomainResult, ProductId, UnitId};

/// Id and name of a category or brand embedded in a product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef<Id> {
    pub id: Id,
    pub name: String,
}

/// Catalog product as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "product_id", alias = "productId", alias = "id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sale price.
    #[serde(rename = "sale_price", alias = "salePrice", alias = "price", default)]
    pub price: Decimal,
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, rename = "categories", skip_serializing_if = "Option::is_none")]
    pub category: Option<NamedRef<CategoryId>>,
    #[serde(default, rename = "brands", skip_serializing_if = "Option::is_none")]
    pub brand: Option<NamedRef<BrandId>>,
}

impl Product {
    /// Out of stock only when the API reports a count and it is not positive.
    pub fn is_available(&self) -> bool {
        self.stock.is_none_or(|stock| stock > 0)
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category.as_ref().map(|c| c.id)
    }
}

/// Body for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub sku: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<BrandId>,
    pub unit_id: UnitId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub is_taxable: bool,
    pub min_stock: u32,
}

impl ProductInput {
    /// Client-side sanity checks before the payload goes out.
    ///
    /// The API runs its own validation; this only catches what the back
    /// office form would have refused anyway.
    pub fn validate(&self) -> DomainResult<()> {
        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("product sku is required"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name is required"));
        }
        if self.sale_price.is_sign_negative() {
            return Err(DomainError::validation("sale price must not be negative"));
        }
        if self.cost_price.is_sign_negative() {
            return Err(DomainError::validation("cost price must not be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "category_id", alias = "id")]
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "brand_id", alias = "id")]
    pub id: BrandId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBrand {
    pub name: String,
}

/// Unit of measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(rename = "unit_id", alias = "id")]
    pub id: UnitId,
    /// Short code such as `UND` or `KG`.
    #[serde(default)]
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUnit {
    pub code: String,
    pub name: String,
}

/// Query string of the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<BrandId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ProductQuery {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

/// `{ data, meta }` listing envelope. Older responses use `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paged<T> {
    #[serde(default, alias = "items")]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T> Paged<T> {
    /// Whether pages after this one may still hold rows.
    pub fn has_more(&self, fetched_so_far: usize) -> bool {
        match self.meta {
            Some(meta) => {
                !self.data.is_empty()
                    && (fetched_so_far as u64) < meta.total
                    && self.data.len() as u64 >= u64::from(meta.page_size)
            }
            None => false,
        }
    }
}
