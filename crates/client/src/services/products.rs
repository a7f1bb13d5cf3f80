use async_trait::async_trait;
use serde::Serialize;

use ironmonger_core::ProductId;
use ironmonger_products::{
    Brand, Category, NewBrand, NewCategory, NewUnit, Paged, Product, ProductInput, ProductQuery,
    Unit,
};

use crate::catalog_store::CatalogApi;
use crate::http::{ApiClient, ApiError};

/// Page size used when the whole catalog is pulled into the local cache.
pub const CATALOG_PAGE_SIZE: u32 = 100;

const LOOKUP_PAGE_SIZE: u32 = 100;
const UNIT_PAGE_SIZE: u32 = 500;

/// Catalog endpoints: products, categories, brands and units.
#[derive(Debug, Clone)]
pub struct ProductService {
    api: ApiClient,
}

impl ProductService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// One page of `GET /catalog/products`.
    pub async fn list(&self, query: &ProductQuery) -> Result<Paged<Product>, ApiError> {
        self.api.get_query("/catalog/products", query).await
    }

    /// Every product, following pages until the reported total is reached.
    pub async fn list_all(&self) -> Result<Vec<Product>, ApiError> {
        let mut products = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.list(&ProductQuery::page(page, CATALOG_PAGE_SIZE)).await?;
            let more = batch.has_more(products.len() + batch.data.len());
            products.extend(batch.data);
            if !more {
                break;
            }
            page += 1;
        }
        tracing::debug!(count = products.len(), pages = page, "catalog fetched");
        Ok(products)
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, ApiError> {
        self.api.get(&format!("/catalog/products/{id}")).await
    }

    pub async fn create(&self, input: &ProductInput) -> Result<Product, ApiError> {
        self.api.post("/catalog/products", input).await
    }

    pub async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, ApiError> {
        self.api.put(&format!("/catalog/products/{id}"), input).await
    }

    pub async fn delete(&self, id: ProductId) -> Result<(), ApiError> {
        self.api.delete(&format!("/catalog/products/{id}")).await
    }

    /// `POST /catalog/products/{id}/image` as multipart field `image`.
    pub async fn upload_image(
        &self,
        id: ProductId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Product, ApiError> {
        let mime = image_mime(file_name);
        self.api
            .upload(&format!("/catalog/products/{id}/image"), "image", file_name, bytes, mime)
            .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.lookup("/catalog/categories", LOOKUP_PAGE_SIZE).await
    }

    pub async fn create_category(&self, body: &NewCategory) -> Result<Category, ApiError> {
        self.api.post("/catalog/categories", body).await
    }

    pub async fn brands(&self) -> Result<Vec<Brand>, ApiError> {
        self.lookup("/catalog/brands", LOOKUP_PAGE_SIZE).await
    }

    pub async fn create_brand(&self, body: &NewBrand) -> Result<Brand, ApiError> {
        self.api.post("/catalog/brands", body).await
    }

    pub async fn units(&self) -> Result<Vec<Unit>, ApiError> {
        self.lookup("/catalog/units", UNIT_PAGE_SIZE).await
    }

    pub async fn create_unit(&self, body: &NewUnit) -> Result<Unit, ApiError> {
        self.api.post("/catalog/units", body).await
    }

    async fn lookup<T>(&self, path: &str, page_size: u32) -> Result<Vec<T>, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct LookupQuery {
            page: u32,
            page_size: u32,
        }

        let page: Paged<T> = self
            .api
            .get_query(path, &LookupQuery { page: 1, page_size })
            .await?;
        Ok(page.data)
    }
}

#[async_trait]
impl CatalogApi for ProductService {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.list_all().await
    }
}

fn image_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::image_mime;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(image_mime("taladro.PNG"), "image/png");
        assert_eq!(image_mime("a.b.jpeg"), "image/jpeg");
        assert_eq!(image_mime("sin-extension"), "application/octet-stream");
    }
}
