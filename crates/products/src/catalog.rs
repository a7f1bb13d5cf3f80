//! In-memory product catalog.

use ironmonger_core::{CategoryId, ProductId};

use crate::Product;

/// The product list the storefront browses.
///
/// Products keep the order the API returned them in. Ids are unique: the
/// last copy of a duplicated id wins on `replace`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        let mut catalog = Self::new();
        catalog.replace(products);
        catalog
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Swap in a freshly fetched list.
    pub fn replace(&mut self, products: Vec<Product>) {
        self.products.clear();
        for product in products {
            self.upsert(product);
        }
    }

    /// Insert a product, or overwrite the one with the same id in place.
    pub fn upsert(&mut self, product: Product) {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
    }

    pub fn remove(&mut self, id: ProductId) -> Option<Product> {
        let idx = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(idx))
    }

    /// Case-insensitive match on name or sku.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Product> + 'a {
        let needle = term.trim().to_lowercase();
        self.products.iter().filter(move |p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.sku.as_deref().is_some_and(|sku| sku.to_lowercase().contains(&needle))
        })
    }

    pub fn in_category(&self, category: CategoryId) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |p| p.category_id() == Some(category))
    }

    pub fn available(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_available())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NamedRef;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn product(id: i64, name: &str, stock: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            sku: Some(format!("P-{id}")),
            description: None,
            price: dec!(10),
            image_url: None,
            stock: Some(stock),
            category: Some(NamedRef {
                id: CategoryId::new(id % 2),
                name: format!("cat {}", id % 2),
            }),
            brand: None,
        }
    }

    #[test]
    fn upsert_overwrites_in_place() {
        let mut catalog =
            ProductCatalog::from_products(vec![product(1, "Pala", 3), product(2, "Pico", 1)]);
        catalog.upsert(product(1, "Pala reforzada", 5));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.products()[0].name, "Pala reforzada");
        assert_eq!(catalog.find(ProductId::new(1)).and_then(|p| p.stock), Some(5));
    }

    #[test]
    fn search_matches_name_and_sku_case_insensitively() {
        let catalog = ProductCatalog::from_products(vec![
            product(1, "Cinta métrica", 4),
            product(2, "Llave inglesa", 0),
        ]);

        let hits: Vec<_> = catalog.search("CINTA").map(|p| p.id).collect();
        assert_eq!(hits, vec![ProductId::new(1)]);

        let by_code: Vec<_> = catalog.search("p-2").map(|p| p.id).collect();
        assert_eq!(by_code, vec![ProductId::new(2)]);

        assert_eq!(catalog.search("  ").count(), 2);
    }

    #[test]
    fn remove_and_filters() {
        let mut catalog = ProductCatalog::from_products(vec![
            product(1, "A", 0),
            product(2, "B", 2),
            product(3, "C", 9),
        ]);

        assert_eq!(catalog.available().count(), 2);
        assert_eq!(catalog.in_category(CategoryId::new(1)).count(), 2);

        assert!(catalog.remove(ProductId::new(2)).is_some());
        assert!(catalog.remove(ProductId::new(2)).is_none());
        assert_eq!(catalog.len(), 2);
    }

    proptest! {
        #[test]
        fn replace_never_keeps_duplicate_ids(ids in prop::collection::vec(0i64..20, 0..40)) {
            let catalog = ProductCatalog::from_products(
                ids.iter().map(|id| product(*id, "x", 1)).collect(),
            );

            let mut seen = std::collections::HashSet::new();
            for p in catalog.products() {
                prop_assert!(seen.insert(p.id));
            }
        }
    }
}
