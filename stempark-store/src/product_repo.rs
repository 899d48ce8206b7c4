use std::collections::HashMap;

use async_trait::async_trait;
use stempark_catalog::FlatVariant;
use stempark_core::{Product, ProductRepository, StoreError};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local product storage
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &Product) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(format!("Product {} already exists", product.id).into());
        }
        products.insert(product.id, product.clone());
        tracing::debug!(product = %product.id, "created product");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn replace_variants(
        &self,
        id: Uuid,
        variants: Vec<FlatVariant>,
    ) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.write().await;
        Ok(products.get_mut(&id).map(|product| {
            product.set_variants(variants);
            product.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.products.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stempark_core::NewProduct;

    fn product(name: &str) -> Product {
        Product::new(NewProduct {
            name: name.to_string(),
            description: None,
            category: None,
        })
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let repo = InMemoryProductRepository::new();
        let kit = product("Solar Kit");
        repo.create(&kit).await.unwrap();

        assert_eq!(repo.get(kit.id).await.unwrap().unwrap().name, "Solar Kit");
        assert!(repo.create(&kit).await.is_err());
        assert!(repo.delete(kit.id).await.unwrap());
        assert!(!repo.delete(kit.id).await.unwrap());
        assert!(repo.get(kit.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_variants() {
        let repo = InMemoryProductRepository::new();
        let kit = product("Microscope");
        repo.create(&kit).await.unwrap();

        let variant = FlatVariant {
            name: "40x".to_string(),
            sku: "MIC-40".to_string(),
            ..FlatVariant::default()
        };
        let updated = repo
            .replace_variants(kit.id, vec![variant])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.variants[0].sku, "MIC-40");
        assert!(updated.updated_at >= kit.updated_at);

        assert!(repo
            .replace_variants(Uuid::new_v4(), Vec::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_in_creation_order() {
        let repo = InMemoryProductRepository::new();
        let first = product("First");
        let second = product("Second");
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"First".to_string()));
    }
}
