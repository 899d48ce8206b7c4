use async_trait::async_trait;
use stempark_catalog::{FlatVariant, MediaRef, StagedFile};
use uuid::Uuid;

use crate::product::Product;

/// Error returned by storage backends
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for product documents
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &Product) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// Replace the stored variant list; `None` if the product does not exist
    async fn replace_variants(
        &self,
        id: Uuid,
        variants: Vec<FlatVariant>,
    ) -> Result<Option<Product>, StoreError>;

    /// Returns whether a product was removed
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Persistent storage for uploaded variant media
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store one file for a product and return how to reference it
    async fn save(&self, product_id: Uuid, file: &StagedFile) -> Result<MediaRef, StoreError>;
}
