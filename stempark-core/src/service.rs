use std::sync::Arc;

use stempark_catalog::{
    validate, StagedUpload, TreeEdit, ValidationIssue, VariantDefaults, VariantError, VariantTree,
};
use uuid::Uuid;

use crate::product::{NewProduct, Product};
use crate::repository::{MediaStore, ProductRepository, StoreError};
use crate::ServiceResult;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Variant tree has {} validation issue(s)", .0.len())]
    Invalid(Vec<ValidationIssue>),

    #[error("Edit {index} failed: {source}")]
    Edit {
        index: usize,
        #[source]
        source: VariantError,
    },

    #[error("Upload targets variant {index} but only {count} variant(s) were submitted")]
    UploadOutOfRange { index: usize, count: usize },

    #[error("Storage failure: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Storage(err)
    }
}

/// Loads, edits and saves product variant trees
///
/// The repository only knows flat variants; this service owns the conversion
/// in both directions and the media uploads that go with a submission.
#[derive(Clone)]
pub struct VariantService {
    products: Arc<dyn ProductRepository>,
    media: Arc<dyn MediaStore>,
    defaults: Arc<VariantDefaults>,
}

impl VariantService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        media: Arc<dyn MediaStore>,
        defaults: Arc<VariantDefaults>,
    ) -> Self {
        Self {
            products,
            media,
            defaults,
        }
    }

    pub fn defaults(&self) -> &Arc<VariantDefaults> {
        &self.defaults
    }

    pub async fn create_product(&self, draft: NewProduct) -> ServiceResult<Product> {
        let product = Product::new(draft);
        self.products.create(&product).await?;
        tracing::info!(product = %product.id, name = %product.name, "created product");
        Ok(product)
    }

    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.products.list().await?)
    }

    pub async fn product(&self, id: Uuid) -> ServiceResult<Product> {
        self.products.get(id).await?.ok_or(ServiceError::NotFound(id))
    }

    pub async fn delete_product(&self, id: Uuid) -> ServiceResult<()> {
        if !self.products.delete(id).await? {
            return Err(ServiceError::NotFound(id));
        }
        tracing::info!(product = %id, "deleted product");
        Ok(())
    }

    /// Editing tree for a stored product
    pub async fn load_tree(&self, id: Uuid) -> ServiceResult<VariantTree> {
        let product = self.product(id).await?;
        Ok(product.variant_tree().with_defaults(self.defaults.clone()))
    }

    /// Validate and persist a tree.
    ///
    /// Files staged on the tree's leaves and `extra_uploads` (already keyed by
    /// flattened position) are stored first; their references are appended to
    /// the owning variant's media before the variant list is replaced.
    pub async fn submit(
        &self,
        id: Uuid,
        tree: &VariantTree,
        extra_uploads: Vec<StagedUpload>,
    ) -> ServiceResult<Product> {
        self.product(id).await?;

        let issues = validate(tree);
        if !issues.is_empty() {
            tracing::debug!(product = %id, issues = issues.len(), "rejecting variant tree");
            return Err(ServiceError::Invalid(issues));
        }

        let submission = tree.to_submission();
        let mut variants = submission.variants;
        let uploads: Vec<StagedUpload> = submission.uploads.into_iter().chain(extra_uploads).collect();

        if let Some(stray) = uploads.iter().find(|u| u.variant_index >= variants.len()) {
            return Err(ServiceError::UploadOutOfRange {
                index: stray.variant_index,
                count: variants.len(),
            });
        }

        for upload in &uploads {
            let media = self.media.save(id, &upload.file).await?;
            tracing::debug!(product = %id, variant = upload.variant_index, url = %media.url, "stored variant media");
            variants[upload.variant_index].media.push(media);
        }

        let count = variants.len();
        let product = self
            .products
            .replace_variants(id, variants)
            .await?
            .ok_or(ServiceError::NotFound(id))?;
        tracing::info!(product = %id, variants = count, uploads = uploads.len(), "saved product variants");
        Ok(product)
    }

    /// Apply editor actions to the stored tree and save the result
    pub async fn apply_edits(&self, id: Uuid, edits: &[TreeEdit]) -> ServiceResult<Product> {
        let tree = self.load_tree(id).await?;
        let tree = tree
            .apply_all(edits)
            .map_err(|(index, source)| ServiceError::Edit { index, source })?;
        self.submit(id, &tree, Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use stempark_catalog::{
        FlatVariant, LeafData, MediaKind, MediaRef, StagedFile, VariantNode, VariantPath,
    };
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemoryProducts(Mutex<HashMap<Uuid, Product>>);

    #[async_trait]
    impl ProductRepository for MemoryProducts {
        async fn create(&self, product: &Product) -> Result<(), StoreError> {
            self.0.lock().await.insert(product.id, product.clone());
            Ok(())
        }

        async fn get(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
            Ok(self.0.lock().await.get(&id).cloned())
        }

        async fn list(&self) -> Result<Vec<Product>, StoreError> {
            Ok(self.0.lock().await.values().cloned().collect())
        }

        async fn replace_variants(
            &self,
            id: Uuid,
            variants: Vec<FlatVariant>,
        ) -> Result<Option<Product>, StoreError> {
            let mut products = self.0.lock().await;
            Ok(products.get_mut(&id).map(|p| {
                p.set_variants(variants);
                p.clone()
            }))
        }

        async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
            Ok(self.0.lock().await.remove(&id).is_some())
        }
    }

    #[derive(Default)]
    struct CountingMedia(Mutex<Vec<String>>);

    #[async_trait]
    impl MediaStore for CountingMedia {
        async fn save(&self, product_id: Uuid, file: &StagedFile) -> Result<MediaRef, StoreError> {
            self.0.lock().await.push(file.file_name.clone());
            Ok(MediaRef {
                url: format!("/uploads/{}/{}", product_id, file.file_name),
                kind: file.kind(),
            })
        }
    }

    async fn setup() -> (VariantService, Arc<CountingMedia>, Uuid) {
        let products = Arc::new(MemoryProducts::default());
        let media = Arc::new(CountingMedia::default());
        let service = VariantService::new(products, media.clone(), Arc::new(VariantDefaults::default()));
        let product = service
            .create_product(NewProduct {
                name: "Telescope".to_string(),
                description: None,
                category: None,
            })
            .await
            .unwrap();
        (service, media, product.id)
    }

    fn edits(raw: serde_json::Value) -> Vec<TreeEdit> {
        serde_json::from_value(raw).unwrap()
    }

    #[tokio::test]
    async fn test_edit_then_reload() {
        let (service, _, id) = setup().await;
        let script = edits(json!([
            {"op": "setLevelLabel", "depth": 1, "label": "Aperture"},
            {"op": "setLevelLabel", "depth": 2, "label": "Mount"},
            {"op": "add"},
            {"op": "update", "path": [0], "field": "name", "value": "70mm"},
            {"op": "add", "path": [0]},
            {"op": "update", "path": [0, "children", 0], "field": "name", "value": "Alt-Az"},
            {"op": "update", "path": [0, "children", 0], "field": "sku", "value": "TEL-70-AZ"}
        ]));

        let product = service.apply_edits(id, &script).await.unwrap();
        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.variants[0].name, "70mm / Alt-Az");
        assert_eq!(product.level_labels(), vec!["Aperture", "Mount"]);

        let tree = service.load_tree(id).await.unwrap();
        let leaf = tree.get(&"0.children.0".parse().unwrap()).unwrap();
        assert_eq!(leaf.leaf_data().unwrap().sku, "TEL-70-AZ");
    }

    #[tokio::test]
    async fn test_invalid_tree_is_not_saved() {
        let (service, _, id) = setup().await;
        let err = service
            .apply_edits(id, &edits(json!([{"op": "add"}])))
            .await
            .unwrap_err();
        match err {
            ServiceError::Invalid(issues) => assert_eq!(issues.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(service.load_tree(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_uploads_attach_to_variant_media() {
        let (service, media, id) = setup().await;
        let tree = service
            .load_tree(id)
            .await
            .unwrap()
            .apply_all(&edits(json!([
                {"op": "add"},
                {"op": "update", "path": [0], "field": "name", "value": "80mm"},
                {"op": "update", "path": [0], "field": "sku", "value": "TEL-80"},
                {"op": "add"},
                {"op": "update", "path": [1], "field": "name", "value": "100mm"},
                {"op": "update", "path": [1], "field": "sku", "value": "TEL-100"}
            ])))
            .unwrap()
            .stage_file(&VariantPath::from_indices(vec![1]), StagedFile::new("scope.png", None, vec![0; 4]))
            .unwrap();
        let extra = StagedUpload {
            variant_index: 0,
            file: StagedFile::new("demo.mp4", Some("video/mp4".to_string()), vec![1; 4]),
        };

        let product = service.submit(id, &tree, vec![extra]).await.unwrap();
        assert_eq!(product.variants[0].media[0].kind, MediaKind::Video);
        assert_eq!(product.variants[1].media[0].url, format!("/uploads/{}/scope.png", id));
        assert_eq!(media.0.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_shallow_first_variant_survives_reload_and_edit() {
        let (service, _, id) = setup().await;
        let sku = |sku: &str| LeafData {
            sku: sku.to_string(),
            ..LeafData::default()
        };
        let tree = VariantTree::from_nodes(
            vec!["Color".to_string(), "Size".to_string()],
            vec![
                VariantNode::leaf("Green", sku("G")),
                VariantNode::branch(
                    "Red",
                    vec![VariantNode::leaf("S", sku("R-S")), VariantNode::leaf("L", sku("R-L"))],
                ),
            ],
        );
        service.submit(id, &tree, vec![]).await.unwrap();

        let reloaded = service.load_tree(id).await.unwrap();
        assert_eq!(reloaded.level_labels, vec!["Color", "Size"]);
        assert_eq!(reloaded.leaf_count(), 3);

        let product = service
            .apply_edits(
                id,
                &edits(json!([{"op": "update", "path": [0], "field": "inventory.stock", "value": 4}])),
            )
            .await
            .unwrap();
        let names: Vec<&str> = product.variants.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Green", "Red / S", "Red / L"]);
        assert_eq!(product.variants[0].inventory.stock, 4);
    }

    #[tokio::test]
    async fn test_out_of_range_upload_stores_nothing() {
        let (service, media, id) = setup().await;
        let tree = service
            .load_tree(id)
            .await
            .unwrap()
            .apply_all(&edits(json!([
                {"op": "add"},
                {"op": "update", "path": [0], "field": "name", "value": "Basic"},
                {"op": "update", "path": [0], "field": "sku", "value": "TEL-B"}
            ])))
            .unwrap();
        let stray = StagedUpload {
            variant_index: 3,
            file: StagedFile::new("x.png", None, vec![]),
        };

        let err = service.submit(id, &tree, vec![stray]).await.unwrap_err();
        assert!(matches!(err, ServiceError::UploadOutOfRange { index: 3, count: 1 }));
        assert!(media.0.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let (service, _, _) = setup().await;
        let missing = Uuid::new_v4();
        assert!(matches!(
            service.load_tree(missing).await,
            Err(ServiceError::NotFound(id)) if id == missing
        ));
        assert!(matches!(
            service.delete_product(missing).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_product() {
        let (service, _, id) = setup().await;
        service.delete_product(id).await.unwrap();
        assert!(service.list_products().await.unwrap().is_empty());
    }
}
