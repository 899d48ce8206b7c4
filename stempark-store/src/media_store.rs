use std::path::PathBuf;

use async_trait::async_trait;
use stempark_catalog::{MediaRef, StagedFile};
use stempark_core::{MediaStore, StoreError};
use uuid::Uuid;

/// Writes variant media to a local directory that is served statically
pub struct FsMediaStore {
    root: PathBuf,
    public_prefix: String,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

/// Last path component with anything outside `[A-Za-z0-9._-]` replaced
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn save(&self, product_id: Uuid, file: &StagedFile) -> Result<MediaRef, StoreError> {
        let dir = self.root.join("products").join(product_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(&file.file_name));
        tokio::fs::write(dir.join(&stored_name), &file.data).await?;

        let media = MediaRef {
            url: format!("{}/products/{}/{}", self.public_prefix, product_id, stored_name),
            kind: file.kind(),
        };
        tracing::info!(product = %product_id, url = %media.url, bytes = file.data.len(), "stored media file");
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stempark_catalog::MediaKind;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("front view.png"), "front_view.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\kit.jpg"), "kit.jpg");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[tokio::test]
    async fn test_save_writes_under_product_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path(), "/uploads/");
        let product_id = Uuid::new_v4();
        let file = StagedFile::new("demo clip.mp4", None, b"frames".to_vec());

        let media = store.save(product_id, &file).await.unwrap();

        assert_eq!(media.kind, MediaKind::Video);
        let prefix = format!("/uploads/products/{}/", product_id);
        assert!(media.url.starts_with(&prefix), "{}", media.url);
        assert!(media.url.ends_with("-demo_clip.mp4"));

        let stored = media.url.trim_start_matches(&prefix);
        let on_disk = dir
            .path()
            .join("products")
            .join(product_id.to_string())
            .join(stored);
        assert_eq!(std::fs::read(on_disk).unwrap(), b"frames");
    }

    #[tokio::test]
    async fn test_same_name_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path(), "/uploads");
        let product_id = Uuid::new_v4();
        let file = StagedFile::new("a.png", Some("image/png".into()), vec![1]);

        let first = store.save(product_id, &file).await.unwrap();
        let second = store.save(product_id, &file).await.unwrap();
        assert_ne!(first.url, second.url);
        assert_eq!(first.kind, MediaKind::Image);
    }
}
