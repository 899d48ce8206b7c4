use std::path::PathBuf;
use std::sync::Arc;

use stempark_catalog::VariantDefaults;
use stempark_core::{MediaStore, ProductRepository, VariantService};

#[derive(Clone)]
pub struct MediaServing {
    /// Directory the media store writes into
    pub root_dir: PathBuf,
    /// URL prefix the directory is mounted at
    pub public_prefix: String,
}

#[derive(Clone)]
pub struct AppState {
    pub variants: VariantService,
    pub media: MediaServing,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        media_store: Arc<dyn MediaStore>,
        defaults: VariantDefaults,
        media: MediaServing,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            variants: VariantService::new(products, media_store, Arc::new(defaults)),
            media,
            max_upload_bytes,
        }
    }
}
