use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use stempark_catalog::{parse_media_field, StagedFile, StagedUpload, TreeEdit, VariantTree};
use stempark_core::{NewProduct, Product};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Multipart part holding the JSON variant tree
pub const VARIANT_TREE_FIELD: &str = "variantTree";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", get(list_products).post(create_product))
        .route("/v1/products/{id}", get(get_product).delete(delete_product))
        .route(
            "/v1/products/{id}/variant-tree",
            get(get_variant_tree).patch(edit_variant_tree),
        )
        .route("/v1/products/{id}/variants", axum::routing::put(submit_variants))
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Multipart body has no variantTree part")]
    MissingTree,

    #[error("Malformed variant tree: {0}")]
    MalformedTree(#[from] serde_json::Error),

    #[error("Unexpected multipart field: {0}")]
    UnexpectedField(String),

    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match &err {
            UploadError::Multipart(source) if source.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                AppError::PayloadTooLarge(err.to_string())
            }
            _ => AppError::ValidationError(err.to_string()),
        }
    }
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.variants.list_products().await?))
}

async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("Product name is required".to_string()));
    }
    let product = state.variants.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.variants.product(id).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.variants.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_variant_tree(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VariantTree>, AppError> {
    Ok(Json(state.variants.load_tree(id).await?))
}

async fn edit_variant_tree(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edits): Json<Vec<TreeEdit>>,
) -> Result<Json<Product>, AppError> {
    tracing::debug!(product = %id, edits = edits.len(), "applying variant tree edits");
    Ok(Json(state.variants.apply_edits(id, &edits).await?))
}

/// Replace a product's variants from an editor submission
///
/// Expects a `variantTree` JSON part and any number of `variantMedia_<n>`
/// file parts, where `n` is the flattened position of the owning variant.
async fn submit_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Product>, AppError> {
    let (tree, uploads) = read_submission(multipart).await?;
    let tree = tree.with_defaults(state.variants.defaults().clone());
    Ok(Json(state.variants.submit(id, &tree, uploads).await?))
}

async fn read_submission(
    mut multipart: Multipart,
) -> Result<(VariantTree, Vec<StagedUpload>), UploadError> {
    let mut tree = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == VARIANT_TREE_FIELD {
            let raw = field.text().await?;
            tree = Some(serde_json::from_str::<VariantTree>(&raw)?);
            continue;
        }

        let Some(variant_index) = parse_media_field(&name) else {
            return Err(UploadError::UnexpectedField(name));
        };
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        uploads.push(StagedUpload {
            variant_index,
            file: StagedFile::new(file_name, content_type, data.to_vec()),
        });
    }

    let tree = tree.ok_or(UploadError::MissingTree)?;
    Ok((tree, uploads))
}
