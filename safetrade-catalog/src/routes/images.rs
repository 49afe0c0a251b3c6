use axum::extract::{Multipart, Path, State};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use safetrade_shared::errors::{AppError, AppResult, ErrorCode};
use safetrade_shared::types::api::ApiResponse;
use safetrade_shared::types::auth::{AuthUser, UserRole};

use crate::models::{NewProductImage, ProductImage};
use crate::routes::products::load_product;
use crate::schema::product_images;
use crate::AppState;

/// POST /products/:id/images - upload a listing photo
pub async fn upload_image(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ProductImage>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let product = load_product(&mut conn, product_id)?;
    if product.seller_id != auth.id && auth.role != UserRole::Admin {
        return Err(AppError::new(ErrorCode::NotProductOwner, "you do not own this listing"));
    }

    // Read the file from multipart
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::ImageUploadFailed, format!("failed to read multipart: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ImageUploadFailed, "no file provided"))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    // Determine file extension from content type
    let ext = match content_type.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => {
            return Err(AppError::new(
                ErrorCode::ImageUploadFailed,
                "unsupported image format, accepted: jpeg, png, webp, gif",
            ));
        }
    };

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::new(ErrorCode::ImageUploadFailed, format!("failed to read file data: {e}")))?;

    // Upload to MinIO
    let file_id = Uuid::now_v7();
    let key = format!("products/{}/{}.{}", product.id, file_id, ext);

    let image_url = state
        .minio
        .upload(&key, data.to_vec(), &content_type)
        .await
        .map_err(|e| AppError::new(ErrorCode::ImageUploadFailed, e))?;

    let position: i64 = product_images::table
        .filter(product_images::product_id.eq(product.id))
        .count()
        .get_result(&mut conn)?;

    let new_image = NewProductImage {
        product_id: product.id,
        image_url,
        position: position as i32,
    };

    let image: ProductImage = diesel::insert_into(product_images::table)
        .values(&new_image)
        .get_result(&mut conn)?;

    tracing::info!(
        product_id = %product.id,
        image_url = %image.image_url,
        "product image uploaded"
    );

    Ok(Json(ApiResponse::ok(image)))
}

/// DELETE /products/:id/images/:image_id
pub async fn delete_image(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let product = load_product(&mut conn, product_id)?;
    if product.seller_id != auth.id && auth.role != UserRole::Admin {
        return Err(AppError::new(ErrorCode::NotProductOwner, "you do not own this listing"));
    }

    let image: ProductImage = product_images::table
        .find(image_id)
        .filter(product_images::product_id.eq(product.id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ImageNotFound, "image not found"))?;

    // Remove the stored object first; an orphaned row is worse than an
    // orphaned object, so storage failures only log.
    if let Some(key) = object_key(&image.image_url) {
        if let Err(e) = state.minio.delete(key).await {
            tracing::warn!(error = %e, image_id = %image_id, "failed to delete stored image");
        }
    }

    diesel::delete(product_images::table.find(image_id)).execute(&mut conn)?;

    Ok(Json(ApiResponse::ok("image deleted")))
}

/// Extract the object key from a public URL of the form
/// `{public_url}/{bucket}/products/...`.
fn object_key(image_url: &str) -> Option<&str> {
    let idx = image_url.find("/products/")?;
    Some(&image_url[idx + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_from_public_url() {
        let url = "http://localhost:9000/safetrade-images/products/abc/def.jpg";
        assert_eq!(object_key(url), Some("products/abc/def.jpg"));
    }

    #[test]
    fn object_key_missing_prefix() {
        assert_eq!(object_key("http://localhost:9000/other/things.jpg"), None);
    }
}
