use super::AppState;
use crate::ai::UploadedImage;
use crate::models::{HealthResponse, UrlResponse};
use crate::{Error, Result};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

const IMAGE_FIELD: &str = "image";

/// Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Transform an uploaded photo and return the generated image URL.
///
/// Every failure is logged here and turned into a JSON error body; nothing
/// propagates past the handler.
pub async fn gigafy(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("gigafy", request_id = %request_id);

    match run_gigafy(&state, multipart).instrument(span.clone()).await {
        Ok(url) => Json(UrlResponse { url }).into_response(),
        Err(e) => {
            span.in_scope(|| match &e {
                Error::MissingApiToken => error!("REPLICATE_API_TOKEN is not set"),
                Error::MissingImage => info!("Rejected request without an image field"),
                other => error!("Gigafy error: {}", other),
            });
            e.to_response(state.config.sanitize_errors)
        }
    }
}

async fn run_gigafy(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<String> {
    let generator = state.generator.as_ref().ok_or(Error::MissingApiToken)?;

    // A body that is not multipart at all carries no image either.
    let mut multipart = multipart.map_err(|_| Error::MissingImage)?;
    let image = read_image_field(&mut multipart).await?;

    info!(
        size_bytes = image.bytes.len(),
        content_type = ?image.content_type,
        "Received image upload"
    );

    let output = generator.generate(&image).await?;
    let url = output.into_url()?;

    info!("Gigafy complete, returning result URL");
    Ok(url)
}

/// Only file parts count: a plain text part named `image` is not an upload.
async fn read_image_field(multipart: &mut Multipart) -> Result<UploadedImage> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(IMAGE_FIELD) || field.file_name().is_none() {
            continue;
        }

        let content_type = field.content_type().map(|s| s.to_string());
        let bytes = field.bytes().await.map_err(upload_error)?;
        return Ok(UploadedImage::new(bytes.to_vec(), content_type));
    }

    Err(Error::MissingImage)
}

/// A body we cannot parse carries no usable image; only the size limit keeps
/// its own status.
fn upload_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::UploadTooLarge(e)
    } else {
        tracing::debug!("Unreadable multipart body: {}", e);
        Error::MissingImage
    }
}
