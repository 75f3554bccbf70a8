//! Cover image upload handler.
//!
//! ```text
//! POST /api/v1/events/upload-image
//! ```
//!
//! Accepts one multipart field named `image`, restricted to JPEG, PNG, or
//! WebP and at most [`MAX_UPLOAD_BYTES`]. Files land in the configured
//! uploads directory under a collision-free generated name and are served
//! back as static assets.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use futures_util::StreamExt as _;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::missing_field;

/// Upper bound on uploaded image size.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Response payload for a stored upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Public URL path the image is served under.
    pub url: String,
    /// Generated file name.
    pub filename: String,
    /// Stored size in bytes.
    pub size: usize,
    /// Media type of the stored file.
    pub mimetype: String,
}

fn extension_for(content_type: &mime::Mime) -> Option<&'static str> {
    if content_type.type_() != mime::IMAGE {
        return None;
    }
    match content_type.subtype().as_str() {
        "jpeg" => Some("jpg"),
        "png" => Some("png"),
        "webp" => Some("webp"),
        _ => None,
    }
}

fn storage_error(error: std::io::Error) -> Error {
    warn!(%error, "failed to store uploaded image");
    Error::internal("failed to store uploaded image")
}

async fn read_capped(field: &mut actix_multipart::Field) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk =
            chunk.map_err(|error| Error::invalid_request(format!("malformed upload: {error}")))?;
        if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(Error::invalid_request("image must be 5 MiB or smaller"));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Store a cover image for later use in an event payload.
#[utoipa::path(
    post,
    path = "/api/v1/events/upload-image",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Missing field, wrong type, or too large", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["events"],
    operation_id = "uploadEventImage"
)]
#[post("/events/upload-image")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    auth: AuthContext,
    mut payload: Multipart,
) -> ApiResult<HttpResponse> {
    auth.require_user()?;

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|error| Error::invalid_request(format!("malformed upload: {error}")))?;
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field
            .content_type()
            .cloned()
            .ok_or_else(|| Error::invalid_request("image must be a JPEG, PNG, or WebP file"))?;
        let extension = extension_for(&content_type)
            .ok_or_else(|| Error::invalid_request("image must be a JPEG, PNG, or WebP file"))?;

        let data = read_capped(&mut field).await?;
        if data.is_empty() {
            return Err(Error::invalid_request("image file is empty"));
        }

        let filename = format!(
            "event-{}-{}.{extension}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4()
        );
        let uploads = &state.uploads;
        tokio::fs::create_dir_all(&uploads.directory)
            .await
            .map_err(storage_error)?;
        tokio::fs::write(uploads.directory.join(&filename), &data)
            .await
            .map_err(storage_error)?;

        let url = format!("{}/{filename}", uploads.public_path);
        return Ok(HttpResponse::Created().json(UploadResponse {
            url,
            filename,
            size: data.len(),
            mimetype: content_type.essence_str().to_owned(),
        }));
    }

    Err(missing_field("image"))
}

fn content_type_for(filename: &str) -> Option<&'static str> {
    match filename.rsplit_once('.')?.1 {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Only names our own upload handler generates are servable; anything with
/// path separators or leading dots is rejected outright.
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !filename.contains("..")
}

/// Serve a previously stored cover image.
#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    params(("filename" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "No such image", body = Error)
    ),
    tags = ["events"],
    operation_id = "serveUploadedImage"
)]
#[get("/uploads/{filename}")]
pub async fn serve_upload(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let filename = path.into_inner();
    if !is_safe_filename(&filename) {
        return Err(Error::not_found("image not found"));
    }
    let Some(content_type) = content_type_for(&filename) else {
        return Err(Error::not_found("image not found"));
    };

    match tokio::fs::read(state.uploads.directory.join(&filename)).await {
        Ok(bytes) => Ok(HttpResponse::Ok().content_type(content_type).body(bytes)),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::not_found("image not found"))
        }
        Err(error) => Err(storage_error(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::state::UploadConfig;
    use crate::inbound::http::test_utils::{StateBuilder, sample_user};
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::App;
    use rstest::rstest;

    #[rstest]
    #[case(mime::IMAGE_JPEG, Some("jpg"))]
    #[case(mime::IMAGE_PNG, Some("png"))]
    #[case(mime::IMAGE_GIF, None)]
    #[case(mime::TEXT_PLAIN, None)]
    fn only_supported_image_types_map_to_extensions(
        #[case] content_type: mime::Mime,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(extension_for(&content_type), expected);
    }

    #[rstest]
    fn webp_is_supported() {
        let webp: mime::Mime = "image/webp".parse().expect("valid mime");
        assert_eq!(extension_for(&webp), Some("webp"));
    }

    fn multipart_body(boundary: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"image\"; filename=\"pic\"\r\n",
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }

    async fn upload(
        builder: StateBuilder,
        token: Option<&str>,
        content_type: &str,
        data: &[u8],
    ) -> actix_web::dev::ServiceResponse {
        let app = actix_web::test::init_service(
            App::new()
                .app_data(builder.build())
                .service(web::scope("/api/v1").service(upload_image)),
        )
        .await;
        let boundary = "abbc761f78ff4d7cb7573b5a23f96ef0";
        let mut req = actix_web::test::TestRequest::post()
            .uri("/api/v1/events/upload-image")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(multipart_body(boundary, content_type, data));
        if let Some(token) = token {
            req = req.insert_header((AUTHORIZATION, format!("Bearer {token}")));
        }
        actix_web::test::call_service(&app, req.to_request()).await
    }

    #[actix_web::test]
    async fn stores_a_png_and_returns_its_public_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut builder = StateBuilder::default();
        builder.allow_user(sample_user());
        builder.uploads = UploadConfig {
            directory: dir.path().to_path_buf(),
            public_path: "/uploads".to_owned(),
        };

        let res = upload(builder, Some("token"), "image/png", b"\x89PNG fake bytes").await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = actix_web::test::read_body_json(res).await;
        let filename = body
            .get("filename")
            .and_then(|v| v.as_str())
            .expect("filename");
        assert!(filename.starts_with("event-") && filename.ends_with(".png"));
        assert_eq!(
            body.get("url").and_then(|v| v.as_str()),
            Some(format!("/uploads/{filename}").as_str())
        );
        assert_eq!(
            body.get("size").and_then(|v| v.as_u64()),
            Some(b"\x89PNG fake bytes".len() as u64)
        );
        assert_eq!(
            body.get("mimetype").and_then(|v| v.as_str()),
            Some("image/png")
        );
        assert!(dir.path().join(filename).exists());
    }

    #[actix_web::test]
    async fn rejects_unsupported_content_types() {
        let mut builder = StateBuilder::default();
        builder.allow_user(sample_user());
        let res = upload(builder, Some("token"), "image/gif", b"GIF89a").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn rejects_oversized_uploads() {
        let mut builder = StateBuilder::default();
        builder.allow_user(sample_user());
        let oversized = vec![0_u8; MAX_UPLOAD_BYTES + 1];
        let res = upload(builder, Some("token"), "image/jpeg", &oversized).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn requires_authentication() {
        let res = upload(StateBuilder::default(), None, "image/png", b"data").await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("event-1-abc.png", true)]
    #[case("../etc/passwd", false)]
    #[case(".hidden.png", false)]
    #[case("a/b.png", false)]
    #[case("", false)]
    fn filename_safety(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_safe_filename(name), expected);
    }

    async fn fetch(builder: StateBuilder, path: &str) -> actix_web::dev::ServiceResponse {
        let app =
            actix_web::test::init_service(App::new().app_data(builder.build()).service(serve_upload)).await;
        let req = actix_web::test::TestRequest::get().uri(path).to_request();
        actix_web::test::call_service(&app, req).await
    }

    #[actix_web::test]
    async fn serves_stored_images_with_their_content_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("event-1-abc.webp"), b"RIFF fake").expect("write fixture");
        let mut builder = StateBuilder::default();
        builder.uploads = UploadConfig {
            directory: dir.path().to_path_buf(),
            public_path: "/uploads".to_owned(),
        };

        let res = fetch(builder, "/uploads/event-1-abc.webp").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("image/webp")
        );
    }

    #[actix_web::test]
    async fn missing_images_return_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut builder = StateBuilder::default();
        builder.uploads = UploadConfig {
            directory: dir.path().to_path_buf(),
            public_path: "/uploads".to_owned(),
        };
        let res = fetch(builder, "/uploads/event-9-missing.png").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
