//! Post CRUD, search, and category handlers.
//!
//! Create and update accept multipart forms (the browser client submits a
//! form with an optional file input). The three-way image input is derived
//! here, at the HTTP boundary: a new upload wins, else an echoed
//! `originalImage` keeps the current file, else the image is cleared.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures::TryStreamExt;

use quill_core::domain::{ImageChange, PostDraft, Upload};
use quill_shared::dto::{CreatedResponse, SearchQuery, SuccessResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.service.list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let post = state.service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/posts/search?q=&category=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.service.search(&query.q, &query.category).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/categories
pub async fn categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.service.categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// POST /api/posts
pub async fn create(state: web::Data<AppState>, payload: Multipart) -> AppResult<HttpResponse> {
    let form = read_form(payload).await?;
    let draft = PostDraft::new(form.title, form.category, form.content);

    let post = state.service.create(draft, form.upload).await?;
    Ok(HttpResponse::Ok().json(CreatedResponse { id: post.id }))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_form(payload).await?;
    let draft = PostDraft::new(form.title, form.category, form.content);

    let image = match (form.upload, form.original_image) {
        (Some(upload), _) => ImageChange::Replace(upload),
        // An echoed origin with no path resolves to nothing to keep.
        (None, Some(prior)) => match reference_path(&prior) {
            path if path.is_empty() => ImageChange::Clear,
            path => ImageChange::Keep(path),
        },
        (None, None) => ImageChange::Clear,
    };

    state.service.update(path.into_inner(), draft, image).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

/// DELETE /api/posts/{id}
pub async fn remove(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    state.service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

/// The fields of a create/update multipart form.
#[derive(Default)]
struct PostForm {
    title: String,
    category: String,
    content: String,
    original_image: Option<String>,
    upload: Option<Upload>,
}

/// Collect the multipart fields. The upload stream is fully consumed before
/// any mutation runs, so an aborted upload leaves no partial record.
async fn read_form(mut payload: Multipart) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(bad_request)? {
        let (name, filename) = {
            let cd = field.content_disposition();
            (
                cd.get_name().unwrap_or_default().to_owned(),
                cd.get_filename().map(str::to_owned),
            )
        };

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_request)? {
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "image" => {
                // A blank file input arrives as an empty part; that is
                // "no upload", not an empty attachment.
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    if !data.is_empty() {
                        form.upload = Some(Upload::new(filename, data));
                    }
                }
            }
            "title" => form.title = text(data)?,
            "category" => form.category = text(data)?,
            "content" => form.content = text(data)?,
            "originalImage" => {
                let value = text(data)?;
                if !value.is_empty() {
                    form.original_image = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn text(data: Vec<u8>) -> Result<String, AppError> {
    String::from_utf8(data)
        .map_err(|_| AppError::BadRequest("form field is not valid UTF-8".to_string()))
}

fn bad_request(e: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(e.to_string())
}

/// Reduce an echoed prior reference to the recorded relative path; the
/// client may send it back as an absolute URL.
fn reference_path(value: &str) -> String {
    match value.split_once("://") {
        Some((_, rest)) => match rest.find('/') {
            Some(idx) => rest[idx..].to_owned(),
            None => String::new(),
        },
        None => value.to_owned(),
    }
}
