//! The admin panel: session login, user management, project authoring
//! (including the server-held section draft behind the form builder),
//! homepage slots, and media uploads.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header::SET_COOKIE};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use tera::Context;
use vitrine_core::user::UserError;
use vitrine_core::{
    Direction, NewProject, NewUser, Section, SectionDraft, SectionKind, SlotContent, Uploader,
    home::SlotError,
};

use crate::session::{Session, clear_cookie, session_cookie};
use crate::{AppError, AppState};

/// Gate for admin handlers: unauthenticated requests are sent to the
/// login page.
fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Session, Response> {
    state
        .sessions
        .authenticate(headers)
        .ok_or_else(|| Redirect::to("/admin/login").into_response())
}

/// Base template context for admin pages: the logged-in operator's name.
fn admin_ctx(session: &Session) -> Context {
    let mut ctx = Context::new();
    ctx.insert("username", &session.username);
    ctx.insert("first_name", &session.first_name);
    ctx.insert("last_name", &session.last_name);
    ctx
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// ---- Authentication ----

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if state.sessions.authenticate(&headers).is_some() {
        return Ok(Redirect::to("/admin/dashboard").into_response());
    }
    let mut ctx = Context::new();
    ctx.insert("title", "Login");
    Ok(state.render("admin/login.html", &ctx)?.into_response())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state.users.verify(&form.username, &form.password) {
        Some(user) => {
            let token = state.sessions.create(&user);
            tracing::info!(username = %user.username, "admin login");
            Ok((
                [(SET_COOKIE, session_cookie(&token))],
                Redirect::to("/admin/dashboard"),
            )
                .into_response())
        }
        None => {
            let mut ctx = Context::new();
            ctx.insert("title", "Login");
            ctx.insert("error", "Invalid credentials");
            Ok((StatusCode::UNAUTHORIZED, state.render("admin/login.html", &ctx)?).into_response())
        }
    }
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    state.sessions.destroy(&headers);
    ([(SET_COOKIE, clear_cookie())], Redirect::to("/")).into_response()
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    let mut ctx = admin_ctx(&session);
    ctx.insert("title", "Dashboard");
    Ok(state.render("admin/dashboard.html", &ctx)?.into_response())
}

// ---- Users ----

pub async fn users_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    // Password hashes stay server-side.
    let users: Vec<Value> = state
        .users
        .all()
        .iter()
        .map(|u| {
            json!({
                "id": u.id,
                "username": u.username,
                "firstName": u.first_name,
                "lastName": u.last_name,
                "createdAt": u.created_at,
            })
        })
        .collect();
    let mut ctx = admin_ctx(&session);
    ctx.insert("title", "Users");
    ctx.insert("users", &users);
    Ok(state.render("admin/users.html", &ctx)?.into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

pub async fn add_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AddUserBody>,
) -> Result<Response, AppError> {
    if let Err(r) = require_session(&state, &headers) {
        return Ok(r);
    }
    if body.username.is_empty()
        || body.first_name.is_empty()
        || body.last_name.is_empty()
        || body.password.is_empty()
    {
        return Ok(json_error(StatusCode::BAD_REQUEST, "All fields are required"));
    }
    match state.users.create(NewUser {
        username: body.username,
        first_name: body.first_name,
        last_name: body.last_name,
        password: body.password,
        admin: false,
    }) {
        Ok(user) => Ok(Json(json!({
            "success": true,
            "user": { "id": user.id, "username": user.username },
        }))
        .into_response()),
        Err(UserError::DuplicateUsername(_)) => {
            Ok(json_error(StatusCode::BAD_REQUEST, "Username already exists"))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, AppError> {
    if let Err(r) = require_session(&state, &headers) {
        return Ok(r);
    }
    state.users.delete(id)?;
    Ok(Json(json!({ "success": true })).into_response())
}

// ---- Projects ----

pub async fn projects_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    let mut ctx = admin_ctx(&session);
    ctx.insert("title", "Projects");
    ctx.insert("projects", &state.projects.list());
    Ok(state.render("admin/projects.html", &ctx)?.into_response())
}

pub async fn project_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    let kinds: Vec<&str> = SectionKind::ALL.iter().map(|k| k.as_str()).collect();
    let mut ctx = admin_ctx(&session);
    ctx.insert("title", "New Project");
    ctx.insert("section_kinds", &kinds);
    Ok(state.render("admin/project_form.html", &ctx)?.into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProjectBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    /// The section list as wire-format JSON text, exactly as the form's
    /// hidden field carries it.
    #[serde(default)]
    pub sections: String,
}

pub async fn add_project(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AddProjectBody>,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    let sections: Vec<Section> = if body.sections.is_empty() {
        Vec::new()
    } else {
        // Reject a document that is not a JSON array; individual elements
        // with unknown types are dropped, not fatal.
        match serde_json::from_str::<Vec<Value>>(&body.sections) {
            Ok(values) => values.iter().filter_map(Section::from_value).collect(),
            Err(_) => {
                return Ok(json_error(StatusCode::BAD_REQUEST, "Invalid sections data"));
            }
        }
    };
    let project = state.projects.create(NewProject {
        title: body.title,
        slug: body.slug,
        brand: body.brand,
        cover_image: body.cover_image,
        sections,
    })?;
    // The submitted draft is spent.
    state.drafts.write().expect("drafts poisoned").remove(&session.token);
    tracing::info!(id = project.id, title = %project.title, "project created");
    Ok(Json(json!({ "success": true, "project": project })).into_response())
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, AppError> {
    if let Err(r) = require_session(&state, &headers) {
        return Ok(r);
    }
    state.projects.delete(id)?;
    Ok(Json(json!({ "success": true })).into_response())
}

#[derive(Deserialize)]
pub struct MoveBody {
    pub direction: String,
}

pub async fn move_project(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Form(body): Form<MoveBody>,
) -> Result<Response, AppError> {
    if let Err(r) = require_session(&state, &headers) {
        return Ok(r);
    }
    let direction = match body.direction.as_str() {
        "up" => Direction::Up,
        "down" => Direction::Down,
        _ => return Ok(json_error(StatusCode::BAD_REQUEST, "Unknown direction")),
    };
    state.projects.swap(id, direction)?;
    Ok(Redirect::to("/admin/projects").into_response())
}

// ---- Home slots ----

pub async fn slots_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    let mut ctx = admin_ctx(&session);
    ctx.insert("title", "Home Slots");
    ctx.insert("slots", &state.slots.all()?);
    Ok(state.render("admin/slots.html", &ctx)?.into_response())
}

#[derive(Deserialize)]
pub struct SlotForm {
    pub kind: String,
    pub value: String,
}

pub async fn update_slot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u32>,
    Form(form): Form<SlotForm>,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    let content = match form.kind.as_str() {
        "image" => SlotContent::Image(form.value),
        "video" => SlotContent::Video(form.value),
        _ => return Ok(json_error(StatusCode::BAD_REQUEST, "Unknown slot kind")),
    };
    match state.slots.update(id, content) {
        Ok(_) => Ok(Redirect::to("/admin/slots").into_response()),
        Err(SlotError::InvalidVideoUrl(url)) => {
            let mut ctx = admin_ctx(&session);
            ctx.insert("title", "Home Slots");
            ctx.insert("slots", &state.slots.all()?);
            ctx.insert("error", &format!("Not a playable video URL: {url}"));
            Ok((
                StatusCode::BAD_REQUEST,
                state.render("admin/slots.html", &ctx)?,
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// ---- Uploads ----

/// Multipart upload; returns `{success, url}` so the form scripts can
/// write the URL into a field.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    if let Err(r) = require_session(&state, &headers) {
        return Ok(r);
    }
    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        return match state.uploader.store(&filename, &bytes) {
            Ok(url) => Ok(Json(json!({ "success": true, "url": url })).into_response()),
            Err(e) => {
                tracing::warn!("upload failed: {e}");
                Ok(json_error(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed"))
            }
        };
    }
    Ok(json_error(StatusCode::BAD_REQUEST, "No file"))
}

#[derive(Deserialize)]
pub struct Base64Upload {
    #[serde(default)]
    pub filename: String,
    /// `data:<mime>;base64,<payload>` or the bare payload.
    #[serde(default)]
    pub data: String,
}

pub async fn upload_base64(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Base64Upload>,
) -> Result<Response, AppError> {
    if let Err(r) = require_session(&state, &headers) {
        return Ok(r);
    }
    if body.filename.is_empty() || body.data.is_empty() {
        return Ok(json_error(StatusCode::BAD_REQUEST, "Invalid upload"));
    }
    let payload = body.data.rsplit(',').next().unwrap_or(&body.data);
    let Ok(bytes) = BASE64.decode(payload) else {
        return Ok(json_error(StatusCode::BAD_REQUEST, "Invalid upload"));
    };
    match state.uploader.store(&body.filename, &bytes) {
        Ok(url) => Ok(Json(json!({ "success": true, "url": url })).into_response()),
        Err(e) => {
            tracing::warn!("upload failed: {e}");
            Ok(json_error(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed"))
        }
    }
}

// ---- Section draft ----
//
// The project form drives a per-session draft held in memory. Every
// mutation responds with the full draft state so the form can re-render
// idempotently from the response alone.

fn draft_response(draft: &SectionDraft) -> Response {
    Json(json!({
        "sections": draft.sections(),
        "serialized": draft.serialize(),
    }))
    .into_response()
}

fn with_draft<F>(state: &AppState, session: &Session, f: F) -> Response
where
    F: FnOnce(&mut SectionDraft) -> Option<Response>,
{
    let mut drafts = state.drafts.write().expect("drafts poisoned");
    let draft = drafts.entry(session.token.clone()).or_default();
    match f(draft) {
        Some(response) => response,
        None => draft_response(draft),
    }
}

pub async fn draft_state(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    Ok(with_draft(&state, &session, |_| None))
}

pub async fn discard_draft(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    state.drafts.write().expect("drafts poisoned").remove(&session.token);
    Ok(Json(json!({ "success": true })).into_response())
}

#[derive(Deserialize)]
pub struct AppendBody {
    pub kind: String,
}

pub async fn draft_append(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AppendBody>,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    let Some(kind) = SectionKind::parse(&body.kind) else {
        return Ok(json_error(StatusCode::BAD_REQUEST, "Unknown section type"));
    };
    Ok(with_draft(&state, &session, |draft| {
        draft.append(kind);
        None
    }))
}

pub async fn draft_remove(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    Ok(with_draft(&state, &session, |draft| {
        draft.remove(id);
        None
    }))
}

pub async fn draft_move(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<MoveBody>,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    Ok(with_draft(&state, &session, |draft| match body.direction.as_str() {
        "up" => {
            draft.move_up(id);
            None
        }
        "down" => {
            draft.move_down(id);
            None
        }
        _ => Some(json_error(StatusCode::BAD_REQUEST, "Unknown direction")),
    }))
}

#[derive(Deserialize)]
pub struct SetFieldBody {
    pub field: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub index: Option<usize>,
    /// Full-replace payload for gallery fields.
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

pub async fn draft_set_field(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<SetFieldBody>,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    Ok(with_draft(&state, &session, |draft| {
        match (body.values, body.index) {
            (Some(values), _) => draft.set_images(id, values),
            (None, Some(index)) => {
                draft.set_list_field(id, &body.field, index, body.value.as_deref().unwrap_or(""))
            }
            (None, None) => draft.set_field(id, &body.field, body.value.as_deref().unwrap_or("")),
        }
        None
    }))
}

/// Single-file attach into a scalar field or one list slot: multipart with
/// a `field` text part, an optional `index` text part, and the file.
pub async fn draft_upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    let mut target_field = None;
    let mut index = None;
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(part) = multipart.next_field().await? {
        match part.name() {
            Some("field") => target_field = Some(part.text().await?),
            Some("index") => index = part.text().await?.parse::<usize>().ok(),
            _ => {
                if let Some(filename) = part.file_name().map(str::to_string) {
                    file = Some((filename, part.bytes().await?.to_vec()));
                }
            }
        }
    }
    let (Some(field), Some((filename, bytes))) = (target_field, file) else {
        return Ok(json_error(StatusCode::BAD_REQUEST, "No file"));
    };
    // Write the file before touching the draft table; the lock is shared
    // by every session and must not wait on the disk.
    let url = match state.uploader.store(&filename, &bytes) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("upload failed: {e}");
            return Ok(json_error(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed"));
        }
    };
    Ok(with_draft(&state, &session, |draft| {
        match index {
            Some(i) => draft.set_list_field(id, &field, i, &url),
            None => draft.set_field(id, &field, &url),
        }
        None
    }))
}

/// Multi-file gallery attach: every file part becomes one gallery entry,
/// replacing the gallery wholesale. Any failure leaves it untouched.
pub async fn draft_upload_gallery(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let session = match require_session(&state, &headers) {
        Ok(s) => s,
        Err(r) => return Ok(r),
    };
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    while let Some(part) = multipart.next_field().await? {
        if let Some(filename) = part.file_name().map(str::to_string) {
            files.push((filename, part.bytes().await?.to_vec()));
        }
    }
    if files.is_empty() {
        return Ok(json_error(StatusCode::BAD_REQUEST, "No files"));
    }
    // Same ordering as single uploads: all files land on disk first, and
    // the gallery is replaced only if every write succeeded.
    let urls = files
        .iter()
        .map(|(name, bytes)| state.uploader.store(name, bytes))
        .collect::<Result<Vec<_>, _>>();
    let urls = match urls {
        Ok(urls) => urls,
        Err(e) => {
            tracing::warn!("gallery upload failed: {e}");
            return Ok(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "One or more uploads failed",
            ));
        }
    };
    Ok(with_draft(&state, &session, |draft| {
        draft.set_images(id, urls);
        None
    }))
}
