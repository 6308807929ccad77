use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vitrine_core::config::SiteConfig;
use vitrine_core::{HomeSlotStore, ProjectStore, SectionDraft, UserStore};

pub mod routes;
pub mod session;
pub mod upload;

use session::SessionTable;
use upload::DiskUploader;

/// Configuration for the web application.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Directory holding the flat JSON collections
    pub data_dir: PathBuf,
    /// Directory uploaded media is written to
    pub uploads_dir: PathBuf,
    /// Directory of static assets (css, js), served at the root
    pub static_dir: PathBuf,
    /// Tera glob for the page templates
    pub templates: String,
    /// Site-wide presentation settings
    pub site: SiteConfig,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3576,
            data_dir: PathBuf::from("./data"),
            uploads_dir: PathBuf::from("./public/uploads"),
            static_dir: PathBuf::from("./public"),
            templates: "./templates/**/*.html".to_string(),
            site: SiteConfig::default(),
        }
    }
}

/// Shared application state: the flat-file stores, the template engine,
/// the in-memory session table, and per-session section drafts.
pub struct AppState {
    pub projects: ProjectStore,
    pub slots: HomeSlotStore,
    pub users: UserStore,
    pub sessions: SessionTable,
    pub drafts: RwLock<HashMap<String, SectionDraft>>,
    pub uploader: DiskUploader,
    pub tera: tera::Tera,
    pub site: SiteConfig,
}

impl AppState {
    pub fn new(options: &ServerOptions) -> Result<Self> {
        let mut tera = tera::Tera::new(&options.templates)?;
        tera.register_filter("format_date", format_date_filter);
        Ok(Self {
            projects: ProjectStore::new(options.data_dir.join("projects.json")),
            slots: HomeSlotStore::new(options.data_dir.join("home-slots.json")),
            users: UserStore::new(options.data_dir.join("users.json")),
            sessions: SessionTable::new(),
            drafts: RwLock::new(HashMap::new()),
            uploader: DiskUploader::new(&options.uploads_dir),
            tera,
            site: options.site.clone(),
        })
    }

    /// Render a page template with the site config merged in. Template
    /// failures become 500 responses instead of panics.
    pub fn render(&self, template: &str, context: &tera::Context) -> Result<Html<String>, AppError> {
        let mut full = tera::Context::new();
        full.insert("site", &self.site);
        full.extend(context.clone());
        Ok(Html(self.tera.render(template, &full)?))
    }
}

/// Tera filter rendering an RFC 3339 timestamp as dd-mm-yyyy, matching the
/// public site's date display.
fn format_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let Some(raw) = value.as_str() else {
        return Ok(tera::Value::String(String::new()));
    };
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(date) => Ok(tera::Value::String(date.format("%d-%m-%Y").to_string())),
        Err(_) => Ok(tera::Value::String(String::new())),
    }
}

/// Error type for handlers: anything anyhow can absorb becomes a logged
/// 500 with a generic page, never a panic.
pub struct AppError(anyhow::Error);

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Something went wrong!</h1>".to_string()),
        )
            .into_response()
    }
}

/// The portfolio CMS web application.
pub struct Server {
    options: ServerOptions,
}

impl Server {
    pub fn new(options: ServerOptions) -> Self {
        Self { options }
    }

    pub fn router(&self) -> Result<Router> {
        let state = Arc::new(AppState::new(&self.options)?);
        Ok(build_router(state, &self.options))
    }

    /// Run the server until shutdown.
    pub async fn run(self) -> Result<()> {
        let app = self.router()?;
        let addr: SocketAddr = format!("{}:{}", self.options.host, self.options.port).parse()?;

        tracing::info!("Serving at http://{}", addr);
        tracing::info!("Data dir: {}", self.options.data_dir.display());

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

fn build_router(state: Arc<AppState>, options: &ServerOptions) -> Router {
    let admin = Router::new()
        .route("/login", get(routes::admin::login_page).post(routes::admin::login))
        .route("/logout", get(routes::admin::logout))
        .route("/dashboard", get(routes::admin::dashboard))
        .route("/users", get(routes::admin::users_page))
        .route("/users/add", post(routes::admin::add_user))
        .route("/users/delete/{id}", post(routes::admin::delete_user))
        .route("/projects", get(routes::admin::projects_page))
        .route("/projects/new", get(routes::admin::project_form))
        .route("/projects/add", post(routes::admin::add_project))
        .route("/projects/delete/{id}", post(routes::admin::delete_project))
        .route("/projects/move/{id}", post(routes::admin::move_project))
        .route("/slots", get(routes::admin::slots_page))
        .route("/slots/{id}", post(routes::admin::update_slot))
        .route("/upload", post(routes::admin::upload))
        .route("/upload-base64", post(routes::admin::upload_base64))
        .route("/draft", get(routes::admin::draft_state).delete(routes::admin::discard_draft))
        .route("/draft/sections", post(routes::admin::draft_append))
        .route("/draft/sections/{id}/remove", post(routes::admin::draft_remove))
        .route("/draft/sections/{id}/move", post(routes::admin::draft_move))
        .route("/draft/sections/{id}/field", post(routes::admin::draft_set_field))
        .route("/draft/sections/{id}/upload", post(routes::admin::draft_upload))
        .route("/draft/sections/{id}/gallery", post(routes::admin::draft_upload_gallery));

    Router::new()
        .route("/", get(routes::public::home))
        .route("/services", get(routes::public::services))
        .route("/contact", get(routes::public::contact))
        .route("/work", get(routes::public::work))
        .route("/projects/{id}", get(routes::public::project))
        .nest("/admin", admin)
        .nest_service("/uploads", ServeDir::new(&options.uploads_dir))
        .fallback_service(
            ServeDir::new(&options.static_dir).not_found_service(get(routes::public::not_found).with_state(state.clone())),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
