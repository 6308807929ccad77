//! The public-facing pages: everything here renders the same stored
//! content the admin panel manages.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tera::Context;
use vitrine_core::Project;

use crate::{AppError, AppState};

/// Card data for project listings: the resolved cover saves templates
/// from re-deriving the fallback chain.
#[derive(Serialize)]
struct ProjectCard {
    id: u64,
    title: String,
    slug: String,
    brand: String,
    cover: String,
    created_at: String,
}

impl ProjectCard {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            title: project.title.clone(),
            slug: project.slug.clone(),
            brand: project.brand.clone(),
            cover: project.resolved_cover().to_string(),
            created_at: project.created_at.clone(),
        }
    }
}

pub async fn home(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let slots = state.slots.all()?;
    let mut ctx = Context::new();
    ctx.insert("title", "Home");
    ctx.insert("slots", &slots);
    Ok(state.render("home.html", &ctx)?.into_response())
}

pub async fn services(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("title", "Services");
    Ok(state.render("services.html", &ctx)?.into_response())
}

pub async fn contact(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("title", "Contact");
    Ok(state.render("contact.html", &ctx)?.into_response())
}

pub async fn work(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let cards: Vec<ProjectCard> = state.projects.list().iter().map(ProjectCard::from).collect();
    let mut ctx = Context::new();
    ctx.insert("title", "Work");
    ctx.insert("projects", &cards);
    Ok(state.render("work.html", &ctx)?.into_response())
}

pub async fn project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Response, AppError> {
    let Some(project) = state.projects.get(id) else {
        return not_found(State(state)).await;
    };

    // Each section renders independently; a malformed one degrades to
    // empty markup rather than failing the page.
    let sections_html: String = project.sections.iter().map(|s| s.render()).collect();

    let related: Vec<ProjectCard> = if project.brand.is_empty() {
        Vec::new()
    } else {
        state
            .projects
            .by_brand(&project.brand)
            .iter()
            .filter(|p| p.id != project.id)
            .take(3)
            .map(ProjectCard::from)
            .collect()
    };

    let mut ctx = Context::new();
    ctx.insert("title", &project.title);
    ctx.insert("project", &ProjectCard::from(&project));
    ctx.insert("sections_html", &sections_html);
    ctx.insert("related_projects", &related);
    Ok(state.render("project.html", &ctx)?.into_response())
}

pub async fn not_found(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("title", "Not Found");
    let page = state.render("404.html", &ctx)?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}
