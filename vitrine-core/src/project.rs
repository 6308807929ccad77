//! The project store: an ordered JSON array on disk, order = display
//! order, newest created first.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::section::Section;
use crate::store::{StoreError, read_collection, write_collection};

/// Cover shown when a project has no explicit cover and no usable image in
/// any section.
pub const PLACEHOLDER_COVER: &str = "/uploads/placeholder.jpg";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub created_at: String,
}

impl Project {
    /// The cover to display: the explicit cover when set, else the first
    /// usable image found scanning sections in order, else a placeholder.
    pub fn resolved_cover(&self) -> &str {
        if let Some(cover) = self.cover_image.as_deref().filter(|c| !c.is_empty()) {
            return cover;
        }
        self.sections
            .iter()
            .find_map(|s| s.first_image())
            .unwrap_or(PLACEHOLDER_COVER)
    }
}

/// Fields the admin form submits when creating a project.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub title: String,
    pub slug: String,
    pub brand: String,
    pub cover_image: Option<String>,
    pub sections: Vec<Section>,
}

/// Partial update; `None` fields are left as stored. Kept for API parity
/// with the other stores even though the admin panel only creates and
/// deletes whole projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub brand: Option<String>,
    pub cover_image: Option<Option<String>>,
    pub sections: Option<Vec<Section>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

pub struct ProjectStore {
    path: PathBuf,
}

impl ProjectStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// All projects in display order.
    pub fn list(&self) -> Vec<Project> {
        read_collection(&self.path)
    }

    pub fn get(&self, id: u64) -> Option<Project> {
        self.list().into_iter().find(|p| p.id == id)
    }

    /// Case-insensitive brand filter, for related-project listings.
    pub fn by_brand(&self, brand: &str) -> Vec<Project> {
        self.list()
            .into_iter()
            .filter(|p| !p.brand.is_empty() && p.brand.eq_ignore_ascii_case(brand))
            .collect()
    }

    /// Create a project and prepend it so the newest shows first. The id
    /// is the creation time in milliseconds; an empty slug falls back to
    /// the id.
    pub fn create(&self, fields: NewProject) -> Result<Project, StoreError> {
        let now = Utc::now();
        let mut projects = self.list();
        // Timestamp ids collide when two creates land in the same
        // millisecond; bump until free.
        let mut id = now.timestamp_millis() as u64;
        while projects.iter().any(|p| p.id == id) {
            id += 1;
        }
        let project = Project {
            id,
            title: fields.title,
            slug: if fields.slug.is_empty() {
                id.to_string()
            } else {
                fields.slug
            },
            brand: fields.brand,
            cover_image: fields.cover_image.filter(|c| !c.is_empty()),
            sections: fields.sections,
            created_at: now.to_rfc3339(),
        };
        projects.insert(0, project.clone());
        write_collection(&self.path, &projects)?;
        Ok(project)
    }

    pub fn update(&self, id: u64, update: ProjectUpdate) -> Result<Option<Project>, StoreError> {
        let mut projects = self.list();
        let Some(project) = projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            project.title = title;
        }
        if let Some(slug) = update.slug {
            project.slug = slug;
        }
        if let Some(brand) = update.brand {
            project.brand = brand;
        }
        if let Some(cover) = update.cover_image {
            project.cover_image = cover;
        }
        if let Some(sections) = update.sections {
            project.sections = sections;
        }
        let updated = project.clone();
        write_collection(&self.path, &projects)?;
        Ok(Some(updated))
    }

    pub fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut projects = self.list();
        projects.retain(|p| p.id != id);
        write_collection(&self.path, &projects)
    }

    /// Swap a project with its neighbor in display order. No-op at the
    /// respective boundary or on an unknown id.
    pub fn swap(&self, id: u64, direction: Direction) -> Result<(), StoreError> {
        let mut projects = self.list();
        let Some(idx) = projects.iter().position(|p| p.id == id) else {
            return Ok(());
        };
        match direction {
            Direction::Up if idx > 0 => projects.swap(idx - 1, idx),
            Direction::Down if idx + 1 < projects.len() => projects.swap(idx, idx + 1),
            _ => return Ok(()),
        }
        write_collection(&self.path, &projects)
    }
}
