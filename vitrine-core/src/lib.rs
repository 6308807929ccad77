pub mod config;
pub mod draft;
pub mod home;
pub mod project;
pub mod render;
pub mod section;
pub mod store;
pub mod user;

// Re-export main types
pub use draft::{SectionDraft, UploadError, Uploader};
pub use home::{HomeSlot, HomeSlotStore, SlotContent, SlotKind};
pub use project::{Direction, NewProject, Project, ProjectStore};
pub use section::{Section, SectionKind, parse_sections, serialize_sections};
pub use store::StoreError;
pub use user::{NewUser, User, UserStore};
