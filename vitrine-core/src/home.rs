//! The three fixed homepage media slots.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::render::is_direct_video_url;
use crate::store::{StoreError, read_collection, write_collection};

pub const SLOT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Image,
    Video,
}

/// One homepage media placeholder. Exactly the field matching `kind` is
/// populated; the other is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeSlot {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: SlotKind,
    pub image_path: Option<String>,
    pub video_url: Option<String>,
}

impl HomeSlot {
    fn empty(id: u32) -> Self {
        Self {
            id,
            kind: SlotKind::Image,
            image_path: None,
            video_url: None,
        }
    }
}

/// New content for a slot. Setting either kind clears the other field.
#[derive(Debug, Clone)]
pub enum SlotContent {
    Image(String),
    Video(String),
}

#[derive(Debug)]
pub enum SlotError {
    InvalidVideoUrl(String),
    Store(StoreError),
}

impl std::fmt::Display for SlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotError::InvalidVideoUrl(url) => write!(f, "Not a playable video URL: {}", url),
            SlotError::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for SlotError {}

impl From<StoreError> for SlotError {
    fn from(value: StoreError) -> Self {
        SlotError::Store(value)
    }
}

pub struct HomeSlotStore {
    path: PathBuf,
}

impl HomeSlotStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Exactly three slots, ids 1..=3. Missing slots are synthesized as
    /// empty image slots and persisted so later updates find them.
    pub fn all(&self) -> Result<Vec<HomeSlot>, StoreError> {
        let mut slots: Vec<HomeSlot> = read_collection(&self.path);
        if slots.len() < SLOT_COUNT {
            while slots.len() < SLOT_COUNT {
                slots.push(HomeSlot::empty(slots.len() as u32 + 1));
            }
            write_collection(&self.path, &slots)?;
        }
        slots.truncate(SLOT_COUNT);
        Ok(slots)
    }

    pub fn get(&self, id: u32) -> Result<Option<HomeSlot>, StoreError> {
        Ok(self.all()?.into_iter().find(|s| s.id == id))
    }

    /// Replace a slot's content. Video URLs must look like a playable file;
    /// unknown ids are a no-op returning `None`.
    pub fn update(&self, id: u32, content: SlotContent) -> Result<Option<HomeSlot>, SlotError> {
        if let SlotContent::Video(url) = &content {
            if !is_direct_video_url(url) {
                return Err(SlotError::InvalidVideoUrl(url.clone()));
            }
        }
        let mut slots = self.all()?;
        let Some(slot) = slots.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        match content {
            SlotContent::Image(path) => {
                slot.kind = SlotKind::Image;
                slot.image_path = Some(path);
                slot.video_url = None;
            }
            SlotContent::Video(url) => {
                slot.kind = SlotKind::Video;
                slot.video_url = Some(url);
                slot.image_path = None;
            }
        }
        let updated = slot.clone();
        write_collection(&self.path, &slots).map_err(SlotError::Store)?;
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn always_exactly_three_slots() {
        let dir = TempDir::new().unwrap();
        let store = HomeSlotStore::new(dir.path().join("home-slots.json"));
        let slots = store.all().unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots.iter().map(|s| s.id).collect::<Vec<_>>(), [1, 2, 3]);
        assert!(slots.iter().all(|s| s.kind == SlotKind::Image && s.image_path.is_none()));
    }

    #[test]
    fn update_populates_exactly_one_field() {
        let dir = TempDir::new().unwrap();
        let store = HomeSlotStore::new(dir.path().join("home-slots.json"));

        let slot = store
            .update(2, SlotContent::Video("/uploads/a.mp4".into()))
            .unwrap()
            .unwrap();
        assert_eq!(slot.kind, SlotKind::Video);
        assert_eq!(slot.video_url.as_deref(), Some("/uploads/a.mp4"));
        assert!(slot.image_path.is_none());

        let slot = store
            .update(2, SlotContent::Image("/uploads/b.jpg".into()))
            .unwrap()
            .unwrap();
        assert_eq!(slot.kind, SlotKind::Image);
        assert!(slot.video_url.is_none());

        assert!(store.update(9, SlotContent::Image("x.jpg".into())).unwrap().is_none());
    }

    #[test]
    fn rejects_embed_urls_for_video_slots() {
        let dir = TempDir::new().unwrap();
        let store = HomeSlotStore::new(dir.path().join("home-slots.json"));
        let err = store
            .update(1, SlotContent::Video("https://youtube.com/watch?v=1".into()))
            .unwrap_err();
        assert!(matches!(err, SlotError::InvalidVideoUrl(_)));
        // Slot untouched on failure.
        assert!(store.get(1).unwrap().unwrap().video_url.is_none());
    }

    #[test]
    fn persisted_shape_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("home-slots.json");
        let store = HomeSlotStore::new(&path);
        store.update(1, SlotContent::Image("/uploads/hero.jpg".into())).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v[0]["type"], "image");
        assert_eq!(v[0]["image_path"], "/uploads/hero.jpg");
        assert_eq!(v[0]["video_url"], serde_json::Value::Null);
    }
}
