//! The authoring session behind the admin project form: an ordered list of
//! sections built up interactively, serialized to the wire format on every
//! mutation so a submit always reflects current state.

use serde::Serialize;

use crate::section::{Section, SectionKind, serialize_sections};

/// Upload collaborator: takes one file, returns a stable URL for it.
/// Failure must leave no partial effect.
pub trait Uploader {
    fn store(&self, filename: &str, bytes: &[u8]) -> Result<String, UploadError>;
}

#[derive(Debug)]
pub struct UploadError(pub String);

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Upload failed: {}", self.0)
    }
}

impl std::error::Error for UploadError {}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError(err.to_string())
    }
}

/// One entry in a draft: a section plus its session-local handle. The id
/// only has to be collision-free within one draft; it never persists.
#[derive(Debug, Clone, Serialize)]
pub struct DraftSection {
    pub id: u64,
    #[serde(flatten)]
    pub section: Section,
}

/// Ordered, mutable list of sections for one authoring session. All
/// id-addressed operations are no-ops on a missing id, tolerating stale
/// references after a concurrent removal.
#[derive(Debug, Default)]
pub struct SectionDraft {
    entries: Vec<DraftSection>,
    next_id: u64,
}

impl SectionDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[DraftSection] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a new section with its kind's schema defaults; returns the
    /// session-local id for subsequent edits.
    pub fn append(&mut self, kind: SectionKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(DraftSection {
            id,
            section: Section::new(kind),
        });
        id
    }

    pub fn remove(&mut self, id: u64) {
        self.entries.retain(|e| e.id != id);
    }

    pub fn move_up(&mut self, id: u64) {
        if let Some(idx) = self.index_of(id) {
            if idx > 0 {
                self.entries.swap(idx - 1, idx);
            }
        }
    }

    pub fn move_down(&mut self, id: u64) {
        if let Some(idx) = self.index_of(id) {
            if idx + 1 < self.entries.len() {
                self.entries.swap(idx, idx + 1);
            }
        }
    }

    pub fn set_field(&mut self, id: u64, field: &str, value: &str) {
        if let Some(e) = self.get_mut(id) {
            e.section.set_field(field, value);
        }
    }

    pub fn set_list_field(&mut self, id: u64, field: &str, index: usize, value: &str) {
        if let Some(e) = self.get_mut(id) {
            e.section.set_list_field(field, index, value);
        }
    }

    pub fn set_images(&mut self, id: u64, values: Vec<String>) {
        if let Some(e) = self.get_mut(id) {
            e.section.set_images(values);
        }
    }

    /// Upload one file and write its URL into a scalar field. On upload
    /// failure the field is untouched and the error is returned; the draft
    /// itself survives.
    pub fn attach(
        &mut self,
        id: u64,
        field: &str,
        uploader: &dyn Uploader,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let url = uploader.store(filename, bytes)?;
        self.set_field(id, field, &url);
        Ok(url)
    }

    /// Upload one file and write its URL into one slot of a list field
    /// (reel thumbnails). Out-of-order completion across indices is fine:
    /// each result lands only in its own slot.
    pub fn attach_at(
        &mut self,
        id: u64,
        field: &str,
        index: usize,
        uploader: &dyn Uploader,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let url = uploader.store(filename, bytes)?;
        self.set_list_field(id, field, index, &url);
        Ok(url)
    }

    /// Upload a batch of files and replace the section's gallery with the
    /// resulting URLs. If any upload fails the gallery is left unchanged —
    /// no partial replace.
    pub fn attach_gallery(
        &mut self,
        id: u64,
        uploader: &dyn Uploader,
        files: &[(&str, &[u8])],
    ) -> Result<Vec<String>, UploadError> {
        let urls = files
            .iter()
            .map(|(name, bytes)| uploader.store(name, bytes))
            .collect::<Result<Vec<_>, _>>()?;
        self.set_images(id, urls.clone());
        Ok(urls)
    }

    /// Wire-format JSON of the current list, in order. Pure: repeated calls
    /// without intervening mutation produce identical text.
    pub fn serialize(&self) -> String {
        let sections: Vec<Section> = self.entries.iter().map(|e| e.section.clone()).collect();
        serialize_sections(&sections)
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut DraftSection> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::parse_sections;
    use std::cell::Cell;

    struct FakeUploader {
        fail: bool,
        calls: Cell<u32>,
    }

    impl FakeUploader {
        fn ok() -> Self {
            Self { fail: false, calls: Cell::new(0) }
        }

        fn failing() -> Self {
            Self { fail: true, calls: Cell::new(0) }
        }
    }

    impl Uploader for FakeUploader {
        fn store(&self, filename: &str, _bytes: &[u8]) -> Result<String, UploadError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(UploadError("disk full".into()))
            } else {
                Ok(format!("/uploads/{filename}"))
            }
        }
    }

    #[test]
    fn append_uses_schema_defaults() {
        let mut draft = SectionDraft::new();
        let id = draft.append(SectionKind::Reels);
        let json = draft.serialize();
        let sections = parse_sections(&json);
        let Section::Reels(d) = &sections[0] else {
            panic!("wrong kind");
        };
        assert_eq!(d.videos, vec![String::new(); 4]);

        draft.set_list_field(id, "videos", 1, "http://x/v.mp4");
        let sections = parse_sections(&draft.serialize());
        let Section::Reels(d) = &sections[0] else {
            panic!("wrong kind");
        };
        assert_eq!(d.videos[1], "http://x/v.mp4");
        assert_eq!(sections[0].render().matches("class=\"reel\"").count(), 1);
    }

    #[test]
    fn ids_are_unique_within_a_session() {
        let mut draft = SectionDraft::new();
        let a = draft.append(SectionKind::TextSection);
        draft.remove(a);
        let b = draft.append(SectionKind::TextSection);
        assert_ne!(a, b);
    }

    #[test]
    fn move_up_then_down_restores_order() {
        let mut draft = SectionDraft::new();
        let a = draft.append(SectionKind::TextSection);
        let b = draft.append(SectionKind::Collage);
        let c = draft.append(SectionKind::Results);

        let before = draft.serialize();
        draft.move_up(b);
        draft.move_down(b);
        assert_eq!(draft.serialize(), before);

        // At the top, move_up is a no-op; move_down still swaps.
        draft.move_up(a);
        assert_eq!(draft.serialize(), before);
        draft.move_down(c);
        assert_eq!(draft.serialize(), before);
    }

    #[test]
    fn mutations_on_missing_id_are_noops() {
        let mut draft = SectionDraft::new();
        draft.append(SectionKind::TextSection);
        let before = draft.serialize();

        draft.remove(999);
        draft.move_up(999);
        draft.move_down(999);
        draft.set_field(999, "text", "x");
        draft.set_list_field(999, "images", 0, "x");
        draft.set_images(999, vec!["x".into()]);
        assert_eq!(draft.serialize(), before);
    }

    #[test]
    fn serialize_is_stable_without_mutation() {
        let mut draft = SectionDraft::new();
        let id = draft.append(SectionKind::VideoText);
        draft.set_field(id, "text", "hello");
        assert_eq!(draft.serialize(), draft.serialize());
    }

    #[test]
    fn failed_upload_leaves_field_unchanged() {
        let mut draft = SectionDraft::new();
        let id = draft.append(SectionKind::Results);
        draft.set_field(id, "image", "/uploads/old.jpg");

        let err = draft
            .attach(id, "image", &FakeUploader::failing(), "new.jpg", b"x")
            .unwrap_err();
        assert!(err.to_string().contains("disk full"));

        let sections = parse_sections(&draft.serialize());
        let Section::Results(d) = &sections[0] else {
            panic!("wrong kind");
        };
        assert_eq!(d.image, "/uploads/old.jpg");
    }

    #[test]
    fn failed_gallery_upload_is_all_or_nothing() {
        let mut draft = SectionDraft::new();
        let id = draft.append(SectionKind::Collage);
        draft.set_images(id, vec!["/uploads/keep.jpg".into()]);

        let files: Vec<(&str, &[u8])> = vec![("a.jpg", b"a"), ("b.jpg", b"b")];
        assert!(draft.attach_gallery(id, &FakeUploader::failing(), &files).is_err());

        let sections = parse_sections(&draft.serialize());
        let Section::Collage(d) = &sections[0] else {
            panic!("wrong kind");
        };
        assert_eq!(d.images, vec!["/uploads/keep.jpg".to_string()]);
    }

    #[test]
    fn gallery_upload_replaces_wholesale() {
        let mut draft = SectionDraft::new();
        let id = draft.append(SectionKind::CollageHeader);
        draft.set_images(id, vec!["old.jpg".into(), "older.jpg".into()]);

        let uploader = FakeUploader::ok();
        let files: Vec<(&str, &[u8])> = vec![("a.jpg", b"a")];
        draft.attach_gallery(id, &uploader, &files).unwrap();
        assert_eq!(uploader.calls.get(), 1);

        let sections = parse_sections(&draft.serialize());
        let Section::CollageHeader(d) = &sections[0] else {
            panic!("wrong kind");
        };
        assert_eq!(d.images, vec!["/uploads/a.jpg".to_string()]);
    }

    #[test]
    fn indexed_attach_targets_only_its_slot() {
        let mut draft = SectionDraft::new();
        let id = draft.append(SectionKind::Reels);
        let uploader = FakeUploader::ok();

        // Results applied in reverse completion order still land in the
        // slot each upload targeted.
        draft.attach_at(id, "thumbnails", 3, &uploader, "t3.jpg", b"x").unwrap();
        draft.attach_at(id, "thumbnails", 0, &uploader, "t0.jpg", b"x").unwrap();

        let sections = parse_sections(&draft.serialize());
        let Section::Reels(d) = &sections[0] else {
            panic!("wrong kind");
        };
        assert_eq!(d.thumbnails[0], "/uploads/t0.jpg");
        assert_eq!(d.thumbnails[3], "/uploads/t3.jpg");
        assert_eq!(d.thumbnails[1], "");
    }
}
