use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of video/thumbnail slots in a Reels section.
pub const REEL_SLOTS: usize = 4;
/// Number of video slots in a WebVideos section.
pub const WEB_VIDEO_SLOTS: usize = 6;

/// The set of content block types a project body can be composed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionKind {
    VideoText,
    CollageHeader,
    Reels,
    WebVideos,
    Results,
    Collage,
    TextSection,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::VideoText,
        SectionKind::CollageHeader,
        SectionKind::Reels,
        SectionKind::WebVideos,
        SectionKind::Results,
        SectionKind::Collage,
        SectionKind::TextSection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::VideoText => "VideoText",
            SectionKind::CollageHeader => "CollageHeader",
            SectionKind::Reels => "Reels",
            SectionKind::WebVideos => "WebVideos",
            SectionKind::Results => "Results",
            SectionKind::Collage => "Collage",
            SectionKind::TextSection => "TextSection",
        }
    }

    pub fn parse(s: &str) -> Option<SectionKind> {
        SectionKind::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoTextData {
    pub video: String,
    pub text: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollageHeaderData {
    pub images: Vec<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelsData {
    // Field-level defaults: a stored section missing a list reads as an
    // empty list, while `Default` pre-sizes both for fresh sections.
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

impl Default for ReelsData {
    fn default() -> Self {
        Self {
            videos: vec![String::new(); REEL_SLOTS],
            thumbnails: vec![String::new(); REEL_SLOTS],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebVideosData {
    #[serde(default)]
    pub videos: Vec<String>,
}

impl Default for WebVideosData {
    fn default() -> Self {
        Self {
            videos: vec![String::new(); WEB_VIDEO_SLOTS],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsData {
    pub image: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollageData {
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSectionData {
    pub text: String,
}

/// One typed content block in a project body. The wire format is the
/// adjacently-tagged `{"type": ..., "data": {...}}` shape the stores and
/// the authoring form exchange; field shapes per kind are fixed by the
/// data structs above, and absent fields deserialize to empty defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Section {
    VideoText(VideoTextData),
    CollageHeader(CollageHeaderData),
    Reels(ReelsData),
    WebVideos(WebVideosData),
    Results(ResultsData),
    Collage(CollageData),
    TextSection(TextSectionData),
}

impl Section {
    /// Fresh section with the schema defaults for `kind`: list-valued
    /// fields are pre-sized with empty-string placeholders, scalars empty.
    pub fn new(kind: SectionKind) -> Section {
        match kind {
            SectionKind::VideoText => Section::VideoText(VideoTextData::default()),
            SectionKind::CollageHeader => Section::CollageHeader(CollageHeaderData::default()),
            SectionKind::Reels => Section::Reels(ReelsData::default()),
            SectionKind::WebVideos => Section::WebVideos(WebVideosData::default()),
            SectionKind::Results => Section::Results(ResultsData::default()),
            SectionKind::Collage => Section::Collage(CollageData::default()),
            SectionKind::TextSection => Section::TextSection(TextSectionData::default()),
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            Section::VideoText(_) => SectionKind::VideoText,
            Section::CollageHeader(_) => SectionKind::CollageHeader,
            Section::Reels(_) => SectionKind::Reels,
            Section::WebVideos(_) => SectionKind::WebVideos,
            Section::Results(_) => SectionKind::Results,
            Section::Collage(_) => SectionKind::Collage,
            Section::TextSection(_) => SectionKind::TextSection,
        }
    }

    /// Overwrite one scalar field. Field names the kind does not carry are
    /// ignored, so a stale form reference never errors.
    pub fn set_field(&mut self, field: &str, value: &str) {
        match self {
            Section::VideoText(d) => match field {
                "video" => d.video = value.to_string(),
                "text" => d.text = value.to_string(),
                "thumbnail" => d.thumbnail = value.to_string(),
                _ => {}
            },
            Section::CollageHeader(d) => {
                if field == "text" {
                    d.text = value.to_string();
                }
            }
            Section::Results(d) => match field {
                "image" => d.image = value.to_string(),
                "text" => d.text = value.to_string(),
                _ => {}
            },
            Section::TextSection(d) => {
                if field == "text" {
                    d.text = value.to_string();
                }
            }
            Section::Reels(_) | Section::WebVideos(_) | Section::Collage(_) => {}
        }
    }

    /// Overwrite one element of a list-valued field. Writing past the
    /// current length extends the list with empty placeholders first.
    pub fn set_list_field(&mut self, field: &str, index: usize, value: &str) {
        let list = match (&mut *self, field) {
            (Section::Reels(d), "videos") => &mut d.videos,
            (Section::Reels(d), "thumbnails") => &mut d.thumbnails,
            (Section::WebVideos(d), "videos") => &mut d.videos,
            (Section::CollageHeader(d), "images") => &mut d.images,
            (Section::Collage(d), "images") => &mut d.images,
            _ => return,
        };
        if index >= list.len() {
            list.resize(index + 1, String::new());
        }
        list[index] = value.to_string();
    }

    /// Replace a gallery `images` field wholesale (multi-file upload
    /// produces all URLs at once). No-op for kinds without a gallery.
    pub fn set_images(&mut self, values: Vec<String>) {
        match self {
            Section::CollageHeader(d) => d.images = values,
            Section::Collage(d) => d.images = values,
            _ => {}
        }
    }

    /// First usable image in this section, for cover fallback: the scalar
    /// `image` field if set, else the first non-empty gallery entry.
    pub fn first_image(&self) -> Option<&str> {
        fn non_empty(s: &str) -> Option<&str> {
            (!s.is_empty()).then_some(s)
        }
        match self {
            Section::Results(d) => non_empty(&d.image),
            Section::CollageHeader(d) => d.images.iter().find_map(|s| non_empty(s)),
            Section::Collage(d) => d.images.iter().find_map(|s| non_empty(s)),
            Section::VideoText(_)
            | Section::Reels(_)
            | Section::WebVideos(_)
            | Section::TextSection(_) => None,
        }
    }

    /// Lenient single-section parse: unknown or missing `type` yields
    /// `None`; a missing `data` object is treated as `{}`.
    pub fn from_value(value: &Value) -> Option<Section> {
        let kind = value.get("type")?.as_str()?;
        SectionKind::parse(kind)?;
        let data = value.get("data").cloned().unwrap_or_else(|| Value::Object(Default::default()));
        let normalized = serde_json::json!({ "type": kind, "data": data });
        serde_json::from_value(normalized).ok()
    }
}

/// Parse a stored section array leniently: a corrupt document reads as an
/// empty list, and elements with an unknown or missing type are dropped.
pub fn parse_sections(json: &str) -> Vec<Section> {
    let Ok(values) = serde_json::from_str::<Vec<Value>>(json) else {
        return Vec::new();
    };
    values.iter().filter_map(Section::from_value).collect()
}

/// Serialize a section list to the wire format the stores persist.
pub fn serialize_sections(sections: &[Section]) -> String {
    serde_json::to_string(sections).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fix_list_arity() {
        let Section::Reels(d) = Section::new(SectionKind::Reels) else {
            panic!("wrong kind");
        };
        assert_eq!(d.videos, vec![String::new(); 4]);
        assert_eq!(d.thumbnails, vec![String::new(); 4]);

        let Section::WebVideos(d) = Section::new(SectionKind::WebVideos) else {
            panic!("wrong kind");
        };
        assert_eq!(d.videos.len(), 6);

        let Section::Collage(d) = Section::new(SectionKind::Collage) else {
            panic!("wrong kind");
        };
        assert!(d.images.is_empty());
    }

    #[test]
    fn wire_round_trip_is_lossless() {
        let sections = vec![
            Section::TextSection(TextSectionData {
                text: "hello".into(),
            }),
            Section::Reels(ReelsData {
                videos: vec!["a.mp4".into(), String::new(), String::new(), String::new()],
                thumbnails: vec![String::new(); 4],
            }),
            Section::Collage(CollageData {
                images: vec!["x.jpg".into(), "y.jpg".into()],
            }),
        ];
        let json = serialize_sections(&sections);
        assert_eq!(parse_sections(&json), sections);
    }

    #[test]
    fn wire_shape_is_type_plus_data() {
        let json = serialize_sections(&[Section::new(SectionKind::TextSection)]);
        let v: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v[0]["type"], "TextSection");
        assert_eq!(v[0]["data"]["text"], "");
    }

    #[test]
    fn unknown_type_is_dropped_not_fatal() {
        let json = r#"[{"type":"Marquee","data":{}},{"type":"TextSection","data":{"text":"t"}},{"data":{}}]"#;
        let parsed = parse_sections(json);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].kind(), SectionKind::TextSection);
    }

    #[test]
    fn corrupt_document_reads_empty() {
        assert!(parse_sections("not json").is_empty());
        assert!(parse_sections("{\"type\":1}").is_empty());
    }

    #[test]
    fn missing_data_and_fields_default() {
        let parsed = parse_sections(r#"[{"type":"VideoText"},{"type":"Reels","data":{"videos":["v"]}}]"#);
        assert_eq!(parsed[0], Section::VideoText(VideoTextData::default()));
        let Section::Reels(d) = &parsed[1] else {
            panic!("wrong kind");
        };
        // Absent fields come back empty, not pre-sized; the renderer and
        // list setters both tolerate short lists.
        assert_eq!(d.videos, vec!["v".to_string()]);
        assert!(d.thumbnails.is_empty());
    }

    #[test]
    fn set_field_ignores_unknown_names() {
        let mut s = Section::new(SectionKind::TextSection);
        s.set_field("video", "nope");
        s.set_field("text", "yes");
        assert_eq!(s, Section::TextSection(TextSectionData { text: "yes".into() }));
    }

    #[test]
    fn set_list_field_extends_past_end() {
        let mut s = Section::new(SectionKind::Collage);
        s.set_list_field("images", 2, "c.jpg");
        let Section::Collage(d) = &s else {
            panic!("wrong kind");
        };
        assert_eq!(d.images, vec!["".to_string(), "".to_string(), "c.jpg".to_string()]);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in SectionKind::ALL {
            assert_eq!(SectionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SectionKind::parse("Banner"), None);
    }
}
