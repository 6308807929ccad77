//! Section-to-markup rendering for public project pages.
//!
//! Rendering is a pure function of the section value and must never fail a
//! page: absent fields collapse to empty output, blank list entries are
//! filtered before anything is counted, and every stored value is escaped
//! for the context it lands in.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::Value;

use crate::section::Section;

/// Gallery counts in this inclusive range select a per-count grid variant;
/// anything outside falls back to the generic grid class.
pub const COLLAGE_STYLED_RANGE: std::ops::RangeInclusive<usize> = 6..=10;

/// True for URLs that point at a playable video file rather than an embed
/// page. Anything else goes into an iframe.
pub fn is_direct_video_url(url: &str) -> bool {
    url.contains(".mp4") || url.contains(".webm") || url.contains(".mov")
}

fn collage_grid_class(count: usize) -> String {
    if COLLAGE_STYLED_RANGE.contains(&count) {
        format!("collage-grid collage-grid-{count}")
    } else {
        "collage-grid".to_string()
    }
}

fn collage_grid(images: &[String]) -> String {
    images
        .iter()
        .enumerate()
        .map(|(idx, url)| {
            format!(
                r#"<div class="collage-item collage-item-{}"><img src="{}" alt=""/></div>"#,
                idx + 1,
                encode_double_quoted_attribute(url)
            )
        })
        .collect()
}

fn non_blank(values: &[String]) -> Vec<&String> {
    values.iter().filter(|v| !v.is_empty()).collect()
}

impl Section {
    /// Render this section to display markup.
    pub fn render(&self) -> String {
        match self {
            Section::VideoText(d) => {
                let poster = if d.thumbnail.is_empty() {
                    String::new()
                } else {
                    format!(r#" poster="{}""#, encode_double_quoted_attribute(&d.thumbnail))
                };
                let player = if is_direct_video_url(&d.video) {
                    format!(
                        r#"<video width="100%" playsinline preload="metadata" class="videoframe"{poster}><source src="{}" type="video/mp4"></video>"#,
                        encode_double_quoted_attribute(&d.video)
                    )
                } else {
                    format!(
                        r#"<iframe class="videoframe" src="{}" frameborder="0" allow="autoplay; encrypted-media" allowfullscreen></iframe>"#,
                        encode_double_quoted_attribute(&d.video)
                    )
                };
                format!(
                    r#"<section class="proj-video-text"><div class="proj-video-text-wrapper">{player}<div class="video-play-button" onclick="playVideoText(this)"></div></div><p class="section-text">{}</p></section>"#,
                    encode_text(&d.text)
                )
            }
            Section::CollageHeader(d) => format!(
                r#"<section class="proj-collage-header"><div class="{}">{}</div><p class="section-text">{}</p></section>"#,
                collage_grid_class(d.images.len()),
                collage_grid(&d.images),
                encode_text(&d.text)
            ),
            Section::Reels(d) => {
                let videos = non_blank(&d.videos);
                let items: String = videos
                    .iter()
                    .enumerate()
                    .map(|(idx, url)| {
                        let poster = match d.thumbnails.get(idx).filter(|t| !t.is_empty()) {
                            Some(t) => {
                                format!(r#" poster="{}""#, encode_double_quoted_attribute(t))
                            }
                            None => String::new(),
                        };
                        format!(
                            r#"<div class="reel" id="reel-{idx}"><video id="video-{idx}" src="{}" playsinline preload="metadata"{poster}></video><div class="reel-play-button" onclick="playReel({idx})"></div></div>"#,
                            encode_double_quoted_attribute(url)
                        )
                    })
                    .collect();
                format!(
                    r#"<section class="proj-reels"><h2 class="reels-title">REELS</h2><div class="reels-grid reels-count-{}">{items}</div></section>"#,
                    videos.len()
                )
            }
            Section::WebVideos(d) => {
                let items: String = non_blank(&d.videos)
                    .iter()
                    .map(|url| {
                        format!(
                            r#"<div class="webvideo"><video autoplay loop muted playsinline><source src="{}" type="video/mp4"></video></div>"#,
                            encode_double_quoted_attribute(url)
                        )
                    })
                    .collect();
                format!(r#"<section class="proj-webvideos"><div class="webvideos-grid">{items}</div></section>"#)
            }
            Section::Results(d) => format!(
                r#"<section class="proj-results"><h2 class="results-title">RESULTS</h2><div class="results-content"><div class="results-image"><img src="{}" alt=""/></div><p class="section-text">{}</p></div></section>"#,
                encode_double_quoted_attribute(&d.image),
                encode_text(&d.text)
            ),
            Section::Collage(d) => format!(
                r#"<section class="proj-collage"><div class="{}">{}</div></section>"#,
                collage_grid_class(d.images.len()),
                collage_grid(&d.images)
            ),
            Section::TextSection(d) => format!(
                r#"<section class="proj-text-section"><div class="text-section-content"><p class="section-text">{}</p></div></section>"#,
                encode_text(&d.text)
            ),
        }
    }
}

/// Render a raw stored section value. Unknown or missing `type` produces
/// empty output rather than an error, so one bad record never takes down
/// a page.
pub fn render_value(value: &Value) -> String {
    Section::from_value(value).map(|s| s.render()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{CollageData, ReelsData, SectionKind, VideoTextData};
    use serde_json::json;

    #[test]
    fn blank_reel_slots_are_filtered() {
        let mut section = Section::new(SectionKind::Reels);
        section.set_list_field("videos", 1, "http://x/v.mp4");
        let html = section.render();
        assert_eq!(html.matches("class=\"reel\"").count(), 1);
        assert!(html.contains("reels-count-1"));
    }

    #[test]
    fn reel_thumbnails_stay_index_aligned_after_filtering() {
        let section = Section::Reels(ReelsData {
            videos: vec!["".into(), "v.mp4".into(), "".into(), "".into()],
            thumbnails: vec!["t0.jpg".into(), "t1.jpg".into(), "".into(), "".into()],
        });
        let html = section.render();
        // The surviving video is item 0 of the filtered list; its poster is
        // looked up at the filtered index.
        assert!(html.contains("poster=\"t0.jpg\""));
        assert!(!html.contains("t1.jpg"));
    }

    #[test]
    fn collage_count_selects_grid_variant() {
        let seven = Section::Collage(CollageData {
            images: (0..7).map(|i| format!("{i}.jpg")).collect(),
        });
        assert!(seven.render().contains(r#"class="collage-grid collage-grid-7""#));

        let three = Section::Collage(CollageData {
            images: (0..3).map(|i| format!("{i}.jpg")).collect(),
        });
        let html = three.render();
        assert!(html.contains(r#"class="collage-grid""#));
        assert!(!html.contains("collage-grid-3"));
    }

    #[test]
    fn video_text_picks_player_by_url() {
        let mut direct = Section::new(SectionKind::VideoText);
        direct.set_field("video", "/uploads/a.mp4");
        assert!(direct.render().contains("<video"));

        let mut embed = Section::new(SectionKind::VideoText);
        embed.set_field("video", "https://player.vimeo.com/video/1");
        assert!(embed.render().contains("<iframe"));
    }

    #[test]
    fn text_is_escaped() {
        let mut section = Section::new(SectionKind::TextSection);
        section.set_field("text", "<script>alert(1)</script>");
        let html = section.render();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut section = Section::new(SectionKind::Results);
        section.set_field("image", "x\" onerror=\"alert(1)");
        let html = section.render();
        assert!(!html.contains("onerror=\"alert"));
    }

    #[test]
    fn render_value_tolerates_garbage() {
        assert_eq!(render_value(&json!({"type": "Marquee", "data": {}})), "");
        assert_eq!(render_value(&json!({"data": {"text": "x"}})), "");
        assert_eq!(render_value(&json!(null)), "");
        assert_eq!(render_value(&json!({"type": "TextSection"})), render_value(&json!({"type": "TextSection", "data": {}})));
    }

    #[test]
    fn empty_defaults_render_without_panicking() {
        for kind in SectionKind::ALL {
            let _ = Section::new(kind).render();
        }
    }

    #[test]
    fn video_text_poster_only_when_thumbnail_set() {
        let bare = Section::VideoText(VideoTextData {
            video: "a.mp4".into(),
            ..Default::default()
        });
        assert!(!bare.render().contains("poster"));

        let with = Section::VideoText(VideoTextData {
            video: "a.mp4".into(),
            thumbnail: "p.jpg".into(),
            ..Default::default()
        });
        assert!(with.render().contains(r#"poster="p.jpg""#));
    }
}
