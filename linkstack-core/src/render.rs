//! Projection of the filtered collection into display models.
//!
//! Nothing in here touches the store; front ends draw these structs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::filter::{self, Selector, SmartCount};
use crate::item::{Item, ItemId, ItemKind};

/// Shown on grid cards for links that have no preview reference.
pub const FALLBACK_PREVIEW: &str =
    "https://images.unsplash.com/photo-1557683316-973673baf926?w=400&q=80";

/// Number of tags shown on a grid card.
pub const CARD_TAG_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!("unknown view mode '{other}' (expected grid or list)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconCategory {
    Globe,
    Image,
    Video,
    Audio,
    Pdf,
    Document,
    Spreadsheet,
    File,
}

impl IconCategory {
    /// Total over all inputs; unknown types map to [`IconCategory::File`].
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            IconCategory::Image
        } else if mime.starts_with("video/") {
            IconCategory::Video
        } else if mime.starts_with("audio/") {
            IconCategory::Audio
        } else if mime == "application/pdf" {
            IconCategory::Pdf
        } else if mime.contains("sheet") || mime.contains("excel") {
            IconCategory::Spreadsheet
        } else if mime.contains("word") || mime.contains("document") {
            IconCategory::Document
        } else {
            IconCategory::File
        }
    }

    pub fn for_item(item: &Item) -> Self {
        match &item.kind {
            ItemKind::Link { .. } => IconCategory::Globe,
            ItemKind::File { file_type, .. } => IconCategory::from_mime(file_type),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IconCategory::Globe => "globe",
            IconCategory::Image => "image",
            IconCategory::Video => "video",
            IconCategory::Audio => "audio",
            IconCategory::Pdf => "pdf",
            IconCategory::Document => "document",
            IconCategory::Spreadsheet => "spreadsheet",
            IconCategory::File => "file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Preview {
    Image { url: String },
    Icon { category: IconCategory },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: ItemId,
    pub title: String,
    pub preview: Preview,
    pub subtitle: String,
    pub tags: Vec<String>,
    pub fav: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: ItemId,
    pub title: String,
    pub icon: IconCategory,
    pub detail: String,
    pub fav: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", content = "entries", rename_all = "lowercase")]
pub enum Entries {
    Empty,
    Grid(Vec<Card>),
    List(Vec<Row>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed {
    pub heading: String,
    pub count: usize,
    pub entries: Entries,
}

impl Feed {
    pub fn ids(&self) -> Vec<&str> {
        match &self.entries {
            Entries::Empty => Vec::new(),
            Entries::Grid(cards) => cards.iter().map(|c| c.id.as_str()).collect(),
            Entries::List(rows) => rows.iter().map(|r| r.id.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Locator {
    Link { url: String },
    File { file_name: String, size: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspector {
    pub id: ItemId,
    pub title: String,
    pub preview: Preview,
    pub locator: Locator,
    pub folder: String,
    pub tags: Vec<String>,
    pub note: String,
    pub downloadable: bool,
    pub fav: bool,
    pub pinned: bool,
    pub later: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sidebar {
    pub active: Selector,
    pub smart: Vec<SmartCount>,
    pub folders: Vec<String>,
    pub tags: Vec<String>,
}

/// `bytes / 1024` with one decimal: 2048 -> "2.0 KB".
/// Exact halves round up: 256 -> "0.3 KB".
pub fn size_label(bytes: u64) -> String {
    let tenths = (u128::from(bytes) * 10 + 512) / 1024;
    format!("{}.{} KB", tenths / 10, tenths % 10)
}

/// Host name without a leading `www.`. Falls back to the raw input when it
/// does not parse as a URL.
pub fn domain_of(url: &str) -> String {
    let candidate = if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    };
    match url::Url::parse(&candidate)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
    {
        Some(host) => host.strip_prefix("www.").unwrap_or(&host).to_string(),
        None => url.to_string(),
    }
}

pub fn render_card(item: &Item, selected: bool) -> Card {
    let (preview, subtitle) = match &item.kind {
        ItemKind::Link { url, preview } => {
            let src = if preview.is_empty() {
                FALLBACK_PREVIEW.to_string()
            } else {
                preview.clone()
            };
            (Preview::Image { url: src }, domain_of(url))
        }
        ItemKind::File {
            file_type,
            file_size,
            ..
        } => (
            Preview::Icon {
                category: IconCategory::from_mime(file_type),
            },
            size_label(*file_size),
        ),
    };
    Card {
        id: item.id.clone(),
        title: item.title.clone(),
        preview,
        subtitle,
        tags: item.tags.iter().take(CARD_TAG_LIMIT).cloned().collect(),
        fav: item.fav,
        selected,
    }
}

pub fn render_row(item: &Item, selected: bool) -> Row {
    let detail = match &item.kind {
        ItemKind::Link { url, .. } => url.clone(),
        ItemKind::File {
            file_type,
            file_size,
            ..
        } => format!("{} • {}", size_label(*file_size), file_type),
    };
    Row {
        id: item.id.clone(),
        title: item.title.clone(),
        icon: IconCategory::for_item(item),
        detail,
        fav: item.fav,
        selected,
    }
}

pub fn render_feed(
    visible: &[&Item],
    selector: &Selector,
    mode: ViewMode,
    selected: Option<&str>,
) -> Feed {
    let is_selected = |item: &Item| selected == Some(item.id.as_str());
    let entries = if visible.is_empty() {
        Entries::Empty
    } else {
        match mode {
            ViewMode::Grid => Entries::Grid(
                visible
                    .iter()
                    .map(|i| render_card(i, is_selected(*i)))
                    .collect(),
            ),
            ViewMode::List => Entries::List(
                visible
                    .iter()
                    .map(|i| render_row(i, is_selected(*i)))
                    .collect(),
            ),
        }
    };
    Feed {
        heading: selector.label().to_string(),
        count: visible.len(),
        entries,
    }
}

pub fn render_inspector(item: &Item) -> Inspector {
    let (preview, locator, downloadable) = match &item.kind {
        ItemKind::Link { url, preview } => (
            Preview::Image {
                url: preview.clone(),
            },
            Locator::Link { url: url.clone() },
            false,
        ),
        ItemKind::File {
            file_name,
            file_type,
            file_size,
            ..
        } => (
            Preview::Icon {
                category: IconCategory::from_mime(file_type),
            },
            Locator::File {
                file_name: file_name.clone(),
                size: size_label(*file_size),
            },
            true,
        ),
    };
    Inspector {
        id: item.id.clone(),
        title: item.title.clone(),
        preview,
        locator,
        folder: item.folder_or_default().to_string(),
        tags: item.tags.clone(),
        note: item.note.clone(),
        downloadable,
        fav: item.fav,
        pinned: item.pinned,
        later: item.later,
        created_at: item
            .created_at
            .format("%Y-%m-%d %H:%M UTC")
            .to_string(),
    }
}

pub fn render_sidebar(items: &[Item], active: &Selector) -> Sidebar {
    Sidebar {
        active: active.clone(),
        smart: filter::smart_counts(items),
        folders: filter::folders(items),
        tags: filter::tags(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn file(size: u64, mime: &str) -> Item {
        Item {
            id: "7".into(),
            kind: ItemKind::File {
                file_name: "a.bin".into(),
                file_type: mime.into(),
                file_data: String::new(),
                file_size: size,
            },
            title: "a".into(),
            folder: "General".into(),
            tags: vec!["1".into(), "2".into(), "3".into(), "4".into()],
            fav: true,
            pinned: false,
            later: false,
            note: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn size_label_uses_one_decimal_kilobytes() {
        assert_eq!(size_label(2048), "2.0 KB");
        assert_eq!(size_label(0), "0.0 KB");
        assert_eq!(size_label(1536), "1.5 KB");
    }

    #[test]
    fn size_label_rounds_halves_up() {
        assert_eq!(size_label(256), "0.3 KB");
        assert_eq!(size_label(768), "0.8 KB");
        assert_eq!(size_label(1280), "1.3 KB");
        assert_eq!(size_label(2304), "2.3 KB");
        assert_eq!(size_label(u64::MAX), "18014398509481984.0 KB");
    }

    #[test]
    fn mime_mapping_is_total() {
        let cases = [
            ("image/png", IconCategory::Image),
            ("video/mp4", IconCategory::Video),
            ("audio/ogg", IconCategory::Audio),
            ("application/pdf", IconCategory::Pdf),
            ("application/msword", IconCategory::Document),
            (
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                IconCategory::Document,
            ),
            (
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                IconCategory::Spreadsheet,
            ),
            ("application/vnd.ms-excel", IconCategory::Spreadsheet),
            ("", IconCategory::File),
            ("garbage", IconCategory::File),
            ("\u{1F600}/?", IconCategory::File),
        ];
        for (mime, expected) in cases {
            assert_eq!(IconCategory::from_mime(mime), expected, "{mime}");
        }
    }

    #[test]
    fn domain_strips_www_and_tolerates_garbage() {
        assert_eq!(domain_of("https://www.example.com/a"), "example.com");
        assert_eq!(domain_of("example.org"), "example.org");
        assert_eq!(domain_of("https://"), "https://");
        assert_eq!(domain_of("http://[::1"), "http://[::1");
    }

    #[test]
    fn card_shows_three_tags_and_size() {
        let card = render_card(&file(2048, "image/png"), false);
        assert_eq!(card.tags, vec!["1", "2", "3"]);
        assert_eq!(card.subtitle, "2.0 KB");
        assert_eq!(
            card.preview,
            Preview::Icon {
                category: IconCategory::Image
            }
        );
        assert!(card.fav);
    }

    #[test]
    fn row_detail_for_file_includes_mime() {
        let row = render_row(&file(1024, "text/plain"), true);
        assert_eq!(row.detail, "1.0 KB • text/plain");
        assert!(row.selected);
    }

    #[test]
    fn empty_feed_renders_empty_state() {
        let feed = render_feed(&[], &Selector::Pinned, ViewMode::List, None);
        assert_eq!(feed.entries, Entries::Empty);
        assert_eq!(feed.heading, "Pinned");
        assert_eq!(feed.count, 0);
    }

    #[test]
    fn inspector_offers_download_for_files_only() {
        let insp = render_inspector(&file(10, "application/pdf"));
        assert!(insp.downloadable);
        assert_eq!(
            insp.locator,
            Locator::File {
                file_name: "a.bin".into(),
                size: "0.0 KB".into()
            }
        );
        assert_eq!(insp.tags.len(), 4);
    }
}
