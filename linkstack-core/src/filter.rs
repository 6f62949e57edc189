//! Visible-set derivation: selector + search query, plus sidebar facets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::item::{Item, ToggleField};

/// The active filter criterion: one of the smart filters or a folder name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Selector {
    #[default]
    All,
    Favourites,
    LinkLater,
    Pinned,
    Folder(String),
}

impl Selector {
    pub const SMART: [Selector; 4] = [
        Selector::All,
        Selector::Favourites,
        Selector::LinkLater,
        Selector::Pinned,
    ];

    /// Interprets a sidebar label; anything that is not a smart filter name
    /// is taken as a folder.
    pub fn from_label(label: &str) -> Self {
        match label {
            "All Items" => Selector::All,
            "Favourites" => Selector::Favourites,
            "Link Later" => Selector::LinkLater,
            "Pinned" => Selector::Pinned,
            folder => Selector::Folder(folder.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Selector::All => "All Items",
            Selector::Favourites => "Favourites",
            Selector::LinkLater => "Link Later",
            Selector::Pinned => "Pinned",
            Selector::Folder(name) => name,
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Selector::All => true,
            Selector::Favourites => item.flag(ToggleField::Fav),
            Selector::LinkLater => item.flag(ToggleField::Later),
            Selector::Pinned => item.flag(ToggleField::Pinned),
            Selector::Folder(name) => item.folder_or_default() == name,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Selector {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let label = String::deserialize(d)?;
        Ok(Selector::from_label(&label))
    }
}

/// Case-insensitive substring test over `title + url`.
pub fn query_matches(item: &Item, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let hay = format!("{}{}", item.title, item.url()).to_lowercase();
    hay.contains(&query.to_lowercase())
}

/// Items passing both the selector and the query, in collection order.
pub fn filter_items<'a>(items: &'a [Item], selector: &Selector, query: &str) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|i| selector.matches(i) && query_matches(i, query))
        .collect()
}

/// Distinct folder names, sorted. Blank folders count as the default folder.
pub fn folders(items: &[Item]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.folder_or_default().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct tags across all items, sorted.
pub fn tags(items: &[Item]) -> Vec<String> {
    items
        .iter()
        .flat_map(|i| i.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartCount {
    pub selector: Selector,
    pub count: usize,
}

/// Per smart filter item counts for the sidebar. Independent of the query.
pub fn smart_counts(items: &[Item]) -> Vec<SmartCount> {
    Selector::SMART
        .into_iter()
        .map(|selector| SmartCount {
            count: items.iter().filter(|i| selector.matches(i)).count(),
            selector,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use chrono::Utc;

    fn item(id: &str, title: &str, url: Option<&str>, folder: &str) -> Item {
        let kind = match url {
            Some(u) => ItemKind::Link {
                url: u.into(),
                preview: String::new(),
            },
            None => ItemKind::File {
                file_name: format!("{title}.bin"),
                file_type: String::new(),
                file_data: String::new(),
                file_size: 0,
            },
        };
        Item {
            id: id.into(),
            kind,
            title: title.into(),
            folder: folder.into(),
            tags: Vec::new(),
            fav: false,
            pinned: false,
            later: false,
            note: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn labels_round_trip() {
        for s in Selector::SMART {
            assert_eq!(Selector::from_label(s.label()), s);
        }
        assert_eq!(Selector::from_label("Work"), Selector::Folder("Work".into()));
    }

    #[test]
    fn query_matches_url_and_title_case_insensitively() {
        let a = item("1", "Rust Book", Some("https://doc.rust-lang.org"), "General");
        assert!(query_matches(&a, "rust"));
        assert!(query_matches(&a, "DOC.RUST"));
        assert!(!query_matches(&a, "python"));
    }

    #[test]
    fn file_items_search_on_title_only() {
        let f = item("1", "Report", None, "General");
        assert!(query_matches(&f, "report"));
        assert!(!query_matches(&f, "undefined"));
    }

    #[test]
    fn folder_selector_is_exact() {
        let items = vec![
            item("1", "a", Some("https://a"), "Work"),
            item("2", "b", Some("https://b"), "Workshop"),
        ];
        let out = filter_items(&items, &Selector::Folder("Work".into()), "");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");
    }

    #[test]
    fn facets_are_sorted_and_deduplicated() {
        let mut a = item("1", "a", Some("https://a"), "Work");
        a.tags = vec!["z".into(), "a".into()];
        let mut b = item("2", "b", Some("https://b"), "");
        b.tags = vec!["a".into(), "m".into(), "a".into()];
        let items = vec![a, b];
        assert_eq!(folders(&items), vec!["General", "Work"]);
        assert_eq!(tags(&items), vec!["a", "m", "z"]);
    }

    #[test]
    fn smart_counts_ignore_folder() {
        let mut a = item("1", "a", Some("https://a"), "Work");
        a.fav = true;
        a.later = true;
        let b = item("2", "b", Some("https://b"), "Home");
        let counts = smart_counts(&[a, b]);
        let get = |s: Selector| counts.iter().find(|c| c.selector == s).unwrap().count;
        assert_eq!(get(Selector::All), 2);
        assert_eq!(get(Selector::Favourites), 1);
        assert_eq!(get(Selector::LinkLater), 1);
        assert_eq!(get(Selector::Pinned), 0);
    }
}
