//! Item lifecycle: create, update and delete against the store.
//!
//! Every mutation is flushed with [`Store::save`] before it returns. When the
//! flush fails the in-memory change is undone, so the collection held here
//! never drifts from what is on disk without the caller seeing an error.

use std::io::Read;

use chrono::{DateTime, SubsecRound, Utc};

use crate::error::Result;
use crate::item::{Item, ItemId, ItemKind, ToggleField, DEFAULT_FOLDER};
use crate::payload;
use crate::store::Store;

const PREVIEW_ENDPOINT: &str = "https://api.microlink.io/";

#[derive(Debug, Clone, Default)]
pub struct NewLink {
    pub title: String,
    pub url: String,
    pub folder: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewFile {
    /// Defaults to `file_name` when blank.
    pub title: Option<String>,
    pub folder: Option<String>,
    pub tags: Vec<String>,
    pub file_name: String,
    pub file_type: String,
    /// Size reported by the host; the encoded byte count is used when absent.
    pub file_size: Option<u64>,
}

pub struct Library {
    store: Box<dyn Store>,
    items: Vec<Item>,
    last_id: u64,
    load_error: Option<String>,
}

impl Library {
    /// Unreadable or corrupt stored data opens as an empty library; the
    /// reason is kept in [`Library::load_error`].
    pub fn open(store: Box<dyn Store>) -> Self {
        let (items, load_error) = match store.try_load() {
            Ok(items) => (items, None),
            Err(e) => {
                tracing::warn!(error = %e, "stored items unreadable, starting empty");
                (Vec::new(), Some(e.to_string()))
            }
        };
        let last_id = items
            .iter()
            .filter_map(|i| i.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            store,
            items,
            last_id,
            load_error,
        }
    }

    /// Why the stored collection could not be read at open, if it could not.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn create_link(&mut self, input: NewLink) -> Result<&Item> {
        let url = normalize_url(&input.url);
        let item = Item {
            id: self.next_id(),
            kind: ItemKind::Link {
                preview: preview_url(&url),
                url,
            },
            title: input.title,
            folder: folder_or_default(input.folder),
            tags: input.tags,
            fav: false,
            pinned: false,
            later: false,
            note: String::new(),
            created_at: now(),
        };
        self.append(item)
    }

    /// Encodes the file before anything is inserted; a read failure leaves
    /// the collection untouched.
    pub fn create_file<R: Read>(&mut self, input: NewFile, reader: R) -> Result<&Item> {
        let (file_data, encoded_len) =
            payload::encode_reader(reader, &input.file_name, &input.file_type)?;
        let title = match input.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => input.file_name.clone(),
        };
        let item = Item {
            id: self.next_id(),
            kind: ItemKind::File {
                file_name: input.file_name,
                file_type: input.file_type,
                file_data,
                file_size: input.file_size.unwrap_or(encoded_len),
            },
            title,
            folder: folder_or_default(input.folder),
            tags: input.tags,
            fav: false,
            pinned: false,
            later: false,
            note: String::new(),
            created_at: now(),
        };
        self.append(item)
    }

    pub fn update_note(&mut self, id: &str, text: &str) -> Result<()> {
        let Some(idx) = self.position(id) else {
            return Ok(());
        };
        let previous = std::mem::replace(&mut self.items[idx].note, text.to_string());
        self.persist_or_undo(|items| items[idx].note = previous)
    }

    pub fn toggle_field(&mut self, id: &str, field: ToggleField, value: bool) -> Result<()> {
        let Some(idx) = self.position(id) else {
            return Ok(());
        };
        let previous = self.items[idx].flag(field);
        self.items[idx].set_flag(field, value);
        self.persist_or_undo(|items| items[idx].set_flag(field, previous))
    }

    /// Returns whether an item was removed.
    pub fn delete_item(&mut self, id: &str) -> Result<bool> {
        let Some(idx) = self.position(id) else {
            return Ok(false);
        };
        let removed = self.items.remove(idx);
        tracing::info!(id = %removed.id, "deleting item");
        self.persist_or_undo(|items| items.insert(idx, removed))?;
        Ok(true)
    }

    fn append(&mut self, item: Item) -> Result<&Item> {
        tracing::info!(id = %item.id, kind = item.kind.type_name(), "creating item");
        self.items.push(item);
        self.persist_or_undo(|items| {
            items.pop();
        })?;
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    fn persist_or_undo(&mut self, undo: impl FnOnce(&mut Vec<Item>)) -> Result<()> {
        if let Err(e) = self.store.save(&self.items) {
            tracing::warn!(error = %e, "save failed, rolling back");
            undo(&mut self.items);
            return Err(e);
        }
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Epoch milliseconds, bumped past the last issued id so ids stay unique
    /// even when two items are created within the same millisecond.
    fn next_id(&mut self) -> ItemId {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut candidate = now.max(self.last_id.saturating_add(1));
        while self.items.iter().any(|i| i.id == candidate.to_string()) {
            candidate = candidate.wrapping_add(1);
        }
        self.last_id = candidate;
        candidate.to_string()
    }
}

/// Prefix `https://` when the input carries no scheme.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn has_scheme(s: &str) -> bool {
    match s.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Screenshot-service URL for a link. Never fetched here.
pub fn preview_url(url: &str) -> String {
    format!(
        "{PREVIEW_ENDPOINT}?url={}&screenshot=true&embed=screenshot.url",
        urlencoding::encode(url)
    )
}

/// Millisecond precision, so the in-memory value equals what a reload yields.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn folder_or_default(folder: Option<String>) -> String {
    match folder {
        Some(f) if !f.trim().is_empty() => f.trim().to_string(),
        _ => DEFAULT_FOLDER.to_string(),
    }
}
