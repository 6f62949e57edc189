//! linkstack-core: item model, persistent store, lifecycle, filtering and
//! display projection for the LinkStack link and file organizer.

pub mod app;
pub mod error;
pub mod filter;
pub mod item;
pub mod library;
pub mod payload;
pub mod render;
pub mod store;

pub use app::{App, Download, FileSource, Inspection, Outcome, Projection, UiEvent, ViewState};
pub use error::{Error, Result};
pub use filter::{filter_items, Selector, SmartCount};
pub use item::{parse_tags, Item, ItemId, ItemKind, ToggleField, DEFAULT_FOLDER};
pub use library::{normalize_url, Library, NewFile, NewLink};
pub use render::{
    Card, Entries, Feed, IconCategory, Inspector, Locator, Preview, Row, Sidebar, ViewMode,
};
pub use store::{JsonFileStore, MemStore, SqliteStore, Store, STORAGE_KEY};
