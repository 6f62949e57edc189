//! Application controller: owns the library and the ephemeral view state,
//! and maps UI events onto lifecycle calls.

use std::fs::File;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::filter::{self, Selector};
use crate::item::{Item, ItemId, ItemKind, ToggleField};
use crate::library::{Library, NewFile, NewLink};
use crate::payload;
use crate::render::{self, Feed, Inspector, Sidebar, ViewMode};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Inspection {
    #[default]
    Idle,
    Inspecting(ItemId),
}

/// Never persisted; a fresh `App` always starts from the defaults.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub selector: Selector,
    pub mode: ViewMode,
    pub query: String,
    pub inspection: Inspection,
    pub pending_delete: Option<ItemId>,
}

impl ViewState {
    pub fn selected(&self) -> Option<&str> {
        match &self.inspection {
            Inspection::Idle => None,
            Inspection::Inspecting(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    SearchChanged(String),
    TabSelected(Selector),
    ViewModeSelected(ViewMode),
    ItemSelected(ItemId),
    ItemDeselected,
    NoteBlurred {
        id: ItemId,
        text: String,
    },
    FieldToggled {
        id: ItemId,
        field: ToggleField,
        value: bool,
    },
    CreateLinkSubmitted(NewLink),
    CreateFileSubmitted {
        input: NewFile,
        source: FileSource,
    },
    DeleteRequested(ItemId),
    DeleteCancelled,
    DeleteConfirmed(ItemId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ViewChanged,
    Created(ItemId),
    Updated,
    /// `None` when the id was already gone.
    Deleted(Option<ItemId>),
}

#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub sidebar: Sidebar,
    pub feed: Feed,
    pub inspector: Option<Inspector>,
}

/// A stored file handed back to the host for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct App {
    library: Library,
    view: ViewState,
}

impl App {
    pub fn new(store: Box<dyn Store>) -> Self {
        Self::with_view(store, ViewState::default())
    }

    pub fn with_view(store: Box<dyn Store>, view: ViewState) -> Self {
        Self {
            library: Library::open(store),
            view,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn dispatch(&mut self, event: UiEvent) -> Result<Outcome> {
        match event {
            UiEvent::SearchChanged(query) => {
                self.view.query = query;
                Ok(Outcome::ViewChanged)
            }
            UiEvent::TabSelected(selector) => {
                self.view.selector = selector;
                Ok(Outcome::ViewChanged)
            }
            UiEvent::ViewModeSelected(mode) => {
                self.view.mode = mode;
                Ok(Outcome::ViewChanged)
            }
            UiEvent::ItemSelected(id) => {
                self.view.inspection = if self.library.get(&id).is_some() {
                    Inspection::Inspecting(id)
                } else {
                    Inspection::Idle
                };
                Ok(Outcome::ViewChanged)
            }
            UiEvent::ItemDeselected => {
                self.view.inspection = Inspection::Idle;
                Ok(Outcome::ViewChanged)
            }
            UiEvent::NoteBlurred { id, text } => {
                self.library.update_note(&id, &text)?;
                Ok(Outcome::Updated)
            }
            UiEvent::FieldToggled { id, field, value } => {
                self.library.toggle_field(&id, field, value)?;
                Ok(Outcome::Updated)
            }
            UiEvent::CreateLinkSubmitted(input) => {
                let id = self.library.create_link(input)?.id.clone();
                Ok(Outcome::Created(id))
            }
            UiEvent::CreateFileSubmitted { input, source } => {
                let id = match source {
                    FileSource::Bytes(bytes) => {
                        self.library.create_file(input, bytes.as_slice())?.id.clone()
                    }
                    FileSource::Path(path) => {
                        let file = File::open(&path).map_err(|source| Error::FileEncoding {
                            name: path.display().to_string(),
                            source,
                        })?;
                        self.library.create_file(input, file)?.id.clone()
                    }
                };
                Ok(Outcome::Created(id))
            }
            UiEvent::DeleteRequested(id) => {
                self.view.pending_delete = Some(id);
                Ok(Outcome::ViewChanged)
            }
            UiEvent::DeleteCancelled => {
                self.view.pending_delete = None;
                Ok(Outcome::ViewChanged)
            }
            UiEvent::DeleteConfirmed(id) => self.delete(id),
        }
    }

    fn delete(&mut self, id: ItemId) -> Result<Outcome> {
        let removed = self.library.delete_item(&id)?;
        if self.view.selected() == Some(id.as_str()) {
            self.view.inspection = Inspection::Idle;
        }
        if self.view.pending_delete.as_deref() == Some(id.as_str()) {
            self.view.pending_delete = None;
        }
        Ok(Outcome::Deleted(removed.then_some(id)))
    }

    pub fn visible(&self) -> Vec<&Item> {
        filter::filter_items(self.library.items(), &self.view.selector, &self.view.query)
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.view.selected().and_then(|id| self.library.get(id))
    }

    pub fn feed(&self) -> Feed {
        render::render_feed(
            &self.visible(),
            &self.view.selector,
            self.view.mode,
            self.view.selected(),
        )
    }

    pub fn sidebar(&self) -> Sidebar {
        render::render_sidebar(self.library.items(), &self.view.selector)
    }

    pub fn inspector(&self) -> Option<Inspector> {
        self.selected_item().map(render::render_inspector)
    }

    pub fn projection(&self) -> Projection {
        Projection {
            sidebar: self.sidebar(),
            feed: self.feed(),
            inspector: self.inspector(),
        }
    }

    /// Decoded payload for a file item; `None` for links and unknown ids.
    pub fn download(&self, id: &str) -> Result<Option<Download>> {
        let Some(item) = self.library.get(id) else {
            return Ok(None);
        };
        match &item.kind {
            ItemKind::File {
                file_name,
                file_data,
                ..
            } => Ok(Some(Download {
                file_name: file_name.clone(),
                bytes: payload::decode(file_data)?,
            })),
            ItemKind::Link { .. } => Ok(None),
        }
    }
}
