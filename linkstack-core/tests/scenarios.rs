use std::sync::Arc;

use linkstack_core::{
    App, Entries, Error, FileSource, Inspection, MemStore, NewFile, NewLink, Outcome, Selector,
    Store, ToggleField, UiEvent, ViewMode,
};

fn new_app() -> (App, Arc<MemStore>) {
    let store = Arc::new(MemStore::new());
    (App::new(Box::new(store.clone())), store)
}

fn add_link(app: &mut App, title: &str, url: &str, folder: &str) -> String {
    match app
        .dispatch(UiEvent::CreateLinkSubmitted(NewLink {
            title: title.into(),
            url: url.into(),
            folder: Some(folder.into()),
            tags: vec![],
        }))
        .unwrap()
    {
        Outcome::Created(id) => id,
        other => panic!("expected Created, got {other:?}"),
    }
}

#[test]
fn bare_domain_gets_https_scheme() {
    let (mut app, _) = new_app();
    let id = add_link(&mut app, "Example", "example.com", "");
    assert_eq!(app.library().get(&id).unwrap().url(), "https://example.com");
}

#[test]
fn favourites_tab_shows_only_the_favourite() {
    let (mut app, _) = new_app();
    let a = add_link(&mut app, "A", "a.com", "General");
    let _b = add_link(&mut app, "B", "b.com", "General");
    app.dispatch(UiEvent::FieldToggled {
        id: a.clone(),
        field: ToggleField::Fav,
        value: true,
    })
    .unwrap();
    app.dispatch(UiEvent::TabSelected(Selector::Favourites))
        .unwrap();
    let ids: Vec<_> = app.visible().iter().map(|i| i.id.clone()).collect();
    assert_eq!(ids, vec![a]);
}

#[test]
fn committed_note_survives_reload() {
    let (mut app, store) = new_app();
    let id = add_link(&mut app, "A", "a.com", "General");
    app.dispatch(UiEvent::NoteBlurred {
        id: id.clone(),
        text: "final text".into(),
    })
    .unwrap();
    let reloaded = App::new(Box::new(store));
    assert_eq!(reloaded.library().get(&id).unwrap().note, "final text");
}

#[test]
fn two_kilobyte_file_shows_size_label() {
    let (mut app, _) = new_app();
    let out = app
        .dispatch(UiEvent::CreateFileSubmitted {
            input: NewFile {
                file_name: "blob.bin".into(),
                file_type: "application/octet-stream".into(),
                ..Default::default()
            },
            source: FileSource::Bytes(vec![0u8; 2048]),
        })
        .unwrap();
    let Outcome::Created(id) = out else {
        panic!("expected Created");
    };
    let item = app.library().get(&id).unwrap();
    assert_eq!(item.title, "blob.bin");
    let Entries::Grid(cards) = app.feed().entries else {
        panic!("grid expected");
    };
    assert_eq!(cards[0].subtitle, "2.0 KB");
}

#[test]
fn deleting_inspected_item_returns_to_idle() {
    let (mut app, _) = new_app();
    let a = add_link(&mut app, "A", "a.com", "Work");
    let _b = add_link(&mut app, "B", "b.com", "Work");
    app.dispatch(UiEvent::ItemSelected(a.clone())).unwrap();
    assert_eq!(app.view().inspection, Inspection::Inspecting(a.clone()));
    assert!(app.inspector().is_some());

    app.dispatch(UiEvent::DeleteRequested(a.clone())).unwrap();
    let out = app.dispatch(UiEvent::DeleteConfirmed(a.clone())).unwrap();
    assert_eq!(out, Outcome::Deleted(Some(a.clone())));
    assert_eq!(app.view().inspection, Inspection::Idle);
    assert!(app.view().pending_delete.is_none());
    assert!(app.inspector().is_none());

    for selector in [
        Selector::All,
        Selector::Folder("Work".into()),
        Selector::Favourites,
    ] {
        app.dispatch(UiEvent::TabSelected(selector)).unwrap();
        assert!(app.visible().iter().all(|i| i.id != a));
    }

    let again = app.dispatch(UiEvent::DeleteConfirmed(a)).unwrap();
    assert_eq!(again, Outcome::Deleted(None));
    assert_eq!(app.library().len(), 1);
}

#[test]
fn unreadable_file_inserts_nothing() {
    let (mut app, store) = new_app();
    let err = app
        .dispatch(UiEvent::CreateFileSubmitted {
            input: NewFile {
                file_name: "missing.pdf".into(),
                ..Default::default()
            },
            source: FileSource::Path("/definitely/not/here/missing.pdf".into()),
        })
        .unwrap_err();
    assert!(matches!(err, Error::FileEncoding { .. }));
    assert!(app.library().is_empty());
    assert!(store.read_slot().unwrap().is_none());
}

#[test]
fn quota_failure_is_reported_and_rolled_back() {
    let store = Arc::new(MemStore::with_quota(900));
    let mut app = App::new(Box::new(store.clone()));
    let id = add_link(&mut app, "A", "a.com", "General");

    let err = app
        .dispatch(UiEvent::NoteBlurred {
            id: id.clone(),
            text: "x".repeat(2000),
        })
        .unwrap_err();
    assert!(matches!(err, Error::QuotaExceeded { .. }));
    assert_eq!(app.library().get(&id).unwrap().note, "");
    assert_eq!(store.load().as_slice(), app.library().items());

    let err = app
        .dispatch(UiEvent::CreateFileSubmitted {
            input: NewFile {
                file_name: "big.bin".into(),
                ..Default::default()
            },
            source: FileSource::Bytes(vec![7u8; 4096]),
        })
        .unwrap_err();
    assert!(matches!(err, Error::QuotaExceeded { .. }));
    assert_eq!(app.library().len(), 1);
}

#[test]
fn view_mode_switches_layout_without_touching_items() {
    let (mut app, _) = new_app();
    add_link(&mut app, "A", "www.a.com/path", "General");
    assert!(matches!(app.feed().entries, Entries::Grid(_)));
    app.dispatch(UiEvent::ViewModeSelected(ViewMode::List))
        .unwrap();
    let Entries::List(rows) = app.feed().entries else {
        panic!("list expected");
    };
    assert_eq!(rows[0].detail, "https://www.a.com/path");
    app.dispatch(UiEvent::ViewModeSelected(ViewMode::Grid))
        .unwrap();
    let Entries::Grid(cards) = app.feed().entries else {
        panic!("grid expected");
    };
    assert_eq!(cards[0].subtitle, "a.com");
}
