mod common;
use common::TestEnv;

fn list_ids(t: &TestEnv, args: &[&str]) -> Vec<String> {
    let mut full = vec!["list", "--json"];
    full.extend_from_slice(args);
    let v: serde_json::Value = serde_json::from_str(&t.run(&full)).unwrap();
    match v["entries"]["entries"].as_array() {
        Some(cards) => cards
            .iter()
            .map(|c| c["id"].as_str().unwrap().to_string())
            .collect(),
        None => Vec::new(),
    }
}

#[test]
fn favourite_tab_tracks_flag() {
    let t = TestEnv::new();
    let a = t.add(&["a.example", "--title", "Alpha"]);
    let b = t.add(&["b.example", "--title", "Beta"]);
    t.run(&["set", &a, "fav", "on"]);
    assert_eq!(list_ids(&t, &["--tab", "Favourites"]), vec![a.clone()]);
    assert_eq!(list_ids(&t, &[]), vec![a.clone(), b.clone()]);
    t.run(&["set", &a, "fav", "off"]);
    assert!(list_ids(&t, &["--tab", "Favourites"]).is_empty());
    t.run(&["set", &b, "later", "on"]);
    assert_eq!(list_ids(&t, &["--tab", "Link Later"]), vec![b]);
}

#[test]
fn search_and_folder_tab_combine() {
    let t = TestEnv::new();
    let rust = t.add(&["rust-lang.org", "--title", "Rust", "--folder", "Dev"]);
    t.add(&["go.dev", "--title", "Go", "--folder", "Dev"]);
    t.add(&["rust.example", "--title", "Rusty pans", "--folder", "Home"]);
    assert_eq!(
        list_ids(&t, &["--tab", "Dev", "--search", "RUST"]),
        vec![rust]
    );
    assert_eq!(t.run(&["folders"]), "Dev\nHome\n");
}

#[test]
fn note_persists_and_shows() {
    let t = TestEnv::new();
    let id = t.add(&["example.com", "--tags", "read, later"]);
    t.run(&["note", &id, "final text"]);
    let v: serde_json::Value =
        serde_json::from_str(&t.run(&["show", &id, "--json"])).unwrap();
    assert_eq!(v["note"], "final text");
    assert_eq!(v["folder"], "General");
    assert_eq!(v["tags"], serde_json::json!(["read", "later"]));
    assert_eq!(t.run(&["tags"]), "later\nread\n");
}

#[test]
fn delete_removes_from_every_tab() {
    let t = TestEnv::new();
    let a = t.add(&["a.example", "--folder", "Work"]);
    t.run(&["set", &a, "pinned", "on"]);
    t.run(&["delete", &a]);
    assert!(list_ids(&t, &[]).is_empty());
    assert!(list_ids(&t, &["--tab", "Pinned"]).is_empty());
    assert!(list_ids(&t, &["--tab", "Work"]).is_empty());
}
