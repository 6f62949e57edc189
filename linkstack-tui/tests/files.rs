mod common;
use common::TestEnv;
use predicates::prelude::*;

#[test]
fn add_file_shows_size_and_downloads_back() {
    let t = TestEnv::new();
    let bytes: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
    let path = t.write_file("report.pdf", &bytes);
    let id = t
        .run(&["add-file", path.to_str().unwrap()])
        .trim()
        .trim_start_matches("added ")
        .to_string();

    t.bin()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("report.pdf\t2.0 KB"));

    let v: serde_json::Value =
        serde_json::from_str(&t.run(&["show", &id, "--json"])).unwrap();
    assert_eq!(v["preview"]["category"], "pdf");
    assert_eq!(v["downloadable"], true);

    let out_dir = t.root.join("out");
    let written = t.run(&["download", &id, "--out", out_dir.to_str().unwrap()]);
    assert_eq!(written.trim(), out_dir.join("report.pdf").display().to_string());
    assert_eq!(std::fs::read(out_dir.join("report.pdf")).unwrap(), bytes);
}

#[test]
fn missing_file_inserts_nothing() {
    let t = TestEnv::new();
    t.bin()
        .args(["add-file", "/no/such/file.txt"])
        .assert()
        .failure();
    t.bin()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn links_cannot_be_downloaded() {
    let t = TestEnv::new();
    let id = t.add(&["example.com"]);
    t.bin()
        .args(["download", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only files can be downloaded"));
}
