#![allow(dead_code)]
use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _dir: TempDir,
    pub db: PathBuf,
    pub cfg: PathBuf,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().to_path_buf();
        let cfg = root.join("config");
        std::fs::create_dir_all(&cfg).expect("cfg dir");
        let db = root.join("linkstack.db");
        Self {
            _dir: dir,
            db,
            cfg,
            root,
        }
    }

    /// Binary pinned to a sqlite file inside the temp dir.
    pub fn bin(&self) -> Command {
        let mut cmd = Command::cargo_bin("linkstack").unwrap();
        cmd.env("XDG_CONFIG_HOME", &self.cfg);
        cmd.env("XDG_STATE_HOME", self.root.join("state"));
        cmd.arg("--store").arg("sqlite").arg("--db").arg(&self.db);
        cmd
    }

    /// Runs `args` and returns stdout.
    pub fn run(&self, args: &[&str]) -> String {
        let out = self
            .bin()
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(out).unwrap()
    }

    /// Adds a link and returns its id.
    pub fn add(&self, args: &[&str]) -> String {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        self.run(&full)
            .trim()
            .trim_start_matches("added ")
            .to_string()
    }

    pub fn write_file(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
