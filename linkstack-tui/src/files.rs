use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use linkstack_core::Download;

/// MIME type from the file extension, `application/octet-stream` when unknown.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Write `dl` into `dir` under its stored name. Directory parts of the stored
/// name are dropped so the file always lands inside `dir`.
pub fn save_download(dir: &Path, dl: &Download) -> Result<PathBuf> {
    let name = Path::new(&dl.file_name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "download".into());
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(name);
    std::fs::write(&path, &dl.bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
