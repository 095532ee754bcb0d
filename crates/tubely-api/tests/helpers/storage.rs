use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Tempdir standing in for the local storage root.
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub base_path: PathBuf,
    pub base_url: String,
}

impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let base_path = temp_dir.path().to_path_buf();
        let base_url = "http://localhost:8091/assets".to_string();
        Self {
            temp_dir,
            base_path,
            base_url,
        }
    }

    pub fn base_path_str(&self) -> String {
        self.base_path.to_string_lossy().to_string()
    }

    /// Storage key for a public URL handed out by this storage.
    pub fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.base_url)
            .map(|rest| rest.trim_start_matches('/'))
    }

    pub fn read(&self, key: &str) -> Vec<u8> {
        std::fs::read(self.base_path.join(key)).expect("Stored file missing")
    }

    /// All stored files as keys relative to the root.
    pub fn stored_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_files(&self.base_path, &self.base_path, &mut keys);
        keys.sort();
        keys
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    for entry in std::fs::read_dir(dir).expect("Failed to read storage dir") {
        let path = entry.expect("dir entry").path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}
