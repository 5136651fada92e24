use log::warn;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "outputs.json";

pub fn content_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheManifest {
    /// Output path (relative to the out dir) → hash of the bytes last written
    entries: BTreeMap<String, String>,
}

/// Remembers what was written to each output so unchanged pages are not
/// rewritten on the next build.
pub struct IncrementalCache {
    cache_dir: PathBuf,
    manifest: CacheManifest,
}

impl IncrementalCache {
    pub fn open(cache_dir: &Path) -> Self {
        let manifest_path = cache_dir.join(MANIFEST_FILE);
        let manifest = match fs::read_to_string(&manifest_path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(
                        "cache manifest {} is corrupt, starting fresh: {}",
                        manifest_path.display(),
                        e
                    );
                    // Invalidate corrupt cache file
                    fs::remove_file(&manifest_path).ok();
                    CacheManifest::default()
                }
            },
            Err(_) => CacheManifest::default(),
        };

        Self {
            cache_dir: cache_dir.to_path_buf(),
            manifest,
        }
    }

    /// True when `output` was last written with exactly `contents` and the
    /// file is still present under `out_dir`.
    pub fn is_fresh(&self, out_dir: &Path, output: &str, contents: &str) -> bool {
        match self.manifest.entries.get(output) {
            Some(hash) => *hash == content_hash(contents) && out_dir.join(output).exists(),
            None => false,
        }
    }

    pub fn record(&mut self, output: &str, contents: &str) {
        self.manifest
            .entries
            .insert(output.to_string(), content_hash(contents));
    }

    /// Drop entries for outputs the current build no longer produces.
    pub fn retain(&mut self, outputs: &[String]) {
        self.manifest
            .entries
            .retain(|path, _| outputs.iter().any(|o| o == path));
    }

    pub fn save(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        let data = serde_json::to_string_pretty(&self.manifest)?;
        fs::write(self.cache_dir.join(MANIFEST_FILE), data)
    }

    pub fn len(&self) -> usize {
        self.manifest.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_content_hash_is_stable_sha256() {
        assert_eq!(
            content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fresh_requires_same_hash_and_existing_file() {
        let out = tempdir().unwrap();
        let cache_dir = tempdir().unwrap();
        let mut cache = IncrementalCache::open(cache_dir.path());

        assert!(!cache.is_fresh(out.path(), "index.html", "<p>a</p>"));
        cache.record("index.html", "<p>a</p>");
        assert!(!cache.is_fresh(out.path(), "index.html", "<p>a</p>"), "file missing");

        fs::write(out.path().join("index.html"), "<p>a</p>").unwrap();
        assert!(cache.is_fresh(out.path(), "index.html", "<p>a</p>"));
        assert!(!cache.is_fresh(out.path(), "index.html", "<p>b</p>"));
    }

    #[test]
    fn test_save_and_reopen() {
        let cache_dir = tempdir().unwrap();
        let mut cache = IncrementalCache::open(cache_dir.path());
        cache.record("a/index.html", "x");
        cache.record("b/index.html", "y");
        cache.retain(&["a/index.html".to_string()]);
        cache.save().unwrap();

        let reopened = IncrementalCache::open(cache_dir.path());
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_corrupt_manifest_is_discarded() {
        let cache_dir = tempdir().unwrap();
        let manifest = cache_dir.path().join(MANIFEST_FILE);
        fs::write(&manifest, "{ broken").unwrap();

        let cache = IncrementalCache::open(cache_dir.path());
        assert!(cache.is_empty());
        assert!(!manifest.exists());
    }
}
