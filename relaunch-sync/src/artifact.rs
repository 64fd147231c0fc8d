//! Local artifact tree produced by the build step.
//!
//! Each regular file under the artifact root becomes an [`ArtifactEntry`] keyed
//! by its `/`-separated relative path. Content is identified by its SHA-256
//! hex digest, the same digest that is stored as object metadata on upload.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::{io_err, SyncError};

/// Cache policy for HTML entry documents: always revalidate.
pub const HTML_CACHE_CONTROL: &str = "no-cache";

/// Cache policy for content-hash-addressed assets.
pub const ASSET_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// One file of the build output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactEntry {
    /// Object key, e.g. `assets/app.a1b2.js`.
    pub key: String,
    /// Absolute path of the file on disk.
    pub source: PathBuf,
    pub size: u64,
    /// SHA-256 hex digest of the file content.
    pub digest: String,
}

impl ArtifactEntry {
    fn extension(&self) -> String {
        Path::new(&self.key)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }

    pub fn is_html(&self) -> bool {
        matches!(self.extension().as_str(), "html" | "htm")
    }

    /// MIME type derived from the file extension.
    pub fn content_type(&self) -> &'static str {
        match self.extension().as_str() {
            "html" | "htm" => "text/html; charset=utf-8",
            "js" | "mjs" => "text/javascript; charset=utf-8",
            "css" => "text/css; charset=utf-8",
            "json" | "map" => "application/json",
            "webmanifest" => "application/manifest+json",
            "txt" => "text/plain; charset=utf-8",
            "xml" => "application/xml",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "avif" => "image/avif",
            "ico" => "image/x-icon",
            "woff" => "font/woff",
            "woff2" => "font/woff2",
            "ttf" => "font/ttf",
            "otf" => "font/otf",
            "wasm" => "application/wasm",
            "pdf" => "application/pdf",
            _ => "application/octet-stream",
        }
    }

    /// HTML documents must be revalidated; everything else is content-hash
    /// addressed and may be cached forever.
    pub fn cache_control(&self) -> &'static str {
        if self.is_html() {
            HTML_CACHE_CONTROL
        } else {
            ASSET_CACHE_CONTROL
        }
    }

    /// Read the full content from disk.
    pub fn read(&self) -> Result<Vec<u8>, SyncError> {
        std::fs::read(&self.source).map_err(|e| io_err(&self.source, e))
    }
}

/// The set of files a build produced, sorted by key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ArtifactTree {
    pub root: PathBuf,
    entries: BTreeMap<String, ArtifactEntry>,
}

impl ArtifactTree {
    /// Walk `root` and hash every regular file beneath it.
    ///
    /// Symlinked directories are not followed.
    pub fn scan(root: &Path) -> Result<Self, SyncError> {
        let mut entries = BTreeMap::new();
        for item in WalkDir::new(root).follow_links(false) {
            let item = item?;
            if !item.file_type().is_file() {
                continue;
            }
            let path = item.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let content = std::fs::read(path).map_err(|e| io_err(path, e))?;
            let digest = digest_bytes(&content);
            entries.insert(
                key.clone(),
                ArtifactEntry {
                    key,
                    source: path.to_path_buf(),
                    size: content.len() as u64,
                    digest,
                },
            );
        }
        tracing::debug!("scanned {} artifact(s) under {}", entries.len(), root.display());
        Ok(Self {
            root: root.to_path_buf(),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ArtifactEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtifactEntry> {
        self.entries.values()
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|e| e.size).sum()
    }
}

/// SHA-256 hex digest of `content`.
pub fn digest_bytes(content: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(content);
    hex::encode(h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entry(key: &str) -> ArtifactEntry {
        ArtifactEntry {
            key: key.to_string(),
            source: PathBuf::from("/dist").join(key),
            size: 0,
            digest: String::new(),
        }
    }

    #[test]
    fn scan_collects_nested_files_with_slash_keys() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("assets/img")).unwrap();
        fs::write(tmp.path().join("index.html"), "<html></html>").unwrap();
        fs::write(tmp.path().join("assets/app.a1b2.js"), "console.log(1)").unwrap();
        fs::write(tmp.path().join("assets/img/logo.svg"), "<svg/>").unwrap();

        let tree = ArtifactTree::scan(tmp.path()).unwrap();
        let keys: Vec<_> = tree.keys().collect();
        assert_eq!(keys, vec!["assets/app.a1b2.js", "assets/img/logo.svg", "index.html"]);
        assert_eq!(tree.get("index.html").unwrap().size, 13);
    }

    #[test]
    fn scan_skips_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("empty/dir")).unwrap();
        let tree = ArtifactTree::scan(tmp.path()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn identical_content_has_identical_digest() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "same").unwrap();
        fs::write(tmp.path().join("b.txt"), "same").unwrap();
        fs::write(tmp.path().join("c.txt"), "different").unwrap();
        let tree = ArtifactTree::scan(tmp.path()).unwrap();
        assert_eq!(tree.get("a.txt").unwrap().digest, tree.get("b.txt").unwrap().digest);
        assert_ne!(tree.get("a.txt").unwrap().digest, tree.get("c.txt").unwrap().digest);
        assert_eq!(tree.get("a.txt").unwrap().digest, digest_bytes(b"same"));
    }

    #[test]
    fn scan_of_missing_root_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(ArtifactTree::scan(&tmp.path().join("absent")).is_err());
    }

    #[test]
    fn html_is_revalidated_and_assets_are_immutable() {
        assert_eq!(entry("index.html").cache_control(), HTML_CACHE_CONTROL);
        assert_eq!(entry("nested/page.HTM").cache_control(), HTML_CACHE_CONTROL);
        assert_eq!(entry("app.a1b2.js").cache_control(), ASSET_CACHE_CONTROL);
    }

    #[test]
    fn content_type_falls_back_to_octet_stream() {
        assert_eq!(entry("index.html").content_type(), "text/html; charset=utf-8");
        assert_eq!(entry("app.js").content_type(), "text/javascript; charset=utf-8");
        assert_eq!(entry("font.woff2").content_type(), "font/woff2");
        assert_eq!(entry("LICENSE").content_type(), "application/octet-stream");
    }
}
