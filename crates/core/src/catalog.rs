//! The fixed, ordered list of certificates shown in the gallery.

use crate::config::GalleryConfig;
use serde::{Deserialize, Serialize};

/// One certificate in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateEntry {
    /// File name as listed in the config.
    pub file_name: String,
    /// Path the PDF is fetched from, relative to the page.
    pub path: String,
    /// 1-based position in the catalog.
    pub index: usize,
    /// Human-readable title derived from the file name.
    pub title: String,
}

impl CertificateEntry {
    /// Create an entry for `file_name` stored under `dir`.
    pub fn new(dir: &str, file_name: &str, index: usize) -> Self {
        Self {
            file_name: file_name.to_string(),
            path: resolve_path(dir, file_name),
            index,
            title: display_title(file_name),
        }
    }
}

/// Join a certificate directory and a file name.
pub fn resolve_path(dir: &str, file_name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", dir, file_name)
    }
}

/// Derive a display title: drop the first `.pdf`, put a space before every
/// ASCII capital, trim.
pub fn display_title(file_name: &str) -> String {
    let stem = file_name.replacen(".pdf", "", 1);
    let mut title = String::with_capacity(stem.len() + 8);
    for c in stem.chars() {
        if c.is_ascii_uppercase() {
            title.push(' ');
        }
        title.push(c);
    }
    title.trim().to_string()
}

/// Ordered certificate entries.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CertificateEntry>,
}

impl Catalog {
    /// Build the catalog from the configured file list.
    pub fn from_config(config: &GalleryConfig) -> Self {
        let entries = config
            .files
            .iter()
            .enumerate()
            .map(|(i, file)| CertificateEntry::new(&config.certificate_dir, file, i + 1))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CertificateEntry] {
        &self.entries
    }

    /// Look up an entry by its 1-based index.
    pub fn get(&self, index: usize) -> Option<&CertificateEntry> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
