//! The static table of videos the service exposes, keyed by id.

use crate::domain::error::{Result, VideoError};
use regex::Regex;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mkv", "mov", "avi", "webm", "m4v"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCatalogEntry {
    pub id: String,
    pub path: PathBuf,
}

/// Built once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct VideoCatalog {
    entries: BTreeMap<String, PathBuf>,
}

impl VideoCatalog {
    pub fn new<I, S, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(id, path)| (id.into(), path.into()))
                .collect(),
        }
    }

    /// One entry per video file directly inside `dir`, id derived from the file stem.
    pub fn scan_dir(dir: &Path) -> io::Result<Self> {
        let mut entries = BTreeMap::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || !has_video_extension(&path) {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!(path = %path.display(), "skipping video with non UTF-8 name");
                continue;
            };

            let id = catalog_id(stem);
            if id.is_empty() {
                warn!(path = %path.display(), "skipping video with no usable id");
                continue;
            }
            if let Some(previous) = entries.insert(id.clone(), path.clone()) {
                warn!(id = %id, kept = %path.display(), dropped = %previous.display(), "duplicate video id");
            }
        }

        Ok(Self { entries })
    }

    /// Add or replace one entry.
    pub fn with_entry(mut self, id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.entries.insert(id.into(), path.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Path> {
        self.entries.get(id).map(PathBuf::as_path)
    }

    /// Path for `id`, failing with `NotFound` when the id is unknown or its
    /// file is gone.
    pub fn resolve(&self, id: &str) -> Result<&Path> {
        match self.get(id) {
            Some(path) if path.is_file() => Ok(path),
            _ => Err(VideoError::NotFound(id.to_string())),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = VideoCatalogEntry> + '_ {
        self.entries.iter().map(|(id, path)| VideoCatalogEntry {
            id: id.clone(),
            path: path.clone(),
        })
    }
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lowercase the stem and collapse everything outside `[a-z0-9_-]` into `-`.
pub fn catalog_id(stem: &str) -> String {
    static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars =
        UNSAFE_CHARS.get_or_init(|| Regex::new(r"[^a-z0-9_-]+").expect("valid id pattern"));

    unsafe_chars
        .replace_all(&stem.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}
