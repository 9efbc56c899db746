use crate::manifest::ManifestReferences;
use log::info;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A candidate manifest found during the walk: its path relative to the
/// scan root, plus the not-yet-consumed reference scanner for it.
pub struct ManifestLocation {
    pub rel_path: PathBuf,
    pub references: ManifestReferences,
}

/// Walk `top_directory` in pre-order and yield every regular file as a
/// candidate manifest. There is no extension filter: a non-manifest file
/// simply yields no references. One progress line is logged per directory
/// visited. Unreadable directory entries are dropped; an unreadable file
/// fails later, when its reference sequence is consumed.
pub fn walk_manifests(top_directory: &Path) -> impl Iterator<Item = ManifestLocation> {
    let root = top_directory.to_path_buf();
    WalkDir::new(&root).into_iter().filter_map(move |entry| {
        let entry = entry.ok()?;
        if entry.file_type().is_dir() {
            info!("looking in {}", entry.path().display());
            return None;
        }
        if !entry.file_type().is_file() {
            return None;
        }
        let rel_path = entry.path().strip_prefix(&root).ok()?.to_path_buf();
        Some(ManifestLocation {
            rel_path,
            references: ManifestReferences::open(entry.path()),
        })
    })
}
