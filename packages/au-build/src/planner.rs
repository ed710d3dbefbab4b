//! Build planner (spec §4.8): mtime-driven staleness, transitive rebuild
//! propagation along the export graph, and the final-link decision.
//!
//! Grounded on `auc.cpp`'s `set_rebuild_recursive`: marking a file dirty
//! walks its `exports_to` edges and marks every transitive consumer dirty
//! too, so a header-level change invalidates everyone who saw it.

use std::path::Path;

use au_translate::source_file::SourceFile;

use crate::fs_classify::should_rebuild;

/// Marks `files[start]` (and everyone reachable via `exports_to`) for
/// rebuild. Idempotent: already-marked files stop the walk early.
fn mark_rebuild_recursive(files: &mut [SourceFile], start: usize) {
    if files[start].rebuild {
        return;
    }
    files[start].rebuild = true;
    let targets = files[start].exports_to.clone();
    for target in targets {
        mark_rebuild_recursive(files, target);
    }
}

/// For each file, probes object-file staleness via `object_path`, marks it
/// (and its transitive consumers) for rebuild when stale, and returns
/// whether any file in the set needs rebuilding — the final-link decision.
pub fn plan(files: &mut [SourceFile], object_path: impl Fn(&SourceFile) -> std::path::PathBuf) -> bool {
    let stale: Vec<usize> = files
        .iter()
        .enumerate()
        .filter(|(_, f)| should_rebuild(&f.path, &object_path(f)))
        .map(|(i, _)| i)
        .collect();

    for i in stale {
        mark_rebuild_recursive(files, i);
    }

    files.iter().any(|f| f.rebuild)
}

/// Object-file path convention: same stem as the source, `.o` extension,
/// placed alongside it unless `out_dir` is given.
pub fn default_object_path(source: &Path, out_dir: Option<&Path>) -> std::path::PathBuf {
    let stem = source.file_stem().unwrap_or_default();
    let mut object = out_dir.map(Path::to_path_buf).unwrap_or_else(|| {
        source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });
    object.push(stem);
    object.set_extension("o");
    object
}
