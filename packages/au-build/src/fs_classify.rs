//! Input-file classification by extension, and mtime-based staleness
//! probing (spec §6, the collaborator layer named but not implemented by
//! the core).

use std::fs;
use std::path::Path;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// `.au` — triggers translation through `au-translate`.
    Dialect,
    /// `.c` / `.cpp` / `.asm` — compiled directly.
    CompileDirect,
    /// `.rs` / `.cs` — accumulated for a downstream toolchain.
    AccumulateDownstream,
    /// `.o` / `.so` / `.dll` — linked as-is.
    LinkAsIs,
    /// `.rc` / `.res` — resource-compiled.
    ResourceCompile,
    /// `.ico` / `.manifest` — captured into the resource template.
    ResourceTemplate,
}

/// Classifies a path by its extension. Returns `None` for unrecognized
/// extensions — the driver surfaces this as `BuildError::UnknownExtension`.
pub fn classify(path: &Path) -> Option<InputKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "au" => InputKind::Dialect,
        "c" | "cpp" | "asm" => InputKind::CompileDirect,
        "rs" | "cs" => InputKind::AccumulateDownstream,
        "o" | "so" | "dll" => InputKind::LinkAsIs,
        "rc" | "res" => InputKind::ResourceCompile,
        "ico" | "manifest" => InputKind::ResourceTemplate,
        _ => return None,
    })
}

pub fn modified_time(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Whether `object` is missing or older than `source` (spec §4.8's
/// per-file staleness test, upstream of the planner's transitive
/// propagation).
pub fn should_rebuild(source: &Path, object: &Path) -> bool {
    let Ok(source_time) = modified_time(source) else {
        return true;
    };
    match modified_time(object) {
        Ok(object_time) => source_time > object_time,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn classifies_recognized_extensions() {
        assert_eq!(classify(&PathBuf::from("a.au")), Some(InputKind::Dialect));
        assert_eq!(classify(&PathBuf::from("a.cpp")), Some(InputKind::CompileDirect));
        assert_eq!(classify(&PathBuf::from("a.rs")), Some(InputKind::AccumulateDownstream));
        assert_eq!(classify(&PathBuf::from("a.dll")), Some(InputKind::LinkAsIs));
        assert_eq!(classify(&PathBuf::from("a.rc")), Some(InputKind::ResourceCompile));
        assert_eq!(classify(&PathBuf::from("a.ico")), Some(InputKind::ResourceTemplate));
    }

    #[test]
    fn unrecognized_extension_is_none() {
        assert_eq!(classify(&PathBuf::from("a.txt")), None);
        assert_eq!(classify(&PathBuf::from("a")), None);
    }

    #[test]
    fn missing_object_forces_rebuild() {
        let dir = std::env::temp_dir().join(format!("au_build_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let source = dir.join("a.au");
        fs::write(&source, "int x;").unwrap();
        let object = dir.join("a.o");
        assert!(should_rebuild(&source, &object));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn fresher_object_skips_rebuild() {
        let dir = std::env::temp_dir().join(format!("au_build_test2_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let source = dir.join("a.au");
        fs::write(&source, "int x;").unwrap();
        let object = dir.join("a.o");
        fs::write(&object, "obj").unwrap();
        assert!(!should_rebuild(&source, &object));
        fs::remove_dir_all(&dir).unwrap();
    }
}
