//! Per-file translation record (spec §3 "Source file record").

use std::collections::HashSet;
use std::path::PathBuf;

use crate::csharp::CsEmission;
use crate::struct_enum::Emission as StructEmission;
use crate::signatures::Emission as SignatureEmission;
use crate::types::{SymbolFlagMap, VariableTypeTable};

/// Index into the run's arena of [`SourceFile`]s. A plain integer rather
/// than a reference so `imports_from`/`exports_to` can form cycles without
/// `Rc`/`RefCell`.
pub type SourceFileId = usize;

/// The four header/body accumulators plus the two post-header
/// (forward-declaration) accumulators described in spec §3.
#[derive(Debug, Clone, Default)]
pub struct OutputStreams {
    pub public_header: String,
    pub module_header: String,
    pub local_header: String,
    pub body: String,
    pub module_post_header: String,
    pub public_post_header: String,
}

fn append_line(buf: &mut String, line: &str) {
    if line.is_empty() {
        return;
    }
    buf.push_str(line);
    buf.push('\n');
}

/// One translation unit, tracked for the duration of a run: constructed
/// from a path, mutated by the translation pass, then by the solver
/// (reordering and edge insertion), and finally consumed by the output
/// assembler and build planner.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub raw_lines: Vec<String>,
    pub template_name: Option<String>,
    pub template_params: Vec<String>,
    pub streams: OutputStreams,
    pub cs_emissions: Vec<CsEmission>,
    pub variable_types: VariableTypeTable,
    pub symbol_flags: SymbolFlagMap,
    pub imports_from: Vec<SourceFileId>,
    pub exports_to: Vec<SourceFileId>,
    pub rebuild: bool,
    pub rearrangement_count: u32,
    /// `public`/`opaque public` struct and enum names seen so far, in
    /// declaration order, awaiting the C# struct-class emission once the
    /// whole file (and therefore its `new`/`delete` member definitions,
    /// which may appear anywhere relative to the struct body) is known.
    pub pending_cs_structs: Vec<String>,
    /// Types with a `Type::new(...)` member definition (§4.7: "if the
    /// dialect declared a `new` method").
    pub types_with_new: HashSet<String>,
    /// Types with a `Type::delete(...)` member definition.
    pub types_with_delete: HashSet<String>,
    /// For each source line that appended anything to `streams.body`, its
    /// 1-based line number paired with the text it appended. Lets the
    /// assembler interleave a `#line N` directive immediately before the
    /// emission derived from line `N` (spec §4.9) instead of stamping the
    /// whole body with a single anchor.
    pub body_by_line: Vec<(usize, String)>,
}

impl SourceFile {
    pub fn new(path: PathBuf, raw_lines: Vec<String>) -> Self {
        SourceFile {
            path,
            raw_lines,
            template_name: None,
            template_params: Vec::new(),
            streams: OutputStreams::default(),
            cs_emissions: Vec::new(),
            variable_types: VariableTypeTable::new(),
            symbol_flags: SymbolFlagMap::new(),
            imports_from: Vec::new(),
            exports_to: Vec::new(),
            rebuild: false,
            rearrangement_count: 0,
            pending_cs_structs: Vec::new(),
            types_with_new: HashSet::new(),
            types_with_delete: HashSet::new(),
            body_by_line: Vec::new(),
        }
    }

    pub fn push_public_header(&mut self, line: &str) {
        append_line(&mut self.streams.public_header, line);
    }

    pub fn push_module_header(&mut self, line: &str) {
        append_line(&mut self.streams.module_header, line);
    }

    pub fn push_local_header(&mut self, line: &str) {
        append_line(&mut self.streams.local_header, line);
    }

    pub fn push_body(&mut self, line: &str) {
        append_line(&mut self.streams.body, line);
    }

    pub fn push_module_post_header(&mut self, line: &str) {
        append_line(&mut self.streams.module_post_header, line);
    }

    pub fn push_public_post_header(&mut self, line: &str) {
        append_line(&mut self.streams.public_post_header, line);
    }

    /// Folds a struct/enum rewriter [`Emission`](StructEmission) into the
    /// file's streams.
    pub fn apply_struct_enum(&mut self, emission: &StructEmission) {
        if let Some(l) = &emission.public_header {
            self.push_public_header(l);
        }
        if let Some(l) = &emission.module_header {
            self.push_module_header(l);
        }
        if let Some(l) = &emission.local_header {
            self.push_local_header(l);
        }
        if let Some(l) = &emission.body {
            self.push_body(l);
        }
    }

    /// Folds a signature-extractor [`Emission`](SignatureEmission) into
    /// the file's streams.
    pub fn apply_signature(&mut self, emission: &SignatureEmission) {
        if let Some(l) = &emission.module_header {
            self.push_module_header(l);
        }
        if let Some(l) = &emission.local_header {
            self.push_local_header(l);
        }
        if let Some(l) = &emission.module_post_header {
            self.push_module_post_header(l);
        }
        if let Some(l) = &emission.public_post_header {
            self.push_public_post_header(l);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_file_has_empty_streams() {
        let f = SourceFile::new(PathBuf::from("a.au"), vec!["int x;".to_string()]);
        assert!(f.streams.body.is_empty());
        assert!(f.imports_from.is_empty());
        assert!(!f.rebuild);
    }

    #[test]
    fn apply_struct_enum_routes_each_field() {
        let mut f = SourceFile::new(PathBuf::from("a.au"), Vec::new());
        f.apply_struct_enum(&StructEmission {
            public_header: Some("typedef struct N N;".to_string()),
            module_header: None,
            local_header: None,
            body: None,
        });
        assert_eq!(f.streams.public_header, "typedef struct N N;\n");
    }

    #[test]
    fn apply_signature_routes_post_headers() {
        let mut f = SourceFile::new(PathBuf::from("a.au"), Vec::new());
        f.apply_signature(&SignatureEmission {
            module_header: None,
            local_header: None,
            module_post_header: Some("DLLEXPORT int add(int a, int b);".to_string()),
            public_post_header: Some("DLLIMPORT int add(int a, int b);".to_string()),
            body_prefix: Some("DLLEXPORT ".to_string()),
        });
        assert_eq!(
            f.streams.module_post_header,
            "DLLEXPORT int add(int a, int b);\n"
        );
        assert_eq!(
            f.streams.public_post_header,
            "DLLIMPORT int add(int a, int b);\n"
        );
    }
}
