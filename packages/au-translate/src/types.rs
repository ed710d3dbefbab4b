//! Type-lexicon and symbol table (spec §2 item 2, §3 "Symbol-flag bitset" /
//! "Variable-type table").

use bitflags::bitflags;
use std::collections::HashMap;

bitflags! {
    /// Per-symbol flags. The cross-file solver only ever reads
    /// `DEFINED_HERE | REFERENCED` (mask = 3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SymbolFlags: u32 {
        /// This file defines the type.
        const DEFINED_HERE = 0b0000_0001;
        /// This file references the type.
        const REFERENCED = 0b0000_0010;
        /// Referenced where type completeness matters (e.g. a value, not a pointer).
        const USED_IN_TAIL = 0b0000_0100;
        /// The name appears anywhere in code (declarations, calls, …).
        const APPEARS_IN_CODE = 0b0000_1000;
        /// Exported as an opaque struct (`typedef struct N N;` only).
        const EXPORTED_OPAQUE_STRUCT = 0b0001_0000;
        /// Exported as an opaque enum (`typedef int N;`).
        const EXPORTED_OPAQUE_ENUM = 0b0010_0000;
    }
}

/// Mask of bits the cross-file solver (`au_build::solver`) consults.
pub const SOLVER_MASK: SymbolFlags =
    SymbolFlags::DEFINED_HERE.union(SymbolFlags::REFERENCED);

/// Per-file map from symbol name to its accumulated flags.
pub type SymbolFlagMap = HashMap<String, SymbolFlags>;

/// Sentinel recorded for a destructor supplied by the dialect author rather
/// than synthesized by the rewriter.
pub const CUSTOM: &str = "custom";
/// Sentinel for "no declared type" — an unresolved identifier.
pub const UNKNOWN: &str = "";

/// Per-file mapping from variable name to its canonical declared type.
#[derive(Debug, Clone, Default)]
pub struct VariableTypeTable {
    types: HashMap<String, String>,
}

impl VariableTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, canonical_type: impl Into<String>) {
        self.types.insert(name.into(), canonical_type.into());
    }

    /// Returns the declared type, or `UNKNOWN` if the name was never recorded.
    pub fn type_of(&self, name: &str) -> &str {
        self.types.get(name).map(String::as_str).unwrap_or(UNKNOWN)
    }

    pub fn is_custom(&self, name: &str) -> bool {
        self.type_of(name) == CUSTOM
    }

    pub fn mark_custom(&mut self, name: impl Into<String>) {
        self.insert(name, CUSTOM);
    }
}

/// Canonicalizes a declared type: trims, collapses internal whitespace runs
/// to a single space, strips `const`/`static`/`restrict` modifiers, and
/// folds `T *` to `T*`.
pub fn canonicalize_type(raw: &str) -> String {
    let collapsed: Vec<&str> = raw
        .split_whitespace()
        .filter(|word| !matches!(*word, "const" | "static" | "restrict"))
        .collect();
    let joined = collapsed.join(" ");
    joined.replace(" *", "*")
}
