//! Struct/enum rewriter (spec §4.3).
//!
//! Converts `struct Name { … }` / `class Name { … }` / `enum Name { … }`
//! into C `typedef` forms, routing forward declarations and the aggregate
//! body to the header channel the modifier table dictates, and bracketing
//! `packed` aggregates with `#pragma pack`.

use crate::lexical::trim;
use crate::types::{SymbolFlagMap, SymbolFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Opaque,
    OpaquePublic,
    Public,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Struct,
    Enum,
}

/// Where the aggregate's body (the lines between `{` and the matching `}`)
/// is accumulated while the block is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRoute {
    /// Kept in the translated C body, unchanged.
    Body,
    /// Duplicated in full into the public header and the module header.
    PublicAndModuleHeader,
    /// Emitted in full only into the module header.
    ModuleHeader,
    /// Emitted, `typedef`-wrapped, into the local header.
    LocalHeaderTypedef,
}

/// What to append to each of the four output streams for one source line.
/// `None` means "nothing for this stream on this line".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    pub public_header: Option<String>,
    pub module_header: Option<String>,
    pub local_header: Option<String>,
    pub body: Option<String>,
}

impl Emission {
    fn only_body(line: impl Into<String>) -> Self {
        Emission {
            body: Some(line.into()),
            ..Default::default()
        }
    }
}

fn forward_decl(kind: Kind, name: &str) -> String {
    match kind {
        // C has no enum forward-declaration; both the private and opaque
        // paths fall back to the underlying integer type.
        Kind::Enum => format!("typedef int {name};"),
        Kind::Struct => format!("typedef struct {name} {name};"),
    }
}

fn kind_word(kind: Kind) -> &'static str {
    match kind {
        Kind::Struct => "struct",
        Kind::Enum => "enum",
    }
}

fn typedef_wrap(kind: Kind, name: &str, body: &str) -> String {
    format!("typedef {} {name} {{ {body} }} {name};", kind_word(kind))
}

#[derive(Debug, Clone)]
struct Pending {
    kind: Kind,
    name: String,
    route: BodyRoute,
    packed: bool,
    body_so_far: String,
}

/// Per-file rewriter state: at most one aggregate can be open at a time
/// (the dialect does not nest struct/enum definitions).
#[derive(Debug, Clone, Default)]
pub struct StructEnumRewriter {
    pending: Option<Pending>,
}

impl StructEnumRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// The name of the aggregate currently open, if any.
    pub fn pending_name(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.name.as_str())
    }

    /// Attempts to open a new aggregate from `code`, which must begin with
    /// `struct`, `class`, or `enum` and contain a `{` on the same line.
    /// Returns `None` if the line isn't a trigger.
    pub fn try_open(
        &mut self,
        code: &str,
        visibility: Visibility,
        packed: bool,
        symbol_flags: &mut SymbolFlagMap,
    ) -> Option<Emission> {
        let trimmed = trim(code);
        let (kind, rest) = if let Some(r) = trimmed.strip_prefix("struct") {
            (Kind::Struct, r)
        } else if let Some(r) = trimmed.strip_prefix("class") {
            (Kind::Struct, r)
        } else if let Some(r) = trimmed.strip_prefix("enum") {
            (Kind::Enum, r)
        } else {
            return None;
        };
        if !rest.starts_with(char::is_whitespace) || !trimmed.contains('{') {
            return None;
        }
        let rest = rest.trim_start();
        let name: String = rest
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '{')
            .collect();
        if name.is_empty() {
            return None;
        }

        symbol_flags
            .entry(name.clone())
            .or_default()
            .insert(SymbolFlags::DEFINED_HERE);

        let opaque = matches!(visibility, Visibility::Opaque | Visibility::OpaquePublic);
        if opaque {
            symbol_flags.entry(name.clone()).or_default().insert(match kind {
                Kind::Struct => SymbolFlags::EXPORTED_OPAQUE_STRUCT,
                Kind::Enum => SymbolFlags::EXPORTED_OPAQUE_ENUM,
            });
        }

        let (route, forwards): (BodyRoute, Emission) = match visibility {
            Visibility::Private => (
                BodyRoute::Body,
                Emission {
                    local_header: Some(forward_decl(kind, &name)),
                    body: Some(format!("{} {} {{", kind_word(kind), name)),
                    ..Default::default()
                },
            ),
            Visibility::Opaque => (
                BodyRoute::LocalHeaderTypedef,
                Emission {
                    module_header: Some(forward_decl(kind, &name)),
                    ..Default::default()
                },
            ),
            Visibility::OpaquePublic => (
                BodyRoute::LocalHeaderTypedef,
                Emission {
                    public_header: Some(forward_decl(kind, &name)),
                    module_header: Some(forward_decl(kind, &name)),
                    ..Default::default()
                },
            ),
            Visibility::Public => (BodyRoute::PublicAndModuleHeader, Emission::default()),
            Visibility::Default => (BodyRoute::ModuleHeader, Emission::default()),
        };

        self.pending = Some(Pending {
            kind,
            name,
            route,
            packed,
            body_so_far: String::new(),
        });

        Some(forwards)
    }

    /// Routes one body line (a field/variant declaration between the
    /// opening and closing brace) to the correct stream. `Body` echoes
    /// lines as they arrive; every other route accumulates text and emits
    /// nothing until the closing brace, where the whole aggregate is
    /// `typedef`-wrapped as a unit.
    pub fn route_line(&mut self, code_line: &str) -> Emission {
        let Some(pending) = self.pending.as_mut() else {
            return Emission::only_body(code_line);
        };
        match pending.route {
            BodyRoute::Body => Emission::only_body(code_line),
            BodyRoute::PublicAndModuleHeader | BodyRoute::ModuleHeader | BodyRoute::LocalHeaderTypedef => {
                pending.body_so_far.push_str(code_line);
                pending.body_so_far.push(' ');
                Emission::default()
            }
        }
    }

    /// Called when `code` (already trimmed) is exactly `}` or `};` and an
    /// aggregate is open. Closes it and returns the closing emission.
    pub fn try_close(&mut self, code: &str) -> Option<Emission> {
        if code != "}" && code != "};" {
            return None;
        }
        let pending = self.pending.take()?;
        let emission = match pending.route {
            BodyRoute::Body => Emission::only_body(code),
            BodyRoute::PublicAndModuleHeader => {
                let wrapped = typedef_wrap(pending.kind, &pending.name, pending.body_so_far.trim());
                Emission {
                    public_header: Some(wrapped.clone()),
                    module_header: Some(wrapped),
                    ..Default::default()
                }
            }
            BodyRoute::ModuleHeader => {
                let wrapped = typedef_wrap(pending.kind, &pending.name, pending.body_so_far.trim());
                Emission {
                    module_header: Some(wrapped),
                    ..Default::default()
                }
            }
            BodyRoute::LocalHeaderTypedef => {
                let wrapped = typedef_wrap(pending.kind, &pending.name, pending.body_so_far.trim());
                Emission {
                    local_header: Some(wrapped),
                    ..Default::default()
                }
            }
        };
        Some(if pending.packed {
            pack_wrap(emission)
        } else {
            emission
        })
    }
}

fn pack_wrap(mut emission: Emission) -> Emission {
    for field in [
        &mut emission.public_header,
        &mut emission.module_header,
        &mut emission.local_header,
        &mut emission.body,
    ] {
        if let Some(text) = field {
            *text = format!("#pragma pack(push, 1)\n{text}\n#pragma pack(pop)");
        }
    }
    emission
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_struct_routes_body_and_local_forward() {
        let mut rw = StructEnumRewriter::new();
        let mut flags = SymbolFlagMap::new();
        let open = rw
            .try_open("struct Foo {", Visibility::Private, false, &mut flags)
            .unwrap();
        assert_eq!(open.local_header.as_deref(), Some("typedef struct Foo Foo;"));
        assert_eq!(open.body.as_deref(), Some("struct Foo {"));

        let field = rw.route_line("int x;");
        assert_eq!(field.body.as_deref(), Some("int x;"));

        let close = rw.try_close("};").unwrap();
        assert_eq!(close.body.as_deref(), Some("};"));
        assert!(!rw.is_open());
    }

    #[test]
    fn public_struct_duplicates_typedef_wrapped_body_into_two_headers() {
        let mut rw = StructEnumRewriter::new();
        let mut flags = SymbolFlagMap::new();
        rw.try_open("struct Widget {", Visibility::Public, false, &mut flags)
            .unwrap();
        let field = rw.route_line("int z;");
        assert_eq!(field, Emission::default());
        let close = rw.try_close("};").unwrap();
        assert_eq!(
            close.public_header.as_deref(),
            Some("typedef struct Widget { int z; } Widget;")
        );
        assert_eq!(close.module_header, close.public_header);
        assert!(close.body.is_none());
    }

    #[test]
    fn default_struct_wraps_body_into_module_header_only() {
        let mut rw = StructEnumRewriter::new();
        let mut flags = SymbolFlagMap::new();
        rw.try_open("struct Foo {", Visibility::Default, false, &mut flags)
            .unwrap();
        rw.route_line("int x;");
        let close = rw.try_close("};").unwrap();
        assert_eq!(
            close.module_header.as_deref(),
            Some("typedef struct Foo { int x; } Foo;")
        );
        assert!(close.public_header.is_none());
        assert!(close.body.is_none());
    }

    #[test]
    fn opaque_public_struct_emits_forward_in_both_and_body_in_local_header() {
        let mut rw = StructEnumRewriter::new();
        let mut flags = SymbolFlagMap::new();
        let open = rw
            .try_open("struct Bar {", Visibility::OpaquePublic, false, &mut flags)
            .unwrap();
        assert_eq!(open.public_header.as_deref(), Some("typedef struct Bar Bar;"));
        assert_eq!(open.module_header.as_deref(), Some("typedef struct Bar Bar;"));

        rw.route_line("int z;");
        let close = rw.try_close("};").unwrap();
        assert_eq!(
            close.local_header.as_deref(),
            Some("typedef struct Bar { int z; } Bar;")
        );
        assert!(flags[&"Bar".to_string()].contains(SymbolFlags::EXPORTED_OPAQUE_STRUCT));
    }

    #[test]
    fn opaque_enum_public_surface_is_typedef_int() {
        let mut rw = StructEnumRewriter::new();
        let mut flags = SymbolFlagMap::new();
        let open = rw
            .try_open("enum Color {", Visibility::OpaquePublic, false, &mut flags)
            .unwrap();
        assert_eq!(open.public_header.as_deref(), Some("typedef int Color;"));
    }

    #[test]
    fn private_enum_forward_decl_is_typedef_int() {
        let mut rw = StructEnumRewriter::new();
        let mut flags = SymbolFlagMap::new();
        let open = rw
            .try_open("enum Color {", Visibility::Private, false, &mut flags)
            .unwrap();
        assert_eq!(open.local_header.as_deref(), Some("typedef int Color;"));
        assert_eq!(open.body.as_deref(), Some("enum Color {"));
    }

    #[test]
    fn packed_wraps_body_with_pragma_pack() {
        let mut rw = StructEnumRewriter::new();
        let mut flags = SymbolFlagMap::new();
        rw.try_open("struct Packed {", Visibility::Private, true, &mut flags)
            .unwrap();
        let close = rw.try_close("};").unwrap();
        let body = close.body.unwrap();
        assert!(body.starts_with("#pragma pack(push, 1)\n"));
        assert!(body.ends_with("#pragma pack(pop)"));
    }

    #[test]
    fn non_trigger_lines_return_none() {
        let mut rw = StructEnumRewriter::new();
        let mut flags = SymbolFlagMap::new();
        assert!(rw
            .try_open("int compute(int x) {", Visibility::Default, false, &mut flags)
            .is_none());
    }
}
