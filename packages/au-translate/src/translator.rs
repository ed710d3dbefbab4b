//! Per-line pass orchestration (spec §4.4 "Member resolver ordering").
//!
//! Ties the directive recognizer, struct/enum rewriter, member resolver,
//! signature extractor, and C# surface generator together into the
//! documented per-line pipeline.

use crate::csharp::{translate_arg_type, ArgMode, CsEmission};
use crate::directives::{classify, Conditional, DirectiveKind, DirectiveState, PlatformGate};
use crate::error::TranslateError;
use crate::lexical::trim;
use crate::members::{extract_variable_types, rewrite_member_definition, rewrite_method_calls};
use crate::signatures::{
    is_function_definition, is_function_pointer_typedef, route_signature, route_typedef,
    Visibility as SignatureVisibility,
};
use crate::source_file::SourceFile;
use crate::struct_enum::{StructEnumRewriter, Visibility as StructVisibility};
use crate::types::{canonicalize_type, SymbolFlags};

/// Modifier keywords recognized at the start of a line (spec §6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_const: bool,
    pub is_custom: bool,
    pub is_opaque: bool,
    pub is_packed: bool,
    pub is_private: bool,
    pub is_public: bool,
    pub is_static: bool,
}

/// Peels recognized modifier keywords off the front of a line, in any
/// order, stopping at the first unrecognized token.
pub fn strip_modifiers(line: &str) -> (Modifiers, &str) {
    let mut mods = Modifiers::default();
    let mut rest = line;
    loop {
        let trimmed = rest.trim_start();
        let next_word = trimmed.split_whitespace().next().unwrap_or("");
        let matched = match next_word {
            "const" => {
                mods.is_const = true;
                true
            }
            "custom" => {
                mods.is_custom = true;
                true
            }
            "opaque" => {
                mods.is_opaque = true;
                true
            }
            "packed" => {
                mods.is_packed = true;
                true
            }
            "private" => {
                mods.is_private = true;
                true
            }
            "public" => {
                mods.is_public = true;
                true
            }
            "static" => {
                mods.is_static = true;
                true
            }
            _ => false,
        };
        if !matched {
            rest = trimmed;
            break;
        }
        rest = &trimmed[next_word.len()..];
    }
    (mods, rest)
}

fn struct_visibility(mods: &Modifiers) -> StructVisibility {
    match (mods.is_opaque, mods.is_public, mods.is_private) {
        (true, true, _) => StructVisibility::OpaquePublic,
        (true, false, _) => StructVisibility::Opaque,
        (false, _, true) => StructVisibility::Private,
        (false, true, false) => StructVisibility::Public,
        (false, false, false) => StructVisibility::Default,
    }
}

fn signature_visibility(mods: &Modifiers) -> SignatureVisibility {
    if mods.is_public {
        SignatureVisibility::Public
    } else if mods.is_opaque {
        SignatureVisibility::Opaque
    } else if mods.is_private {
        SignatureVisibility::Private
    } else {
        SignatureVisibility::Default
    }
}

/// Per-run translation state shared across every line of one file: the
/// process-wide directive accumulator, the platform gate, and the
/// struct/enum rewriter's open-aggregate state.
pub struct TranslationContext {
    pub directive_state: DirectiveState,
    gate: PlatformGate,
    struct_enum: StructEnumRewriter,
    lib_name: String,
    /// 1-based number of the line currently being translated, for
    /// [`TranslateError`]'s `path:line` labeling.
    line_no: usize,
}

impl TranslationContext {
    pub fn new(platform_targets: impl IntoIterator<Item = String>, lib_name: impl Into<String>) -> Self {
        TranslationContext {
            directive_state: DirectiveState::new(),
            gate: PlatformGate::new(platform_targets),
            struct_enum: StructEnumRewriter::new(),
            lib_name: lib_name.into(),
            line_no: 0,
        }
    }

    /// Labels a rewrite-pass failure with the current file/line, per spec
    /// §7's "rewrite errors" category.
    fn rewrite_error(&self, file: &SourceFile, message: String) -> String {
        TranslateError::Rewrite {
            path: file.path.display().to_string(),
            line: self.line_no,
            message,
        }
        .to_string()
    }

    fn cs_arg_type(file: &SourceFile, raw: &str, mode: ArgMode) -> String {
        let canonical = canonicalize_type(raw);
        let base = canonical.trim_end_matches('*');
        let is_opaque_struct = file
            .symbol_flags
            .get(base)
            .is_some_and(|f| f.contains(SymbolFlags::EXPORTED_OPAQUE_STRUCT));
        let is_opaque_enum = file
            .symbol_flags
            .get(base)
            .is_some_and(|f| f.contains(SymbolFlags::EXPORTED_OPAQUE_ENUM));
        translate_arg_type(&canonical, mode, is_opaque_struct, is_opaque_enum)
    }

    /// Parses `RetType name(args) {` into a [`CsEmission::Method`], looking
    /// up opaque-struct/opaque-enum flags in the file's symbol table.
    fn build_cs_method(&self, file: &SourceFile, code: &str, mode: ArgMode) -> Option<CsEmission> {
        let open = code.find('(')?;
        let ret_and_name = code[..open].trim();
        let split = ret_and_name.rfind(char::is_whitespace)? + 1;
        let return_type_raw = ret_and_name[..split].trim();
        let name = ret_and_name[split..].trim();
        let close = open + code[open..].find(')')?;
        let args_raw = code[open + 1..close].trim();
        let mut params = Vec::new();
        if !args_raw.is_empty() {
            for part in args_raw.split(',') {
                let part = part.trim();
                let pos = part.rfind(char::is_whitespace)?;
                let (ty, pname) = (part[..pos].trim(), part[pos + 1..].trim());
                params.push((pname.to_string(), Self::cs_arg_type(file, ty, mode)));
            }
        }
        Some(CsEmission::Method {
            lib: self.lib_name.clone(),
            entry_point: name.to_string(),
            return_type: Self::cs_arg_type(file, return_type_raw, mode),
            params,
        })
    }

    /// Runs the full per-line pipeline against one already-extracted code
    /// line, mutating `file`'s streams, symbol tables, and C# emissions.
    pub fn translate_line(&mut self, file: &mut SourceFile, raw: &str) -> Result<(), String> {
        self.line_no += 1;
        let trimmed = trim(raw);
        let kind = classify(trimmed);

        if let DirectiveKind::Conditional(cond) = &kind {
            self.gate.apply(cond);
            return Ok(());
        }
        if self.gate.is_active() {
            self.directive_state.apply(&kind);
        }

        match &kind {
            DirectiveKind::MalformedTemplate { detail } => {
                return Err(TranslateError::MalformedTemplate {
                    path: file.path.display().to_string(),
                    line: self.line_no,
                    detail: detail.clone(),
                }
                .to_string());
            }
            DirectiveKind::DefineOrInclude => {
                file.push_module_header(trimmed);
                return Ok(());
            }
            DirectiveKind::Copyright(_)
            | DirectiveKind::Template { .. }
            | DirectiveKind::Link(_)
            | DirectiveKind::Vendor(_)
            | DirectiveKind::Product(_)
            | DirectiveKind::Detail(_)
            | DirectiveKind::Version(_)
            | DirectiveKind::Icon(_)
            | DirectiveKind::Manifest(_)
            | DirectiveKind::Public(_)
            | DirectiveKind::Global(_) => return Ok(()),
            DirectiveKind::Code => {}
            DirectiveKind::Conditional(_) => unreachable!(),
        }

        if self.struct_enum.is_open() {
            let emission = self
                .struct_enum
                .try_close(trimmed)
                .unwrap_or_else(|| self.struct_enum.route_line(trimmed));
            file.apply_struct_enum(&emission);
            return Ok(());
        }

        let (mods, rest) = strip_modifiers(trimmed);

        if (rest.starts_with("struct") || rest.starts_with("class") || rest.starts_with("enum"))
            && rest.contains('{')
        {
            let visibility = struct_visibility(&mods);
            if let Some(emission) =
                self.struct_enum
                    .try_open(rest, visibility, mods.is_packed, &mut file.symbol_flags)
            {
                if matches!(visibility, StructVisibility::Public | StructVisibility::OpaquePublic) {
                    if let Some(name) = self.struct_enum.pending_name() {
                        file.pending_cs_structs.push(name.to_string());
                    }
                }
                file.apply_struct_enum(&emission);
                return Ok(());
            }
        }

        // Member resolver ordering (spec §4.4): collect declared types and
        // rewrite delete/new before method calls, then the outer signature.
        let mut code = rest.to_string();
        extract_variable_types(&mut code, &mut file.variable_types, &mut file.symbol_flags, false)
            .map_err(|message| self.rewrite_error(file, message))?;
        code = rewrite_method_calls(&code, &file.variable_types)
            .map_err(|message| self.rewrite_error(file, message))?;

        if code.contains("::") {
            if let Some(def) = rewrite_member_definition(
                &code,
                mods.is_static,
                mods.is_const,
                mods.is_custom,
                &mut file.variable_types,
            ) {
                if !mods.is_static {
                    let this_type = if mods.is_const {
                        format!("const {}*", def.receiver_type)
                    } else {
                        format!("{}*", def.receiver_type)
                    };
                    file.variable_types.insert("this", this_type);
                }
                file.push_module_header(&def.header_decl);
                file.push_body(&def.definition_open);
                if let Some(prelude) = &def.ctor_prelude {
                    file.push_body(prelude);
                }
                match def.method.as_str() {
                    "new" => {
                        file.types_with_new.insert(def.receiver_type.clone());
                    }
                    "delete" => {
                        file.types_with_delete.insert(def.receiver_type.clone());
                    }
                    _ => {}
                }
                return Ok(());
            }
        }

        if let Some(emission) = route_typedef(&code) {
            file.apply_signature(&emission);
            if is_function_pointer_typedef(&code) {
                // Function-pointer typedefs surface as C# delegates; the
                // declarator grammar needed to extract name/return/params
                // here is out of this pass's scope and handled by callers
                // that already know the typedef's parsed shape.
            }
            return Ok(());
        }

        if is_function_definition(&code) {
            let visibility = signature_visibility(&mods);
            if let Some(emission) = route_signature(&code, visibility) {
                file.apply_signature(&emission);
                let body_line = match &emission.body_prefix {
                    Some(prefix) => format!("{prefix}{code}"),
                    None => code.clone(),
                };
                file.push_body(&body_line);
                if matches!(visibility, SignatureVisibility::Public | SignatureVisibility::Opaque) {
                    let mode = if matches!(visibility, SignatureVisibility::Opaque) {
                        ArgMode::Opaque
                    } else {
                        ArgMode::PointerOfStruct
                    };
                    if let Some(cs) = self.build_cs_method(file, &code, mode) {
                        file.cs_emissions.push(cs);
                    }
                }
                return Ok(());
            }
        }

        file.push_body(&code);
        Ok(())
    }

    /// Called once after every line of a file has gone through
    /// [`translate_line`](Self::translate_line). Emits the deferred C#
    /// struct classes (spec §4.7): the `new`/`delete` member definitions
    /// that gate a struct's constructor/finalizer may appear anywhere in
    /// the file relative to the struct body, so the struct-class emission
    /// can only be finalized once the whole file has been seen.
    pub fn finish(&self, file: &mut SourceFile) {
        for name in std::mem::take(&mut file.pending_cs_structs) {
            let has_new = file.types_with_new.contains(&name);
            let has_delete = file.types_with_delete.contains(&name);
            file.cs_emissions.push(CsEmission::StructBegin {
                name: name.clone(),
                lib: self.lib_name.clone(),
                has_new,
                has_delete,
            });
            file.cs_emissions.push(CsEmission::StructEnd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn new_file() -> SourceFile {
        SourceFile::new(PathBuf::from("a.au"), Vec::new())
    }

    #[test]
    fn scenario_default_struct_with_member_function() {
        let mut ctx = TranslationContext::new(["OS_LINUX".to_string()], "a.dll");
        let mut file = new_file();
        ctx.translate_line(&mut file, "struct Foo {").unwrap();
        ctx.translate_line(&mut file, "int x;").unwrap();
        ctx.translate_line(&mut file, "};").unwrap();
        ctx.translate_line(&mut file, "Foo::bar(int y) {").unwrap();
        ctx.translate_line(&mut file, "this->x = y;").unwrap();
        ctx.translate_line(&mut file, "}").unwrap();

        assert_eq!(
            file.streams.module_header,
            "typedef struct Foo { int x; } Foo;\nFoo_bar(Foo* this, int y);\n"
        );
        assert!(file.streams.public_header.is_empty());
        assert!(file.streams.body.contains("Foo_bar(Foo* restrict this, int y) {"));
        assert!(file.streams.body.contains("this->x = y;"));
    }

    #[test]
    fn scenario_delete_pointer_emits_free() {
        let mut ctx = TranslationContext::new(["OS_LINUX".to_string()], "a.dll");
        let mut file = new_file();
        ctx.translate_line(&mut file, "Foo* f;").unwrap();
        ctx.translate_line(&mut file, "delete f;").unwrap();
        assert!(file.streams.body.contains("Foo_delete(f); free(f);"));
    }

    #[test]
    fn scenario_delete_value_has_no_free() {
        let mut ctx = TranslationContext::new(["OS_LINUX".to_string()], "a.dll");
        let mut file = new_file();
        ctx.translate_line(&mut file, "Foo f;").unwrap();
        ctx.translate_line(&mut file, "delete f;").unwrap();
        assert!(file.streams.body.contains("Foo_delete(&f);"));
        assert!(!file.streams.body.contains("free(f)"));
    }

    #[test]
    fn scenario_public_function_emits_dllimport_surface() {
        let mut ctx = TranslationContext::new(["OS_LINUX".to_string()], "a.dll");
        let mut file = new_file();
        ctx.translate_line(&mut file, "public int add(int a, int b) {").unwrap();
        assert_eq!(file.cs_emissions.len(), 1);
        match &file.cs_emissions[0] {
            CsEmission::Method { entry_point, return_type, lib, .. } => {
                assert_eq!(entry_point, "add");
                assert_eq!(return_type, "int");
                assert_eq!(lib, "a.dll");
            }
            other => panic!("unexpected emission: {other:?}"),
        }
        assert!(file.streams.body.starts_with("DLLEXPORT "));
    }

    #[test]
    fn public_struct_with_new_emits_csharp_constructor_and_dllimport() {
        let mut ctx = TranslationContext::new(["OS_LINUX".to_string()], "a.dll");
        let mut file = new_file();
        ctx.translate_line(&mut file, "public struct Foo {").unwrap();
        ctx.translate_line(&mut file, "int x;").unwrap();
        ctx.translate_line(&mut file, "};").unwrap();
        ctx.translate_line(&mut file, "Foo::new() {").unwrap();
        ctx.translate_line(&mut file, "this->x = 0;").unwrap();
        ctx.translate_line(&mut file, "}").unwrap();
        ctx.finish(&mut file);

        let struct_begin = file
            .cs_emissions
            .iter()
            .find(|e| matches!(e, CsEmission::StructBegin { name, .. } if name == "Foo"))
            .expect("expected a StructBegin emission for Foo");
        match struct_begin {
            CsEmission::StructBegin { has_new, has_delete, .. } => {
                assert!(*has_new);
                assert!(!*has_delete);
            }
            other => panic!("unexpected emission: {other:?}"),
        }
        let text = crate::csharp::lower(&file.cs_emissions);
        assert!(text.contains("public Foo()"));
        assert!(text.contains("Foo_new"));
    }

    #[test]
    fn opaque_public_struct_example() {
        let mut ctx = TranslationContext::new(["OS_LINUX".to_string()], "a.dll");
        let mut file = new_file();
        ctx.translate_line(&mut file, "public opaque struct Bar {").unwrap();
        ctx.translate_line(&mut file, "int z;").unwrap();
        ctx.translate_line(&mut file, "};").unwrap();
        assert_eq!(
            file.streams.public_header,
            "typedef struct Bar Bar;\n"
        );
        assert_eq!(file.streams.module_header, "typedef struct Bar Bar;\n");
        assert_eq!(
            file.streams.local_header,
            "typedef struct Bar { int z; } Bar;\n"
        );
    }

    #[test]
    fn malformed_template_directive_is_a_parse_error() {
        let mut ctx = TranslationContext::new(["OS_LINUX".to_string()], "a.dll");
        let mut file = new_file();
        let err = ctx.translate_line(&mut file, "#template Box<>").unwrap_err();
        assert!(err.contains("malformed #template directive"));
        assert!(err.contains("a.au:1"));
    }
}
