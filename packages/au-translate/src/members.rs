//! Member-function resolver and type-lexicon extraction (spec §4.4, §4.5).

use crate::lexical::{read_identifier_backwards, str_replace, trim};
use crate::types::{canonicalize_type, SymbolFlagMap, SymbolFlags, VariableTypeTable};

/// A declarator candidate is valid when it matches `[A-Za-z0-9_* ]+` and
/// contains at least one space (the split between type and name).
fn valid_candidate(buffer: &str) -> bool {
    let buffer = buffer.trim();
    !buffer.is_empty()
        && buffer.contains(' ')
        && buffer
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '*' || c == ' ')
}

fn split_type_and_name(buffer: &str) -> Option<(&str, &str)> {
    let pos = buffer.rfind(' ')?;
    Some((&buffer[..pos], &buffer[pos + 1..]))
}

/// `delete obj;` → `T_delete(&obj);` (value) or `T_delete(obj); free(obj);`
/// (pointer, unless `T_delete` is `custom`, which suppresses the `free`).
/// `delimiter` is the token-scan delimiter that closed the candidate (`;`
/// in the ordinary case) so the whole matched span, delimiter included, is
/// replaced rather than leaving a stray trailing delimiter behind.
fn rewrite_delete(
    code: &str,
    name: &str,
    delimiter: char,
    table: &VariableTypeTable,
) -> Result<String, String> {
    let declared = table.type_of(name);
    if declared.is_empty() {
        return Err(format!("unknown type for {name}"));
    }
    let (is_ptr, ty) = match declared.strip_suffix('*') {
        Some(stripped) => (true, stripped),
        None => (false, declared),
    };
    let synthesized = format!("{ty}_delete");
    let is_custom = table.is_custom(&synthesized);
    let mut replacement = format!("{synthesized}(");
    if !is_ptr {
        replacement.push('&');
    }
    replacement.push_str(name);
    replacement.push_str(");");
    if is_ptr && !is_custom {
        replacement.push_str(&format!(" free({name});"));
    }
    let pattern = format!("delete {name}{delimiter}");
    Ok(str_replace(code, &pattern, &replacement))
}

/// `new Type(args)` at a call site → `Type_new(0, args)` / `Type_new(0)`.
fn rewrite_new(code: &str, type_name: &str) -> String {
    let obuffer = format!("new {type_name}(");
    let Some(pos) = code.find(&obuffer) else {
        return code.to_string();
    };
    let after = pos + obuffer.len();
    let rest = code[after..].trim_start();
    let mut replacement = format!("{type_name}_new(0");
    if !rest.starts_with(')') {
        replacement.push_str(", ");
    }
    str_replace(code, &obuffer, &replacement)
}

enum ScanOutcome {
    Rewrote(String),
    Done,
}

fn scan_once(
    code: &str,
    table: &mut VariableTypeTable,
    symbol_flags: &mut SymbolFlagMap,
    has_tail: bool,
) -> Result<ScanOutcome, String> {
    let mut buffer = String::new();
    let chars: Vec<char> = code.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, ';' | '=' | ',' | ')') {
            let candidate = buffer.trim().to_string();
            buffer.clear();
            if valid_candidate(&candidate) {
                if let Some((raw_type, name)) = split_type_and_name(&candidate) {
                    if raw_type == "delete" {
                        let rewritten = rewrite_delete(code, name, c, table)?;
                        return Ok(ScanOutcome::Rewrote(rewritten));
                    }
                    if raw_type != "return" {
                        let canonical = canonicalize_type(raw_type);
                        table.insert(name, canonical.clone());
                        let flags = symbol_flags.entry(canonical.clone()).or_default();
                        flags.insert(SymbolFlags::REFERENCED | SymbolFlags::APPEARS_IN_CODE);
                        if has_tail {
                            flags.insert(SymbolFlags::USED_IN_TAIL);
                        }
                    }
                }
            }
        }
        if c == '(' {
            let candidate = buffer.trim().to_string();
            if valid_candidate(&candidate) {
                if let Some((raw_type, name)) = split_type_and_name(&candidate) {
                    symbol_flags
                        .entry(raw_type.to_string())
                        .or_default()
                        .insert(SymbolFlags::APPEARS_IN_CODE);
                    if raw_type == "new" {
                        let rewritten = rewrite_new(code, name);
                        return Ok(ScanOutcome::Rewrote(rewritten));
                    }
                }
            }
            buffer.clear();
            continue;
        }
        if matches!(c, ';' | '=' | ',' | ')') {
            continue;
        }
        if c.is_whitespace() {
            buffer = buffer.trim_end().to_string();
            buffer.push(' ');
        } else {
            buffer.push(c);
        }
        let _ = i;
    }
    Ok(ScanOutcome::Done)
}

/// Re-entrant scan of a code line: records declared variable types,
/// canonicalizing them, and rewrites `delete`/`new` as they're encountered,
/// restarting the scan after each rewrite. Bounded so a malformed line
/// cannot loop forever.
pub fn extract_variable_types(
    code: &mut String,
    table: &mut VariableTypeTable,
    symbol_flags: &mut SymbolFlagMap,
    has_tail: bool,
) -> Result<(), String> {
    const MAX_PASSES: usize = 64;
    for _ in 0..MAX_PASSES {
        *code = trim(code).to_string();
        match scan_once(code, table, symbol_flags, has_tail)? {
            ScanOutcome::Rewrote(next) => {
                *code = next;
            }
            ScanOutcome::Done => return Ok(()),
        }
    }
    Ok(())
}

/// Rewrites every `obj.method(...)` / `obj->method(...)` call site on the
/// line into `Type_method(&obj, ...)` / `Type_method(obj, ...)`.
pub fn rewrite_method_calls(code: &str, table: &VariableTypeTable) -> Result<String, String> {
    let mut code = code.to_string();
    let mut search_from = 0usize;
    loop {
        let Some(paren) = code[search_from..].find('(').map(|p| p + search_from) else {
            break;
        };
        let before = &code[..paren];
        let arrow = before.rfind("->");
        let dot = before.rfind('.');
        let (op_start, op_len) = match (arrow, dot) {
            (Some(a), Some(d)) if d > a => (d, 1),
            (Some(a), Some(_)) => (a, 2),
            (Some(a), None) => (a, 2),
            (None, Some(d)) => (d, 1),
            (None, None) => {
                search_from = paren + 1;
                continue;
            }
        };
        let op_end = op_start + op_len;
        let method = code[op_end..paren].trim();
        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            search_from = paren + 1;
            continue;
        }
        let method = method.to_string();
        let receiver = read_identifier_backwards(&code, op_start).to_string();
        if receiver.is_empty() {
            search_from = paren + 1;
            continue;
        }
        let receiver_start = op_start - receiver.len();
        let declared = table.type_of(&receiver).to_string();
        if declared.is_empty() {
            search_from = paren + 1;
            continue;
        }
        let is_arrow = op_len == 2;
        let is_ptr = declared.ends_with('*');
        if is_ptr && !is_arrow {
            return Err(format!(
                "'{receiver}' is a pointer, use '->' for member calls"
            ));
        }
        if !is_ptr && is_arrow {
            return Err(format!(
                "'{receiver}' is not a pointer, use '.' for member calls"
            ));
        }
        let type_clean = declared.strip_suffix('*').unwrap_or(&declared);
        let receiver_expr = if is_ptr {
            receiver.clone()
        } else {
            format!("&{receiver}")
        };
        let has_args = code[paren + 1..]
            .trim_start()
            .chars()
            .next()
            .is_some_and(|c| c != ')');
        let mut replacement = format!("{type_clean}_{method}({receiver_expr}");
        if has_args {
            replacement.push_str(", ");
        }
        let new_len = replacement.len();
        code.replace_range(receiver_start..=paren, &replacement);
        search_from = receiver_start + new_len;
    }
    Ok(code)
}

/// A rewritten `Type::method(args) { … }` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDefinition {
    /// Forward-declaration form, e.g. `void Foo_bar(Foo* this, int y);`.
    pub header_decl: String,
    /// Definition-site prefix up to and including the opening brace, e.g.
    /// `void Foo_bar(Foo* restrict this, int y) {`.
    pub definition_open: String,
    pub receiver_type: String,
    pub method: String,
    /// Set when `method == "new"` and the definition isn't `custom`.
    pub ctor_prelude: Option<String>,
}

/// Rewrites a `RetType Type::method(args) {` signature line. Returns `None`
/// if the line contains no top-level `::`.
pub fn rewrite_member_definition(
    line: &str,
    is_static: bool,
    is_const: bool,
    is_custom: bool,
    table: &mut VariableTypeTable,
) -> Option<MemberDefinition> {
    let col = line.find("::")?;
    let type_name = read_identifier_backwards(line, col).to_string();
    if type_name.is_empty() {
        return None;
    }
    let type_start = col - type_name.len();
    let after_colons = &line[col + 2..];
    let paren_rel = after_colons.find('(')?;
    let method = after_colons[..paren_rel].trim().to_string();
    let paren_abs = col + 2 + paren_rel;
    let rparen = line[paren_abs..].find(')').map(|p| p + paren_abs)?;
    let args = line[paren_abs + 1..rparen].trim();
    let has_args = !args.is_empty();

    let synthesized = format!("{type_name}_{method}");
    if is_custom {
        table.mark_custom(synthesized.clone());
    }

    let ret_prefix = &line[..type_start];
    let mut header = format!("{ret_prefix}{synthesized}(");
    let mut def = header.clone();

    let is_ctor = !is_custom && method == "new";

    if !is_static {
        if is_const {
            header.push_str("const ");
            def.push_str("const ");
            header.push_str(&format!("{type_name}* this"));
            def.push_str(&format!("{type_name}* restrict this"));
        } else {
            header.push_str(&format!("{type_name}* this"));
            if is_ctor {
                def.push_str(&format!("{type_name}* this"));
            } else {
                def.push_str(&format!("{type_name}* restrict this"));
            }
        }
        if has_args {
            header.push_str(", ");
            def.push_str(", ");
        }
    }

    header.push_str(args);
    header.push_str(");");
    def.push_str(args);
    def.push_str(") {");

    let ctor_prelude = is_ctor.then(|| format!("if (!this) this = allocate(sizeof({type_name}));"));

    Some(MemberDefinition {
        header_decl: header,
        definition_open: def,
        receiver_type: type_name,
        method,
        ctor_prelude,
    })
}
