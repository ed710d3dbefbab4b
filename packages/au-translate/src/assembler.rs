//! Output assembler (spec §4.9).
//!
//! Composes the four per-file streams into the final header and body text,
//! interleaves `#line` directives in non-pretty mode, and post-processes
//! headers to collapse empty conditionals and merge adjacent pack pragmas.

use crate::source_file::SourceFile;

/// Deterministic include-guard token for a path: uppercased, non-identifier
/// bytes folded to `_`. Two files with the same canonicalized path produce
/// the same guard.
pub fn include_guard_for(path: &str) -> String {
    let mut guard: String = path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    if guard.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        guard.insert(0, '_');
    }
    guard
}

/// Wraps a module header's body in the `#ifndef`/`#define`/`#endif` guard.
pub fn wrap_module_header(guard: &str, body: &str) -> String {
    format!("#ifndef {guard}\n#define {guard}\n{body}#endif\n")
}

/// One source line paired with its 1-based coordinate in the original file.
pub struct NumberedLine<'a> {
    pub line_no: usize,
    pub text: &'a str,
}

/// Interleaves `#line N "path"` before every line in non-pretty mode;
/// pretty mode emits the lines unchanged.
pub fn interleave_line_directives(path: &str, lines: &[NumberedLine<'_>], pretty: bool) -> String {
    let mut out = String::new();
    for line in lines {
        if !pretty {
            out.push_str(&format!("#line {} \"{path}\"\n", line.line_no));
        }
        out.push_str(line.text);
        out.push('\n');
    }
    out
}

/// Assembles one file's final body: embedded static prefix header, the
/// aggregated `.au.h` include list, the local header, the local
/// post-header (forward decls), then the translated body.
pub fn assemble_body(
    static_prefix: &str,
    peer_includes: &[String],
    local_header: &str,
    local_post_header: &str,
    body: &str,
) -> String {
    let mut out = String::new();
    out.push_str(static_prefix);
    if !static_prefix.ends_with('\n') {
        out.push('\n');
    }
    for peer in peer_includes {
        out.push_str(&format!("#include \"{peer}.au.h\"\n"));
    }
    out.push_str(local_header);
    out.push_str(local_post_header);
    out.push_str(body);
    out
}

/// Collapses empty `#if`/`#ifdef`/`#ifndef` … `#endif` pairs, inverts an
/// empty `#ifdef X` / `#else` into `#ifndef X`, and merges adjacent
/// `#pragma pack(pop)` / `#pragma pack(push, 1)` pairs. Iterates to a fixed
/// point, bounded by the line count.
pub fn post_process_header(text: &str) -> String {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    for _ in 0..=lines.len() {
        let mut changed = false;
        lines = merge_pack_pairs(&lines, &mut changed);
        lines = collapse_empty_conditionals(&lines, &mut changed);
        if !changed {
            break;
        }
    }
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn merge_pack_pairs(lines: &[String], changed: &mut bool) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if i + 1 < lines.len()
            && lines[i].trim() == "#pragma pack(pop)"
            && lines[i + 1].trim() == "#pragma pack(push, 1)"
        {
            *changed = true;
            i += 2;
            continue;
        }
        out.push(lines[i].clone());
        i += 1;
    }
    out
}

fn collapse_empty_conditionals(lines: &[String], changed: &mut bool) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        let opens_conditional = trimmed.starts_with("#if")
            && (trimmed.starts_with("#if ")
                || trimmed.starts_with("#ifdef ")
                || trimmed.starts_with("#ifndef ")
                || trimmed == "#if");
        if opens_conditional && i + 1 < lines.len() && lines[i + 1].trim() == "#endif" {
            *changed = true;
            i += 2;
            continue;
        }
        if let Some(token) = trimmed.strip_prefix("#ifdef ") {
            if i + 1 < lines.len() && lines[i + 1].trim() == "#else" {
                out.push(format!("#ifndef {}", token.trim()));
                *changed = true;
                i += 2;
                continue;
            }
        }
        out.push(lines[i].clone());
        i += 1;
    }
    out
}

/// Composes the public header (when the file exports one) and the module
/// header for a translated file, guard-wrapping the module header and
/// post-processing both.
pub fn assemble_headers(file: &SourceFile, guard: &str) -> (Option<String>, String) {
    let public_header = if file.streams.public_header.is_empty()
        && file.streams.public_post_header.is_empty()
    {
        None
    } else {
        let raw = format!(
            "{}{}",
            file.streams.public_post_header, file.streams.public_header
        );
        Some(post_process_header(&raw))
    };

    let module_raw = format!(
        "{}{}",
        file.streams.module_post_header, file.streams.module_header
    );
    let module_header = post_process_header(&wrap_module_header(guard, &module_raw));

    (public_header, module_header)
}
