//! Build driver (spec §5, §6): owns the arena of [`SourceFile`]s, runs the
//! translation/solve/plan pipeline in sequence, and invokes the toolchain.
//! Single-threaded throughout, per spec §5 — the solver runs once after
//! translation, the planner runs once, and compiler/linker invocations are
//! synchronous and sequential.

use std::fs;
use std::path::{Path, PathBuf};

use au_translate::assembler::{
    assemble_body, assemble_headers, include_guard_for, interleave_line_directives, NumberedLine,
};
use au_translate::source_file::SourceFile;
use au_translate::TranslationContext;

use crate::cli::CliOptions;
use crate::error::{BuildError, Result};
use crate::fs_classify::{classify, InputKind};
use crate::planner::{default_object_path, plan};
use crate::resources::STATIC_PREFIX_HEADER;
use crate::solver::{build_export_graph, solve};
use crate::toolchain::{compile_c, link, run as run_toolchain};

fn base_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn os_target(opts: &CliOptions) -> String {
    opts.os.clone().unwrap_or_else(|| "linux".to_string())
}

fn platform_token(os: &str) -> String {
    match os.to_ascii_lowercase().as_str() {
        "windows" => "OS_WINDOWS",
        "apple" | "macos" => "OS_APPLE",
        _ => "OS_LINUX",
    }
    .to_string()
}

fn build_subdir(opts: &CliOptions, os: &str) -> PathBuf {
    let root = opts.dir.clone().unwrap_or_else(|| ".".to_string());
    let mode = if opts.debug { "debug" } else { "release" };
    Path::new(&root).join(format!("{os}-{mode}"))
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|source| BuildError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().map(str::to_string).collect())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BuildError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Translates one `.au` file's lines into a populated [`SourceFile`],
/// recording which source line each chunk of translated body text came
/// from so the assembler can interleave per-line `#line` directives.
fn translate_file(path: &Path, lines: Vec<String>, platform: &str, lib_name: &str) -> Result<SourceFile> {
    let mut file = SourceFile::new(path.to_path_buf(), lines.clone());
    let mut ctx = TranslationContext::new([platform.to_string()], lib_name.to_string());
    for (idx, raw) in lines.iter().enumerate() {
        let before = file.streams.body.len();
        ctx.translate_line(&mut file, raw)
            .map_err(|message| BuildError::Translate {
                path: path.to_path_buf(),
                line: idx + 1,
                message,
            })?;
        let appended = file.streams.body[before..].to_string();
        if !appended.is_empty() {
            file.body_by_line.push((idx + 1, appended));
        }
    }
    ctx.finish(&mut file);
    Ok(file)
}

/// Renders a file's final `.au.c` body, interleaving `#line` directives
/// unless `pretty` suppresses them.
fn render_body(file: &SourceFile, peer_includes: &[String], pretty: bool) -> String {
    let path_str = file.path.display().to_string();
    let lines: Vec<(usize, &str)> = file
        .body_by_line
        .iter()
        .map(|(line_no, text)| (*line_no, text.strip_suffix('\n').unwrap_or(text)))
        .collect();
    let numbered: Vec<NumberedLine<'_>> = lines
        .iter()
        .map(|(line_no, text)| NumberedLine {
            line_no: *line_no,
            text,
        })
        .collect();
    let body_with_lines = interleave_line_directives(&path_str, &numbered, pretty);
    assemble_body(
        STATIC_PREFIX_HEADER,
        peer_includes,
        &file.streams.local_header,
        &file.streams.module_post_header,
        &body_with_lines,
    )
}

/// Runs the full pipeline for the `.au` inputs in `opts.inputs` and any
/// directly-compilable companions, then invokes the toolchain. Returns
/// `Ok(())` on success, or on the exit code of the first failing
/// subprocess, per spec §6.
pub fn run(opts: &CliOptions) -> Result<()> {
    let os = os_target(opts);
    let platform = platform_token(&os);
    let build_dir = build_subdir(opts, &os);
    let lib_name = opts
        .out
        .clone()
        .unwrap_or_else(|| "a.out".to_string());

    let mut dialect_files = Vec::new();
    let mut direct_sources: Vec<PathBuf> = Vec::new();

    for input in &opts.inputs {
        match classify(input) {
            Some(InputKind::Dialect) => {
                let lines = read_lines(input)?;
                let file = translate_file(input, lines, &platform, &lib_name)?;
                dialect_files.push(file);
            }
            Some(InputKind::CompileDirect) => direct_sources.push(input.clone()),
            Some(_) => {}
            None => return Err(BuildError::UnknownExtension { path: input.clone() }),
        }
    }

    build_export_graph(&mut dialect_files);
    let warnings = solve(&mut dialect_files);
    for warning in &warnings {
        if opts.verbose {
            eprintln!("warning: {warning}");
        }
    }

    let names: Vec<String> = dialect_files.iter().map(|f| base_name(&f.path)).collect();

    let mut objects = Vec::new();
    for (idx, file) in dialect_files.iter().enumerate() {
        let peer_includes: Vec<String> = file
            .imports_from
            .iter()
            .map(|&peer_idx| names[peer_idx].clone())
            .collect();

        let base = &names[idx];
        let guard = include_guard_for(&format!("{base}.au.h"));
        let (public_header, module_header) = assemble_headers(file, &guard);
        let body = render_body(file, &peer_includes, opts.pretty);

        let c_path = build_dir.join(format!("{base}.au.c"));
        let h_path = build_dir.join(format!("{base}.au.h"));
        write_file(&c_path, &body)?;
        write_file(&h_path, &module_header)?;

        if let Some(public) = public_header {
            write_file(&Path::new(".").join(format!("{base}.dll.h")), &public)?;
        }
        if !file.cs_emissions.is_empty() {
            let cs = au_translate::csharp::lower(&file.cs_emissions);
            write_file(&Path::new(".").join(format!("{base}.dll.cs")), &cs)?;
        }

        objects.push(default_object_path(&c_path, Some(&build_dir)));
    }

    let needs_link = plan(&mut dialect_files, |f| {
        let base = base_name(&f.path);
        default_object_path(&build_dir.join(format!("{base}.au.c")), Some(&build_dir))
    });

    let compiler = opts.compiler.clone().unwrap_or_else(|| "cc".to_string());
    for (idx, file) in dialect_files.iter().enumerate() {
        if !file.rebuild {
            continue;
        }
        let base = &names[idx];
        let c_path = build_dir.join(format!("{base}.au.c"));
        let object = &objects[idx];
        run_toolchain(&compile_c(&compiler, &c_path, object, &opts.includes, &opts.defines))?;
    }

    for source in &direct_sources {
        let base = base_name(source);
        let object = default_object_path(source, Some(&build_dir));
        run_toolchain(&compile_c(&compiler, source, &object, &opts.includes, &opts.defines))?;
        objects.push(object);
        let _ = base;
    }

    if needs_link || !direct_sources.is_empty() {
        let linker = opts.linker.clone().unwrap_or_else(|| compiler.clone());
        let out_path = PathBuf::from(&lib_name);
        run_toolchain(&link(
            &linker,
            &objects,
            &out_path,
            &opts.lib_dirs,
            &opts.libs,
            opts.dll,
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_extension() {
        assert_eq!(base_name(Path::new("dir/widget.au")), "widget");
    }

    #[test]
    fn platform_token_defaults_to_linux() {
        assert_eq!(platform_token("linux"), "OS_LINUX");
        assert_eq!(platform_token("windows"), "OS_WINDOWS");
        assert_eq!(platform_token("apple"), "OS_APPLE");
    }

    #[test]
    fn build_subdir_reflects_mode() {
        let mut opts = CliOptions::default();
        opts.debug = true;
        opts.dir = Some("out".to_string());
        assert_eq!(build_subdir(&opts, "linux"), PathBuf::from("out/linux-debug"));
    }
}
