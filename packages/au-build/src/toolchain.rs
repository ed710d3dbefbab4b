//! Thin subprocess wrapper around the external C compiler, C# compiler,
//! resource compiler, and linker (spec §1: "it does not implement ...
//! these are invoked as external processes"). Single-threaded, synchronous
//! — one invocation at a time, per spec §5.

use std::path::Path;
use std::process::Command;

use crate::error::{BuildError, Result};

/// One external tool invocation: the executable and its argument list,
/// built up by the driver from `CliOptions` and the per-file plan.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(tool: impl Into<String>) -> Self {
        Invocation {
            tool: tool.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Runs `invocation` to completion and maps a non-zero exit or spawn
/// failure to a `BuildError`. The exit code of a failing subprocess is
/// the process's own exit code, per spec §6.
pub fn run(invocation: &Invocation) -> Result<()> {
    let status = Command::new(&invocation.tool)
        .args(&invocation.args)
        .status()
        .map_err(|source| BuildError::ToolchainSpawn {
            tool: invocation.tool.clone(),
            source,
        })?;

    if status.success() {
        return Ok(());
    }

    Err(BuildError::ToolchainFailure {
        tool: invocation.tool.clone(),
        code: status.code().unwrap_or(1),
    })
}

/// Builds the C compiler invocation for a single translated source.
pub fn compile_c(
    compiler: &str,
    source: &Path,
    object: &Path,
    includes: &[String],
    defines: &[String],
) -> Invocation {
    let mut inv = Invocation::new(compiler)
        .arg("-c")
        .arg(source.display().to_string())
        .arg("-o")
        .arg(object.display().to_string());
    for include in includes {
        inv = inv.arg(format!("-I{include}"));
    }
    for define in defines {
        inv = inv.arg(format!("-D{define}"));
    }
    inv
}

/// Builds the linker invocation for the final binary or shared library.
pub fn link(
    linker: &str,
    objects: &[std::path::PathBuf],
    out: &Path,
    lib_dirs: &[String],
    libs: &[String],
    shared: bool,
) -> Invocation {
    let mut inv = Invocation::new(linker);
    for object in objects {
        inv = inv.arg(object.display().to_string());
    }
    if shared {
        inv = inv.arg("-shared");
    }
    inv = inv.arg("-o").arg(out.display().to_string());
    for dir in lib_dirs {
        inv = inv.arg(format!("-L{dir}"));
    }
    for lib in libs {
        inv = inv.arg(format!("-l{lib}"));
    }
    inv
}
