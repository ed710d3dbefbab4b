//! Command-line surface (spec §6): the original MSVC-flavored slash flags
//! alongside their Unix short-flag aliases, plus raw compiler/linker
//! pass-through. Parsing itself is not performance-sensitive and is not
//! part of the translation core — it lives here, at the I/O boundary.

use clap::{value_parser, Arg, ArgAction, Command};

/// Rewrites a single `/Flag` or `/Flag:value` MSVC-style token into the
/// long-flag spelling `clap` understands, leaving every other token
/// (including the `-x` short aliases, which `clap` already accepts)
/// untouched.
fn normalize_alias(arg: &str) -> String {
    let Some(rest) = arg.strip_prefix('/') else {
        return arg.to_string();
    };
    let (name, value) = match rest.split_once(':') {
        Some((n, v)) => (n, Some(v)),
        None => (rest, None),
    };
    let long = match name.to_ascii_uppercase().as_str() {
        "OUT" => "out",
        "DEBUG" => "debug",
        "DIR" => "dir",
        "OS" => "os",
        "DLL" => "dll",
        "VERBOSE" => "verbose",
        "PRETTY" => "pretty",
        "HELP" => "help",
        _ => return arg.to_string(),
    };
    match value {
        Some(v) => format!("--{long}={v}"),
        None => format!("--{long}"),
    }
}

fn command() -> Command {
    Command::new("auc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translates and builds .au dialect sources")
        .disable_help_flag(true)
        .arg(Arg::new("out").long("out").short('o').value_name("PATH"))
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('g')
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("dir").long("dir").short('d').value_name("PATH"))
        .arg(Arg::new("os").long("os").short('m').value_name("TARGET"))
        .arg(
            Arg::new("dll")
                .long("dll")
                .visible_alias("shared")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("pretty").long("pretty").action(ArgAction::SetTrue))
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("compiler").long("compiler").value_name("PATH"))
        .arg(Arg::new("linker").long("linker").value_name("PATH"))
        .arg(Arg::new("cs-compiler").long("cs-compiler").value_name("PATH"))
        .arg(Arg::new("cpp-compiler").long("cpp-compiler").value_name("PATH"))
        .arg(
            Arg::new("include")
                .short('I')
                .action(ArgAction::Append)
                .value_name("DIR"),
        )
        .arg(
            Arg::new("define")
                .short('D')
                .action(ArgAction::Append)
                .value_name("NAME[=VALUE]"),
        )
        .arg(
            Arg::new("libdir")
                .short('L')
                .action(ArgAction::Append)
                .value_name("DIR"),
        )
        .arg(
            Arg::new("lib")
                .short('l')
                .action(ArgAction::Append)
                .value_name("NAME"),
        )
        .arg(
            Arg::new("inputs")
                .action(ArgAction::Append)
                .value_parser(value_parser!(std::path::PathBuf)),
        )
}

#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub out: Option<String>,
    pub debug: bool,
    pub dir: Option<String>,
    pub os: Option<String>,
    pub dll: bool,
    pub verbose: bool,
    pub pretty: bool,
    pub help: bool,
    pub compiler: Option<String>,
    pub linker: Option<String>,
    pub cs_compiler: Option<String>,
    pub cpp_compiler: Option<String>,
    pub includes: Vec<String>,
    pub defines: Vec<String>,
    pub lib_dirs: Vec<String>,
    pub libs: Vec<String>,
    pub inputs: Vec<std::path::PathBuf>,
}

pub fn parse<I, T>(args: I) -> Result<CliOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let normalized: Vec<String> = args
        .into_iter()
        .map(|a| normalize_alias(&a.into()))
        .collect();
    let matches = command().try_get_matches_from(normalized)?;

    let strings = |id: &str| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default()
    };

    Ok(CliOptions {
        out: matches.get_one::<String>("out").cloned(),
        debug: matches.get_flag("debug"),
        dir: matches.get_one::<String>("dir").cloned(),
        os: matches.get_one::<String>("os").cloned(),
        dll: matches.get_flag("dll"),
        verbose: matches.get_flag("verbose"),
        pretty: matches.get_flag("pretty"),
        help: matches.get_flag("help"),
        compiler: matches.get_one::<String>("compiler").cloned(),
        linker: matches.get_one::<String>("linker").cloned(),
        cs_compiler: matches.get_one::<String>("cs-compiler").cloned(),
        cpp_compiler: matches.get_one::<String>("cpp-compiler").cloned(),
        includes: strings("include"),
        defines: strings("define"),
        lib_dirs: strings("libdir"),
        libs: strings("lib"),
        inputs: matches
            .get_many::<std::path::PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
    })
}

pub fn usage() -> String {
    command().render_help().to_string()
}
