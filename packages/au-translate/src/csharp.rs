//! C#/P-Invoke surface generator (spec §4.7).
//!
//! Per-file state collects a sequence of tagged [`CsEmission`] records and
//! lowers them to text in a single final pass, rather than interleaving
//! string fragments as they're discovered.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgMode {
    /// Opaque structs surface as `unsafe T*`.
    PointerOfStruct,
    /// Opaque structs surface as `T*`, no `unsafe` required.
    Opaque,
}

/// Translates one dialect argument type to its C# counterpart per the
/// bidirectional table in spec §4.7. `is_opaque_struct`/`is_opaque_enum`
/// report whether the pointee/value names `EXPORTED_OPAQUE_STRUCT` /
/// `EXPORTED_OPAQUE_ENUM` (the caller looks this up in the symbol-flag map).
pub fn translate_arg_type(ty: &str, mode: ArgMode, is_opaque_struct: bool, is_opaque_enum: bool) -> String {
    let primitive = match ty {
        "u8" => Some("byte"),
        "i8" => Some("sbyte"),
        "u16" => Some("ushort"),
        "i16" => Some("short"),
        "u32" => Some("uint"),
        "i32" => Some("int"),
        "u64" => Some("ulong"),
        "i64" => Some("long"),
        "f32" => Some("float"),
        "f64" => Some("double"),
        "f16" => Some("ushort"),
        "void*" => Some("IntPtr"),
        "char*" => Some("byte*"),
        _ => None,
    };
    if let Some(p) = primitive {
        return p.to_string();
    }
    if ty == "const char*" {
        return "[MarshalAs(UnmanagedType.LPStr)] string".to_string();
    }
    if let Some(base) = ty.strip_suffix('*') {
        if is_opaque_struct {
            return match mode {
                ArgMode::PointerOfStruct => format!("unsafe {base}*"),
                ArgMode::Opaque => format!("{base}*"),
            };
        }
        return format!("ref {base}");
    }
    if is_opaque_enum {
        return "uint".to_string();
    }
    ty.to_string()
}

/// One C# parameter: name and already-translated type.
pub type CsParam = (String, String);

fn format_params(params: &[CsParam]) -> String {
    params
        .iter()
        .map(|(name, ty)| format!("{ty} {name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsEmission {
    Enum {
        name: String,
        members: Vec<String>,
    },
    StructBegin {
        name: String,
        lib: String,
        has_new: bool,
        has_delete: bool,
    },
    StructEnd,
    Delegate {
        name: String,
        return_type: String,
        params: Vec<CsParam>,
    },
    Method {
        lib: String,
        entry_point: String,
        return_type: String,
        params: Vec<CsParam>,
    },
    Raw(String),
}

/// Lowers a file's collected emissions to the final C# source text.
pub fn lower(emissions: &[CsEmission]) -> String {
    let mut out = String::new();
    for emission in emissions {
        match emission {
            CsEmission::Enum { name, members } => {
                out.push_str(&format!("public enum {name}\n{{\n"));
                for member in members {
                    out.push_str(&format!("    {member},\n"));
                }
                out.push_str("}\n\n");
            }
            CsEmission::StructBegin {
                name,
                lib,
                has_new,
                has_delete,
            } => {
                out.push_str("[StructLayout(LayoutKind.Sequential)]\n");
                out.push_str(&format!("public class {name}\n{{\n"));
                out.push_str("    private IntPtr handle;\n\n");
                if *has_new {
                    out.push_str(&format!(
                        "    [DllImport(\"{lib}\", EntryPoint = \"{name}_new\")]\n    extern private static IntPtr {name}_new(IntPtr self);\n\n"
                    ));
                    out.push_str(&format!(
                        "    public {name}()\n    {{\n        handle = {name}_new(IntPtr.Zero);\n    }}\n\n"
                    ));
                }
                if *has_delete {
                    out.push_str(&format!(
                        "    [DllImport(\"{lib}\", EntryPoint = \"{name}_delete\")]\n    extern private static void {name}_delete(IntPtr self);\n\n"
                    ));
                    out.push_str(&format!(
                        "    ~{name}()\n    {{\n        {name}_delete(handle);\n    }}\n\n"
                    ));
                }
            }
            CsEmission::StructEnd => {
                out.push_str("}\n\n");
            }
            CsEmission::Delegate {
                name,
                return_type,
                params,
            } => {
                out.push_str(&format!(
                    "public delegate {return_type} {name}({});\n\n",
                    format_params(params)
                ));
            }
            CsEmission::Method {
                lib,
                entry_point,
                return_type,
                params,
            } => {
                out.push_str(&format!("[DllImport(\"{lib}\", EntryPoint = \"{entry_point}\")]\n"));
                out.push_str(&format!(
                    "extern public static {return_type} {entry_point}({});\n\n",
                    format_params(params)
                ));
            }
            CsEmission::Raw(text) => {
                out.push_str(text);
                out.push('\n');
            }
        }
    }
    out
}
