//! Embedded resources consumed at startup (spec §6 "Embedded resources"):
//! the static prefix header prepended to every translated body, and the
//! Windows RC template used when the build targets a DLL with resources.

/// Integer/float aliases and the `DLLEXPORT`/`DLLIMPORT` macros for both
/// ABIs. Grounded on the dialect's own `austere.h`, with the integer
/// aliases renamed `i8..i64` (the naming spec.md's glossary uses) rather
/// than the historical `s8..s64`.
pub const STATIC_PREFIX_HEADER: &str = r#"#ifndef __AUSTERE_H__
#define __AUSTERE_H__
#include <stdlib.h>
typedef unsigned long long u64;
typedef unsigned int u32;
typedef unsigned short u16;
typedef unsigned char u8;
typedef long long i64;
typedef int i32;
typedef short i16;
typedef char i8;
typedef double f64;
typedef float f32;
typedef unsigned short f16;
typedef int bool;
#define false 0
#define true 1
#endif
#ifndef DLLEXPORT
#ifdef _WIN32
#define DLLEXPORT __declspec(dllexport)
#else
#define DLLEXPORT __attribute__((visibility("default")))
#endif
#endif
#ifndef DLLIMPORT
#ifdef _WIN32
#define DLLIMPORT __declspec(dllimport)
#else
#define DLLIMPORT
#endif
#endif
#ifdef _WIN32
#define OS_WINDOWS
#elif __APPLE__
#define OS_APPLE
#else
#define OS_LINUX
#endif
"#;

/// Windows RC template with `$`-prefixed placeholders the driver
/// substitutes from the accumulated directive state before handing the
/// result to the resource compiler.
pub const RC_TEMPLATE: &str = r#"#include <winuser.h>
$ICON ICON "$ICON"
1 RT_MANIFEST "$MANIFEST"
1 VERSIONINFO
FILEVERSION $VERSION
BEGIN
    BLOCK "StringFileInfo"
    BEGIN
        BLOCK "040904b0"
        BEGIN
            VALUE "CompanyName", "$VENDOR"
            VALUE "FileDescription", "$DETAILS"
            VALUE "FileVersion", "$VERSION"
            VALUE "LegalCopyright", "$COPYRIGHT"
            VALUE "OriginalFilename", "$SONAME"
            VALUE "ProductName", "$PRODUCT"
        END
    END
END
"#;

/// Per-build substitution values for [`RC_TEMPLATE`]'s placeholders.
#[derive(Debug, Clone, Default)]
pub struct RcValues {
    pub icon: String,
    pub manifest: String,
    pub details: String,
    pub vendor: String,
    pub product: String,
    pub version: String,
    pub copyright: String,
    pub soname: String,
}

/// Substitutes [`RcValues`] into [`RC_TEMPLATE`].
pub fn render_rc_template(values: &RcValues) -> String {
    RC_TEMPLATE
        .replace("$ICON", &values.icon)
        .replace("$MANIFEST", &values.manifest)
        .replace("$DETAILS", &values.details)
        .replace("$VENDOR", &values.vendor)
        .replace("$PRODUCT", &values.product)
        .replace("$VERSION", &values.version)
        .replace("$COPYRIGHT", &values.copyright)
        .replace("$SONAME", &values.soname)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_prefix_declares_all_integer_aliases() {
        for alias in ["u8", "u16", "u32", "u64", "i8", "i16", "i32", "i64", "f16", "f32", "f64"] {
            assert!(
                STATIC_PREFIX_HEADER.contains(&format!(" {alias};")),
                "missing alias {alias}"
            );
        }
    }

    #[test]
    fn render_rc_template_substitutes_all_placeholders() {
        let values = RcValues {
            icon: "app.ico".to_string(),
            manifest: "app.manifest".to_string(),
            details: "Widget Tool".to_string(),
            vendor: "Acme".to_string(),
            product: "Widgets".to_string(),
            version: "1.0.0.0".to_string(),
            copyright: "2026 Acme".to_string(),
            soname: "widgets.dll".to_string(),
        };
        let rendered = render_rc_template(&values);
        assert!(!rendered.contains('$'));
        assert!(rendered.contains("Acme"));
        assert!(rendered.contains("widgets.dll"));
    }
}
