//! Integration coverage for the concrete translation scenarios.

use std::path::PathBuf;

use au_translate::csharp::CsEmission;
use au_translate::source_file::SourceFile;
use au_translate::translator::TranslationContext;

fn translate(lines: &[&str]) -> SourceFile {
    let mut ctx = TranslationContext::new(["OS_LINUX".to_string()], "widgets.dll");
    let mut file = SourceFile::new(PathBuf::from("widgets.au"), Vec::new());
    for line in lines {
        ctx.translate_line(&mut file, line).unwrap();
    }
    ctx.finish(&mut file);
    file
}

#[test]
fn default_struct_and_member_function() {
    let file = translate(&[
        "struct Foo {",
        "int x;",
        "};",
        "Foo::bar(int y) {",
        "this->x = y;",
        "}",
    ]);
    assert!(file.streams.public_header.is_empty());
    assert!(file
        .streams
        .module_header
        .contains("typedef struct Foo { int x; } Foo;"));
    assert!(file.streams.module_header.contains("Foo_bar(Foo* this, int y);"));
    assert!(file
        .streams
        .body
        .contains("Foo_bar(Foo* restrict this, int y) {"));
    assert!(file.streams.body.contains("this->x = y;"));
}

#[test]
fn public_opaque_struct() {
    let file = translate(&["public opaque struct Bar {", "int z;", "};"]);
    assert_eq!(file.streams.public_header, "typedef struct Bar Bar;\n");
    assert_eq!(file.streams.module_header, "typedef struct Bar Bar;\n");
    assert_eq!(
        file.streams.local_header,
        "typedef struct Bar { int z; } Bar;\n"
    );
}

#[test]
fn delete_on_pointer_rewrites_with_free() {
    let file = translate(&["Foo* f;", "delete f;"]);
    assert!(file.streams.body.contains("Foo_delete(f); free(f);"));
}

#[test]
fn delete_on_value_rewrites_without_free() {
    let file = translate(&["Foo f;", "delete f;"]);
    assert!(file.streams.body.contains("Foo_delete(&f);"));
    assert!(!file.streams.body.contains("free(f)"));
}

#[test]
fn new_call_site_rewrites_to_synthesized_constructor() {
    let file = translate(&["Foo* f = new Foo(1, 2);"]);
    assert!(file.streams.body.contains("Foo_new(0, 1, 2);"));
}

#[test]
fn public_struct_with_declared_new_gets_csharp_constructor() {
    let file = translate(&[
        "public struct Widget {",
        "int x;",
        "};",
        "Widget::new() {",
        "this->x = 0;",
        "}",
    ]);
    let has_struct_begin = file.cs_emissions.iter().any(|e| {
        matches!(e, CsEmission::StructBegin { name, has_new, .. } if name == "Widget" && *has_new)
    });
    assert!(has_struct_begin, "expected StructBegin{{has_new: true}} for Widget");
    let text = au_translate::csharp::lower(&file.cs_emissions);
    assert!(text.contains("[DllImport(\"widgets.dll\", EntryPoint = \"Widget_new\")]"));
    assert!(text.contains("public Widget()"));
}

#[test]
fn public_free_function_gets_csharp_dllimport_surface() {
    let file = translate(&["public int add(int a, int b) {"]);
    assert_eq!(file.cs_emissions.len(), 1);
    let CsEmission::Method { entry_point, return_type, .. } = &file.cs_emissions[0] else {
        panic!("expected a Method emission");
    };
    assert_eq!(entry_point, "add");
    assert_eq!(return_type, "int");
    assert!(file.streams.module_post_header.contains("DLLEXPORT int add(int a, int b);"));
    assert!(file.streams.public_post_header.contains("DLLIMPORT int add(int a, int b);"));
}
