//! Public-signature extractor (spec §4.6).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Opaque,
    Private,
    Default,
}

const CONTROL_KEYWORDS: [&str; 5] = ["if", "else", "switch", "for", "while"];

/// True when `line` opens a top-level function definition: its first
/// non-space token isn't a control keyword, and it contains a `)` followed
/// (modulo whitespace) by a `{`.
pub fn is_function_definition(line: &str) -> bool {
    let trimmed = line.trim_start();
    let first_token: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if CONTROL_KEYWORDS.contains(&first_token.as_str()) {
        return false;
    }
    let Some(close) = line.rfind(')') else {
        return false;
    };
    line[close + 1..].trim_start().starts_with('{')
}

/// The declaration form of a definition line: everything through the last
/// `)` before the `{`, with a trailing `;`.
pub fn extract_signature(line: &str) -> Option<String> {
    if !is_function_definition(line) {
        return None;
    }
    let close = line.rfind(')')?;
    Some(format!("{};", &line[..=close]))
}

/// What to append to each output stream for one routed signature line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    pub module_header: Option<String>,
    pub local_header: Option<String>,
    /// `public`/`opaque`: the `DLLEXPORT` forward declaration, destined for
    /// the module file's post-header (forward-decl) stream.
    pub module_post_header: Option<String>,
    /// `public`/`opaque`: the `DLLIMPORT` forward declaration, destined for
    /// the public header's post-stream.
    pub public_post_header: Option<String>,
    /// Text to prefix the in-body definition with (e.g. `"DLLEXPORT "`).
    pub body_prefix: Option<String>,
}

/// Routes one function-definition line per the visibility table. Returns
/// `None` when `line` isn't a top-level function definition.
pub fn route_signature(line: &str, visibility: Visibility) -> Option<Emission> {
    let signature = extract_signature(line)?;
    Some(match visibility {
        Visibility::Public | Visibility::Opaque => Emission {
            module_post_header: Some(format!("DLLEXPORT {signature}")),
            public_post_header: Some(format!("DLLIMPORT {signature}")),
            body_prefix: Some("DLLEXPORT ".to_string()),
            ..Default::default()
        },
        Visibility::Private => Emission {
            local_header: Some(format!("static {signature}")),
            ..Default::default()
        },
        Visibility::Default => Emission {
            module_header: Some(signature),
            ..Default::default()
        },
    })
}

/// `typedef … ;` lines are echoed verbatim to the module header.
pub fn route_typedef(line: &str) -> Option<Emission> {
    let trimmed = line.trim();
    if trimmed.starts_with("typedef") && trimmed.ends_with(';') {
        Some(Emission {
            module_header: Some(trimmed.to_string()),
            ..Default::default()
        })
    } else {
        None
    }
}

/// Whether a `typedef` line declares a function-pointer type, which the C#
/// surface mirrors as a `delegate` declaration.
pub fn is_function_pointer_typedef(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("typedef") && trimmed.contains("(*") && trimmed.contains(")(")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_keywords_are_not_definitions() {
        assert!(!is_function_definition("if (x) {"));
        assert!(!is_function_definition("while (running) {"));
    }

    #[test]
    fn ordinary_definition_is_detected() {
        assert!(is_function_definition("int add(int a, int b) {"));
    }

    #[test]
    fn declaration_without_brace_is_not_a_definition() {
        assert!(!is_function_definition("int add(int a, int b);"));
    }

    #[test]
    fn extracts_signature_with_trailing_semicolon() {
        assert_eq!(
            extract_signature("int add(int a, int b) {"),
            Some("int add(int a, int b);".to_string())
        );
    }

    #[test]
    fn public_routes_to_both_post_headers_and_body_prefix() {
        let e = route_signature("int add(int a, int b) {", Visibility::Public).unwrap();
        assert_eq!(
            e.module_post_header.as_deref(),
            Some("DLLEXPORT int add(int a, int b);")
        );
        assert_eq!(
            e.public_post_header.as_deref(),
            Some("DLLIMPORT int add(int a, int b);")
        );
        assert_eq!(e.body_prefix.as_deref(), Some("DLLEXPORT "));
    }

    #[test]
    fn private_routes_to_local_header_as_static() {
        let e = route_signature("int add(int a, int b) {", Visibility::Private).unwrap();
        assert_eq!(
            e.local_header.as_deref(),
            Some("static int add(int a, int b);")
        );
        assert!(e.module_post_header.is_none());
    }

    #[test]
    fn default_routes_unannotated_to_module_header() {
        let e = route_signature("int add(int a, int b) {", Visibility::Default).unwrap();
        assert_eq!(
            e.module_header.as_deref(),
            Some("int add(int a, int b);")
        );
    }

    #[test]
    fn typedef_is_echoed_verbatim() {
        let e = route_typedef("typedef unsigned long long u64;").unwrap();
        assert_eq!(
            e.module_header.as_deref(),
            Some("typedef unsigned long long u64;")
        );
    }

    #[test]
    fn function_pointer_typedef_is_detected() {
        assert!(is_function_pointer_typedef("typedef void (*Callback)(int x);"));
        assert!(!is_function_pointer_typedef("typedef unsigned long long u64;"));
    }
}
