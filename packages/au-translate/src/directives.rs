//! Directive and visibility preamble recognizer (spec §4.2).
//!
//! Classifies a single logical line into a [`DirectiveKind`], tracks the
//! small platform/build conditional state machine that gates which
//! directives feed the process-wide [`DirectiveState`], and folds
//! recognized directives into that state with their repetition policy.

use std::collections::HashSet;

/// The `#if`/`#ifdef`/`#ifndef`/`#else`/`#elif`/`#endif` family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conditional {
    If(String),
    Ifdef(String),
    Ifndef(String),
    Else,
    Elif(String),
    Endif,
}

/// Platform/build tokens the recognizer understands verbatim. Anything else
/// is an "unrecognized" `#if` that still nests but never gates.
pub const PLATFORM_TOKENS: [&str; 5] =
    ["OS_WINDOWS", "OS_LINUX", "OS_APPLE", "BUILD_EXE", "BUILD_DLL"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
    Copyright(String),
    Template { name: String, params: Vec<String> },
    /// `#template` present but not of the form `NAME` or `NAME<T1,T2,…>`
    /// spec §6 requires (missing name, unbalanced `<`/`>`, or an empty
    /// parameter list inside balanced brackets).
    MalformedTemplate { detail: String },
    Link(String),
    Vendor(String),
    Product(String),
    Detail(String),
    Version(String),
    Icon(String),
    Manifest(String),
    /// `#public_X` — `X` is the directive text following the prefix.
    Public(String),
    /// `#global_X` — `X` is the directive text following the prefix.
    Global(String),
    /// `#define`/`#include`, forwarded unchanged.
    DefineOrInclude,
    Conditional(Conditional),
    Code,
}

fn after_prefix<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix).map(str::trim)
}

/// Classifies a trimmed logical line, in the priority order spec §4.2
/// specifies.
pub fn classify(trimmed: &str) -> DirectiveKind {
    if let Some(rest) = after_prefix(trimmed, "#copyright") {
        return DirectiveKind::Copyright(rest.to_string());
    }
    if let Some(rest) = after_prefix(trimmed, "#template") {
        return parse_template(rest);
    }
    if let Some(rest) = after_prefix(trimmed, "#link") {
        return DirectiveKind::Link(rest.to_string());
    }
    if let Some(rest) = after_prefix(trimmed, "#vendor") {
        return DirectiveKind::Vendor(rest.to_string());
    }
    if let Some(rest) = after_prefix(trimmed, "#product") {
        return DirectiveKind::Product(rest.to_string());
    }
    if let Some(rest) = after_prefix(trimmed, "#detail") {
        return DirectiveKind::Detail(rest.to_string());
    }
    if let Some(rest) = after_prefix(trimmed, "#version") {
        return DirectiveKind::Version(rest.to_string());
    }
    if let Some(rest) = after_prefix(trimmed, "#icon") {
        return DirectiveKind::Icon(rest.to_string());
    }
    if let Some(rest) = after_prefix(trimmed, "#manifest") {
        return DirectiveKind::Manifest(rest.to_string());
    }
    if let Some(rest) = after_prefix(trimmed, "#public_") {
        return DirectiveKind::Public(rest.to_string());
    }
    if let Some(rest) = after_prefix(trimmed, "#global_") {
        return DirectiveKind::Global(rest.to_string());
    }
    if trimmed.starts_with("#define") || trimmed.starts_with("#include") {
        return DirectiveKind::DefineOrInclude;
    }
    if let Some(rest) = after_prefix(trimmed, "#ifdef") {
        return DirectiveKind::Conditional(Conditional::Ifdef(rest.to_string()));
    }
    if let Some(rest) = after_prefix(trimmed, "#ifndef") {
        return DirectiveKind::Conditional(Conditional::Ifndef(rest.to_string()));
    }
    if let Some(rest) = after_prefix(trimmed, "#if") {
        return DirectiveKind::Conditional(Conditional::If(rest.to_string()));
    }
    if trimmed.starts_with("#else") {
        return DirectiveKind::Conditional(Conditional::Else);
    }
    if let Some(rest) = after_prefix(trimmed, "#elif") {
        return DirectiveKind::Conditional(Conditional::Elif(rest.to_string()));
    }
    if trimmed.starts_with("#endif") {
        return DirectiveKind::Conditional(Conditional::Endif);
    }
    DirectiveKind::Code
}

fn parse_template(rest: &str) -> DirectiveKind {
    let rest = rest.trim();
    if rest.is_empty() {
        return DirectiveKind::MalformedTemplate {
            detail: "missing template name".to_string(),
        };
    }
    let has_open = rest.contains('<');
    let has_close = rest.ends_with('>');
    if has_open != has_close {
        return DirectiveKind::MalformedTemplate {
            detail: format!("unbalanced angle brackets in `{rest}`"),
        };
    }
    match rest.find('<') {
        Some(lt) => {
            let name = rest[..lt].trim().to_string();
            if name.is_empty() {
                return DirectiveKind::MalformedTemplate {
                    detail: format!("missing template name in `{rest}`"),
                };
            }
            let params: Vec<String> = rest[lt + 1..rest.len() - 1]
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
            if params.is_empty() {
                return DirectiveKind::MalformedTemplate {
                    detail: format!("empty parameter list in `{rest}`"),
                };
            }
            DirectiveKind::Template { name, params }
        }
        None => DirectiveKind::Template {
            name: rest.to_string(),
            params: Vec::new(),
        },
    }
}

/// One nesting frame of the `#if`/`#ifdef`/`#ifndef` stack.
#[derive(Debug, Clone, Copy)]
struct GateFrame {
    /// Whether this frame gates on a recognized platform/build token.
    recognized: bool,
    /// Whether code under this frame currently passes the gate.
    active: bool,
}

/// Tracks nested platform/build conditionals well enough to gate which
/// directives reach [`DirectiveState`] — not a preprocessor.
#[derive(Debug, Clone)]
pub struct PlatformGate {
    target: HashSet<String>,
    stack: Vec<GateFrame>,
}

impl PlatformGate {
    pub fn new(target: impl IntoIterator<Item = String>) -> Self {
        PlatformGate {
            target: target.into_iter().collect(),
            stack: Vec::new(),
        }
    }

    /// Whether directives encountered right now should be folded into the
    /// process-wide directive state (the conjunction of every open gate).
    pub fn is_active(&self) -> bool {
        self.stack.iter().all(|f| f.active)
    }

    pub fn apply(&mut self, cond: &Conditional) {
        match cond {
            Conditional::Ifdef(token) => self.push(token, true),
            Conditional::Ifndef(token) => self.push(token, false),
            Conditional::If(token) => {
                let recognized = PLATFORM_TOKENS.contains(&token.trim());
                self.push_raw(recognized, true, token.trim(), true)
            }
            Conditional::Else | Conditional::Elif(_) => {
                if let Some(top) = self.stack.last_mut() {
                    if top.recognized {
                        top.active = !top.active;
                    }
                }
            }
            Conditional::Endif => {
                self.stack.pop();
            }
        }
    }

    fn push(&mut self, token: &str, polarity: bool) {
        let token = token.trim();
        let recognized = PLATFORM_TOKENS.contains(&token);
        let active = if recognized {
            self.target.contains(token) == polarity
        } else {
            true
        };
        self.stack.push(GateFrame { recognized, active });
    }

    fn push_raw(&mut self, recognized: bool, polarity: bool, token: &str, _unused: bool) {
        let active = if recognized {
            self.target.contains(token) == polarity
        } else {
            true
        };
        self.stack.push(GateFrame { recognized, active });
    }
}

/// Process-wide accumulators populated by directives that survive platform
/// gating (spec §3 "Directive state").
#[derive(Debug, Clone, Default)]
pub struct DirectiveState {
    pub vendor: Option<String>,
    pub product: Option<String>,
    pub details: Option<String>,
    pub version: Option<String>,
    pub icon: Option<String>,
    pub manifest: Option<String>,
    pub copyright: Option<String>,
    pub libs: Vec<String>,
}

impl DirectiveState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a recognized directive into the accumulators per spec §4.2's
    /// repetition policy: `vendor` concatenates comma-separated, `product`/
    /// `details`/`version`/`icon`/`manifest` are first-wins, `libs` appends.
    pub fn apply(&mut self, kind: &DirectiveKind) {
        match kind {
            DirectiveKind::Copyright(text) => {
                if self.copyright.is_none() {
                    self.copyright = Some(text.clone());
                }
            }
            DirectiveKind::Link(lib) => self.libs.push(lib.clone()),
            DirectiveKind::Vendor(text) => match &mut self.vendor {
                Some(existing) => {
                    existing.push(',');
                    existing.push_str(text);
                }
                None => self.vendor = Some(text.clone()),
            },
            DirectiveKind::Product(text) => {
                if self.product.is_none() {
                    self.product = Some(text.clone());
                }
            }
            DirectiveKind::Detail(text) => {
                if self.details.is_none() {
                    self.details = Some(text.clone());
                }
            }
            DirectiveKind::Version(text) => {
                if self.version.is_none() {
                    self.version = Some(text.clone());
                }
            }
            DirectiveKind::Icon(text) => {
                if self.icon.is_none() {
                    self.icon = Some(text.clone());
                }
            }
            DirectiveKind::Manifest(text) => {
                if self.manifest.is_none() {
                    self.manifest = Some(text.clone());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_in_priority_order() {
        assert_eq!(
            classify("#copyright 2026 Acme"),
            DirectiveKind::Copyright("2026 Acme".to_string())
        );
        assert_eq!(
            classify("#template Box<T>"),
            DirectiveKind::Template {
                name: "Box".to_string(),
                params: vec!["T".to_string()],
            }
        );
        assert_eq!(classify("int x;"), DirectiveKind::Code);
    }

    #[test]
    fn template_without_name_is_malformed() {
        assert!(matches!(
            classify("#template <T>"),
            DirectiveKind::MalformedTemplate { .. }
        ));
        assert!(matches!(classify("#template"), DirectiveKind::MalformedTemplate { .. }));
    }

    #[test]
    fn template_with_unbalanced_brackets_is_malformed() {
        assert!(matches!(
            classify("#template Box<T"),
            DirectiveKind::MalformedTemplate { .. }
        ));
    }

    #[test]
    fn template_with_empty_params_is_malformed() {
        assert!(matches!(
            classify("#template Box<>"),
            DirectiveKind::MalformedTemplate { .. }
        ));
    }

    #[test]
    fn public_and_global_strip_prefix() {
        assert_eq!(
            classify("#public_define FOO"),
            DirectiveKind::Public("define FOO".to_string())
        );
        assert_eq!(
            classify("#global_include <a.h>"),
            DirectiveKind::Global("include <a.h>".to_string())
        );
    }

    #[test]
    fn vendor_concatenates_comma_separated() {
        let mut state = DirectiveState::new();
        state.apply(&DirectiveKind::Vendor("Acme".to_string()));
        state.apply(&DirectiveKind::Vendor("Widgets".to_string()));
        assert_eq!(state.vendor.as_deref(), Some("Acme,Widgets"));
    }

    #[test]
    fn product_is_first_wins() {
        let mut state = DirectiveState::new();
        state.apply(&DirectiveKind::Product("First".to_string()));
        state.apply(&DirectiveKind::Product("Second".to_string()));
        assert_eq!(state.product.as_deref(), Some("First"));
    }

    #[test]
    fn libs_append_in_order() {
        let mut state = DirectiveState::new();
        state.apply(&DirectiveKind::Link("m".to_string()));
        state.apply(&DirectiveKind::Link("pthread".to_string()));
        assert_eq!(state.libs, vec!["m".to_string(), "pthread".to_string()]);
    }

    #[test]
    fn gate_tracks_recognized_ifdef() {
        let mut gate = PlatformGate::new(["OS_LINUX".to_string()]);
        gate.apply(&Conditional::Ifdef("OS_LINUX".to_string()));
        assert!(gate.is_active());
        gate.apply(&Conditional::Else);
        assert!(!gate.is_active());
        gate.apply(&Conditional::Endif);
        assert!(gate.is_active());
    }

    #[test]
    fn gate_ignores_unrecognized_if_for_gating_but_tracks_depth() {
        let mut gate = PlatformGate::new(["OS_LINUX".to_string()]);
        gate.apply(&Conditional::If("SOME_OTHER_FLAG".to_string()));
        assert!(gate.is_active());
        gate.apply(&Conditional::Else);
        assert!(gate.is_active());
        gate.apply(&Conditional::Endif);
        assert!(gate.is_active());
    }

    #[test]
    fn gate_ifndef_inverts_polarity() {
        let mut gate = PlatformGate::new(["OS_LINUX".to_string()]);
        gate.apply(&Conditional::Ifndef("OS_LINUX".to_string()));
        assert!(!gate.is_active());
    }
}
