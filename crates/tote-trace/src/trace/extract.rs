//! Static extraction of module specifiers from JavaScript/TypeScript source.
//!
//! Only string-literal specifiers are collected. Computed requires
//! (`require(name)`) cannot be followed without executing code and are
//! skipped; files reachable only that way must be added as extra includes.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression,
    ImportDeclaration, ImportExpression,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::Serialize;
use std::path::Path;

/// Why a file was pulled into the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InclusionReason {
    /// Entry file or extra include
    Initial,
    /// Static `import ... from`
    Import,
    /// `export ... from`
    ReExport,
    /// `import("...")`
    DynamicImport,
    /// `require("...")`
    Require,
    /// `require.resolve("...")`
    RequireResolve,
}

impl InclusionReason {
    /// Whether the edge is resolved with `import` or `require` conditions.
    pub fn resolve_kind(self) -> crate::runtime::ResolveKind {
        match self {
            InclusionReason::Require | InclusionReason::RequireResolve => {
                crate::runtime::ResolveKind::CommonJs
            }
            _ => crate::runtime::ResolveKind::Esm,
        }
    }
}

/// A specifier found in a module together with how it was referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSpecifier {
    pub specifier: String,
    pub reason: InclusionReason,
}

/// Extensions whose contents are parsed for further dependencies.
pub fn is_parseable(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("js" | "mjs" | "cjs" | "jsx" | "ts" | "mts" | "cts" | "tsx")
    )
}

/// Extract every statically-known specifier from `source`.
///
/// Files that fail to parse as modules are retried as CommonJS scripts, since
/// `.js` files in `node_modules` are frequently plain CommonJS. Whatever the
/// parser recovered is still scanned; a syntax error never drops the file.
pub fn extract_specifiers(path: &Path, source: &str) -> Vec<ExtractedSpecifier> {
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs());
    let specifiers = scan(source, source_type);

    match specifiers {
        Some(found) => found,
        None if !source_type.is_typescript() => {
            scan(source, SourceType::cjs()).unwrap_or_default()
        }
        None => Vec::new(),
    }
}

/// Returns `None` when the parser gave up entirely.
fn scan(source: &str, source_type: SourceType) -> Option<Vec<ExtractedSpecifier>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if ret.panicked {
        return None;
    }

    let mut collector = SpecifierCollector::default();
    collector.visit_program(&ret.program);
    Some(collector.found)
}

#[derive(Default)]
struct SpecifierCollector {
    found: Vec<ExtractedSpecifier>,
}

impl SpecifierCollector {
    fn push(&mut self, specifier: &str, reason: InclusionReason) {
        if specifier.is_empty() {
            return;
        }
        self.found.push(ExtractedSpecifier {
            specifier: specifier.to_string(),
            reason,
        });
    }
}

fn literal_value(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::StringLiteral(lit) => Some(lit.value.to_string()),
        Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => tpl
            .quasis
            .first()
            .and_then(|quasi| quasi.value.cooked.as_ref())
            .map(|cooked| cooked.to_string()),
        _ => None,
    }
}

fn first_string_argument(call: &CallExpression<'_>) -> Option<String> {
    if call.arguments.len() != 1 {
        return None;
    }
    match &call.arguments[0] {
        Argument::StringLiteral(lit) => Some(lit.value.to_string()),
        Argument::TemplateLiteral(tpl) if tpl.expressions.is_empty() => tpl
            .quasis
            .first()
            .and_then(|quasi| quasi.value.cooked.as_ref())
            .map(|cooked| cooked.to_string()),
        _ => None,
    }
}

impl<'a> Visit<'a> for SpecifierCollector {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        if !decl.import_kind.is_type() {
            self.push(decl.source.value.as_str(), InclusionReason::Import);
        }
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        if !decl.export_kind.is_type() {
            self.push(decl.source.value.as_str(), InclusionReason::ReExport);
        }
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            if !decl.export_kind.is_type() {
                self.push(source.value.as_str(), InclusionReason::ReExport);
            }
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Some(specifier) = literal_value(&expr.source) {
            self.push(&specifier, InclusionReason::DynamicImport);
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        let reason = match &call.callee {
            Expression::Identifier(ident) if ident.name == "require" => {
                Some(InclusionReason::Require)
            }
            Expression::StaticMemberExpression(member)
                if member.property.name == "resolve"
                    && matches!(&member.object, Expression::Identifier(obj) if obj.name == "require") =>
            {
                Some(InclusionReason::RequireResolve)
            }
            _ => None,
        };

        if let Some(reason) = reason {
            if let Some(specifier) = first_string_argument(call) {
                self.push(&specifier, reason);
            }
        }

        walk::walk_call_expression(self, call);
    }
}

/// Node.js builtin modules, which are never traced.
const NODE_BUILTINS: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
    "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

/// Whether `specifier` names a Node.js builtin (`fs`, `fs/promises`, `node:test`, ...).
pub fn is_node_builtin(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    let head = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(&head)
}
