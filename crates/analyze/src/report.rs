//! Schema lint: every design-time diagnostic for a schema, collected
//! rather than thrown, for authoring tools to display as a list.

use formlogic_core::{parse_expression, resolve_logic_order, CONTEXT_ROOTS};
use formlogic_schema::{join_path, CondExpr, FormSchema};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::type_env::{build_form_type_environment, TypeEnvironment};
use crate::validate::{validate_boolean_type, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    SyntaxError,
    TypeMismatch,
    UndefinedVariable,
    UndeclaredField,
    CyclicDependencyWarning,
}

/// One finding, located by its path in the schema
/// (`["fields", "age", "visible"]`, `["logic", "isAdult"]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub path: Vec<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LintReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

/// An expression and where it sits in the schema.
struct Site<'a> {
    path: Vec<String>,
    expr: &'a str,
    boolean: bool,
}

fn site_path(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_owned()).collect()
}

fn push_flag<'a>(sites: &mut Vec<Site<'a>>, path: [&str; 3], cond: Option<&'a CondExpr>) {
    if let Some(expr) = cond.and_then(CondExpr::as_expression) {
        sites.push(Site {
            path: site_path(&path),
            expr,
            boolean: true,
        });
    }
}

fn collect_sites(schema: &FormSchema) -> Vec<Site<'_>> {
    let mut sites = Vec::new();
    for (path, def) in schema.flatten_fields() {
        push_flag(&mut sites, ["fields", path.as_str(), "visible"], def.visible.as_ref());
        push_flag(&mut sites, ["fields", path.as_str(), "required"], def.required.as_ref());
        push_flag(&mut sites, ["fields", path.as_str(), "disabled"], def.disabled.as_ref());
    }
    for (id, annex) in &schema.annexes {
        push_flag(&mut sites, ["annexes", id.as_str(), "visible"], annex.visible.as_ref());
        push_flag(&mut sites, ["annexes", id.as_str(), "required"], annex.required.as_ref());
    }
    for (role, party) in &schema.parties {
        push_flag(&mut sites, ["parties", role.as_str(), "visible"], party.visible.as_ref());
        push_flag(&mut sites, ["parties", role.as_str(), "required"], party.required.as_ref());
    }
    for (key, expr) in &schema.logic {
        sites.push(Site {
            path: site_path(&["logic", key.as_str()]),
            expr,
            boolean: false,
        });
    }
    sites
}

/// Declared field paths, each marked true when it is a fieldset.
fn declared_fields(schema: &FormSchema) -> BTreeMap<String, bool> {
    schema
        .flatten_fields()
        .into_iter()
        .map(|(path, def)| (path, def.is_fieldset()))
        .collect()
}

/// For a `fields.…` variable, the first field path along it that the
/// schema does not declare.
fn undeclared_field(var: &str, declared: &BTreeMap<String, bool>) -> Option<String> {
    let mut segments = var.split('.');
    if segments.next() != Some("fields") {
        return None;
    }
    let mut current = String::new();
    for segment in segments {
        current = join_path(&current, segment);
        match declared.get(&current) {
            None => return Some(current),
            Some(true) => continue,
            Some(false) => return None,
        }
    }
    None
}

pub fn lint_schema(schema: &FormSchema) -> LintReport {
    let env = build_form_type_environment(schema);
    let declared = declared_fields(schema);
    let mut diagnostics = Vec::new();

    for key in resolve_logic_order(&schema.logic).cyclic_keys {
        diagnostics.push(Diagnostic {
            kind: DiagnosticKind::CyclicDependencyWarning,
            severity: Severity::Warning,
            message: format!(
                "logic key '{}' is part of, or depends on, a dependency cycle; unresolved references evaluate as undefined",
                key
            ),
            expression: schema.logic.get(&key).cloned(),
            path: vec!["logic".to_owned(), key],
        });
    }

    for site in collect_sites(schema) {
        lint_site(&site, schema, &env, &declared, &mut diagnostics);
    }

    LintReport { diagnostics }
}

fn lint_site(
    site: &Site<'_>,
    schema: &FormSchema,
    env: &TypeEnvironment,
    declared: &BTreeMap<String, bool>,
    out: &mut Vec<Diagnostic>,
) {
    let mut push = |kind, severity, message: String| {
        out.push(Diagnostic {
            kind,
            severity,
            path: site.path.clone(),
            message,
            expression: Some(site.expr.to_owned()),
        })
    };

    let outcome = parse_expression(site.expr);
    if let Some(error) = outcome.error {
        push(DiagnosticKind::SyntaxError, Severity::Error, error.to_string());
        return;
    }

    for var in &outcome.variables {
        let root = var.split('.').next().unwrap_or_default();
        if !CONTEXT_ROOTS.contains(&root) && !schema.logic.contains_key(root) {
            push(
                DiagnosticKind::UndefinedVariable,
                Severity::Error,
                format!("'{}' is neither a context root nor a logic key", root),
            );
        } else if let Some(field) = undeclared_field(var, declared) {
            push(
                DiagnosticKind::UndeclaredField,
                Severity::Warning,
                format!("field '{}' is not declared in the schema", field),
            );
        }
    }

    if site.boolean {
        if let Some(issue) = validate_boolean_type(site.expr, env).issue() {
            push(DiagnosticKind::TypeMismatch, issue.severity, issue.message.clone());
        }
    }
}
